//! The Maven version model and its ordering
//!
//! A [`Version`] is a major number plus a sequence of fields, each tagged
//! with the separator that introduced it. Construction runs the raw string
//! through [`normalize`], tokenizes it, then trims trailing null fields per
//! hyphen-delimited group. The normalized string is retained verbatim: it is
//! the canonical serialized form, and comparison re-parses it so padding can
//! see separators that trimming removed.
//!
//! Ordering and equality are the Maven rules, not a lexicographic or semver
//! order: both versions are padded to the same field count, then compared
//! field by field with qualifier aliasing. `1.0.0` equals `1`, `1ga` equals
//! `1`, and `1.0-alpha-1` sorts before `1.0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::version::error::VersionError;
use crate::version::normalize::normalize;

/// The separator introducing a version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    Dot,
    Hyphen,
}

impl Separator {
    fn from_byte(b: u8) -> Self {
        if b == b'.' {
            Separator::Dot
        } else {
            Separator::Hyphen
        }
    }

    fn as_char(self) -> char {
        match self {
            Separator::Dot => '.',
            Separator::Hyphen => '-',
        }
    }
}

/// One version field after the major number.
///
/// `numeric` is the parsed value when the text is a base-10 integer;
/// qualifiers keep `None` and compare through the alias tables.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub(crate) separator: Separator,
    pub(crate) value: String,
    pub(crate) numeric: Option<u64>,
}

impl Field {
    fn new(separator: Separator, value: &str) -> Self {
        Self {
            separator,
            value: value.to_string(),
            numeric: value.parse().ok(),
        }
    }

    /// The padding field for a separator: `0` after a dot, the empty
    /// qualifier after a hyphen.
    fn null(separator: Separator) -> Self {
        match separator {
            Separator::Dot => Self {
                separator,
                value: "0".to_string(),
                numeric: Some(0),
            },
            Separator::Hyphen => Self {
                separator,
                value: String::new(),
                numeric: None,
            },
        }
    }
}

/// A version as defined by Maven.
///
/// See <https://maven.apache.org/pom.html> for the ordering and aliasing
/// rules this implements.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    fields: Vec<Field>,
    normalized: String,
}

impl Version {
    /// Parses a Maven version string.
    ///
    /// Fails only when the text before the first separator (or the whole
    /// string) is not a non-negative integer.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let normalized = normalize(input);
        let Some(at) = normalized.find(['-', '.']) else {
            let major = parse_major(&normalized)?;
            return Ok(Self {
                major,
                fields: Vec::new(),
                normalized,
            });
        };
        let major = parse_major(&normalized[..at])?;
        let mut fields = Vec::new();
        let mut separator = Separator::from_byte(normalized.as_bytes()[at]);
        let mut rest = &normalized[at + 1..];
        loop {
            match rest.find(['-', '.']) {
                None => {
                    fields.push(Field::new(separator, rest));
                    break;
                }
                Some(i) => {
                    fields.push(Field::new(separator, &rest[..i]));
                    separator = Separator::from_byte(rest.as_bytes()[i]);
                    rest = &rest[i + 1..];
                }
            }
        }
        Ok(Self {
            major,
            fields: trim_null_fields(fields),
            normalized,
        })
    }

    /// The major number preceding any separator.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Renders the trimmed form: the major number followed by the fields
    /// that survived null trimming. A version that trims away entirely
    /// renders as the empty string, not `"0"`.
    pub fn to_trimmed_string(&self) -> String {
        let mut out = self.major.to_string();
        for field in &self.fields {
            out.push(field.separator.as_char());
            out.push_str(&field.value);
        }
        if out == "0" {
            String::new()
        } else {
            out
        }
    }

    /// True if this version lies in at least one interval of `requirement`.
    ///
    /// A requirement that does not parse satisfies nothing.
    pub fn satisfies(&self, requirement: &str) -> bool {
        crate::version::Requirement::parse(requirement)
            .map(|r| r.matches(self))
            .unwrap_or(false)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    /// The normalized form; re-parsing it yields an equal version.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn parse_major(text: &str) -> Result<u64, VersionError> {
    text.parse()
        .map_err(|_| VersionError::NotANumber(text.to_string()))
}

/// Drops trailing null fields from each hyphen-delimited group.
///
/// A hyphen-separated field starts a new group; within a group the scan runs
/// from the end and stops at the first field that does not reduce to empty
/// under [`strip_null_suffix`].
fn trim_null_fields(fields: Vec<Field>) -> Vec<Field> {
    let mut trimmed = Vec::with_capacity(fields.len());
    let mut group: Vec<Field> = Vec::new();
    for field in fields {
        if field.separator == Separator::Hyphen {
            trim_group(&mut group);
            trimmed.append(&mut group);
        }
        group.push(field);
    }
    trim_group(&mut group);
    trimmed.append(&mut group);
    trimmed
}

fn trim_group(group: &mut Vec<Field>) {
    while let Some(last) = group.last() {
        if strip_null_suffix(&last.value).is_empty() {
            group.pop();
        } else {
            break;
        }
    }
}

/// Strips the trailing null markers `0`, `final`, `ga`, `-`, `.` in that
/// order, each at most once. A value that ends up empty is a null field.
fn strip_null_suffix(value: &str) -> &str {
    let value = value.strip_suffix('0').unwrap_or(value);
    let value = value.strip_suffix("final").unwrap_or(value);
    let value = value.strip_suffix("ga").unwrap_or(value);
    let value = value.strip_suffix('-').unwrap_or(value);
    value.strip_suffix('.').unwrap_or(value)
}

/// Stretches the shorter version with null fields so both have the same
/// field count. The padding field's separator mirrors the longer version's
/// field at that index. Works on fresh re-parses of the normalized form,
/// since trimming removed the separator context padding needs.
fn pad_for_comparison(v: &Version, w: &Version) -> (Version, Version) {
    if v.fields.len() == w.fields.len() {
        return (v.clone(), w.clone());
    }
    let mut v = Version::parse(&v.normalized).unwrap_or_else(|_| v.clone());
    let mut w = Version::parse(&w.normalized).unwrap_or_else(|_| w.clone());
    if w.fields.len() > v.fields.len() {
        pad_to(&mut v, &w);
    } else {
        pad_to(&mut w, &v);
    }
    (v, w)
}

fn pad_to(shorter: &mut Version, longer: &Version) {
    for field in longer.fields.iter().skip(shorter.fields.len()) {
        shorter.fields.push(Field::null(field.separator));
    }
}

/// Maps a qualifier to its position in the ordering, oldest first:
/// `alpha` < `beta` < `milestone` < `rc` < `snapshot` < the empty/release
/// qualifier < `sp` < everything else by its lowercased text.
fn ordering_key(qualifier: &str) -> String {
    let q = qualifier.to_ascii_lowercase();
    match q.as_str() {
        "alpha" | "a" => "1".to_string(),
        "beta" | "b" => "2".to_string(),
        "milestone" | "m" => "3".to_string(),
        "rc" | "cr" => "4".to_string(),
        "snapshot" => "5".to_string(),
        "" | "final" | "ga" => "6".to_string(),
        "sp" => "7".to_string(),
        _ => q,
    }
}

/// Maps a qualifier to its canonical token for equality: `alpha`/`a`,
/// `beta`/`b`, `milestone`/`m`, `rc`/`cr` are the same qualifier, and
/// `final`/`ga` are the release (empty) qualifier.
fn equality_key(qualifier: &str) -> String {
    let q = qualifier.to_ascii_lowercase();
    match q.as_str() {
        "alpha" => "a".to_string(),
        "beta" => "b".to_string(),
        "milestone" => "m".to_string(),
        "rc" => "cr".to_string(),
        "final" | "ga" => String::new(),
        _ => q,
    }
}

fn compare_fields(a: &Field, b: &Field) -> Ordering {
    if a.separator == b.separator {
        match (a.numeric, b.numeric) {
            (Some(x), Some(y)) => x.cmp(&y),
            // a number is newer than any qualifier
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => ordering_key(&a.value).cmp(&ordering_key(&b.value)),
        }
    } else {
        // ".qualifier" < "-qualifier" < "-number" < ".number"
        match (a.numeric.is_some(), b.numeric.is_some()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => match a.separator {
                Separator::Hyphen => Ordering::Less,
                Separator::Dot => Ordering::Greater,
            },
            (false, false) => match a.separator {
                Separator::Dot => Ordering::Less,
                Separator::Hyphen => Ordering::Greater,
            },
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        if self.major != other.major {
            return false;
        }
        let (a, b) = pad_for_comparison(self, other);
        a.fields.iter().zip(&b.fields).all(|(x, y)| {
            x.separator == y.separator
                && match (x.numeric, y.numeric) {
                    (Some(m), Some(n)) => m == n,
                    (None, None) => equality_key(&x.value) == equality_key(&y.value),
                    _ => false,
                }
        })
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.major != other.major {
            return self.major.cmp(&other.major);
        }
        let (a, b) = pad_for_comparison(self, other);
        for (x, y) in a.fields.iter().zip(&b.fields) {
            match compare_fields(x, y) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Version {
    /// Serializes as the normalized string form.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.normalized)
    }
}

impl<'de> Deserialize<'de> for Version {
    /// Rehydrates by re-parsing the serialized string.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A sortable sequence of Maven versions.
///
/// Offers the length/swap/pairwise-less hooks an external sort needs, and
/// sorts itself through the Maven [`Ord`]. Serializes transparently as a
/// sequence of normalized version strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Versions(Vec<Version>);

impl Versions {
    /// Parses every string; the first failure aborts.
    pub fn parse<S: AsRef<str>>(strings: &[S]) -> Result<Self, VersionError> {
        strings
            .iter()
            .map(|s| Version::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, version: Version) {
        self.0.push(version);
    }

    pub fn last(&self) -> Option<&Version> {
        self.0.last()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// True if the version at `i` is older than the version at `j`.
    pub fn less_than(&self, i: usize, j: usize) -> bool {
        self.0[i] < self.0[j]
    }

    /// Sorts oldest first.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// The normalized string form of every version, in order.
    pub fn strings(&self) -> Vec<String> {
        self.0.iter().map(Version::to_string).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.0.iter()
    }
}

impl From<Vec<Version>> for Versions {
    fn from(versions: Vec<Version>) -> Self {
        Self(versions)
    }
}

impl<'a> IntoIterator for &'a Versions {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "1")]
    #[case("1.0.1", "1.0.1")]
    #[case("1.ga", "1")]
    #[case("1.0.final", "1")]
    #[case("1.final", "1")]
    #[case("1.0", "1")]
    #[case("1.", "1")]
    #[case("1-", "1")]
    #[case("1.0.0-foo.0.0", "1-foo")]
    #[case("1.0.0-0.0.0", "1")]
    #[case("0", "")]
    #[case("0.0", "")]
    fn trimmed_string_drops_null_fields(#[case] input: &str, #[case] expected: &str) {
        let v = Version::parse(input).unwrap();
        assert_eq!(v.to_trimmed_string(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("a.1")]
    #[case("x1")]
    #[case("-1")]
    fn parse_rejects_non_numeric_major(#[case] input: &str) {
        assert!(matches!(
            Version::parse(input),
            Err(VersionError::NotANumber(_))
        ));
    }

    #[rstest]
    #[case("1.1.1", "1")]
    #[case("1.0", "1.1.2")]
    #[case("1.0", "1.1-2")]
    #[case("1.1.1", "1.1.2")]
    #[case("1-1.1", "1.1.2")]
    fn padding_mirrors_the_longer_separators(#[case] left: &str, #[case] right: &str) {
        let v = Version::parse(left).unwrap();
        let w = Version::parse(right).unwrap();
        let (vp, wp) = pad_for_comparison(&v, &w);
        assert_eq!(vp.fields.len(), wp.fields.len());

        let (shorter, longer) = if v.fields.len() <= w.fields.len() {
            (&vp, &wp)
        } else {
            (&wp, &vp)
        };
        let shorter_len = v.fields.len().min(w.fields.len());
        for i in shorter_len..shorter.fields.len() {
            assert_eq!(shorter.fields[i].separator, longer.fields[i].separator);
            match shorter.fields[i].separator {
                Separator::Dot => assert_eq!(shorter.fields[i].value, "0"),
                Separator::Hyphen => assert_eq!(shorter.fields[i].value, ""),
            }
        }
    }

    #[rstest]
    #[case("1.0.0")]
    #[case("1-1.foo-bar1baz-.1")]
    #[case("1.0-SNAPSHOT")]
    #[case("2.0.0.v200706041905-7C78EK9E_EkMNfNOd2d8qq")]
    fn display_round_trips(#[case] input: &str) {
        let v = Version::parse(input).unwrap();
        let reparsed = Version::parse(&v.to_string()).unwrap();
        assert_eq!(v, reparsed);
        assert_eq!(v.to_string(), reparsed.to_string());
    }

    #[test]
    fn numeric_fields_compare_by_value_not_text() {
        let v = Version::parse("1.01").unwrap();
        let w = Version::parse("1.1").unwrap();
        assert_eq!(v, w);
        assert_eq!(v.cmp(&w), Ordering::Equal);
    }

    #[test]
    fn large_numeric_fields_do_not_overflow() {
        let v = Version::parse("1.2.3-10000000000").unwrap();
        let w = Version::parse("1.2.3-10000000001").unwrap();
        assert!(v < w);
    }

    #[test]
    fn ordering_ties_agree_with_equality() {
        for (a, b) in [("1", "1.0"), ("1ga", "1"), ("1cr", "1rc"), ("1-foo", "1-foo-0")] {
            let v = Version::parse(a).unwrap();
            let w = Version::parse(b).unwrap();
            assert_eq!(v.cmp(&w), Ordering::Equal, "{a} vs {b}");
            assert_eq!(v, w, "{a} vs {b}");
        }
    }

    #[test]
    fn dot_number_beats_hyphen_qualifier_in_both_directions() {
        let num = Version::parse("1.1").unwrap();
        let qual = Version::parse("1-foo").unwrap();
        assert!(qual < num);
        assert!(!(num < qual));
    }

    #[test]
    fn versions_sort_hooks() {
        let mut versions = Versions::parse(&["2.0", "1.0-alpha-1", "1.0"]).unwrap();
        assert_eq!(versions.len(), 3);
        assert!(versions.less_than(1, 0));
        versions.swap(0, 2);
        assert_eq!(versions.strings()[0], "1.0");
        versions.sort();
        assert_eq!(
            versions.strings(),
            vec!["1.0-alpha-1".to_string(), "1.0".to_string(), "2.0".to_string()]
        );
    }
}
