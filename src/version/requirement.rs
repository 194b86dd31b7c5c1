//! Version requirement parsing and matching
//!
//! Maven requirement strings are one or more comma-separated intervals:
//!
//! - `1.0`: "soft" recommendation, treated as the single point `[1.0,1.0]`
//! - `[1.0]`: hard requirement on exactly 1.0
//! - `(,1.0]`: x <= 1.0
//! - `[1.2,1.3]`: 1.2 <= x <= 1.3
//! - `[1.0,2.0)`: 1.0 <= x < 2.0
//! - `[1.5,)`: x >= 1.5
//! - `(,1.0],[1.2,)`: x <= 1.0 or x >= 1.2
//! - `(,1.1),(1.1,)`: everything except 1.1
//!
//! Rejected: text outside the bracketed intervals, an exclusive bracket
//! around a single version (`(1.0)`, `[1.0)`, `(1.0]`), reversed bounds,
//! and a fully or partially parenthesized interval whose bounds are equal.
//! Overlapping or unsorted intervals are deliberately accepted.

use crate::version::error::RequirementError;
use crate::version::Version;

/// One interval of a requirement. `None` bounds are unbounded.
#[derive(Debug, Clone)]
struct Interval {
    lower: Option<Version>,
    upper: Option<Version>,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl Interval {
    /// The closed single-point interval a bare version denotes.
    fn pin(version: Version) -> Self {
        Self {
            lower: Some(version.clone()),
            upper: Some(version),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(lower) => lower < version || (self.lower_inclusive && version == lower),
        };
        let below_upper = match &self.upper {
            None => true,
            Some(upper) => version < upper || (self.upper_inclusive && version == upper),
        };
        above_lower && below_upper
    }
}

/// A parsed requirement: an ordered sequence of intervals, matched as a
/// disjunction.
#[derive(Debug, Clone)]
pub struct Requirement {
    intervals: Vec<Interval>,
}

impl Requirement {
    /// Parses a requirement string.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        if !input.contains(['[', ']', '(', ')']) {
            // a bare version is a soft pin; a bare comma is an interval
            // list without brackets
            if let Some(at) = input.find(',') {
                return Err(RequirementError::StrayText {
                    input: input.to_string(),
                    found: input[at..].to_string(),
                });
            }
            let version = Version::parse(input)?;
            return Ok(Self {
                intervals: vec![Interval::pin(version)],
            });
        }

        let marks: Vec<(usize, char)> = input
            .char_indices()
            .filter(|(_, c)| matches!(c, '[' | ']' | '(' | ')'))
            .collect();
        if marks.len() % 2 != 0 {
            return Err(RequirementError::Brackets(input.to_string()));
        }

        let mut intervals = Vec::new();
        let mut expected_from = 0;
        for pair in marks.chunks(2) {
            let (open_at, open) = pair[0];
            let (close_at, close) = pair[1];
            if !matches!(open, '[' | '(') || !matches!(close, ']' | ')') {
                return Err(RequirementError::Brackets(input.to_string()));
            }
            // nothing before the first interval, exactly a comma between
            // intervals
            let gap = &input[expected_from..open_at];
            let expected_gap = if intervals.is_empty() { "" } else { "," };
            if gap != expected_gap {
                return Err(RequirementError::StrayText {
                    input: input.to_string(),
                    found: gap.to_string(),
                });
            }
            let body = &input[open_at + 1..close_at];
            intervals.push(parse_interval(body, open == '[', close == ']')?);
            expected_from = close_at + 1;
        }
        if expected_from < input.len() {
            return Err(RequirementError::StrayText {
                input: input.to_string(),
                found: input[expected_from..].to_string(),
            });
        }
        Ok(Self { intervals })
    }

    /// True if `version` lies in at least one interval.
    pub fn matches(&self, version: &Version) -> bool {
        self.intervals.iter().any(|i| i.contains(version))
    }
}

fn parse_interval(
    body: &str,
    lower_inclusive: bool,
    upper_inclusive: bool,
) -> Result<Interval, RequirementError> {
    let mut parts = body.split(',');
    let first = parts.next().unwrap_or("");
    let second = parts.next();
    if parts.next().is_some() {
        return Err(RequirementError::Malformed(body.to_string()));
    }

    let interval = match second {
        None => {
            let version = Version::parse(first)?;
            Interval {
                lower: Some(version.clone()),
                upper: Some(version),
                lower_inclusive,
                upper_inclusive,
            }
        }
        Some(second) => {
            let lower = if first.is_empty() {
                None
            } else {
                Some(Version::parse(first)?)
            };
            let upper = if second.is_empty() {
                None
            } else {
                Some(Version::parse(second)?)
            };
            Interval {
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            }
        }
    };

    if let (Some(lower), Some(upper)) = (&interval.lower, &interval.upper) {
        if upper < lower {
            return Err(RequirementError::ReversedBounds(body.to_string()));
        }
        // a single version, or equal bounds, with any exclusive end is an
        // empty range
        if (!interval.lower_inclusive || !interval.upper_inclusive) && upper == lower {
            return Err(RequirementError::EmptyInterval(body.to_string()));
        }
    }
    Ok(interval)
}
