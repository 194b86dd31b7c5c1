//! Canonical lexical form for raw version strings
//!
//! Before tokenizing, a version string is rewritten so that every token
//! boundary is an explicit separator:
//!
//! - a dot-group ending in `-` gets a `0` appended (`1-` becomes `1-0`)
//! - an empty dot-group becomes `0` (`1.` becomes `1.0`)
//! - a `-` is inserted between every letter/digit adjacency, in both
//!   directions (`foo1bar` becomes `foo-1-bar`, `123bar` becomes `123-bar`)
//!
//! The result is what a [`Version`](crate::version::Version) retains as its
//! normalized form. Only ASCII is relevant for Maven version tokens.

use std::sync::LazyLock;

use regex::Regex;

static LETTER_THEN_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-zA-Z][0-9]").unwrap());
static DIGIT_THEN_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9][a-zA-Z]").unwrap());

/// Rewrites `version` into its canonical lexical form.
pub fn normalize(version: &str) -> String {
    let groups: Vec<String> = version
        .split('.')
        .map(|group| {
            let mut group = group.to_string();
            if group.ends_with('-') {
                group.push('0');
            }
            if group.is_empty() {
                group = "0".to_string();
            }
            hyphenate_alphanumeric(&group)
        })
        .collect();
    groups.join(".")
}

/// Inserts a hyphen between letter/digit adjacencies, letter-then-digit
/// first, then digit-then-letter, each as a single scan.
fn hyphenate_alphanumeric(s: &str) -> String {
    let s = split_matches(s, &LETTER_THEN_DIGIT);
    split_matches(&s, &DIGIT_THEN_LETTER)
}

fn split_matches(s: &str, boundary: &Regex) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for m in boundary.find_iter(s) {
        // every match is two ASCII characters; split between them
        out.push_str(&s[last..m.start() + 1]);
        out.push('-');
        last = m.start() + 1;
    }
    out.push_str(&s[last..]);
    out
}
