use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version string: major value {0:?} is not a number")]
    NotANumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("unexpected {found:?} outside the bracketed intervals of {input:?}")]
    StrayText { input: String, found: String },

    #[error("unbalanced or misordered brackets in {0:?}")]
    Brackets(String),

    #[error("interval {0:?} must contain a single version or a lower,upper pair")]
    Malformed(String),

    #[error("interval {0:?} has its bounds reversed")]
    ReversedBounds(String),

    #[error("interval {0:?} is empty: exclusive bound around a single version")]
    EmptyInterval(String),

    #[error("could not parse version in requirement: {0}")]
    Version(#[from] VersionError),
}
