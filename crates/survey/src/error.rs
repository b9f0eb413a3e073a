use snafu::Snafu;

use crate::form::SurveyField;

/// Client-side validation failure. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("{field} is required"))]
    Missing { field: SurveyField },
    #[snafu(display("{field} must be {expected}"))]
    InvalidFormat {
        field: SurveyField,
        expected: &'static str,
    },
    #[snafu(display("{field} must be at least {min}"))]
    BelowMinimum { field: SurveyField, min: f64 },
    #[snafu(display("{field} must be below {limit}"))]
    NotBelow { field: SurveyField, limit: f64 },
    #[snafu(display("{field} must be between {min} and {max}"))]
    OutOfRange {
        field: SurveyField,
        min: u32,
        max: u32,
    },
    #[snafu(display("{field} must be at most {max} characters"))]
    TooLong { field: SurveyField, max: usize },
    #[snafu(display(
        "every interest needs a skill level ({interests} interests, {ratings} levels)"
    ))]
    RatingsIncomplete { interests: usize, ratings: usize },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

impl SurveyError {
    /// Field the message should be rendered next to.
    pub fn field(&self) -> SurveyField {
        match self {
            Self::Missing { field }
            | Self::InvalidFormat { field, .. }
            | Self::BelowMinimum { field, .. }
            | Self::NotBelow { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::TooLong { field, .. } => field.clone(),
            Self::RatingsIncomplete { .. } => SurveyField::Level,
        }
    }
}
