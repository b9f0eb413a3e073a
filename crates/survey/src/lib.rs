//! Multi-step partner-matching survey: raw form state, per-step
//! validation and the parsed result.
pub mod answers;
pub mod error;
pub mod flow;
pub mod form;
pub mod validate;

pub use answers::{Gender, InterestRating, PartnerPreference, SurveyAnswers};
pub use error::{SurveyError, SurveyResult};
pub use flow::SurveyFlow;
pub use form::{Step, SurveyField, SurveyForm, step_fields};
pub use validate::{is_valid_phone, validate_step};
