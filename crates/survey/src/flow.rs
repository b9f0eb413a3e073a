use tracing::debug;

use crate::answers::SurveyAnswers;
use crate::error::SurveyResult;
use crate::form::{Step, SurveyField, SurveyForm, step_fields};
use crate::validate::validate_step;

/// Multi-step survey state: the current page plus the shared form.
///
/// Moving forward requires the current page to validate; moving back
/// never does.
#[derive(Debug, Clone, Default)]
pub struct SurveyFlow {
    step: Step,
    form: SurveyForm,
}

impl SurveyFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at the first step with a prefilled form.
    pub fn with_form(form: SurveyForm) -> Self {
        Self {
            step: Step::FIRST,
            form,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &SurveyForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SurveyForm {
        &mut self.form
    }

    pub fn fields(&self) -> Vec<SurveyField> {
        step_fields(self.step, &self.form)
    }

    pub fn validate_current(&self) -> SurveyResult<()> {
        validate_step(self.step, &self.form)
    }

    /// Validates the current step and, if it passes, moves to the next one.
    ///
    /// On the last step a successful validation leaves the step unchanged.
    pub fn advance(&mut self) -> SurveyResult<Step> {
        if let Err(error) = self.validate_current() {
            debug!(step = %self.step, field = %error.field(), %error, "survey step rejected");
            return Err(error);
        }
        let next = self.step.next();
        debug!(from = %self.step, to = %next, "survey step advanced");
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    pub fn ratings_complete(&self) -> bool {
        validate_step(Step::Ratings, &self.form).is_ok()
    }

    /// Validates every step and builds the final answers.
    ///
    /// On failure the flow jumps to the first step that does not validate.
    pub fn finish(&mut self) -> SurveyResult<SurveyAnswers> {
        for step in Step::ALL {
            if let Err(error) = validate_step(step, &self.form) {
                debug!(%step, field = %error.field(), %error, "survey incomplete");
                self.step = step;
                return Err(error);
            }
        }
        SurveyAnswers::from_form(&self.form)
    }
}
