//! The steps of the transaction form: fill in the form, review it, submit.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, transaction::validation::Review};

/// Where the user is in the transaction form.
///
/// The current step travels with the form as a hidden input, so every
/// request can check that it is a legal next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStep {
    #[default]
    Form,
    Review,
    Submitted,
}

/// What the user asked to do with the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Review,
    Back,
    Submit,
}

impl Display for FormStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormStep::Form => f.write_str("form"),
            FormStep::Review => f.write_str("review"),
            FormStep::Submitted => f.write_str("submitted"),
        }
    }
}

impl Display for FormEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormEvent::Review => f.write_str("review"),
            FormEvent::Back => f.write_str("go back"),
            FormEvent::Submit => f.write_str("submit"),
        }
    }
}

impl FormStep {
    /// The step after `event`.
    ///
    /// # Errors
    /// Returns [Error::InvalidFormStep] for anything other than
    /// form -> review, review -> form and review -> submitted.
    pub fn transition(self, event: FormEvent) -> Result<FormStep, Error> {
        match (self, event) {
            (FormStep::Form, FormEvent::Review) => Ok(FormStep::Review),
            (FormStep::Review, FormEvent::Back) => Ok(FormStep::Form),
            (FormStep::Review, FormEvent::Submit) => Ok(FormStep::Submitted),
            (step, event) => {
                tracing::debug!("rejected transaction form event {event:?} at step {step:?}");
                Err(Error::InvalidFormStep(format!(
                    "Cannot {event} from the {step} step"
                )))
            }
        }
    }
}

/// Check that the user acknowledged the warnings of `review`, if there are any.
///
/// # Errors
/// Returns [Error::ConfirmationRequired] if there are confirmations and `acknowledged` is false.
pub fn check_acknowledged(review: &Review, acknowledged: bool) -> Result<(), Error> {
    if review.needs_confirmation() && !acknowledged {
        return Err(Error::ConfirmationRequired);
    }

    Ok(())
}
