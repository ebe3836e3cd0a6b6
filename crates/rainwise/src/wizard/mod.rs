//! Wizard state machine.
//!
//! `WizardStore` owns the form record, the step pointer and the derived
//! completion figure. Every mutation goes through one path that recomputes
//! the derived values and publishes a fresh `WizardState` to subscribers.
//! The resolver and the geocoder write through that same path.

mod progress;
mod step;
mod validation;

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{FormField, FormRecord, ResolvedCoordinate, RoofType, SoilType};

pub use progress::{completion, filled_count, step_progress, TrackedField, TRACKED_FIELDS};
pub use step::{WizardStep, TOTAL_STEPS};
pub use validation::{validate_step, FieldIssue, IssueKind};

/// Errors from wizard operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("the wizard session has ended")]
    SessionClosed,
    #[error("{value:?} is not a valid choice for {field}")]
    InvalidChoice { field: &'static str, value: String },
    #[error("submit is only available on the final step (currently on step {0})")]
    NotAtFinalStep(u8),
}

/// Snapshot published after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub form: FormRecord,
    pub step: WizardStep,
    /// Percentage of tracked fields that are filled.
    pub completion: f64,
    /// Bumped on every coordinate write. Orders coordinate producers
    /// independently of the wall clock.
    pub coordinate_revision: u64,
    /// Set once the session has ended; no further writes are accepted.
    pub closed: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        let form = FormRecord::default();
        Self {
            completion: completion(&form),
            form,
            coordinate_revision: 0,
            step: WizardStep::first(),
            closed: false,
        }
    }
}

impl WizardState {
    /// Step position in percent, for the "Step N of 4" header.
    pub fn step_progress(&self) -> f64 {
        step_progress(self.step)
    }

    /// Advisory issues on the current step.
    pub fn issues(&self) -> Vec<FieldIssue> {
        validate_step(self.step, &self.form)
    }
}

/// Shared handle to the wizard state. Clones refer to the same state.
#[derive(Debug, Clone)]
pub struct WizardStore {
    state: Arc<watch::Sender<WizardState>>,
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WizardState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> WizardState {
        self.state.borrow().clone()
    }

    /// Subscribe to published states.
    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.state.subscribe()
    }

    pub fn step(&self) -> WizardStep {
        self.state.borrow().step
    }

    pub fn completion(&self) -> f64 {
        self.state.borrow().completion
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn coordinate_revision(&self) -> u64 {
        self.state.borrow().coordinate_revision
    }

    /// Live address text.
    pub fn location_text(&self) -> String {
        self.state.borrow().form.location.clone()
    }

    /// Set a field from user input. Returns whether anything changed.
    ///
    /// Choice fields accept their names (case-insensitive) or an empty value
    /// to clear the selection. Numeric fields store the raw text.
    pub fn update(&self, field: FormField, value: &str) -> Result<bool, WizardError> {
        match field {
            FormField::RoofType => {
                let choice = parse_choice(field, value, RoofType::from_str)?;
                self.mutate(|form| replace(&mut form.roof_type, choice))
            }
            FormField::SoilType => {
                let choice = parse_choice(field, value, SoilType::from_str)?;
                self.mutate(|form| replace(&mut form.soil_type, choice))
            }
            _ => {
                let value = value.to_string();
                self.mutate(|form| text_slot(form, field).is_some_and(|slot| replace(slot, value)))
            }
        }
    }

    /// The single write path for the form record.
    ///
    /// `edit` returns whether it changed anything; only then are derived
    /// values recomputed and a new state published. Fails once the session
    /// has been closed.
    pub(crate) fn mutate<F>(&self, edit: F) -> Result<bool, WizardError>
    where
        F: FnOnce(&mut FormRecord) -> bool,
    {
        let mut outcome = Err(WizardError::SessionClosed);
        self.state.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            let changed = edit(&mut state.form);
            if changed {
                state.completion = completion(&state.form);
            }
            outcome = Ok(changed);
            changed
        });
        outcome
    }

    /// Store a coordinate. With `expected_revision`, the write only lands if
    /// no other coordinate was written since that revision was read.
    /// Returns whether the coordinate was stored.
    pub(crate) fn write_coordinate(
        &self,
        incoming: ResolvedCoordinate,
        expected_revision: Option<u64>,
    ) -> Result<bool, WizardError> {
        let mut outcome = Err(WizardError::SessionClosed);
        self.state.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            if expected_revision.is_some_and(|rev| rev != state.coordinate_revision) {
                outcome = Ok(false);
                return false;
            }
            state.form.coordinate = Some(incoming);
            state.coordinate_revision += 1;
            state.completion = completion(&state.form);
            outcome = Ok(true);
            true
        });
        outcome
    }

    /// Advance one step. No-op on the last step or after close.
    pub fn next(&self) -> bool {
        self.move_step(|step| step.next())
    }

    /// Go back one step. No-op on the first step or after close.
    pub fn previous(&self) -> bool {
        self.move_step(|step| step.previous())
    }

    fn move_step(&self, target: impl FnOnce(WizardStep) -> Option<WizardStep>) -> bool {
        self.state.send_if_modified(|state| {
            if state.closed {
                return false;
            }
            match target(state.step) {
                Some(step) => {
                    tracing::debug!(from = state.step.number(), to = step.number(), "wizard step");
                    state.step = step;
                    true
                }
                None => false,
            }
        })
    }

    /// Hand out the form for submission. Only valid on the final step; the
    /// store stays open until `close` so a failed submission can be retried.
    pub fn submission_form(&self) -> Result<FormRecord, WizardError> {
        let state = self.state.borrow();
        if state.closed {
            return Err(WizardError::SessionClosed);
        }
        if !state.step.is_last() {
            return Err(WizardError::NotAtFinalStep(state.step.number()));
        }
        Ok(state.form.clone())
    }

    /// End the session. Later writes are rejected.
    pub fn close(&self) {
        self.state.send_if_modified(|state| {
            let was_open = !state.closed;
            state.closed = true;
            was_open
        });
    }
}

fn text_slot(form: &mut FormRecord, field: FormField) -> Option<&mut String> {
    match field {
        FormField::Name => Some(&mut form.name),
        FormField::Location => Some(&mut form.location),
        FormField::Dwellers => Some(&mut form.dwellers),
        FormField::RoofArea => Some(&mut form.roof_area),
        FormField::OpenSpace => Some(&mut form.open_space),
        FormField::RoofAge => Some(&mut form.roof_age),
        FormField::RoofType | FormField::SoilType => None,
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn parse_choice<T>(
    field: FormField,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, WizardError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse(value)
        .map(Some)
        .ok_or_else(|| WizardError::InvalidChoice {
            field: field.as_str(),
            value: value.to_string(),
        })
}
