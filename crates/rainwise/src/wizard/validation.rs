//! Advisory validation. Issues are reported per step but never block
//! navigation or submission.

use std::fmt;

use crate::models::{FormField, FormRecord};

use super::step::WizardStep;

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    NotANumber,
    Negative,
    NotWholeNumber,
    NotSelected,
    NotLocated,
}

/// One advisory finding. `field` is `None` for the coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Option<FormField>,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.field.map_or("Location on map", |field| field.label());
        let message = match self.kind {
            IssueKind::Missing => "is empty",
            IssueKind::NotANumber => "is not a number",
            IssueKind::Negative => "must not be negative",
            IssueKind::NotWholeNumber => "must be a whole number",
            IssueKind::NotSelected => "has not been selected",
            IssueKind::NotLocated => "has not been set",
        };
        write!(f, "{} {}", label, message)
    }
}

fn check_field(form: &FormRecord, field: FormField) -> Option<IssueKind> {
    let raw = form.text(field).trim();
    if raw.is_empty() {
        return Some(match field {
            FormField::RoofType | FormField::SoilType => IssueKind::NotSelected,
            _ => IssueKind::Missing,
        });
    }
    if !field.is_numeric() {
        return None;
    }
    let value = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Some(IssueKind::NotANumber),
    };
    if value < 0.0 {
        return Some(IssueKind::Negative);
    }
    if field == FormField::Dwellers && value.fract() != 0.0 {
        return Some(IssueKind::NotWholeNumber);
    }
    None
}

/// Issues for the fields on one step. The review step reports everything.
pub fn validate_step(step: WizardStep, form: &FormRecord) -> Vec<FieldIssue> {
    if step == WizardStep::Review {
        return WizardStep::ALL
            .iter()
            .filter(|s| **s != WizardStep::Review)
            .flat_map(|s| validate_step(*s, form))
            .collect();
    }

    let mut issues: Vec<FieldIssue> = step
        .fields()
        .iter()
        .filter_map(|field| {
            check_field(form, *field).map(|kind| FieldIssue {
                field: Some(*field),
                kind,
            })
        })
        .collect();

    if step.shows_map() && form.coordinate.is_none() {
        issues.push(FieldIssue {
            field: None,
            kind: IssueKind::NotLocated,
        });
    }
    issues
}
