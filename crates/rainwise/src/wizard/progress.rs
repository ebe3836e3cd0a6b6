//! Derived progress figures.

use crate::models::{FormField, FormRecord};

use super::step::{WizardStep, TOTAL_STEPS};

/// A field counted towards form completion. Latitude and longitude count
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    Form(FormField),
    Latitude,
    Longitude,
}

/// The fixed tracked-field set.
pub const TRACKED_FIELDS: [TrackedField; 10] = [
    TrackedField::Form(FormField::Name),
    TrackedField::Form(FormField::Location),
    TrackedField::Form(FormField::Dwellers),
    TrackedField::Form(FormField::RoofArea),
    TrackedField::Form(FormField::OpenSpace),
    TrackedField::Form(FormField::RoofType),
    TrackedField::Form(FormField::RoofAge),
    TrackedField::Form(FormField::SoilType),
    TrackedField::Latitude,
    TrackedField::Longitude,
];

impl TrackedField {
    pub fn is_filled(&self, form: &FormRecord) -> bool {
        match self {
            TrackedField::Form(field) => form.is_filled(*field),
            TrackedField::Latitude | TrackedField::Longitude => form.coordinate.is_some(),
        }
    }
}

/// Number of tracked fields that are non-empty.
pub fn filled_count(form: &FormRecord) -> usize {
    TRACKED_FIELDS.iter().filter(|f| f.is_filled(form)).count()
}

/// Form completion in percent: `100 * filled / total`.
pub fn completion(form: &FormRecord) -> f64 {
    100.0 * filled_count(form) as f64 / TRACKED_FIELDS.len() as f64
}

/// Position in the wizard in percent: `100 * step / total`.
pub fn step_progress(step: WizardStep) -> f64 {
    100.0 * step.number() as f64 / TOTAL_STEPS as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, CoordinateSource, ResolvedCoordinate, RoofType};

    #[test]
    fn test_empty_form_is_zero() {
        assert_eq!(completion(&FormRecord::new()), 0.0);
    }

    #[test]
    fn test_coordinate_counts_twice() {
        let mut form = FormRecord::new();
        form.coordinate = Some(ResolvedCoordinate::now(
            Coordinate::new(1.0, 2.0).unwrap(),
            CoordinateSource::MapClick,
        ));
        assert_eq!(filled_count(&form), 2);
        assert_eq!(completion(&form), 20.0);
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut form = FormRecord::new();
        let mut last = completion(&form);
        let steps: Vec<Box<dyn Fn(&mut FormRecord)>> = vec![
            Box::new(|f| f.name = "Asha".into()),
            Box::new(|f| f.location = "Bangalore".into()),
            Box::new(|f| f.dwellers = "4".into()),
            Box::new(|f| f.roof_area = "150".into()),
            Box::new(|f| f.open_space = "50".into()),
            Box::new(|f| f.roof_type = Some(RoofType::Tiled)),
            Box::new(|f| f.roof_age = "5".into()),
        ];
        for (i, apply) in steps.iter().enumerate() {
            apply(&mut form);
            let now = completion(&form);
            assert!(now >= last);
            assert_eq!(now, 100.0 * (i + 1) as f64 / 10.0);
            last = now;
        }
    }

    #[test]
    fn test_step_progress() {
        assert_eq!(step_progress(WizardStep::Basics), 25.0);
        assert_eq!(step_progress(WizardStep::Review), 100.0);
    }
}
