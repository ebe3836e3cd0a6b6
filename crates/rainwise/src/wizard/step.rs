//! Wizard steps and the fields each one presents.

use crate::models::FormField;

/// Number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 4;

/// One page of the wizard, ordinal 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    Basics,
    Property,
    Roof,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; TOTAL_STEPS as usize] =
        [Self::Basics, Self::Property, Self::Roof, Self::Review];

    pub fn first() -> Self {
        Self::Basics
    }

    pub fn last() -> Self {
        Self::Review
    }

    /// 1-based ordinal.
    pub fn number(&self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Property => 2,
            Self::Roof => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Basics),
            2 => Some(Self::Property),
            3 => Some(Self::Roof),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_last(&self) -> bool {
        *self == Self::last()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Basics => "Basic Information",
            Self::Property => "Property Details",
            Self::Roof => "Roof Specifications",
            Self::Review => "Review & Calculate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Basics => "Let's start with some basic details about you and your property",
            Self::Property => "Tell us about your roof and available space",
            Self::Roof => "Details about your roof type and condition",
            Self::Review => "Review your information and generate your personalized assessment",
        }
    }

    /// Editable fields shown on this step.
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            Self::Basics => &[FormField::Name, FormField::Location, FormField::Dwellers],
            Self::Property => &[FormField::RoofArea, FormField::OpenSpace],
            Self::Roof => &[FormField::RoofType, FormField::SoilType, FormField::RoofAge],
            Self::Review => &[],
        }
    }

    /// The map surface is part of the property step.
    pub fn shows_map(&self) -> bool {
        matches!(self, Self::Property)
    }
}
