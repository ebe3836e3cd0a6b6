//! The intake form record and its choice types.

use serde::{Deserialize, Serialize};

use super::coordinate::{Coordinate, ResolvedCoordinate};

/// Roof material, which drives the runoff coefficient downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    /// Default applied when the user never picked one.
    #[default]
    Concrete,
    Tiled,
    Metal,
    Asbestos,
    Thatched,
}

impl RoofType {
    pub const ALL: [RoofType; 5] = [
        Self::Concrete,
        Self::Tiled,
        Self::Metal,
        Self::Asbestos,
        Self::Thatched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concrete => "concrete",
            Self::Tiled => "tiled",
            Self::Metal => "metal",
            Self::Asbestos => "asbestos",
            Self::Thatched => "thatched",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Concrete => "Concrete",
            Self::Tiled => "Tiled",
            Self::Metal => "Metal Sheet",
            Self::Asbestos => "Asbestos",
            Self::Thatched => "Thatched",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "concrete" => Some(Self::Concrete),
            "tiled" => Some(Self::Tiled),
            "metal" => Some(Self::Metal),
            "asbestos" => Some(Self::Asbestos),
            "thatched" => Some(Self::Thatched),
            _ => None,
        }
    }
}

/// Soil category, used to estimate infiltration for recharge pits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Sandy,
    Loamy,
    Clay,
    Silty,
    Peaty,
    Chalky,
    Rocky,
}

impl SoilType {
    pub const ALL: [SoilType; 7] = [
        Self::Sandy,
        Self::Loamy,
        Self::Clay,
        Self::Silty,
        Self::Peaty,
        Self::Chalky,
        Self::Rocky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandy => "sandy",
            Self::Loamy => "loamy",
            Self::Clay => "clay",
            Self::Silty => "silty",
            Self::Peaty => "peaty",
            Self::Chalky => "chalky",
            Self::Rocky => "rocky",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandy" => Some(Self::Sandy),
            "loamy" => Some(Self::Loamy),
            "clay" => Some(Self::Clay),
            "silty" => Some(Self::Silty),
            "peaty" => Some(Self::Peaty),
            "chalky" => Some(Self::Chalky),
            "rocky" => Some(Self::Rocky),
            _ => None,
        }
    }
}

/// A user-editable form field. The coordinate is not listed here: it is only
/// written through the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Location,
    Dwellers,
    RoofArea,
    OpenSpace,
    RoofType,
    RoofAge,
    SoilType,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        Self::Name,
        Self::Location,
        Self::Dwellers,
        Self::RoofArea,
        Self::OpenSpace,
        Self::RoofType,
        Self::RoofAge,
        Self::SoilType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Location => "location",
            Self::Dwellers => "dwellers",
            Self::RoofArea => "roof_area",
            Self::OpenSpace => "open_space",
            Self::RoofType => "roof_type",
            Self::RoofAge => "roof_age",
            Self::SoilType => "soil_type",
        }
    }

    /// Accepts snake_case keys plus the camelCase names of the web form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "name" => Some(Self::Name),
            "location" | "address" => Some(Self::Location),
            "dwellers" => Some(Self::Dwellers),
            "roof_area" | "roofArea" => Some(Self::RoofArea),
            "open_space" | "openSpace" => Some(Self::OpenSpace),
            "roof_type" | "roofType" => Some(Self::RoofType),
            "roof_age" | "roofAge" => Some(Self::RoofAge),
            "soil_type" | "soilType" => Some(Self::SoilType),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Location => "Location/Address",
            Self::Dwellers => "Number of dwellers",
            Self::RoofArea => "Roof Area (sq. meters)",
            Self::OpenSpace => "Available Open Space (sq. meters)",
            Self::RoofType => "Roof Type",
            Self::RoofAge => "Roof Age (years)",
            Self::SoilType => "Soil Type",
        }
    }

    /// Fields entered as free numeric text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Dwellers | Self::RoofArea | Self::OpenSpace | Self::RoofAge
        )
    }
}

/// The intake form. Numeric fields keep the raw text the user typed; the
/// empty string means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub name: String,
    pub location: String,
    pub dwellers: String,
    pub roof_area: String,
    pub open_space: String,
    pub roof_type: Option<RoofType>,
    pub roof_age: String,
    pub soil_type: Option<SoilType>,
    pub coordinate: Option<ResolvedCoordinate>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current coordinate without provenance.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate.map(|r| r.coordinate)
    }

    /// Raw text of a field as the user would see it in the input.
    pub fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Location => &self.location,
            FormField::Dwellers => &self.dwellers,
            FormField::RoofArea => &self.roof_area,
            FormField::OpenSpace => &self.open_space,
            FormField::RoofType => self.roof_type.as_ref().map_or("", |r| r.as_str()),
            FormField::RoofAge => &self.roof_age,
            FormField::SoilType => self.soil_type.as_ref().map_or("", |s| s.as_str()),
        }
    }

    /// Whether a field holds anything beyond whitespace.
    pub fn is_filled(&self, field: FormField) -> bool {
        !self.text(field).trim().is_empty()
    }

    /// Parse a numeric field as a non-negative quantity.
    pub fn quantity(&self, field: FormField) -> Option<f64> {
        parse_quantity(self.text(field))
    }
}

/// Parse user-entered numeric text. Blank, non-finite and negative values
/// are all `None`.
pub(crate) fn parse_quantity(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
