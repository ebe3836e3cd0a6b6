//! Domain models for the intake wizard.

mod coordinate;
mod form;

pub use coordinate::{Coordinate, CoordinateError, CoordinateSource, ResolvedCoordinate};
pub use form::{FormField, FormRecord, RoofType, SoilType};
