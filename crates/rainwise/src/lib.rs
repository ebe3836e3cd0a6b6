//! rainwise - rainwater harvesting intake wizard.
//!
//! Core library: the step wizard, the coordinate resolution pipeline
//! (address geocoding, map gestures, device geolocation) and the
//! assessment submission gateway. Presentation lives in `rainwise-cli`.

// Choice types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod capability;
pub mod config;
pub mod geocode;
pub mod http_client;
pub mod links;
pub mod location;
pub mod map;
pub mod models;
pub mod notice;
pub mod resolver;
pub mod session;
pub mod submission;
pub mod wizard;

pub use capability::Capability;
pub use models::{Coordinate, CoordinateSource, FormField, FormRecord, RoofType, SoilType};
pub use notice::{Notice, NoticeLevel};
pub use session::WizardSession;
