//! Host capability wrapper.
//!
//! Device features (geolocation, tiles) are injected rather than probed, so
//! the surface and the tests can run without a real device or network.

/// A host capability that may or may not be present.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Capability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Borrow the capability, or the reason it is missing.
    pub fn get(&self) -> Result<&T, &str> {
        match self {
            Capability::Available(inner) => Ok(inner),
            Capability::Unavailable { reason } => Err(reason.as_str()),
        }
    }
}
