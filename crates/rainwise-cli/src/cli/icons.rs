//! Console output icons.

use console::{style, StyledObject};

use rainwise::NoticeLevel;

/// Success checkmark icon (green ✓).
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Info/progress arrow icon (cyan →).
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Warning icon (yellow !).
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Error icon (red ✗).
pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Bullet point.
pub fn bullet() -> StyledObject<&'static str> {
    style("•").dim()
}

/// Icon for a notice of the given level.
pub fn for_level(level: NoticeLevel) -> StyledObject<&'static str> {
    match level {
        NoticeLevel::Info => info(),
        NoticeLevel::Success => success(),
        NoticeLevel::Error => error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_dont_panic() {
        let _ = success().to_string();
        let _ = info().to_string();
        let _ = warn().to_string();
        let _ = error().to_string();
        let _ = bullet().to_string();
        let _ = for_level(NoticeLevel::Error).to_string();
    }
}
