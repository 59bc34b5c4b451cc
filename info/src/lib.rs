//! Build metadata baked in at compile time.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("RARITY_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("RARITY_BUILD_TIMESTAMP");

/// A one-line description of the build, e.g. `1.0.0 (abc123, 2026-10-19)`.
pub fn describe() -> String {
    match (REVISION, BUILD_TIMESTAMP) {
        (Some(revision), Some(timestamp)) => format!("{} ({}, {})", VERSION, revision, timestamp),
        (Some(revision), None) => format!("{} ({})", VERSION, revision),
        _ => VERSION.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn description_starts_with_version() {
        assert!(super::describe().starts_with(super::VERSION));
    }
}
