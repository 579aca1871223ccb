use std::time::Duration;

use crate::errors::{Error, Result};

pub const DEADLINE_VAR: &str = "SITEMAP_DEADLINE_S";

/// Seconds a whole run may take before it is abandoned.
pub const DEFAULT_DEADLINE_S: u64 = 120;

/// Retrieves the run deadline from SITEMAP_DEADLINE_S, in seconds. Zero is rejected.
pub fn run_deadline() -> Result<Duration> {
    parse_deadline(std::env::var(DEADLINE_VAR).ok().as_deref())
}

fn parse_deadline(value: Option<&str>) -> Result<Duration> {
    let seconds = match value {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::Config(format!("{} must be a whole number of seconds: {}", DEADLINE_VAR, e)))?,
        None => DEFAULT_DEADLINE_S,
    };
    if seconds == 0 {
        return Err(Error::Config(format!("{} must be positive", DEADLINE_VAR)));
    }
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deadline() {
        assert_eq!(parse_deadline(None).unwrap(), Duration::from_secs(120));
        assert_eq!(parse_deadline(Some(" 30 ")).unwrap(), Duration::from_secs(30));
        assert!(matches!(parse_deadline(Some("0")), Err(Error::Config(_))));
        assert!(matches!(parse_deadline(Some("soon")), Err(Error::Config(_))));
    }
}
