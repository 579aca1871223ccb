use std::time::Duration;

#[derive(Debug)]
pub enum Error {
    CoreError(core_smap::Error),
    MissingSiteUrl,
    DeadlineExceeded(Duration),
    ConfigError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoreError(e) => write!(f, "{}", e),
            Self::MissingSiteUrl => write!(
                f,
                "No site URL configured: pass --base-url or store one under the 'site_url' setting"
            ),
            Self::DeadlineExceeded(d) => write!(f, "Run did not finish within {}s", d.as_secs()),
            Self::ConfigError(s) => write!(f, "Configuration error: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CoreError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<core_smap::Error> for Error {
    fn from(error: core_smap::Error) -> Self {
        Self::CoreError(error)
    }
}
