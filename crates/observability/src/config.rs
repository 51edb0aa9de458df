use std::str::FromStr;

/// Env var holding an `EnvFilter` directive, e.g. `journal_auth=debug,info`.
pub const LOG_FILTER_ENV: &str = "JOURNAL_LOG";
/// Env var selecting the output format: `json` (default) or `pretty`.
pub const LOG_FORMAT_ENV: &str = "JOURNAL_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or empty keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let filter = get(LOG_FILTER_ENV).unwrap_or(defaults.filter);
        let format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|err: String| {
                tracing::warn!(error = %err, "falling back to json logs");
                LogFormat::Json
            }),
            None => defaults.format,
        };

        Self { filter, format }
    }
}
