use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "rxdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quiet period after the last keystroke before a suggestion fetch fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Search terms shorter than this (in characters) never reach the API.
pub const MIN_SEARCH_TERM_CHARS: usize = 2;

/// How long a freshly added suggestion stays highlighted.
pub const JUST_ADDED_WINDOW: Duration = Duration::from_secs(2);

/// Lifetime of a transient notification (toast).
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Backend default for `max_suggestions`.
pub const DEFAULT_MAX_SUGGESTIONS: u32 = 5;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;
pub const ROWS_PER_PAGE_OPTIONS: &[usize] = &[5, 10, 25];

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "rxdesk=info,reqwest=warn"
}

/// Connection settings for the clinic API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash (e.g. `http://localhost:8000/api`).
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Read `RXDESK_API_URL` and `RXDESK_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("RXDESK_API_URL").ok(),
            std::env::var("RXDESK_TIMEOUT_SECS").ok(),
        )
    }

    fn from_values(url: Option<String>, timeout: Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.base_url);
        let timeout_secs = match timeout.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = raw, "Ignoring invalid RXDESK_TIMEOUT_SECS");
                    defaults.timeout_secs
                }
            },
            None => defaults.timeout_secs,
        };
        Self {
            base_url,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = ClientConfig::from_values(None, None);
        assert_eq!(cfg.base_url, "http://localhost:8000/api");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = ClientConfig::from_values(
            Some("https://clinic.example/api/".into()),
            Some("5".into()),
        );
        assert_eq!(cfg.base_url, "https://clinic.example/api");
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_falls_back() {
        let cfg = ClientConfig::from_values(Some("  ".into()), Some("soon".into()));
        assert_eq!(cfg.base_url, "http://localhost:8000/api");
        assert_eq!(cfg.timeout_secs, 30);

        let zero = ClientConfig::from_values(None, Some("0".into()));
        assert_eq!(zero.timeout_secs, 30);
    }

    #[test]
    fn debounce_is_one_second() {
        assert_eq!(SEARCH_DEBOUNCE, Duration::from_millis(1000));
        assert_eq!(MIN_SEARCH_TERM_CHARS, 2);
    }

    #[test]
    fn default_rows_per_page_is_an_option() {
        assert!(ROWS_PER_PAGE_OPTIONS.contains(&DEFAULT_ROWS_PER_PAGE));
    }
}
