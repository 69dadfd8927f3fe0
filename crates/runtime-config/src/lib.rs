//! Shared runtime configuration types for the clinicase workbench and CLI.
//!
//! The CLI reads/writes `clinicase.toml` using these types. File location and
//! I/O live in the CLI crate; this crate only owns the shape and defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "clinicase.toml";

/// Environment variable overriding `server.url`.
pub const SERVER_URL_ENV: &str = "CLINICASE_SERVER_URL";

/// Top-level configuration (persisted as `clinicase.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub workbench: WorkbenchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Base URL including the `/api/v1` prefix.
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkbenchSettings {
    /// Cases per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long the intake confirmation stays up before returning to the list.
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            redirect_delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl WorkbenchSettings {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_server_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_size() -> usize {
    5
}
fn default_redirect_delay_ms() -> u64 {
    2_000
}

impl ClientConfig {
    /// Replace values that would make the workbench unusable with defaults.
    /// Returns true when any field was updated.
    pub fn apply_compat_fallbacks(&mut self) -> bool {
        let mut changed = false;

        let trimmed = self.server.url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            self.server.url = default_server_url();
            changed = true;
        } else if trimmed != self.server.url {
            self.server.url = trimmed;
            changed = true;
        }

        if self.server.timeout_secs == 0 {
            self.server.timeout_secs = default_timeout_secs();
            changed = true;
        }

        if self.workbench.page_size == 0 {
            self.workbench.page_size = default_page_size();
            changed = true;
        }

        changed
    }

    /// Apply environment overrides using `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVER_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.server.url = url.trim_end_matches('/').to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("parse toml");
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.server.url, "http://localhost:8080/api/v1");
        assert_eq!(cfg.server.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.workbench.page_size, 5);
        assert_eq!(cfg.workbench.redirect_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: ClientConfig = toml::from_str(
            r#"
[workbench]
page_size = 10
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.workbench.page_size, 10);
        assert_eq!(cfg.workbench.redirect_delay_ms, 2_000);
        assert_eq!(cfg.server, ServerSettings::default());
    }

    #[test]
    fn apply_compat_fallbacks_repairs_unusable_values() {
        let mut cfg = ClientConfig::default();
        cfg.server.url = "http://cases.local/api/v1/".to_string();
        cfg.server.timeout_secs = 0;
        cfg.workbench.page_size = 0;

        assert!(cfg.apply_compat_fallbacks());
        assert_eq!(cfg.server.url, "http://cases.local/api/v1");
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.workbench.page_size, 5);
        assert!(!cfg.apply_compat_fallbacks());
    }

    #[test]
    fn env_override_replaces_server_url() {
        let mut cfg = ClientConfig::default();
        cfg.apply_env_overrides(|key| {
            (key == SERVER_URL_ENV).then(|| "http://example.test/api/v1/".to_string())
        });
        assert_eq!(cfg.server.url, "http://example.test/api/v1");

        cfg.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(cfg.server.url, "http://example.test/api/v1");
    }
}
