use std::{collections::HashMap, fs};

use shared::error::StoreError;

use crate::{LocalStore, MachineStore, RemoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Backend,
    pub database_url: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            database_url: "sqlite://./data/dashboard.db".into(),
            api_url: None,
            api_key: None,
        }
    }
}

/// Defaults, then `dashboard.toml`, then environment. The hosted backend
/// needs exactly two values from the environment: the base URL and the
/// anonymous access key.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dashboard.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("backend") {
                settings.backend = parse_backend(v);
            }
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = v.clone();
            }
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("api_key") {
                settings.api_key = Some(v.clone());
            }
        }
    }

    if let Ok(v) = std::env::var("DASHBOARD_BACKEND") {
        settings.backend = parse_backend(&v);
    }
    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("DASHBOARD_API_URL") {
        settings.api_url = Some(v);
    }
    if let Ok(v) = std::env::var("DASHBOARD_API_KEY") {
        settings.api_key = Some(v);
    }

    settings
}

fn parse_backend(raw: &str) -> Backend {
    if raw.trim().eq_ignore_ascii_case("remote") {
        Backend::Remote
    } else {
        Backend::Local
    }
}

/// Builds the configured backend behind the store contract.
pub async fn open_store(settings: &Settings) -> Result<Box<dyn MachineStore>, StoreError> {
    match settings.backend {
        Backend::Local => {
            let database_url = normalize_database_url(&settings.database_url);
            Ok(Box::new(LocalStore::new(&database_url).await?))
        }
        Backend::Remote => {
            let (Some(api_url), Some(api_key)) = (&settings.api_url, &settings.api_key) else {
                return Err(StoreError::unavailable(
                    "remote backend selected but DASHBOARD_API_URL / DASHBOARD_API_KEY are not set",
                ));
            };
            Ok(Box::new(RemoteStore::new(api_url, api_key)?))
        }
    }
}

/// Opens the hosted-table backend regardless of the configured default.
/// The seed tool always targets the hosted table.
pub fn open_remote_store(settings: &Settings) -> Result<RemoteStore, StoreError> {
    let (Some(api_url), Some(api_key)) = (&settings.api_url, &settings.api_key) else {
        return Err(StoreError::unavailable(
            "DASHBOARD_API_URL / DASHBOARD_API_KEY are not set",
        ));
    };
    RemoteStore::new(api_url, api_key)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_file_path_to_sqlite_url() {
        assert_eq!(
            normalize_database_url("./data/test.db"),
            "sqlite://./data/test.db"
        );
    }

    #[test]
    fn empty_database_url_falls_back_to_default() {
        assert_eq!(
            normalize_database_url("  "),
            Settings::default().database_url
        );
    }

    #[test]
    fn backend_parsing_defaults_to_local() {
        assert_eq!(parse_backend("remote"), Backend::Remote);
        assert_eq!(parse_backend("REMOTE"), Backend::Remote);
        assert_eq!(parse_backend("local"), Backend::Local);
        assert_eq!(parse_backend("anything-else"), Backend::Local);
    }

    #[tokio::test]
    async fn remote_backend_without_credentials_is_rejected() {
        let settings = Settings {
            backend: Backend::Remote,
            ..Settings::default()
        };
        let err = match open_store(&settings).await {
            Ok(_) => panic!("opening a remote store without credentials must fail"),
            Err(err) => err,
        };
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
