//! Service credential resolution.
//!
//! Precedence: environment variables, then `config.json` in the working
//! directory, then the platform config directory. The uppercase JSON keys
//! and the `SUPABASE_*` names match the legacy collector's formats, so
//! existing deployments keep working unchanged.

use std::path::PathBuf;

use serde::Deserialize;

use coletor_delivery::{AuthScheme, Credentials};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "no service credentials: set APP_URL and API_KEY (environment or config.json)"
    )]
    Missing,

    #[error("unknown AUTH_SCHEME {0:?} (expected \"api-key\" or \"supabase\")")]
    UnknownScheme(String),
}

/// On-disk credential file. Key names are the legacy collector's.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default, rename = "APP_URL")]
    app_url: Option<String>,
    #[serde(default, rename = "API_KEY")]
    api_key: Option<String>,
    #[serde(default, rename = "AUTH_SCHEME")]
    auth_scheme: Option<String>,
    #[serde(default, rename = "SUPABASE_URL")]
    supabase_url: Option<String>,
    #[serde(default, rename = "SUPABASE_KEY")]
    supabase_key: Option<String>,
}

/// Credential values after merging environment over file, before
/// validation.
#[derive(Debug, Default)]
struct Sources {
    app_url: Option<String>,
    api_key: Option<String>,
    auth_scheme: Option<String>,
    supabase_url: Option<String>,
    supabase_key: Option<String>,
}

/// Resolves service credentials once, at startup.
pub fn resolve() -> Result<Credentials, ConfigError> {
    let file = load_file(&candidate_paths());
    let sources = Sources {
        app_url: env_value("APP_URL").or(file.app_url),
        api_key: env_value("API_KEY").or(file.api_key),
        auth_scheme: env_value("AUTH_SCHEME").or(file.auth_scheme),
        supabase_url: env_value("SUPABASE_URL").or(file.supabase_url),
        supabase_key: env_value("SUPABASE_KEY").or(file.supabase_key),
    };
    finish(sources)
}

fn finish(sources: Sources) -> Result<Credentials, ConfigError> {
    // Current names first; the legacy pair implies the legacy scheme.
    let (endpoint, api_key, legacy) = match (sources.app_url, sources.api_key) {
        (Some(url), Some(key)) => (url, key, false),
        _ => match (sources.supabase_url, sources.supabase_key) {
            (Some(url), Some(key)) => (url, key, true),
            _ => return Err(ConfigError::Missing),
        },
    };

    let scheme = match sources.auth_scheme {
        Some(raw) => parse_scheme(&raw)?,
        None if legacy => AuthScheme::Supabase,
        None => AuthScheme::ApiKey,
    };

    Ok(Credentials {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        api_key,
        scheme,
    })
}

fn parse_scheme(raw: &str) -> Result<AuthScheme, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "api-key" | "apikey" => Ok(AuthScheme::ApiKey),
        "supabase" => Ok(AuthScheme::Supabase),
        other => Err(ConfigError::UnknownScheme(other.to_string())),
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First parsable credentials file among the candidates. Unreadable or
/// malformed files are skipped with a warning, matching how the legacy
/// collector degraded.
fn load_file(paths: &[PathBuf]) -> ConfigFile {
    for path in paths {
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<ConfigFile>(&content) {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), "credentials file loaded");
                    return file;
                }
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unparsable credentials file"
                ),
            },
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "ignoring unreadable credentials file"
            ),
        }
    }
    ConfigFile::default()
}

fn candidate_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("config.json"),
        config_base_dir().join("coletor").join("config.json"),
    ]
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .unwrap_or_else(|_| "C:\\Users\\Default\\AppData\\Roaming".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
