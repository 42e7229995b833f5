use std::path::PathBuf;

pub const DEFAULT_PUBLIC_PATH: &str = "/apptokenverifier/rest/";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base path used when building absolute action-link URLs.
    /// Set via APPTOKEN_VERIFIER_PUBLIC_PATH_TO_SYSTEM.
    pub public_path_to_system: String,
    /// Base URL of the gatekeeper that issues auth tokens.
    pub gatekeeper_url: String,
    pub storage: StorageConfig,
    /// Emit JSON log lines instead of plain text (APPTOKEN_LOG_FORMAT=json).
    pub json_logs: bool,
}

/// Where app tokens live. Passed through to the storage backend as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Postgres { database_url: String },
    Disk { base_path: PathBuf },
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_vars(|key| std::env::var(key).ok())
}

/// Build the config from a variable lookup. Empty values count as unset.
pub fn from_vars<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    let Some(gatekeeper_url) = var("GATEKEEPER_URL") else {
        anyhow::bail!("GATEKEEPER_URL is not set; the verifier needs a gatekeeper to issue auth tokens");
    };

    let storage = if let Some(database_url) = var("DATABASE_URL") {
        StorageConfig::Postgres { database_url }
    } else if let Some(base_path) = var("APPTOKEN_STORAGE_ON_DISK_BASE_PATH") {
        StorageConfig::Disk {
            base_path: PathBuf::from(base_path),
        }
    } else {
        anyhow::bail!(
            "no app token storage configured: set DATABASE_URL or APPTOKEN_STORAGE_ON_DISK_BASE_PATH"
        );
    };

    Ok(Config {
        port: var("APPTOKEN_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080),
        public_path_to_system: var("APPTOKEN_VERIFIER_PUBLIC_PATH_TO_SYSTEM")
            .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.into()),
        gatekeeper_url,
        storage,
        json_logs: var("APPTOKEN_LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
    })
}
