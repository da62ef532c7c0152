//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory, then from
//! the environment (`DB_USER`, `DB_HOST`, `PORT`, `APP_ENV`, `ADMIN_KEY`, ...),
//! which wins. See `crates/app/settings.example.toml` for every key.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PORT: u16 = 5432;
const PRODUCTION: &str = "production";

/// Flat view of the raw keys, exactly as the sources provide them.
#[derive(Debug, Default, Deserialize)]
struct Raw {
    database_url: Option<String>,
    db_user: Option<String>,
    db_password: Option<String>,
    db_host: Option<String>,
    db_port: Option<u16>,
    db_name: Option<String>,
    port: Option<u16>,
    app_port: Option<u16>,
    bind: Option<String>,
    app_env: Option<String>,
    admin_key: Option<String>,
    log_level: Option<String>,
    public_dir: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("missing database configuration: set DATABASE_URL or DB_USER, DB_HOST and DB_NAME")]
    MissingDatabase,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Database {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub production: bool,
    pub admin_key: Option<String>,
    pub public_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct App {
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::default())
            .build()?;

        Self::from_raw(settings.try_deserialize()?)
    }

    fn from_raw(raw: Raw) -> Result<Self, SettingsError> {
        let database = Database {
            url: database_url(&raw)?,
        };
        let server = Server {
            bind: raw.bind.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: raw.port.or(raw.app_port).unwrap_or(DEFAULT_PORT),
            production: raw
                .app_env
                .as_deref()
                .is_some_and(|env| env.eq_ignore_ascii_case(PRODUCTION)),
            admin_key: raw.admin_key,
            public_dir: PathBuf::from(raw.public_dir.unwrap_or_else(|| "public".to_string())),
        };
        let app = App {
            level: raw.log_level.unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            app,
            database,
            server,
        })
    }
}

fn database_url(raw: &Raw) -> Result<String, SettingsError> {
    if let Some(url) = raw.database_url.as_deref().filter(|url| !url.is_empty()) {
        return Ok(url.to_string());
    }

    let (Some(user), Some(host), Some(name)) = (&raw.db_user, &raw.db_host, &raw.db_name) else {
        return Err(SettingsError::MissingDatabase);
    };
    let credentials = match raw.db_password.as_deref() {
        Some(password) if !password.is_empty() => format!("{user}:{password}"),
        _ => user.clone(),
    };
    let port = raw.db_port.unwrap_or(DEFAULT_DB_PORT);

    Ok(format!("postgres://{credentials}@{host}:{port}/{name}"))
}
