use std::{fmt, net::IpAddr, str::FromStr};

use anyhow::{Context, Result, anyhow};
use platform_db::DatabaseSettings;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HOST: &str = "0.0.0.0";
const LOCAL_FRONTEND: &str = "http://localhost:3000";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Origins allowed to call the API when `CORS_ALLOWED_ORIGINS` is unset.
    pub fn default_origins(self) -> Vec<String> {
        match self {
            Environment::Development | Environment::Production => vec![LOCAL_FRONTEND.into()],
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow!("unknown APP_ENV {other:?}")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
        })
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,
    pub database: DatabaseSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.into())
            .parse::<IpAddr>()
            .context("invalid HOST")?;
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().context("invalid PORT")?,
            None => DEFAULT_PORT,
        };
        let environment = match lookup("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };
        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => split_origins(&raw),
            None => environment.default_origins(),
        };
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseSettings::with_url(url),
            None => DatabaseSettings::from_env(),
        };

        Ok(Self {
            host,
            port,
            environment,
            cors_allowed_origins,
            database,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            environment: Environment::Development,
            cors_allowed_origins: Environment::Development.default_origins(),
            database: DatabaseSettings::from_env(),
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_local_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn production_keeps_the_same_frontend_origin() {
        let config = load(&[("APP_ENV", "production")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn origins_override_is_split_and_trimmed() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            " https://a.example , ,https://b.example",
        )])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        let config = load(&[("CORS_ALLOWED_ORIGINS", "")]).unwrap();
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("APP_ENV", "staging")]).is_err());
        assert!(load(&[("HOST", "localhost:1")]).is_err());
    }

    #[test]
    fn database_url_is_pinned_when_present() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.database.database_url().unwrap(), "sqlite::memory:");
    }
}
