use std::{fmt, net::SocketAddr};

use chrono::{DateTime, FixedOffset};
use url::Url;

/// Administrator account used when `ADMIN_ID` is not set.
pub(crate) const DEFAULT_ADMIN_ID: i64 = 5_120_614_747;
/// The great date, Moscow time.
pub(crate) const DEFAULT_COUNTDOWN_TARGET: &str = "2026-03-13T23:10:00+03:00";
const DEFAULT_PORT: u16 = 8080;
const WEBHOOK_PATH: &str = "/webhook";

const REPORTED_VARS: [&str; 6] = [
    "BOT_TOKEN",
    "DATABASE_URL",
    "ADMIN_ID",
    "RAILWAY_ENVIRONMENT",
    "RAILWAY_STATIC_URL",
    "PORT",
];
const SECRET_VARS: [&str; 2] = ["BOT_TOKEN", "DATABASE_URL"];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// How updates reach the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Transport {
    Polling,
    Webhook { url: Url, address: SocketAddr },
}

#[derive(Clone)]
pub(crate) struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub admin_id: i64,
    /// Its offset is also the zone timestamps are shown in.
    pub countdown_target: DateTime<FixedOffset>,
    pub transport: Transport,
    pub require_tls: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<hidden>")
            .field("database_url", &mask_database_url(&self.database_url))
            .field("admin_id", &self.admin_id)
            .field("countdown_target", &self.countdown_target)
            .field("transport", &self.transport)
            .field("require_tls", &self.require_tls)
            .finish()
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let admin_id = match lookup("ADMIN_ID") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|e| invalid("ADMIN_ID", &value, e))?,
            None => DEFAULT_ADMIN_ID,
        };

        let target = lookup("COUNTDOWN_TARGET");
        let target = target.as_deref().unwrap_or(DEFAULT_COUNTDOWN_TARGET);
        let countdown_target = DateTime::parse_from_rfc3339(target.trim())
            .map_err(|e| invalid("COUNTDOWN_TARGET", target, e))?;

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| invalid("PORT", &value, e))?,
            None => DEFAULT_PORT,
        };

        let transport = match lookup("PUBLIC_URL").or_else(|| lookup("RAILWAY_STATIC_URL")) {
            Some(base) => Transport::Webhook {
                url: webhook_url(&base)?,
                address: SocketAddr::from(([0, 0, 0, 0], port)),
            },
            None => Transport::Polling,
        };

        Ok(Self {
            bot_token,
            database_url,
            admin_id,
            countdown_target,
            transport,
            require_tls: lookup("RAILWAY_ENVIRONMENT").is_some(),
        })
    }
}

/// `<base>/webhook`; a bare host gets `https://`.
fn webhook_url(base: &str) -> Result<Url, ConfigError> {
    let trimmed = base.trim().trim_end_matches('/');
    let full = if trimmed.contains("://") {
        format!("{trimmed}{WEBHOOK_PATH}")
    } else {
        format!("https://{trimmed}{WEBHOOK_PATH}")
    };
    Url::parse(&full).map_err(|e| invalid("PUBLIC_URL", base, e))
}

/// Replaces the password of a connection string with `****`.
pub(crate) fn mask_database_url(database_url: &str) -> String {
    match Url::parse(database_url) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "<hidden>".to_owned();
            }
            url.to_string()
        }
        Err(_) => "<unparseable>".to_owned(),
    }
}

/// Logs which deployment variables are present, hiding secret values.
pub(crate) fn report_env() {
    for var in REPORTED_VARS {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => {
                if SECRET_VARS.contains(&var) {
                    log::info!("{}: set (value hidden)", var);
                } else {
                    log::info!("{}: {}", var, value);
                }
            }
            _ => log::info!("{}: not set", var),
        }
    }
}
