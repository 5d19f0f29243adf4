use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::Context as _;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub email_domain: String,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("missing DATABASE_URL")?;

        Ok(Self {
            database_url,
            bind_address: try_load("BIND_ADDRESS", "0.0.0.0:8000")?,
            email_domain: try_load("REGISTRATION_EMAIL_DOMAIN", "epita.fr")?,
            secure_cookies: try_load("SECURE_COOKIES", "false")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {key} value {value:?}: {e}"))
}
