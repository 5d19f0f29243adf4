use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::config::Config;

mod accounts;
mod config;
mod constants;
mod error;
mod forms;
mod init;
mod models;
mod pagination;
mod query;
mod ranking;
mod routes;
mod search;
mod telemetry;
mod templates;

#[cfg(test)]
mod testing;

/// state shared by every request handler.
#[derive(Clone)]
pub struct Data {
    pub db: Pool<Sqlite>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let telemetry = telemetry::init_telemetry()?;

    let result = match init::init().await {
        Ok(data) => init::serve(data).await,
        Err(e) => Err(e),
    }
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when running server"));

    if let Some(telemetry) = telemetry {
        telemetry.shutdown();
    }

    result
}
