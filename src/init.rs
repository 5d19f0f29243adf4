use std::{str::FromStr, sync::Arc};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use tokio::{net::TcpListener, signal};

use crate::{config::Config, routes, Data};

async fn init_database(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .with_regexp();
    let db = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when connecting to database"))?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

pub async fn init() -> anyhow::Result<Data> {
    tracing::info!("initializing...");

    let config = Config::from_env()?;
    let db = init_database(&config.database_url).await?;

    tracing::info!("finished initializing!");
    Ok(Data {
        db,
        config: Arc::new(config),
    })
}

pub async fn serve(data: Data) -> anyhow::Result<()> {
    let address = data.config.bind_address;
    let app = routes::router(data);

    let listener = TcpListener::bind(address)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, %address, "an error occurred when binding listener"))?;
    tracing::info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(err = ?e, "an error occurred when installing ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when installing terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
