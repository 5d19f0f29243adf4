use std::{str::FromStr, sync::Arc};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use time::OffsetDateTime;

use crate::{accounts, config::Config, Data};

/// an in-memory database with migrations applied.
///
/// a single connection keeps every query on the same in-memory database.
pub async fn database() -> Pool<Sqlite> {
    database_with(SqliteConnectOptions::from_str("sqlite::memory:").unwrap().with_regexp()).await
}

pub async fn database_with(opts: SqliteConnectOptions) -> Pool<Sqlite> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&db).await.unwrap();

    db
}

pub fn config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        email_domain: "example.org".to_string(),
        secure_cookies: false,
    }
}

pub async fn data() -> Data {
    Data {
        db: database().await,
        config: Arc::new(config()),
    }
}

pub const PASSWORD: &str = "hunter22";

pub async fn insert_user(db: &Pool<Sqlite>, username: &str, is_active: bool) -> i64 {
    let password_hash = accounts::hash_password(PASSWORD).unwrap();

    sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO
                users (username, email, password_hash, is_active, date_joined)
            VALUES
                ($1, $2, $3, $4, $5)
            RETURNING id;
        "#,
    )
    .bind(username)
    .bind(format!("{username}@example.org"))
    .bind(password_hash)
    .bind(is_active)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await
    .unwrap()
}

pub async fn insert_quote(
    db: &Pool<Sqlite>,
    user_id: i64,
    content: &str,
    accepted: bool,
    visible: bool,
    date: OffsetDateTime,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO
                quotes (author, context, content, date, accepted, visible, user_id)
            VALUES
                ($1, NULL, $2, $3, $4, $5, $6)
            RETURNING id;
        "#,
    )
    .bind("someone")
    .bind(content)
    .bind(date)
    .bind(accepted)
    .bind(visible)
    .bind(user_id)
    .fetch_one(db)
    .await
    .unwrap()
}

pub async fn insert_vote(db: &Pool<Sqlite>, user_id: i64, quote_id: i64, vote: i64) {
    sqlx::query("INSERT INTO votes (user_id, quote_id, vote) VALUES ($1, $2, $3);")
        .bind(user_id)
        .bind(quote_id)
        .bind(vote)
        .execute(db)
        .await
        .unwrap();
}
