use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::{Pool, Sqlite};
use time::OffsetDateTime;

use crate::{
    config::Config,
    constants::{SESSION_COOKIE, SESSION_MAX_AGE, SESSION_TOKEN_LEN},
    error::AppError,
    forms::{FieldErrors, Registration},
    models::users::User,
    Data,
};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.is_active, u.date_joined";

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("an error occurred when hashing password: {e}"))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// a freshly registered, still inactive account.
#[derive(Clone, Debug)]
pub struct Registered {
    pub user: User,
    pub activation_key: String,
}

/// creates an inactive account and its activation key.
///
/// a taken username, including one lost to a concurrent registration, comes
/// back as a form error on `username`.
#[tracing::instrument(skip(db, config, registration), fields(username = %registration.username))]
pub async fn register(
    db: &Pool<Sqlite>,
    config: &Config,
    registration: Registration,
) -> Result<Result<Registered, FieldErrors>, AppError> {
    let password_hash = hash_password(&registration.password)?;
    let email = format!("{}@{}", registration.username, config.email_domain);
    let activation_key = uuid::Uuid::new_v4().simple().to_string();

    let mut tx = db.begin().await?;

    let inserted = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO
                users (username, email, password_hash, is_active, date_joined)
            VALUES
                ($1, $2, $3, FALSE, $4)
            RETURNING
                id, username, email, password_hash, is_active, date_joined;
        "#,
    )
    .bind(&registration.username)
    .bind(&email)
    .bind(&password_hash)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut *tx)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tracing::info!("username already registered");

            let mut errors = FieldErrors::default();
            errors.add("username", "Ce login est déjà enregistré.");
            return Ok(Err(errors));
        }
        Err(e) => {
            tracing::error!(err = ?e, "an error occurred when creating user");
            return Err(e.into());
        }
    };

    sqlx::query("INSERT INTO registration_profiles (user_id, activation_key) VALUES ($1, $2);")
        .bind(user.id)
        .bind(&activation_key)
        .execute(&mut *tx)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when creating registration profile"),
        )?;

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        email = %user.email,
        activation_key = %activation_key,
        "user registered"
    );

    Ok(Ok(Registered {
        user,
        activation_key,
    }))
}

/// activates the account owning `key` and consumes the key.
#[tracing::instrument(skip(db))]
pub async fn activate(db: &Pool<Sqlite>, key: &str) -> Result<Option<User>, AppError> {
    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, i64>(
        "DELETE FROM registration_profiles WHERE activation_key = $1 RETURNING user_id;",
    )
    .bind(key)
    .fetch_optional(&mut *tx)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when consuming activation key"))?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let user = sqlx::query_as::<_, User>(
        r#"
            UPDATE users
            SET is_active = TRUE
            WHERE id = $1
            RETURNING id, username, email, password_hash, is_active, date_joined;
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, user_id, "an error occurred when activating user"))?;

    tx.commit().await?;

    tracing::info!(user_id, username = %user.username, "user activated");
    Ok(Some(user))
}

/// the active user with these credentials, if any.
#[tracing::instrument(skip(db, password))]
pub async fn authenticate(
    db: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1 AND u.is_active = TRUE;"
    ))
    .bind(username)
    .fetch_optional(db)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching user"))?;

    Ok(user.filter(|user| verify_password(password, &user.password_hash)))
}

/// opens a session for `user_id`, dropping every expired one first.
#[tracing::instrument(skip(db))]
pub async fn create_session(db: &Pool<Sqlite>, user_id: i64) -> Result<String, AppError> {
    let now = OffsetDateTime::now_utc();

    let purged = sqlx::query("DELETE FROM sessions WHERE julianday(created_at) <= julianday($1);")
        .bind(now - SESSION_MAX_AGE)
        .execute(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when purging sessions"))?
        .rows_affected();

    if purged > 0 {
        tracing::debug!(purged, "purged expired sessions");
    }

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect();

    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, $3);")
        .bind(&token)
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when creating session"))?;

    Ok(token)
}

#[tracing::instrument(skip_all)]
pub async fn end_session(db: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1;")
        .bind(token)
        .execute(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when deleting session"))?;

    Ok(())
}

#[tracing::instrument(skip_all)]
pub async fn session_user(db: &Pool<Sqlite>, token: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
            SELECT {USER_COLUMNS}
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE
                s.token = $1
                AND u.is_active = TRUE
                AND julianday(s.created_at) > julianday($2);
        "#
    ))
    .bind(token)
    .bind(OffsetDateTime::now_utc() - SESSION_MAX_AGE)
    .fetch_optional(db)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching session"))?;

    Ok(user)
}

pub fn session_cookie(token: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{secure}",
        SESSION_MAX_AGE.whole_seconds()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// the logged-in user, if the request carries a live session.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Data> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, data: &Data) -> Result<Self, Self::Rejection> {
        let user = match session_token(&parts.headers) {
            Some(token) => session_user(&data.db, &token).await?,
            None => None,
        };

        Ok(MaybeUser(user))
    }
}

/// the logged-in user; anonymous requests are sent to the login page.
pub struct RequireUser(pub User);

impl FromRequestParts<Data> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, data: &Data) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, data).await? {
            MaybeUser(Some(user)) => Ok(RequireUser(user)),
            MaybeUser(None) => Err(AppError::LoginRequired {
                next: parts.uri.path().to_string(),
            }),
        }
    }
}
