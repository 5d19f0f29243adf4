use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    accounts::{self, MaybeUser},
    error::AppError,
    forms::{safe_next, FieldErrors, LoginForm, RegistrationForm},
    templates::{
        ActivateTemplate, Layout, LoginTemplate, RegisterCompleteTemplate, RegisterTemplate,
    },
    Data,
};

#[tracing::instrument(skip_all)]
pub async fn register_form(MaybeUser(user): MaybeUser) -> Result<Html<String>, AppError> {
    let template = RegisterTemplate {
        layout: Layout::new("Inscription", user.as_ref()),
        username: String::new(),
        errors: FieldErrors::default(),
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    let result = match form.validate() {
        Ok(registration) => accounts::register(&data.db, &data.config, registration).await?,
        Err(errors) => Err(errors),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/accounts/register/complete").into_response()),
        Err(errors) => {
            let template = RegisterTemplate {
                layout: Layout::new("Inscription", user.as_ref()),
                username: form.username,
                errors,
            };

            Ok(Html(template.render()?).into_response())
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn register_complete(MaybeUser(user): MaybeUser) -> Result<Html<String>, AppError> {
    let template = RegisterCompleteTemplate {
        layout: Layout::new("Inscription", user.as_ref()),
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all)]
pub async fn activate(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    Path(key): Path<String>,
) -> Result<Html<String>, AppError> {
    let activated = accounts::activate(&data.db, &key)
        .await?
        .ok_or(AppError::NotFound)?;

    let template = ActivateTemplate {
        layout: Layout::new("Activation", user.as_ref()),
        username: activated.username,
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginParams {
    next: String,
}

#[tracing::instrument(skip_all)]
pub async fn login_form(
    MaybeUser(user): MaybeUser,
    Query(params): Query<LoginParams>,
) -> Result<Html<String>, AppError> {
    let template = LoginTemplate {
        layout: Layout::new("Connexion", user.as_ref()),
        username: String::new(),
        next: params.next,
        errors: FieldErrors::default(),
        failed: false,
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let (errors, failed) = match form.validate() {
        Ok((username, password)) => {
            match accounts::authenticate(&data.db, &username, &password).await? {
                Some(authenticated) => {
                    let token = accounts::create_session(&data.db, authenticated.id).await?;
                    tracing::info!(user_id = authenticated.id, "user logged in");

                    return Ok((
                        [(
                            SET_COOKIE,
                            accounts::session_cookie(&token, data.config.secure_cookies),
                        )],
                        Redirect::to(&safe_next(&form.next, "/last")),
                    )
                        .into_response());
                }
                None => (FieldErrors::default(), true),
            }
        }
        Err(errors) => (errors, false),
    };

    let template = LoginTemplate {
        layout: Layout::new("Connexion", user.as_ref()),
        username: form.username,
        next: form.next,
        errors,
        failed,
    };

    Ok(Html(template.render()?).into_response())
}

#[tracing::instrument(skip_all)]
pub async fn logout(State(data): State<Data>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = accounts::session_token(&headers) {
        accounts::end_session(&data.db, &token).await?;
    }

    Ok((
        [(SET_COOKIE, accounts::expired_session_cookie())],
        Redirect::to("/last"),
    )
        .into_response())
}
