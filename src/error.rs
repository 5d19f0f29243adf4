use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::templates::{Layout, NotFoundTemplate};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("login required to access {next}")]
    LoginRequired { next: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                let page = NotFoundTemplate {
                    layout: Layout::new("Page introuvable", None),
                };

                match page.render() {
                    Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
                    Err(e) => {
                        tracing::error!(err = ?e, "an error occurred when rendering not found page");
                        (StatusCode::NOT_FOUND, "not found").into_response()
                    }
                }
            }
            AppError::LoginRequired { next } => Redirect::to(&format!(
                "/accounts/login?next={}",
                urlencoding::encode(&next)
            ))
            .into_response(),
            e => {
                tracing::error!(err = ?e, "an error occurred when handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
