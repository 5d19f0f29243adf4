use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{error::AppError, Data};

pub mod accounts;
pub mod quotes;
pub mod search;
pub mod submit;
pub mod votes;


pub fn router(data: Data) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/last") }))
        .route("/last", get(quotes::last_quotes))
        .route("/last/{page}", get(quotes::last_quotes_page))
        .route("/top", get(quotes::top_quotes))
        .route("/flop", get(quotes::flop_quotes))
        .route("/random", get(quotes::random_quotes))
        .route("/search", get(search::search_quotes))
        .route("/add", get(submit::add_quote_form).post(submit::add_quote))
        .route("/add_confirm", get(submit::add_confirm))
        .route("/vote/{quote_id}/{direction}", post(votes::vote))
        .route(
            "/accounts/register",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/accounts/register/complete", get(accounts::register_complete))
        .route("/accounts/activate/{key}", get(accounts::activate))
        .route("/accounts/login", get(accounts::login_form).post(accounts::login))
        .route("/accounts/logout", post(accounts::logout))
        .fallback(|| async { AppError::NotFound })
        .with_state(data)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
