use askama::Template;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use thousands::Separable;

use crate::{
    accounts::MaybeUser,
    constants::{PAGE_SIZE, RANKING_LIMIT},
    error::AppError,
    models::users::User,
    pagination::pagination_info,
    query::{get_quotes, OrderKey},
    ranking::get_top,
    templates::{LastTemplate, Layout, SimpleTemplate},
    Data,
};

#[derive(Debug, Default, Deserialize)]
pub struct LastParams {
    p: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn last_quotes(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    uri: Uri,
    params: Result<Query<LastParams>, QueryRejection>,
) -> Result<Response, AppError> {
    render_last(&data, user.as_ref(), &uri, "0", params).await
}

#[tracing::instrument(skip_all, fields(page = %page))]
pub async fn last_quotes_page(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    uri: Uri,
    Path(page): Path<String>,
    params: Result<Query<LastParams>, QueryRejection>,
) -> Result<Response, AppError> {
    render_last(&data, user.as_ref(), &uri, &page, params).await
}

async fn render_last(
    data: &Data,
    user: Option<&User>,
    uri: &Uri,
    page: &str,
    params: Result<Query<LastParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|_| AppError::NotFound)?;

    if let Some(p) = params.p {
        return Ok(Redirect::to(&format!("/last/{}", urlencoding::encode(&p))).into_response());
    }

    let page: i64 = page.parse().map_err(|_| AppError::NotFound)?;

    let query = get_quotes(true, OrderKey::default());
    let total = query.count(&data.db).await?;
    let info = pagination_info(total, page, PAGE_SIZE)?;
    let window = u32::try_from(page).map_err(|_| AppError::NotFound)?;
    let quotes = query.split(&data.db, window, PAGE_SIZE).await?;

    let template = LastTemplate {
        layout: Layout::new("Dernières citations", user).at(uri.path()),
        entries: quotes.into_iter().map(Into::into).collect(),
        page,
        info,
        total: total.separate_with_spaces(),
    };

    Ok(Html(template.render()?).into_response())
}

#[tracing::instrument(skip_all)]
pub async fn top_quotes(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let quotes = get_top(&data.db, RANKING_LIMIT, false).await?;

    let template = SimpleTemplate {
        layout: Layout::new("Meilleures citations", user.as_ref()).at("/top"),
        entries: quotes.into_iter().map(Into::into).collect(),
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all)]
pub async fn flop_quotes(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let quotes = get_top(&data.db, RANKING_LIMIT, true).await?;

    let template = SimpleTemplate {
        layout: Layout::new("Pires citations", user.as_ref()).at("/flop"),
        entries: quotes.into_iter().map(Into::into).collect(),
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all)]
pub async fn random_quotes(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let quotes = get_quotes(true, OrderKey::Random)
        .split(&data.db, 0, PAGE_SIZE)
        .await?;

    let template = SimpleTemplate {
        layout: Layout::new("Citations aléatoires", user.as_ref()).at("/random"),
        entries: quotes.into_iter().map(Into::into).collect(),
    };

    Ok(Html(template.render()?))
}
