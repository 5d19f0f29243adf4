use askama::Template;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Uri,
    response::Html,
};

use crate::{
    accounts::MaybeUser,
    error::AppError,
    forms::SearchForm,
    search,
    templates::{Layout, SimpleTemplate},
    Data,
};

#[tracing::instrument(skip_all, fields(q = tracing::field::Empty))]
pub async fn search_quotes(
    State(data): State<Data>,
    MaybeUser(user): MaybeUser,
    uri: Uri,
    form: Result<Query<SearchForm>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let Query(form) = form.map_err(|_| AppError::NotFound)?;
    tracing::Span::current().record("q", form.q.as_str());

    let quotes = search::search_quotes(&data.db, &form.q).await?;

    let path = match uri.query() {
        Some(query) => format!("{}?{query}", uri.path()),
        None => uri.path().to_string(),
    };

    let template = SimpleTemplate {
        layout: Layout::new(format!("Recherche : {}", form.q), user.as_ref()).at(&path),
        entries: quotes.into_iter().map(Into::into).collect(),
    };

    Ok(Html(template.render()?))
}
