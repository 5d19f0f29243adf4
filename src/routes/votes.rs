use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};
use serde::Deserialize;

use crate::{
    accounts::RequireUser, error::AppError, forms::safe_next, models::votes::VoteDirection,
    ranking::record_vote, Data,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VoteForm {
    next: String,
}

#[tracing::instrument(skip_all, fields(user_id = user.id, quote_id = %quote_id, direction = %direction))]
pub async fn vote(
    State(data): State<Data>,
    RequireUser(user): RequireUser,
    Path((quote_id, direction)): Path<(String, String)>,
    Form(form): Form<VoteForm>,
) -> Result<Redirect, AppError> {
    let quote_id: i64 = quote_id.parse().map_err(|_| AppError::NotFound)?;
    let direction: VoteDirection = direction.parse().map_err(|_| AppError::NotFound)?;

    record_vote(&data.db, user.id, quote_id, direction).await?;

    Ok(Redirect::to(&safe_next(&form.next, "/last")))
}
