use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use time::OffsetDateTime;

use crate::{
    accounts::RequireUser,
    error::AppError,
    forms::{AddQuoteForm, FieldErrors},
    models::{quotes::NewQuote, users::User},
    templates::{AddConfirmTemplate, AddTemplate, Layout},
    Data,
};

const NAME_PAGE: &str = "Ajouter une citation";

#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn add_quote_form(RequireUser(user): RequireUser) -> Result<Html<String>, AppError> {
    let template = AddTemplate {
        layout: Layout::new(NAME_PAGE, Some(&user)),
        form: AddQuoteForm::default(),
        errors: FieldErrors::default(),
    };

    Ok(Html(template.render()?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn add_quote(
    State(data): State<Data>,
    RequireUser(user): RequireUser,
    Form(form): Form<AddQuoteForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(quote) => {
            let id = insert_quote(&data, &user, quote).await?;
            tracing::info!(quote_id = id, user_id = user.id, "quote submitted for moderation");

            Ok(Redirect::to("/add_confirm").into_response())
        }
        Err(errors) => {
            let template = AddTemplate {
                layout: Layout::new(NAME_PAGE, Some(&user)),
                form,
                errors,
            };

            Ok(Html(template.render()?).into_response())
        }
    }
}

async fn insert_quote(data: &Data, user: &User, quote: NewQuote) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO
                quotes (author, context, content, date, accepted, visible, user_id)
            VALUES
                ($1, $2, $3, $4, FALSE, FALSE, $5)
            RETURNING id;
        "#,
    )
    .bind(&quote.author)
    .bind(&quote.context)
    .bind(&quote.content)
    .bind(OffsetDateTime::now_utc())
    .bind(user.id)
    .fetch_one(&data.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, author = %quote.author, content = %quote.content, "an error occurred when adding quote");
    })?;

    Ok(id)
}

#[tracing::instrument(skip_all)]
pub async fn add_confirm(RequireUser(user): RequireUser) -> Result<Html<String>, AppError> {
    let template = AddConfirmTemplate {
        layout: Layout::new(NAME_PAGE, Some(&user)),
    };

    Ok(Html(template.render()?))
}
