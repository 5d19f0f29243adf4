use sqlx::{Pool, Sqlite};

use crate::{
    error::AppError,
    models::{quotes::RankedQuote, votes::VoteDirection},
};

/// the `limit` best scored quotes, or the worst ones when `reversed`.
///
/// only quotes with a positive (or, reversed, negative) score are ranked.
/// visibility is not checked here, unlike the chronological listing.
#[tracing::instrument(skip(db))]
pub async fn get_top(
    db: &Pool<Sqlite>,
    limit: i64,
    reversed: bool,
) -> Result<Vec<RankedQuote>, sqlx::Error> {
    let having = if reversed {
        "HAVING score < 0 ORDER BY score ASC, q.id ASC"
    } else {
        "HAVING score > 0 ORDER BY score DESC, q.id ASC"
    };

    let query = format!(
        r#"
            SELECT
                q.id, q.author, q.context, q.content, q.date, q.accepted, q.visible, q.user_id,
                SUM(v.vote) AS score
            FROM votes v
            JOIN quotes q ON q.id = v.quote_id
            WHERE q.accepted = TRUE
            GROUP BY q.id
            {having}
            LIMIT ?;
        "#
    );

    sqlx::query_as::<_, RankedQuote>(&query)
        .bind(limit)
        .fetch_all(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when ranking quotes"))
}

/// records `user_id`'s vote on an accepted quote, replacing any earlier one.
#[tracing::instrument(skip(db))]
pub async fn record_vote(
    db: &Pool<Sqlite>,
    user_id: i64,
    quote_id: i64,
    direction: VoteDirection,
) -> Result<(), AppError> {
    let accepted = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM quotes WHERE id = $1 AND accepted = TRUE;",
    )
    .bind(quote_id)
    .fetch_one(db)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, quote_id, "an error occurred when fetching quote"))?;

    if accepted == 0 {
        return Err(AppError::NotFound);
    }

    match direction.value() {
        Some(vote) => {
            sqlx::query(
                r#"
                    INSERT INTO
                        votes (user_id, quote_id, vote)
                    VALUES
                        ($1, $2, $3)
                    ON CONFLICT (user_id, quote_id) DO UPDATE SET vote = excluded.vote;
                "#,
            )
            .bind(user_id)
            .bind(quote_id)
            .bind(vote)
            .execute(db)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, quote_id, "an error occurred when recording vote"))?;
        }
        None => {
            sqlx::query("DELETE FROM votes WHERE user_id = $1 AND quote_id = $2;")
                .bind(user_id)
                .bind(quote_id)
                .execute(db)
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, quote_id, "an error occurred when clearing vote"),
                )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::testing;

    async fn score_of(db: &Pool<Sqlite>, quote_id: i64) -> Option<i64> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT SUM(vote) FROM votes WHERE quote_id = $1;")
            .bind(quote_id)
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn top_and_flop_rank_by_score() {
        let db = testing::database().await;
        let alice = testing::insert_user(&db, "alice", true).await;
        let bob = testing::insert_user(&db, "bob", true).await;
        let date = datetime!(2024-01-01 0:00 UTC);

        let loved = testing::insert_quote(&db, alice, "loved", true, true, date).await;
        let liked = testing::insert_quote(&db, alice, "liked", true, true, date).await;
        let hated = testing::insert_quote(&db, alice, "hated", true, true, date).await;
        let disliked = testing::insert_quote(&db, alice, "disliked", true, false, date).await;
        let pending = testing::insert_quote(&db, alice, "pending", false, true, date).await;

        testing::insert_vote(&db, alice, loved, 1).await;
        testing::insert_vote(&db, bob, loved, 1).await;
        testing::insert_vote(&db, alice, liked, 1).await;
        testing::insert_vote(&db, alice, hated, -1).await;
        testing::insert_vote(&db, bob, hated, -1).await;
        testing::insert_vote(&db, alice, disliked, -1).await;
        testing::insert_vote(&db, alice, pending, 1).await;

        let top = get_top(&db, 50, false).await.unwrap();
        let top: Vec<_> = top.iter().map(|r| (r.quote.content.as_str(), r.score)).collect();
        assert_eq!(top, [("loved", 2), ("liked", 1)]);

        let flop = get_top(&db, 50, true).await.unwrap();
        let flop: Vec<_> = flop.iter().map(|r| (r.quote.content.as_str(), r.score)).collect();
        assert_eq!(flop, [("hated", -2), ("disliked", -1)]);

        assert_eq!(get_top(&db, 1, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn revoting_replaces_and_clear_removes() {
        let db = testing::database().await;
        let alice = testing::insert_user(&db, "alice", true).await;
        let quote = testing::insert_quote(&db, alice, "q", true, true, datetime!(2024-01-01 0:00 UTC)).await;

        record_vote(&db, alice, quote, VoteDirection::Up).await.unwrap();
        assert_eq!(score_of(&db, quote).await, Some(1));

        record_vote(&db, alice, quote, VoteDirection::Down).await.unwrap();
        assert_eq!(score_of(&db, quote).await, Some(-1));

        record_vote(&db, alice, quote, VoteDirection::Clear).await.unwrap();
        assert_eq!(score_of(&db, quote).await, None);
    }

    #[tokio::test]
    async fn cannot_vote_on_unaccepted_quotes() {
        let db = testing::database().await;
        let alice = testing::insert_user(&db, "alice", true).await;
        let pending = testing::insert_quote(&db, alice, "q", false, true, datetime!(2024-01-01 0:00 UTC)).await;

        assert!(matches!(
            record_vote(&db, alice, pending, VoteDirection::Up).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            record_vote(&db, alice, 9999, VoteDirection::Up).await,
            Err(AppError::NotFound)
        ));
    }
}
