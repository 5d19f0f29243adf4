use sqlx::{Pool, Sqlite};

use crate::{
    constants::{SEARCH_MAX_CHARS, SEARCH_MAX_WORDS},
    error::AppError,
    forms::FieldErrors,
    models::quotes::Quote,
    query::{get_quotes, OrderKey},
};

/// checks the raw query before it is tokenized.
pub fn validate_query(query: &str) -> Result<&str, FieldErrors> {
    let mut errors = FieldErrors::default();

    if query.trim().is_empty() {
        errors.add("q", "Ce champ est obligatoire.");
    } else if query.split_whitespace().count() > SEARCH_MAX_WORDS {
        errors.add("q", "Trop de mots.");
    } else if query.chars().count() > SEARCH_MAX_CHARS {
        errors.add("q", "Trop de lettres.");
    }

    errors.into_result(query)
}

/// splits a query into words, keeping `"quoted phrases"` as single tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split('"')
        .map(str::trim)
        .enumerate()
        .flat_map(|(idx, segment)| {
            if idx % 2 == 1 {
                vec![segment]
            } else {
                segment.split_whitespace().collect()
            }
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Content,
    Context,
    Author,
}

impl Field {
    const ALL: [Field; 3] = [Field::Content, Field::Context, Field::Author];

    fn column(self) -> &'static str {
        match self {
            Field::Content => "content",
            Field::Context => "COALESCE(context, '')",
            Field::Author => "author",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// the field matches this regex pattern.
    Match(Field, String),
    Any(Vec<Predicate>),
}

impl Predicate {
    /// renders the predicate as a SQL condition, pushing the pattern for each
    /// `?` placeholder onto `patterns` in order.
    pub fn to_sql(&self, patterns: &mut Vec<String>) -> String {
        match self {
            Predicate::Match(field, pattern) => {
                patterns.push(pattern.clone());
                format!("{} REGEXP ?", field.column())
            }
            Predicate::Any(predicates) if predicates.is_empty() => "FALSE".to_string(),
            Predicate::Any(predicates) => {
                let clauses: Vec<String> = predicates.iter().map(|p| p.to_sql(patterns)).collect();
                format!("({})", clauses.join(" OR "))
            }
        }
    }
}

/// a case-insensitive pattern matching `token` literally, bounded by non-word
/// characters or the ends of the text.
pub fn whole_word(token: &str) -> String {
    format!(r"(?i)(^|[^\w]){}([^\w]|$)", fancy_regex::escape(token))
}

/// matches a quote when any token appears as a whole word in any field.
pub fn build_predicate(tokens: &[String]) -> Result<Predicate, AppError> {
    if tokens.is_empty() {
        return Err(AppError::NotFound);
    }

    let predicates = tokens
        .iter()
        .flat_map(|token| {
            let pattern = whole_word(token);
            Field::ALL.map(|field| Predicate::Match(field, pattern.clone()))
        })
        .collect();

    Ok(Predicate::Any(predicates))
}

/// the visible quotes matching `query`, newest first.
#[tracing::instrument(skip(db))]
pub async fn search_quotes(db: &Pool<Sqlite>, query: &str) -> Result<Vec<Quote>, AppError> {
    let query = validate_query(query).map_err(|_| AppError::NotFound)?;
    let predicate = build_predicate(&tokenize(query))?;

    let quotes = get_quotes(true, OrderKey::default())
        .matching(&predicate)
        .all(db)
        .await?;

    if quotes.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::sqlite::SqliteConnectOptions;
    use time::macros::datetime;

    use super::*;
    use crate::testing;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn tokenize_keeps_quoted_phrases() {
        assert_eq!(
            tokenize(r#"hello "big world" foo"#),
            ["hello", "big world", "foo"]
        );
    }

    #[test]
    fn tokenize_drops_empty_tokens() {
        assert_eq!(tokenize(r#"  "" a   "  b  " "#), ["a", "b"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn tokenize_unterminated_quote_keeps_rest_as_phrase() {
        assert_eq!(tokenize(r#"one "two three"#), ["one", "two three"]);
    }

    #[test]
    fn validate_rejects_too_many_words() {
        let query = vec!["word"; 31].join(" ");
        let errors = validate_query(&query).unwrap_err();
        assert_eq!(errors.get("q"), ["Trop de mots."]);

        let query = vec!["word"; 30].join(" ");
        assert!(validate_query(&query).is_ok());
    }

    #[test]
    fn validate_rejects_too_many_characters() {
        let query = "a".repeat(301);
        let errors = validate_query(&query).unwrap_err();
        assert_eq!(errors.get("q"), ["Trop de lettres."]);

        assert!(validate_query(&"a".repeat(300)).is_ok());
    }

    #[test]
    fn validate_rejects_blank_query() {
        assert!(validate_query("  ").is_err());
    }

    async fn found(db: &Pool<Sqlite>, words: &[&str]) -> Vec<String> {
        let predicate = build_predicate(&tokens(words)).unwrap();

        get_quotes(true, OrderKey::default())
            .matching(&predicate)
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|quote| quote.content)
            .collect()
    }

    async fn insert_full_quote(db: &Pool<Sqlite>, author: &str, context: Option<&str>, content: &str) {
        sqlx::query(
            r#"
                INSERT INTO
                    quotes (author, context, content, date, accepted, visible)
                VALUES
                    ($1, $2, $3, $4, TRUE, TRUE);
            "#,
        )
        .bind(author)
        .bind(context)
        .bind(content)
        .bind(datetime!(2024-01-01 0:00 UTC))
        .execute(db)
        .await
        .unwrap();
    }

    #[test]
    fn renders_one_placeholder_per_field_and_token() {
        let predicate = build_predicate(&tokens(&["a", "b"])).unwrap();

        let mut patterns = Vec::new();
        let sql = predicate.to_sql(&mut patterns);

        assert_eq!(sql.matches("REGEXP ?").count(), 6);
        assert_eq!(patterns.len(), 6);
        assert_eq!(patterns[0], whole_word("a"));
        assert_eq!(patterns[5], whole_word("b"));
        assert_eq!(Predicate::Any(Vec::new()).to_sql(&mut patterns), "FALSE");
    }

    #[test]
    fn whole_word_escapes_metacharacters() {
        let pattern = fancy_regex::Regex::new(&whole_word("(really)")).unwrap();

        assert!(pattern.is_match("what (really) happened?").unwrap());
        assert!(!pattern.is_match("what really happened?").unwrap());
    }

    #[tokio::test]
    async fn matches_whole_words_case_insensitively() {
        let db = testing::database().await;
        insert_full_quote(&db, "someone", None, "Hello World").await;

        assert_eq!(found(&db, &["world"]).await, ["Hello World"]);
        assert_eq!(found(&db, &["HELLO"]).await, ["Hello World"]);
        assert_eq!(found(&db, &["hello world"]).await, ["Hello World"]);
        assert!(found(&db, &["worl"]).await.is_empty());
        assert!(found(&db, &["helloworld"]).await.is_empty());
    }

    #[tokio::test]
    async fn matches_any_token_in_any_field() {
        let db = testing::database().await;
        insert_full_quote(&db, "Linus", Some("mailing list, 2004"), "talk is cheap").await;
        insert_full_quote(&db, "someone", None, "no context here").await;

        assert_eq!(found(&db, &["nothing", "linus"]).await, ["talk is cheap"]);
        assert_eq!(found(&db, &["2004"]).await, ["talk is cheap"]);
        assert_eq!(found(&db, &["cheap"]).await, ["talk is cheap"]);
        assert!(found(&db, &["expensive", "torvalds"]).await.is_empty());
    }

    #[tokio::test]
    async fn tokens_match_literally() {
        let db = testing::database().await;
        insert_full_quote(&db, "someone", None, "what (really) happened?").await;

        assert_eq!(found(&db, &["(really)"]).await, ["what (really) happened?"]);
        assert!(found(&db, &["h.ppened"]).await.is_empty());
    }

    #[tokio::test]
    async fn store_errors_are_not_reported_as_no_match() {
        // no REGEXP function registered on this pool
        let db = testing::database_with(SqliteConnectOptions::from_str("sqlite::memory:").unwrap()).await;
        insert_full_quote(&db, "someone", None, "Hello World").await;

        assert!(matches!(search_quotes(&db, "world").await, Err(AppError::Database(_))));
    }

    #[test]
    fn empty_tokens_are_not_found() {
        assert!(matches!(build_predicate(&[]), Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn search_filters_visible_quotes() {
        let db = testing::database().await;
        let user = testing::insert_user(&db, "alice", true).await;

        testing::insert_quote(&db, user, "Hello World", true, true, datetime!(2024-01-01 0:00 UTC)).await;
        testing::insert_quote(&db, user, "world peace", true, false, datetime!(2024-01-02 0:00 UTC)).await;
        testing::insert_quote(&db, user, "goodbye", true, true, datetime!(2024-01-03 0:00 UTC)).await;

        let found = search_quotes(&db, "world").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "Hello World");

        assert!(matches!(search_quotes(&db, "worl").await, Err(AppError::NotFound)));
        assert!(matches!(search_quotes(&db, r#""""#).await, Err(AppError::NotFound)));
        assert!(matches!(search_quotes(&db, "").await, Err(AppError::NotFound)));
    }
}
