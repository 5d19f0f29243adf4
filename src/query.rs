use std::str::FromStr;

use sqlx::{Pool, Sqlite};

use crate::{models::quotes::Quote, pagination, search::Predicate};

const QUOTE_COLUMNS: &str = "id, author, context, content, date, accepted, visible, user_id";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Date,
    Author,
}

impl OrderField {
    fn column(self) -> &'static str {
        match self {
            OrderField::Id => "id",
            OrderField::Date => "date",
            OrderField::Author => "author",
        }
    }
}

/// ordering of a quote listing: a field name, `-field` for descending, `?` for random.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderKey {
    Asc(OrderField),
    Desc(OrderField),
    Random,
}

impl Default for OrderKey {
    fn default() -> Self {
        OrderKey::Desc(OrderField::Date)
    }
}

impl FromStr for OrderKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "?" {
            return Ok(OrderKey::Random);
        }

        let (descending, name) = match s.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, s),
        };

        let field = match name {
            "id" => OrderField::Id,
            "date" => OrderField::Date,
            "author" => OrderField::Author,
            _ => anyhow::bail!("unknown order key {s:?}"),
        };

        Ok(if descending {
            OrderKey::Desc(field)
        } else {
            OrderKey::Asc(field)
        })
    }
}

impl OrderKey {
    fn order_by(self) -> String {
        match self {
            OrderKey::Asc(field) => format!("{} ASC, id ASC", field.column()),
            OrderKey::Desc(field) => format!("{} DESC, id DESC", field.column()),
            OrderKey::Random => "RANDOM()".to_string(),
        }
    }
}

/// an extra SQL condition and the patterns bound to its placeholders, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Condition {
    sql: String,
    patterns: Vec<String>,
}

/// the accepted quotes, optionally only the visible ones, in a fixed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteQuery {
    only_visible: bool,
    order: OrderKey,
    condition: Option<Condition>,
}

pub fn get_quotes(only_visible: bool, order: OrderKey) -> QuoteQuery {
    QuoteQuery {
        only_visible,
        order,
        condition: None,
    }
}

impl QuoteQuery {
    /// narrows the query to quotes matching `predicate`, evaluated by the store.
    pub fn matching(mut self, predicate: &Predicate) -> Self {
        let mut patterns = Vec::new();
        let sql = predicate.to_sql(&mut patterns);

        self.condition = Some(Condition { sql, patterns });
        self
    }

    fn filter(&self) -> String {
        let base = if self.only_visible {
            "accepted = TRUE AND visible = TRUE"
        } else {
            "accepted = TRUE"
        };

        match &self.condition {
            Some(condition) => format!("{base} AND {}", condition.sql),
            None => base.to_string(),
        }
    }

    fn patterns(&self) -> &[String] {
        self.condition
            .as_ref()
            .map(|condition| condition.patterns.as_slice())
            .unwrap_or_default()
    }

    #[tracing::instrument(skip(db))]
    pub async fn count(&self, db: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM quotes WHERE {}", self.filter());

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for pattern in self.patterns() {
            query = query.bind(pattern.as_str());
        }

        query
            .fetch_one(db)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting quotes"))
    }

    #[tracing::instrument(skip(db))]
    pub async fn all(&self, db: &Pool<Sqlite>) -> Result<Vec<Quote>, sqlx::Error> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE {} ORDER BY {}",
            self.filter(),
            self.order.order_by(),
        );

        let mut query = sqlx::query_as::<_, Quote>(&sql);
        for pattern in self.patterns() {
            query = query.bind(pattern.as_str());
        }

        query
            .fetch_all(db)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching quotes"))
    }

    /// fetches the `page`-th window of `page_size` quotes, empty past the end.
    #[tracing::instrument(skip(db))]
    pub async fn split(
        &self,
        db: &Pool<Sqlite>,
        page: u32,
        page_size: i64,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let (offset, limit) = pagination::bounds(page, page_size);
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            self.filter(),
            self.order.order_by(),
        );

        let mut query = sqlx::query_as::<_, Quote>(&sql);
        for pattern in self.patterns() {
            query = query.bind(pattern.as_str());
        }

        query
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, page, "an error occurred when fetching quotes page"),
            )
    }
}
