use time::{macros::format_description, OffsetDateTime};

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub author: String,
    pub context: Option<String>,
    pub content: String,
    pub date: OffsetDateTime,
    pub accepted: bool,
    pub visible: bool,
    pub user_id: Option<i64>,
}

impl Quote {
    pub fn date_display(&self) -> String {
        self.date
            .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
            .unwrap_or_default()
    }
}

/// a quote paired with the sum of its votes.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct RankedQuote {
    #[sqlx(flatten)]
    pub quote: Quote,
    pub score: i64,
}

/// a validated submission, not yet stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuote {
    pub author: String,
    pub context: Option<String>,
    pub content: String,
}
