use askama::Template;

use crate::{
    constants::version::get_version,
    forms::{AddQuoteForm, FieldErrors},
    models::{
        quotes::{Quote, RankedQuote},
        users::User,
    },
    pagination::PageInfo,
};

/// the parts every page shares: title, navigation and footer.
pub struct Layout {
    pub name_page: String,
    pub username: Option<String>,
    pub path: String,
    pub version: String,
}

impl Layout {
    pub fn new(name_page: impl Into<String>, user: Option<&User>) -> Self {
        Self {
            name_page: name_page.into(),
            username: user.map(|u| u.username.clone()),
            path: "/".to_string(),
            version: get_version(),
        }
    }

    /// the page's own path, where vote forms send the user back to.
    pub fn at(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
}

pub struct QuoteEntry {
    pub quote: Quote,
    pub score: Option<i64>,
}

impl From<Quote> for QuoteEntry {
    fn from(quote: Quote) -> Self {
        Self { quote, score: None }
    }
}

impl From<RankedQuote> for QuoteEntry {
    fn from(ranked: RankedQuote) -> Self {
        Self {
            quote: ranked.quote,
            score: Some(ranked.score),
        }
    }
}

#[derive(Template)]
#[template(path = "last.html")]
pub struct LastTemplate {
    pub layout: Layout,
    pub entries: Vec<QuoteEntry>,
    pub page: i64,
    pub info: PageInfo,
    pub total: String,
}

#[derive(Template)]
#[template(path = "simple.html")]
pub struct SimpleTemplate {
    pub layout: Layout,
    pub entries: Vec<QuoteEntry>,
}

#[derive(Template)]
#[template(path = "add.html")]
pub struct AddTemplate {
    pub layout: Layout,
    pub form: AddQuoteForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "add_confirm.html")]
pub struct AddConfirmTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub username: String,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "register_complete.html")]
pub struct RegisterCompleteTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "activate.html")]
pub struct ActivateTemplate {
    pub layout: Layout,
    pub username: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    pub errors: FieldErrors,
    pub failed: bool,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}
