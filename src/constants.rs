use std::sync::LazyLock;

use fancy_regex::Regex;
use time::Duration;

pub mod version;

pub const PAGE_SIZE: i64 = 30;
pub const RANKING_LIMIT: i64 = 50;

pub const SEARCH_MAX_WORDS: usize = 30;
pub const SEARCH_MAX_CHARS: usize = 300;

pub const USERNAME_MAX_CHARS: usize = 8;
pub static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{0,8}$").unwrap());

pub const SESSION_COOKIE: &str = "sessionid";
pub const SESSION_TOKEN_LEN: usize = 48;
pub const SESSION_MAX_AGE: Duration = Duration::weeks(2);
