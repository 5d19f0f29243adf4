pub mod quotes;
pub mod users;
pub mod votes;
