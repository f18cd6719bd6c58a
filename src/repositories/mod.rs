pub mod account;

pub use account::{AccountRepository, is_duplicate_username};
