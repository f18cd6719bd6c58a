pub mod account;
pub mod email;
pub mod password;
pub mod refresh;
pub mod token;

pub use account::{AccountService, LoginOutcome};
pub use email::EmailService;
pub use password::PasswordService;
pub use refresh::{RefreshOutcome, RefreshService};
pub use token::TokenService;
