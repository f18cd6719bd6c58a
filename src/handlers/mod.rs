pub mod account;
pub mod email;
pub mod extract;
pub mod health;
pub mod login;
pub mod password;
pub mod refresh;
pub mod register;
pub mod response;

pub use account::delete_account;
pub use email::{request_email_verification, verify_email};
pub use health::health_check;
pub use login::login;
pub use password::{change_password, forgot_password, reset_password};
pub use refresh::refresh;
pub use register::register;
