pub mod game;
pub mod password_reset;
pub mod user;

pub use game::{Game, Purchase};
pub use password_reset::PasswordReset;
pub use user::User;
