pub mod session;
pub mod user;
pub mod user_profile;

pub use session::Session;
pub use user::User;
pub use user_profile::{ProfileChanges, UserProfile};
