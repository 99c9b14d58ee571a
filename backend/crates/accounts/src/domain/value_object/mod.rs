//! Value Objects

pub mod email;
pub mod profile_fields;
pub mod user_name;
pub mod user_password;

pub use email::{Email, EmailError};
pub use profile_fields::{AvatarUrl, Nickname, ProfileFieldError};
pub use user_name::{UserName, UserNameError};
pub use user_password::{RawPassword, UserPassword};
