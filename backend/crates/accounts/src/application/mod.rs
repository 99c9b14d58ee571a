//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod manage_users;
pub mod session;
pub mod signup;
pub mod update_profile;

// Re-exports
pub use config::AccountsConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use manage_users::{ManageUsersUseCase, ManagedUser, UserPatch};
pub use session::{ResolveSessionUseCase, StartSessionUseCase};
pub use signup::{SignupInput, SignupOutput, SignupUseCase};
pub use update_profile::{UpdateMode, UpdateProfileInput, UpdateProfileUseCase};
