//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{Email, UserName, UserPassword};

/// Account holder.
///
/// `is_staff` grants the admin user endpoints; an inactive user cannot log
/// in and their existing sessions stop resolving.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: UserName,
    pub email: Option<Email>,
    pub password_hash: UserPassword,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: UserName, email: Option<Email>, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            username,
            email,
            password_hash,
            is_staff: false,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn set_email(&mut self, email: Option<Email>) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_staff(&mut self, is_staff: bool) {
        self.is_staff = is_staff;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        self.updated_at = Utc::now();
    }
}
