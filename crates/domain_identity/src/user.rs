//! User aggregate
//!
//! A user is never hard-deleted; deactivation flips `is_active`. Login
//! failures accumulate on the record and lock the account after
//! [`MAX_FAILED_LOGIN_ATTEMPTS`] consecutive misses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Role, UserId};

use crate::error::IdentityError;
use crate::password::hash_password;

/// Consecutive failed logins before the account locks
pub const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;

/// How long a lockout lasts
pub const LOCKOUT_DURATION_HOURS: i64 = 2;

/// A registered user of the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Email address, unique across the system
    pub email: String,
    /// Argon2id credential hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Assigned role
    pub role: Role,
    /// Deactivated users cannot authenticate
    pub is_active: bool,
    /// Consecutive failed login attempts
    pub failed_login_attempts: u32,
    /// Lockout expiry, when locked
    pub locked_until: Option<DateTime<Utc>>,
    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Registers a new user with a hashed credential
    pub fn register(
        email: impl Into<String>,
        plaintext_password: &str,
        full_name: impl Into<String>,
        role: Role,
    ) -> Result<Self, IdentityError> {
        let email = email.into().trim().to_lowercase();
        if !email.contains('@') {
            return Err(IdentityError::Validation(
                "Email address is not valid".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: UserId::new_v7(),
            email,
            password_hash: hash_password(plaintext_password)?,
            full_name: full_name.into(),
            phone: None,
            role,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the account is locked at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if until > now)
    }

    /// Ensures the account may attempt authentication
    pub fn check_can_authenticate(&self, now: DateTime<Utc>) -> Result<(), IdentityError> {
        if !self.is_active {
            return Err(IdentityError::AccountDeactivated);
        }
        if let Some(until) = self.locked_until {
            if until > now {
                return Err(IdentityError::AccountLocked(until));
            }
        }
        Ok(())
    }

    /// Records a failed login, locking the account once the threshold is hit
    pub fn record_failed_login(&mut self, now: DateTime<Utc>) {
        self.failed_login_attempts += 1;
        if self.failed_login_attempts >= MAX_FAILED_LOGIN_ATTEMPTS {
            self.locked_until = Some(now + Duration::hours(LOCKOUT_DURATION_HOURS));
        }
        self.updated_at = now;
    }

    /// Records a successful login, clearing the lockout counters
    pub fn record_successful_login(&mut self, now: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.locked_until = None;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Updates the mutable profile fields
    pub fn update_profile(&mut self, full_name: Option<String>, phone: Option<String>) {
        if let Some(name) = full_name {
            self.full_name = name;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        self.updated_at = Utc::now();
    }

    /// Toggles account activation (admin operation)
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn test_user() -> User {
        let email: String = SafeEmail().fake();
        User::register(email, "a-strong-password", "Test User", Role::Customer).unwrap()
    }

    #[test]
    fn register_normalises_email_and_hashes_password() {
        let user = User::register(
            "  Jane@Example.COM ",
            "a-strong-password",
            "Jane Doe",
            Role::Customer,
        )
        .unwrap();

        assert_eq!(user.email, "jane@example.com");
        assert_ne!(user.password_hash, "a-strong-password");
        assert!(verify_password("a-strong-password", &user.password_hash));
    }

    #[test]
    fn register_rejects_invalid_email() {
        let result = User::register("not-an-email", "a-strong-password", "X", Role::Customer);
        assert!(matches!(result, Err(IdentityError::Validation(_))));
    }

    #[test]
    fn lockout_after_max_failures() {
        let mut user = test_user();
        let now = Utc::now();

        for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS - 1 {
            user.record_failed_login(now);
            assert!(!user.is_locked(now));
        }

        user.record_failed_login(now);
        assert!(user.is_locked(now));
        assert!(matches!(
            user.check_can_authenticate(now),
            Err(IdentityError::AccountLocked(_))
        ));
    }

    #[test]
    fn lockout_expires() {
        let mut user = test_user();
        let now = Utc::now();
        for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS {
            user.record_failed_login(now);
        }

        let later = now + Duration::hours(LOCKOUT_DURATION_HOURS) + Duration::minutes(1);
        assert!(!user.is_locked(later));
        assert!(user.check_can_authenticate(later).is_ok());
    }

    #[test]
    fn successful_login_resets_counters() {
        let mut user = test_user();
        let now = Utc::now();
        user.record_failed_login(now);
        user.record_failed_login(now);

        user.record_successful_login(now);
        assert_eq!(user.failed_login_attempts, 0);
        assert!(user.locked_until.is_none());
        assert_eq!(user.last_login_at, Some(now));
    }

    #[test]
    fn deactivated_user_cannot_authenticate() {
        let mut user = test_user();
        user.set_active(false);
        assert!(matches!(
            user.check_can_authenticate(Utc::now()),
            Err(IdentityError::AccountDeactivated)
        ));
    }
}
