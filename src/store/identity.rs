//! Sign-in / sign-up and the current-user lookup.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{GanttError, Result};
use crate::model::User;

const MIN_PASSWORD_LEN: usize = 6;

/// Identity collaborator. The board only asks it who is signed in.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;

    fn sign_in(&mut self, email: &str, password: &str) -> Result<User>;

    /// Register and sign in.
    fn sign_up(&mut self, email: &str, password: &str) -> Result<User>;

    fn sign_out(&mut self);
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    salt: String,
    digest: String,
}

/// In-process accounts with salted SHA-256 password digests.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    accounts: HashMap<String, Account>,
    session: Option<User>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<User> {
        self.session.clone()
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let account = self
            .accounts
            .get(&email)
            .filter(|a| a.digest == digest(&a.salt, password))
            .ok_or_else(|| {
                tracing::warn!(%email, "sign-in rejected");
                GanttError::Authentication {
                    reason: "invalid email or password".to_string(),
                }
            })?;
        self.session = Some(account.user.clone());
        tracing::info!(user = %account.user.id, "signed in");
        Ok(account.user.clone())
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(GanttError::Authentication {
                reason: format!("'{email}' is not an email address"),
            });
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(GanttError::Authentication {
                reason: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        if self.accounts.contains_key(&email) {
            return Err(GanttError::Authentication {
                reason: format!("'{email}' is already registered"),
            });
        }

        let user = User::new(email.clone());
        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            user: user.clone(),
            digest: digest(&salt, password),
            salt,
        };
        self.accounts.insert(email, account);
        self.session = Some(user.clone());
        tracing::info!(user = %user.id, "account created");
        Ok(user)
    }

    fn sign_out(&mut self) {
        if let Some(user) = self.session.take() {
            tracing::info!(user = %user.id, "signed out");
        }
    }
}
