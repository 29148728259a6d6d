//! Accounts, the signed-in identity, and the sign-in flow.
//!
//! `LocalAccounts` keeps email/password accounts in the `accounts` table and
//! remembers who is signed in. The rest of the crate only sees it through
//! `IdentityProvider` and `AccountService`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::db;
use crate::error::{ReaderError, Result};
use crate::models::UserProfile;
use crate::store::ProfileStore;

pub const WRONG_CREDENTIALS_MESSAGE: &str = "Wrong Email or Password";
pub const ACCOUNT_EXISTS_MESSAGE: &str = "Account Already Existed";
const DEFAULT_QUOTE: &str = "YOLO";
const DEFAULT_PROFESSION: &str = "Android Developer";
const MIN_PASSWORD_LEN: usize = 6;
const UNKNOWN_NAME: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

impl Identity {
    /// The part of the email before `@`, or `N/A` without an email.
    pub fn display_name(&self) -> String {
        if self.email.is_empty() {
            return UNKNOWN_NAME.to_string();
        }
        self.email.split('@').next().unwrap_or_default().to_string()
    }
}

/// Display name of whoever is signed in, `N/A` when nobody is.
pub fn display_name_of(identity: Option<&Identity>) -> String {
    identity
        .map(Identity::display_name)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
    fn sign_out(&self);
}

pub trait AccountService: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;
    fn create_account(&self, email: &str, password: &str) -> Result<Identity>;
}

/// Shows a short user-visible message, the way a toast does.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str);
}

pub struct LocalAccounts {
    conn: Mutex<Connection>,
    profiles: Arc<dyn ProfileStore>,
    current: Mutex<Option<Identity>>,
}

impl LocalAccounts {
    pub fn open(db_path: &Path, profiles: Arc<dyn ProfileStore>) -> Result<Self> {
        Ok(Self::from_connection(db::init_db(db_path)?, profiles))
    }

    pub fn in_memory(profiles: Arc<dyn ProfileStore>) -> Result<Self> {
        Ok(Self::from_connection(db::init_in_memory()?, profiles))
    }

    pub fn from_connection(conn: Connection, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            conn: Mutex::new(conn),
            profiles,
            current: Mutex::new(None),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReaderError::Message("account store lock poisoned".to_string()))
    }

    fn set_current(&self, identity: Option<Identity>) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = identity;
    }

    fn create_profile(&self, identity: &Identity) {
        let profile = UserProfile {
            id: None,
            user_id: identity.uid.clone(),
            display_name: identity.display_name(),
            avatar_url: String::new(),
            quote: DEFAULT_QUOTE.to_string(),
            profession: DEFAULT_PROFESSION.to_string(),
        };
        // The account is usable without a profile document.
        if let Err(err) = self.profiles.add_profile(&profile) {
            log::warn!("profile for {} not created: {}", identity.uid, err);
        }
    }
}

impl IdentityProvider for LocalAccounts {
    fn current_user(&self) -> Option<Identity> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn sign_out(&self) {
        if let Some(identity) = self.current_user() {
            log::info!("signed out {}", identity.uid);
        }
        self.set_current(None);
    }
}

impl AccountService for LocalAccounts {
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email);
        let row: Option<(String, String)> = self
            .conn()?
            .query_row(
                "SELECT uid, password_hash FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (uid, stored_hash) =
            row.ok_or_else(|| ReaderError::Auth(format!("no account for {}", email)))?;
        if !verify_password(password, &stored_hash)? {
            return Err(ReaderError::Auth(format!("wrong password for {}", email)));
        }

        let identity = Identity { uid, email };
        self.set_current(Some(identity.clone()));
        log::info!("signed in {}", identity.uid);
        Ok(identity)
    }

    fn create_account(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(ReaderError::Auth(format!("badly formatted email {}", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ReaderError::Auth(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let uid = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(password)?;
        {
            let conn = self.conn()?;
            let exists: Option<String> = conn
                .query_row(
                    "SELECT uid FROM accounts WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                return Err(ReaderError::Auth(format!("{} is already registered", email)));
            }
            conn.execute(
                "INSERT INTO accounts (uid, email, password_hash) VALUES (?1, ?2, ?3)",
                params![uid, email, password_hash],
            )?;
        }

        let identity = Identity { uid, email };
        self.create_profile(&identity);
        self.set_current(Some(identity.clone()));
        log::info!("created account {}", identity.uid);
        Ok(identity)
    }
}

/// Sign-in and sign-up as driven by the login screen.
///
/// Unlike the update flow, failures here are shown to the user through the
/// `Notifier` in addition to being logged.
pub struct LoginFlow {
    accounts: Arc<dyn AccountService>,
    notifier: Arc<dyn Notifier>,
    loading: AtomicBool,
}

impl LoginFlow {
    pub fn new(accounts: Arc<dyn AccountService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            accounts,
            notifier,
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Option<Identity> {
        if !inputs_valid(email, password) {
            return None;
        }
        match self.accounts.sign_in(email, password) {
            Ok(identity) => Some(identity),
            Err(err) => {
                log::warn!("sign in failed: {}", err);
                self.notifier.show(WRONG_CREDENTIALS_MESSAGE);
                None
            }
        }
    }

    /// Ignored while a previous sign-up is still running.
    pub fn create_account(&self, email: &str, password: &str) -> Option<Identity> {
        if !inputs_valid(email, password) {
            return None;
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let result = self.accounts.create_account(email, password);
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(identity) => Some(identity),
            Err(err) => {
                log::warn!("account creation failed: {}", err);
                self.notifier.show(ACCOUNT_EXISTS_MESSAGE);
                None
            }
        }
    }
}

fn inputs_valid(email: &str, password: &str) -> bool {
    !email.trim().is_empty() && !password.trim().is_empty()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2id with a random salt, encoded as a PHC string so the parameters
/// and salt travel with the hash.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| ReaderError::Auth(format!("password hashing failed: {}", err)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| ReaderError::Auth(format!("stored password hash unreadable: {}", err)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(ReaderError::Auth(format!("password check failed: {}", err))),
    }
}
