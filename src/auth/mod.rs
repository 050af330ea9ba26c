//! Authentication provider contract and a local, file-backed implementation.
//!
//! The hosted provider is consumed only through [`AuthProvider`]: sign-in,
//! sign-up, sign-out, the current session and change notifications.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BudgetError, Result};
use crate::utils::persistence::{load_json_or_default, save_json_atomic};

/// An authenticated user session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Session {
    /// Label for this session: the display name, else [`Session::email_name`].
    pub fn display_label(&self) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.email_name(),
        }
    }

    /// Local part of the email, or `User` when it is empty. Profiles
    /// provisioned on sign-in are named with it.
    pub fn email_name(&self) -> String {
        email_local_part(&self.email).unwrap_or("User").to_string()
    }
}

fn email_local_part(email: &str) -> Option<&str> {
    email
        .split('@')
        .next()
        .map(str::trim)
        .filter(|local| !local.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedUp,
    TokenRefreshed,
    SignedOut,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthEvent::SignedIn => "signed_in",
            AuthEvent::SignedUp => "signed_up",
            AuthEvent::TokenRefreshed => "token_refreshed",
            AuthEvent::SignedOut => "signed_out",
        };
        f.write_str(label)
    }
}

pub type AuthCallback = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session>;
    async fn sign_out(&self) -> Result<()>;
    async fn current_session(&self) -> Option<Session>;
    /// Registers `callback` for session changes until the returned handle is
    /// dropped or unsubscribed.
    fn subscribe(&self, callback: AuthCallback) -> Subscription;
}

type ListenerMap = Mutex<HashMap<u64, AuthCallback>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of session-change callbacks shared by provider implementations.
#[derive(Default)]
pub struct AuthListeners {
    next_id: Mutex<u64>,
    callbacks: Arc<ListenerMap>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: AuthCallback) -> Subscription {
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            *next
        };
        lock(&self.callbacks).insert(id, callback);
        Subscription {
            id,
            listeners: Arc::downgrade(&self.callbacks),
        }
    }

    pub fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<AuthCallback> = lock(&self.callbacks).values().cloned().collect();
        for callback in callbacks {
            callback(event, session);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.callbacks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for AuthListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthListeners")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by [`AuthProvider::subscribe`]; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).remove(&self.id);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user_id: Uuid,
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Account {
    fn session(&self) -> Session {
        Session {
            user_id: self.user_id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// In-process provider for tests and the CLI. Credentials are kept as given;
/// this is a development stand-in for the hosted service, not a secret store.
#[derive(Debug, Default)]
pub struct LocalAuthProvider {
    accounts: Mutex<BTreeMap<String, Account>>,
    session: Mutex<Option<Session>>,
    listeners: AuthListeners,
    path: Option<PathBuf>,
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads registered accounts from `path` and writes new ones back to it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stored = load_json_or_default::<Vec<Account>, BudgetError>(&path)?;
        let accounts = stored
            .into_iter()
            .map(|account| (normalize_email(&account.email), account))
            .collect();
        Ok(Self {
            accounts: Mutex::new(accounts),
            path: Some(path),
            ..Self::default()
        })
    }

    /// Re-announces the current session, as the hosted provider does when it
    /// rotates tokens.
    pub fn refresh(&self) -> Result<Session> {
        let session = lock(&self.session)
            .clone()
            .ok_or(BudgetError::Unauthenticated)?;
        self.listeners
            .notify(AuthEvent::TokenRefreshed, Some(&session));
        Ok(session)
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.path {
            let accounts: Vec<Account> = lock(&self.accounts).values().cloned().collect();
            save_json_atomic::<_, BudgetError>(&accounts, path)?;
        }
        Ok(())
    }

    fn start_session(&self, session: Session, event: AuthEvent) -> Session {
        *lock(&self.session) = Some(session.clone());
        tracing::info!(user_id = %session.user_id, %event, "auth session started");
        self.listeners.notify(event, Some(&session));
        session
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = {
            let accounts = lock(&self.accounts);
            match accounts.get(&normalize_email(email)) {
                Some(account) if account.password == password => account.session(),
                _ => return Err(BudgetError::Auth("Invalid login credentials".into())),
            }
        };
        Ok(self.start_session(session, AuthEvent::SignedIn))
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session> {
        let key = normalize_email(email);
        if key.is_empty() || !key.contains('@') {
            return Err(BudgetError::Auth("Unable to validate email address".into()));
        }
        let account = {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(&key) {
                return Err(BudgetError::Auth("User already registered".into()));
            }
            let display_name = Some(display_name.trim().to_string()).filter(|n| !n.is_empty());
            let account = Account {
                user_id: Uuid::new_v4(),
                email: email.trim().to_string(),
                password: password.to_string(),
                display_name,
            };
            accounts.insert(key, account.clone());
            account
        };
        self.persist()?;
        Ok(self.start_session(account.session(), AuthEvent::SignedUp))
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = lock(&self.session).take();
        if let Some(session) = previous {
            tracing::info!(user_id = %session.user_id, "auth session ended");
        }
        self.listeners.notify(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn current_session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    fn subscribe(&self, callback: AuthCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}
