//! Explicit application state: the auth session, onboarding flags, expense
//! caches and stale-response tracking.
//!
//! One [`AppState`] is created at start-up and passed by reference to whoever
//! needs it. Writes are last-write-wins.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::auth::Session;
use crate::config::DEFAULT_RECENT_EXPENSE_LIMIT;
use crate::core::timeframe::Timeframe;
use crate::domain::ExpenseView;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Top-level destinations the routing rule can send a user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    Main,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub is_onboarded: bool,
    pub is_setting_up: bool,
}

impl AuthState {
    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.user_id)
    }

    /// Where the user should be sent, if anywhere. Nothing is decided while
    /// the session is loading or the account is still being set up.
    pub fn redirect(&self, is_loading: bool) -> Option<Route> {
        if is_loading || self.is_setting_up {
            return None;
        }
        match self.session {
            None => Some(Route::Auth),
            Some(_) => Some(Route::Main),
        }
    }
}

/// Cached expense lists for the dashboard, history and insights views.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCache {
    pub expenses: Vec<ExpenseView>,
    pub recent: Vec<ExpenseView>,
    pub timeframe_expenses: Vec<ExpenseView>,
    pub timeframe: Timeframe,
    recent_limit: usize,
}

impl Default for ExpenseCache {
    fn default() -> Self {
        Self::with_recent_limit(DEFAULT_RECENT_EXPENSE_LIMIT)
    }
}

impl ExpenseCache {
    pub fn with_recent_limit(recent_limit: usize) -> Self {
        Self {
            expenses: Vec::new(),
            recent: Vec::new(),
            timeframe_expenses: Vec::new(),
            timeframe: Timeframe::default(),
            recent_limit: recent_limit.max(1),
        }
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    /// Prepends a freshly created expense to every list.
    pub fn add(&mut self, expense: ExpenseView) {
        self.expenses.insert(0, expense.clone());
        self.timeframe_expenses.insert(0, expense.clone());
        self.recent.insert(0, expense);
        self.recent.truncate(self.recent_limit);
    }

    pub fn set_expenses(&mut self, expenses: Vec<ExpenseView>) {
        self.expenses = expenses;
    }

    pub fn set_recent(&mut self, mut expenses: Vec<ExpenseView>) {
        expenses.truncate(self.recent_limit);
        self.recent = expenses;
    }

    pub fn set_timeframe_expenses(&mut self, timeframe: Timeframe, expenses: Vec<ExpenseView>) {
        self.timeframe = timeframe;
        self.timeframe_expenses = expenses;
    }

    /// Drops a deleted expense from every list.
    pub fn remove(&mut self, id: Uuid) {
        self.expenses.retain(|e| e.id != id);
        self.recent.retain(|e| e.id != id);
        self.timeframe_expenses.retain(|e| e.id != id);
    }

    pub fn clear(&mut self) {
        *self = Self::with_recent_limit(self.recent_limit);
    }
}

/// Views that issue asynchronous loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Expenses,
    Insights,
    Categories,
    Recurring,
    Settings,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            View::Dashboard => "dashboard",
            View::Expenses => "expenses",
            View::Insights => "insights",
            View::Categories => "categories",
            View::Recurring => "recurring",
            View::Settings => "settings",
        };
        f.write_str(label)
    }
}

/// Identifies one in-flight load for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub view: View,
    generation: u64,
}

/// Hands out per-view tickets so only the newest response is applied.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generations: Mutex<HashMap<View, u64>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load for `view`, superseding any outstanding one.
    pub fn issue(&self, view: View) -> RequestTicket {
        let mut generations = lock(&self.generations);
        let generation = generations.entry(view).or_insert(0);
        *generation += 1;
        RequestTicket {
            view,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        lock(&self.generations).get(&ticket.view).copied() == Some(ticket.generation)
    }

    /// Invalidates every outstanding ticket for `view`, e.g. when it unmounts.
    pub fn retire(&self, view: View) {
        let mut generations = lock(&self.generations);
        *generations.entry(view).or_insert(0) += 1;
    }
}

/// Shared container for everything the client keeps between calls.
#[derive(Debug, Default)]
pub struct AppState {
    auth: Mutex<AuthState>,
    expenses: Mutex<ExpenseCache>,
    requests: RequestTracker,
}

impl AppState {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            expenses: Mutex::new(ExpenseCache::with_recent_limit(recent_limit)),
            ..Self::default()
        }
    }

    pub fn auth(&self) -> AuthState {
        lock(&self.auth).clone()
    }

    pub fn set_session(&self, session: Option<Session>) {
        lock(&self.auth).session = session;
    }

    pub fn set_onboarded(&self, onboarded: bool) {
        lock(&self.auth).is_onboarded = onboarded;
    }

    fn set_setting_up(&self, setting_up: bool) {
        lock(&self.auth).is_setting_up = setting_up;
    }

    /// Marks the account as being set up until the guard is dropped.
    pub fn begin_setup(&self) -> SetupGuard<'_> {
        self.set_setting_up(true);
        SetupGuard { state: self }
    }

    pub fn expenses(&self) -> ExpenseCache {
        lock(&self.expenses).clone()
    }

    pub fn update_expenses<R>(&self, f: impl FnOnce(&mut ExpenseCache) -> R) -> R {
        f(&mut lock(&self.expenses))
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Applies `f` only if `ticket` is still the newest load for its view.
    pub fn apply_if_current(
        &self,
        ticket: &RequestTicket,
        f: impl FnOnce(&mut ExpenseCache),
    ) -> bool {
        if !self.requests.is_current(ticket) {
            tracing::warn!(view = %ticket.view, "discarding stale response");
            return false;
        }
        self.update_expenses(f);
        true
    }

    /// Forgets the session and every cached row.
    pub fn clear(&self) {
        *lock(&self.auth) = AuthState::default();
        lock(&self.expenses).clear();
    }
}

/// Clears `is_setting_up` when dropped, on every exit path.
#[must_use = "the setting-up flag is cleared as soon as the guard is dropped"]
pub struct SetupGuard<'a> {
    state: &'a AppState,
}

impl Drop for SetupGuard<'_> {
    fn drop(&mut self) {
        self.state.set_setting_up(false);
    }
}
