//! Principal identity and scoped elevation.
//!
//! Some checks must run as the system principal, e.g. reading the owner of
//! a node the caller cannot otherwise see. Elevation is scoped: the
//! identity is pushed when an [`ElevationGuard`] is created and popped when
//! it is dropped, so it is restored on every exit path, including early
//! returns through `?` and unwinding panics.

use std::thread::{self, ThreadId};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::error::{RepositoryError, Result};

/// The identity of the principal on whose behalf evaluation runs.
pub trait IdentityContext: Send + Sync {
    /// The effective principal, `None` when unauthenticated.
    fn current_user(&self) -> Option<String>;

    /// Make `principal` the effective principal.
    fn push(&self, principal: &str);

    /// Restore the previous effective principal.
    fn pop(&self) -> Result<()>;

    /// Name of the system principal.
    fn system_user(&self) -> &str;

    /// Whether the effective principal is the system principal.
    fn is_system_user(&self) -> bool {
        self.current_user().as_deref() == Some(self.system_user())
    }
}

/// Restores the previous identity when dropped.
pub struct ElevationGuard<'a> {
    context: &'a dyn IdentityContext,
}

impl<'a> ElevationGuard<'a> {
    /// Push `principal` onto `context` until the guard is dropped.
    pub fn push(context: &'a dyn IdentityContext, principal: &str) -> Self {
        trace!(principal, "Elevating identity");
        context.push(principal);
        Self { context }
    }
}

impl Drop for ElevationGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.context.pop() {
            warn!("Failed to restore identity after elevation: {}", e);
        }
    }
}

/// Run `f` as `principal`.
pub fn run_as<T, F>(context: &dyn IdentityContext, principal: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _guard = ElevationGuard::push(context, principal);
    f()
}

/// Run `f` as the system principal.
pub fn run_as_system<T, F>(context: &dyn IdentityContext, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let system = context.system_user().to_string();
    run_as(context, &system, f)
}

/// A stack of principals per thread.
///
/// The bottom entry is the authenticated user, shared by every thread using
/// the stack. Elevations are pushed above it and are only seen by the thread
/// that pushed them. Popping the authenticated user is an error.
pub struct AuthenticationStack {
    user: RwLock<Option<String>>,
    elevated: DashMap<ThreadId, Vec<String>>,
    system_user: String,
}

impl AuthenticationStack {
    /// An unauthenticated stack.
    pub fn new(system_user: impl Into<String>) -> Self {
        Self {
            user: RwLock::new(None),
            elevated: DashMap::new(),
            system_user: system_user.into(),
        }
    }

    /// A stack authenticated as `user`.
    pub fn authenticated(system_user: impl Into<String>, user: impl Into<String>) -> Self {
        let stack = Self::new(system_user);
        stack.set_user(user);
        stack
    }

    /// Make `user` the authenticated user and drop the calling thread's
    /// elevations.
    pub fn set_user(&self, user: impl Into<String>) {
        self.elevated.remove(&thread::current().id());
        *self.user.write() = Some(user.into());
    }

    /// Number of identities on the calling thread's stack.
    pub fn depth(&self) -> usize {
        let elevated = self
            .elevated
            .get(&thread::current().id())
            .map_or(0, |frames| frames.len());
        usize::from(self.user.read().is_some()) + elevated
    }
}

impl IdentityContext for AuthenticationStack {
    fn current_user(&self) -> Option<String> {
        if let Some(frames) = self.elevated.get(&thread::current().id()) {
            if let Some(principal) = frames.last() {
                return Some(principal.clone());
            }
        }
        self.user.read().clone()
    }

    fn push(&self, principal: &str) {
        self.elevated
            .entry(thread::current().id())
            .or_default()
            .push(principal.to_string());
    }

    fn pop(&self) -> Result<()> {
        let id = thread::current().id();
        let popped = match self.elevated.get_mut(&id) {
            Some(mut frames) => frames.pop().is_some(),
            None => false,
        };
        self.elevated.remove_if(&id, |_, frames| frames.is_empty());
        if popped {
            Ok(())
        } else {
            Err(RepositoryError::IdentityUnderflow.into())
        }
    }

    fn system_user(&self) -> &str {
        &self.system_user
    }
}
