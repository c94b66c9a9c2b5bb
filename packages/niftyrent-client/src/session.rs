//! Account-scoped loads.
//!
//! Switching account cancels every load started for the previous account and
//! bumps the generation, so a late result can never land on the new account.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle for loads started under one account.
#[derive(Debug, Clone)]
pub struct Scope {
    generation: u64,
    account_id: String,
    cancel: CancellationToken,
}

impl Scope {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct Session {
    generation: AtomicU64,
    current: Mutex<Scope>,
}

impl Session {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            generation: AtomicU64::new(0),
            current: Mutex::new(Scope {
                generation: 0,
                account_id: account_id.into(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn current(&self) -> Scope {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Cancel the previous account's loads and open a new scope.
    pub fn switch_account(&self, account_id: impl Into<String>) -> Scope {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.cancel.cancel();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *current = Scope {
            generation,
            account_id: account_id.into(),
            cancel: CancellationToken::new(),
        };
        info!(account = %current.account_id, generation, "Switched account");
        current.clone()
    }

    pub fn is_current(&self, scope: &Scope) -> bool {
        self.generation.load(Ordering::Acquire) == scope.generation
    }

    /// Run `load` unless the scope is cancelled first.
    pub async fn run<T, F>(&self, scope: &Scope, load: F) -> Result<T, crate::Error>
    where
        F: Future<Output = Result<T, crate::Error>>,
    {
        tokio::select! {
            biased;
            _ = scope.cancel.cancelled() => Err(crate::Error::Cancelled),
            result = load => result,
        }
    }

    /// Hand back `value` only if `scope` is still the active one.
    pub fn commit<T>(&self, scope: &Scope, value: T) -> Option<T> {
        if self.is_current(scope) {
            Some(value)
        } else {
            debug!(
                account = %scope.account_id,
                generation = scope.generation,
                "Discarding result for stale account"
            );
            None
        }
    }
}
