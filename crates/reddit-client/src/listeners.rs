//! Token-change observers owned by a session

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Callback invoked with each newly obtained access token.
pub type TokenListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, TokenListener>,
}

/// Listeners in registration order.
///
/// Notification runs over a snapshot taken outside the lock, so callbacks may
/// register or remove listeners (themselves included). Such changes apply from
/// the next notification on.
#[derive(Default)]
pub(crate) struct TokenListeners {
    inner: Mutex<Registry>,
}

impl TokenListeners {
    pub(crate) fn add(&self, listener: TokenListener) -> ListenerId {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.insert(id, listener);
        id
    }

    /// Returns whether the listener was still registered.
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        registry.listeners.remove(&id).is_some()
    }

    pub(crate) fn notify(&self, access_token: &str) {
        let snapshot: Vec<TokenListener> = {
            let registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            registry.listeners.values().cloned().collect()
        };
        for listener in snapshot {
            listener(access_token);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }
}

impl std::fmt::Debug for TokenListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenListeners")
            .field("count", &self.len())
            .finish()
    }
}
