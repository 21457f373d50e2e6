use oauth2::CsrfToken;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Upper bound on states issued within one TTL window.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Outstanding `state` values handed out with login URLs.
///
/// Each value is accepted once, and only within `ttl` of being issued.
pub struct StateStore {
    ttl: Duration,
    max_pending: usize,
    pending: Mutex<Pending>,
}

#[derive(Default)]
struct Pending {
    by_state: HashMap<String, Instant>,
    // Issue order; every entry shares one TTL so expired ones sit at the front.
    order: VecDeque<(Instant, String)>,
}

impl Pending {
    fn prune(&mut self, now: Instant, ttl: Duration) {
        while let Some(&(created, _)) = self.order.front() {
            if now.duration_since(created) < ttl {
                break;
            }
            if let Some((_, state)) = self.order.pop_front() {
                self.by_state.remove(&state);
            }
        }
    }
}

impl StateStore {
    pub fn new(ttl: time::Duration) -> Self {
        Self::with_limit(ttl, DEFAULT_MAX_PENDING)
    }

    pub fn with_limit(ttl: time::Duration, max_pending: usize) -> Self {
        Self {
            ttl: ttl.unsigned_abs(),
            max_pending,
            pending: Mutex::new(Pending::default()),
        }
    }

    /// Returns `None` when `max_pending` states were already issued inside the TTL window.
    pub fn issue(&self) -> Option<CsrfToken> {
        let now = Instant::now();
        let mut pending = self.lock();
        pending.prune(now, self.ttl);

        if pending.order.len() >= self.max_pending {
            return None;
        }

        let token = CsrfToken::new(Uuid::new_v4().to_string());
        pending.by_state.insert(token.secret().clone(), now);
        pending.order.push_back((now, token.secret().clone()));

        Some(token)
    }

    /// Removes `state`; true when it was issued here and has not expired.
    pub fn consume(&self, state: &str) -> bool {
        match self.lock().by_state.remove(state) {
            Some(created) => created.elapsed() < self.ttl,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().by_state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
