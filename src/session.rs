// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Ownership of the session state machine.
//!
//! [`SessionManager`] is the only writer of [`SessionState`]. Everyone else
//! (the route guard, commands) holds a watch subscription and reacts. All
//! transitions are coalesced through the watch channel's modify check, so a
//! burst of concurrent invalidations collapses into a single observable
//! logout.

use std::sync::Arc;

use log::{debug, warn};
use secrecy::SecretString;
use tokio::sync::watch;

use crate::{
    api::Backend,
    credential::{Credential, DEFAULT_TTL_DAYS},
    error::Result,
    gateway::InvalidationHook,
    model::Principal,
    storage::{self, Storage as _},
};

/// Where the client stands with the server.
///
/// `Unknown` exists only during the single rehydration attempt at process
/// start; once it resolves, the state never returns there. Whenever the
/// state is `Authenticated` the credential store holds a token, and whenever
/// the store is empty the state is `Anonymous`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionState {
    Unknown,
    Anonymous,
    Authenticated(Principal),
}

impl SessionState {
    pub(crate) const fn principal(&self) -> Option<&Principal> {
        match *self {
            Self::Authenticated(ref principal) => Some(principal),
            Self::Unknown | Self::Anonymous => None,
        }
    }
}

pub(crate) type StateSender = Arc<watch::Sender<SessionState>>;

/// Produce the callback the gateway fires after it clears a revoked
/// credential. Lives here so every session-state write stays in this module.
pub(crate) fn invalidation_hook(state: StateSender) -> InvalidationHook {
    Arc::new(move || {
        let changed = state.send_if_modified(|state| {
            if matches!(*state, SessionState::Anonymous) {
                // Another in-flight failure already logged us out.
                false
            } else {
                *state = SessionState::Anonymous;
                true
            }
        });
        if changed {
            warn!("The server no longer accepts the stored credential, so you have been logged out");
        }
    })
}

pub(crate) struct SessionManager {
    backend: Arc<dyn Backend>,
    storage: storage::Shared,
    state: StateSender,
}

impl SessionManager {
    /// Create the state channel ahead of the manager itself so the gateway's
    /// invalidation hook can be wired up before the backend exists.
    pub(crate) fn channel() -> (StateSender, watch::Receiver<SessionState>) {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        (Arc::new(tx), rx)
    }

    pub(crate) fn new(
        backend: Arc<dyn Backend>,
        storage: storage::Shared,
        state: StateSender,
    ) -> Self {
        Self {
            backend,
            storage,
            state,
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub(crate) fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn publish(&self, next: SessionState) {
        let _changed = self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next.clone();
                true
            }
        });
    }

    /// Re-establish a session from whatever credential survived the last
    /// process, called exactly once at startup. The state is guaranteed to
    /// have left `Unknown` by the time this returns, so route guards gated
    /// on a settled state can never race the answer.
    pub(crate) async fn rehydrate(&self) -> SessionState {
        let stored = {
            let mut storage = self.storage.lock().await;
            match storage.get().await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Could not read the stored credential, so starting anonymous: {e}");
                    if let Err(e) = storage.clear().await {
                        warn!("Could not remove the unreadable credential: {e}");
                    }
                    None
                }
            }
        };

        match stored {
            None => self.publish(SessionState::Anonymous),
            Some(_) => match self.backend.current_user().await {
                Ok(principal) => self.publish(SessionState::Authenticated(principal)),
                Err(e) => {
                    // Any rejection at all means the credential is not worth
                    // keeping; a dangling token with no session would violate
                    // the storage/state invariant.
                    debug!("Stored credential was not accepted ({e}), so starting anonymous");
                    let mut storage = self.storage.lock().await;
                    if let Err(e) = storage.clear().await {
                        warn!("Could not remove the rejected credential: {e}");
                    }
                    drop(storage);
                    self.publish(SessionState::Anonymous);
                }
            },
        }

        self.current()
    }

    /// The only path that establishes a session: the credential is written
    /// and the principal published together, so neither ever exists without
    /// the other.
    pub(crate) async fn login(&self, email: &str, password: &SecretString) -> Result<Principal> {
        let grant = self.backend.login(email, password).await?;

        {
            let mut storage = self.storage.lock().await;
            storage
                .update(&Credential::new(grant.token, DEFAULT_TTL_DAYS))
                .await?;
        }
        self.publish(SessionState::Authenticated(grant.user.clone()));

        Ok(grant.user)
    }

    /// Registration never authenticates: the new account still has to be
    /// approved, and the user logs in separately.
    pub(crate) async fn register(&self, email: &str, password: &SecretString) -> Result<Principal> {
        self.backend.register(email, password).await
    }

    pub(crate) async fn logout(&self) -> Result<()> {
        {
            let mut storage = self.storage.lock().await;
            storage.clear().await?;
        }
        self.publish(SessionState::Anonymous);
        Ok(())
    }

    /// Swap in a server-confirmed principal after a profile change, leaving
    /// the credential untouched. A no-op unless the session is still live,
    /// which keeps a slow profile response from resurrecting a session that
    /// was logged out underneath it.
    pub(crate) fn replace_principal(&self, principal: Principal) {
        let _changed = self.state.send_if_modified(|state| match *state {
            SessionState::Authenticated(ref mut current) if *current != principal => {
                *current = principal.clone();
                true
            }
            SessionState::Authenticated(_) | SessionState::Unknown | SessionState::Anonymous => {
                false
            }
        });
    }
}
