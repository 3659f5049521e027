// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Applies the access policy at every navigation boundary.
//!
//! The guard never finalizes a decision while the session is still
//! rehydrating, and it follows redirects internally, so the caller only ever
//! sees the settled destination (the redirect trail replaces itself rather
//! than stacking like pushed history). Share links get their own branch: an
//! account that exists but is still awaiting approval is shown an explicit
//! pending notice instead of being bounced away, so the link still reads as
//! valid to its recipient.

use log::debug;
use tokio::sync::watch;

use crate::{
    error::{self, Result},
    policy::{self, Redirect, Requirement, Route, Verdict},
    session::SessionState,
};

// Deepest legitimate trail is two hops (e.g. "/" -> "/browse" ->
// "/pending-approval"); anything past this is a cycle in the route table.
const MAX_HOPS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Destination {
    /// Render the page at this route.
    Page(Route),
    /// The shared video exists behind this route, but the account is still
    /// awaiting approval; show the interstitial, do not redirect.
    PendingNotice(Route),
    /// No such route.
    NotFound(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub(crate) destination: Destination,
    /// The redirects that were followed to get here, oldest first.
    pub(crate) hops: Vec<Redirect>,
}

impl Resolution {
    /// The originally requested path to return to after logging in, if any
    /// hop recorded one.
    pub(crate) fn return_path(&self) -> Option<&str> {
        self.hops.iter().find_map(|hop| hop.from.as_deref())
    }

    pub(crate) fn reason(&self) -> Option<&str> {
        self.hops.iter().find_map(|hop| hop.reason.as_deref())
    }
}

pub(crate) struct RouteGuard {
    session: watch::Receiver<SessionState>,
}

impl RouteGuard {
    pub(crate) fn new(session: watch::Receiver<SessionState>) -> Self {
        Self { session }
    }

    /// Wait until rehydration has produced a real answer. If the session
    /// channel is gone we fail closed and treat the caller as anonymous.
    pub(crate) async fn settled(&mut self) -> SessionState {
        match self
            .session
            .wait_for(|state| !matches!(*state, SessionState::Unknown))
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => SessionState::Anonymous,
        }
    }

    /// Resolve a navigation to its final destination, following redirects.
    pub(crate) async fn resolve(&mut self, path: &str) -> Result<Resolution> {
        let mut hops = Vec::new();
        let mut current = path.to_owned();

        loop {
            if hops.len() > MAX_HOPS {
                return Err(error::Navigation::RedirectLoop(path.to_owned(), MAX_HOPS).into());
            }

            let state = self.settled().await;
            let Some(route) = policy::route_for(&current) else {
                return Ok(Resolution {
                    destination: Destination::NotFound(current),
                    hops,
                });
            };

            match policy::evaluate(&state, &route) {
                // The state moved on between settling and evaluating; settle
                // again. (It can only ever leave Unknown, never re-enter it.)
                Verdict::Hold => continue,
                Verdict::Allow => {
                    return Ok(Resolution {
                        destination: Destination::Page(route),
                        hops,
                    })
                }
                Verdict::Redirect(redirect) => {
                    if route.requirement == Requirement::SharedVideo
                        && redirect.to == policy::PENDING_PATH
                    {
                        return Ok(Resolution {
                            destination: Destination::PendingNotice(route),
                            hops,
                        });
                    }

                    debug!(r#"Navigation "{current}" redirects to "{}""#, redirect.to);
                    current.clone_from(&redirect.to);
                    hops.push(redirect);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::watch;

    use crate::model::Principal;

    use super::*;

    fn principal(is_admin: bool, is_approved: bool) -> Principal {
        Principal {
            id: "u1".to_owned(),
            email: "a@b.com".to_owned(),
            phone_number: None,
            is_approved,
            is_admin,
            created_at: None,
        }
    }

    fn guard_with(state: SessionState) -> RouteGuard {
        let (tx, rx) = watch::channel(state);
        // Keep the sender alive for the duration of the guard.
        std::mem::forget(tx);
        RouteGuard::new(rx)
    }

    fn page_path(resolution: &Resolution) -> &str {
        match resolution.destination {
            Destination::Page(ref route) => &route.path,
            ref other => panic!("expected a page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_decision_is_made_while_rehydrating() {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        let mut guard = RouteGuard::new(rx);

        let resolution = tokio::time::timeout(Duration::from_millis(50), async {
            let pending = guard.resolve("/browse");
            tokio::pin!(pending);

            // The guard must hold rather than settle on either extreme.
            assert!(tokio::time::timeout(Duration::from_millis(10), &mut pending)
                .await
                .is_err());

            tx.send(SessionState::Authenticated(principal(false, true)))
                .unwrap();
            pending.await
        })
        .await
        .expect("guard never settled after rehydration")
        .unwrap();

        assert_eq!(page_path(&resolution), "/browse");
    }

    #[tokio::test]
    async fn anonymous_protected_navigation_lands_on_login_with_return_path() {
        let mut guard = guard_with(SessionState::Anonymous);

        let resolution = guard.resolve("/admin").await.unwrap();
        assert_eq!(page_path(&resolution), policy::LOGIN_PATH);
        assert_eq!(resolution.return_path(), Some("/admin"));
    }

    #[tokio::test]
    async fn unapproved_login_then_browse_parks_on_pending() {
        // Mirrors logging in with an unapproved account: the very next
        // navigation to /browse must end on the pending page, never on video
        // content.
        let mut guard = guard_with(SessionState::Authenticated(principal(false, false)));

        let resolution = guard.resolve("/browse").await.unwrap();
        assert_eq!(page_path(&resolution), policy::PENDING_PATH);
        assert_eq!(resolution.hops.len(), 1);
    }

    #[tokio::test]
    async fn share_link_while_anonymous_round_trips_through_login() {
        let mut guard = guard_with(SessionState::Anonymous);

        let resolution = guard.resolve("/share/tok123").await.unwrap();
        assert_eq!(page_path(&resolution), policy::LOGIN_PATH);
        assert_eq!(resolution.return_path(), Some("/share/tok123"));
        assert_eq!(
            resolution.reason(),
            Some("Please log in to view this shared video.")
        );

        // After the login succeeds, re-resolving the carried path lands on
        // the share itself.
        let return_path = resolution.return_path().unwrap().to_owned();
        let mut guard = guard_with(SessionState::Authenticated(principal(false, true)));
        let resolution = guard.resolve(&return_path).await.unwrap();
        assert_eq!(page_path(&resolution), "/share/tok123");
    }

    #[tokio::test]
    async fn share_link_while_pending_shows_the_notice_in_place() {
        let mut guard = guard_with(SessionState::Authenticated(principal(false, false)));

        let resolution = guard.resolve("/share/tok123").await.unwrap();
        match resolution.destination {
            Destination::PendingNotice(ref route) => assert_eq!(route.path, "/share/tok123"),
            ref other => panic!("expected the pending notice, got {other:?}"),
        }
        assert!(resolution.hops.is_empty());
    }

    #[tokio::test]
    async fn authenticated_login_navigation_forwards_to_landing() {
        let mut guard = guard_with(SessionState::Authenticated(principal(false, true)));

        let resolution = guard.resolve(policy::LOGIN_PATH).await.unwrap();
        assert_eq!(page_path(&resolution), policy::DEFAULT_LANDING);
    }

    #[tokio::test]
    async fn unknown_path_is_reported_not_chased() {
        let mut guard = guard_with(SessionState::Anonymous);

        let resolution = guard.resolve("/nope").await.unwrap();
        assert_eq!(
            resolution.destination,
            Destination::NotFound("/nope".to_owned())
        );
    }
}
