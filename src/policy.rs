// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The access decision table.
//!
//! Everything the portal believes about who may go where lives in
//! [`evaluate`], and nowhere else: approval gating, the admin bypass, and
//! bouncing logged-in users off the entry pages. The function is pure; it
//! never performs I/O and never mutates session state.

use crate::session::SessionState;

pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const SIGNUP_PATH: &str = "/signup";
pub(crate) const DEFAULT_LANDING: &str = "/browse";
pub(crate) const PROFILE_PATH: &str = "/profile";
pub(crate) const PENDING_PATH: &str = "/pending-approval";
pub(crate) const ADMIN_PATH: &str = "/admin";
pub(crate) const SHARE_PREFIX: &str = "/share/";

/// What a destination demands of the session before it will render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// Login and signup: reachable anonymously, but bounce an authenticated
    /// principal to the landing page instead of showing them a login form.
    Entry,
    /// The bare root, which only ever forwards somewhere else.
    Landing,
    /// Requires an authenticated principal that is approved (or admin).
    Protected,
    /// Requires `is_admin`.
    Admin,
    /// A share link: authenticated and approved, but with its own friendlier
    /// handling of the pending state so the link still feels valid.
    SharedVideo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Route {
    pub(crate) path: String,
    pub(crate) requirement: Requirement,
}

/// Map a navigation path onto the route table. Unknown paths are nobody's
/// business to redirect; the guard reports them as not found.
pub(crate) fn route_for(path: &str) -> Option<Route> {
    let requirement = match path {
        "/" => Requirement::Landing,
        LOGIN_PATH | SIGNUP_PATH => Requirement::Entry,
        DEFAULT_LANDING | PROFILE_PATH | PENDING_PATH => Requirement::Protected,
        ADMIN_PATH => Requirement::Admin,
        p if p.strip_prefix(SHARE_PREFIX).is_some_and(|t| !t.is_empty()) => {
            Requirement::SharedVideo
        }
        _ => return None,
    };

    Some(Route {
        path: path.to_owned(),
        requirement,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Redirect {
    pub(crate) to: String,
    /// The originally requested path, carried so the user can be sent back
    /// there after logging in.
    pub(crate) from: Option<String>,
    pub(crate) reason: Option<String>,
}

impl Redirect {
    fn to(path: &str) -> Self {
        Self {
            to: path.to_owned(),
            from: None,
            reason: None,
        }
    }

    fn to_login(from: &str, reason: &str) -> Self {
        Self {
            to: LOGIN_PATH.to_owned(),
            from: Some(from.to_owned()),
            reason: Some(reason.to_owned()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Session state is still rehydrating. Render nothing and do not
    /// redirect; a verdict will follow.
    Hold,
    Allow,
    Redirect(Redirect),
}

pub(crate) fn evaluate(state: &SessionState, route: &Route) -> Verdict {
    let principal = match *state {
        SessionState::Unknown => return Verdict::Hold,
        SessionState::Anonymous => {
            return match route.requirement {
                Requirement::Entry => Verdict::Allow,
                Requirement::Landing => Verdict::Redirect(Redirect::to(LOGIN_PATH)),
                Requirement::Protected | Requirement::Admin => Verdict::Redirect(
                    Redirect::to_login(&route.path, "Please log in to continue."),
                ),
                Requirement::SharedVideo => Verdict::Redirect(Redirect::to_login(
                    &route.path,
                    "Please log in to view this shared video.",
                )),
            }
        }
        SessionState::Authenticated(ref principal) => principal,
    };

    match route.requirement {
        Requirement::Entry | Requirement::Landing => {
            Verdict::Redirect(Redirect::to(DEFAULT_LANDING))
        }
        Requirement::Admin if !principal.is_admin => {
            Verdict::Redirect(Redirect::to(DEFAULT_LANDING))
        }
        Requirement::Protected | Requirement::SharedVideo | Requirement::Admin => {
            // Admins are implicitly approved for routing purposes, so this
            // must stay an explicit is_admin-or-is_approved check.
            if !principal.can_view_content() && route.path != PENDING_PATH {
                Verdict::Redirect(Redirect::to(PENDING_PATH))
            } else {
                Verdict::Allow
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Principal;

    use super::*;

    fn authenticated(is_admin: bool, is_approved: bool) -> SessionState {
        SessionState::Authenticated(Principal {
            id: "u1".to_owned(),
            email: "a@b.com".to_owned(),
            phone_number: None,
            is_approved,
            is_admin,
            created_at: None,
        })
    }

    fn route(path: &str) -> Route {
        route_for(path).unwrap()
    }

    #[test]
    fn unknown_state_holds_everything() {
        for path in ["/", LOGIN_PATH, DEFAULT_LANDING, ADMIN_PATH, "/share/abc"] {
            assert_eq!(evaluate(&SessionState::Unknown, &route(path)), Verdict::Hold);
        }
    }

    #[test]
    fn anonymous_may_visit_entry_pages() {
        assert_eq!(
            evaluate(&SessionState::Anonymous, &route(LOGIN_PATH)),
            Verdict::Allow
        );
        assert_eq!(
            evaluate(&SessionState::Anonymous, &route(SIGNUP_PATH)),
            Verdict::Allow
        );
    }

    #[test]
    fn anonymous_on_admin_is_sent_to_login_with_return_path() {
        match evaluate(&SessionState::Anonymous, &route(ADMIN_PATH)) {
            Verdict::Redirect(redirect) => {
                assert_eq!(redirect.to, LOGIN_PATH);
                assert_eq!(redirect.from.as_deref(), Some(ADMIN_PATH));
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn anonymous_share_visit_carries_the_share_path_and_a_reason() {
        match evaluate(&SessionState::Anonymous, &route("/share/tok123")) {
            Verdict::Redirect(redirect) => {
                assert_eq!(redirect.to, LOGIN_PATH);
                assert_eq!(redirect.from.as_deref(), Some("/share/tok123"));
                assert_eq!(
                    redirect.reason.as_deref(),
                    Some("Please log in to view this shared video.")
                );
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn authenticated_never_sees_the_login_form() {
        for path in [LOGIN_PATH, SIGNUP_PATH, "/"] {
            match evaluate(&authenticated(false, true), &route(path)) {
                Verdict::Redirect(redirect) => assert_eq!(redirect.to, DEFAULT_LANDING),
                other => panic!("unexpected verdict for {path}: {other:?}"),
            }
        }
    }

    #[test]
    fn unapproved_non_admin_is_parked_on_the_pending_page() {
        match evaluate(&authenticated(false, false), &route(DEFAULT_LANDING)) {
            Verdict::Redirect(redirect) => assert_eq!(redirect.to, PENDING_PATH),
            other => panic!("unexpected verdict: {other:?}"),
        }

        // The pending page itself must stay reachable or the redirect would
        // chase its own tail.
        assert_eq!(
            evaluate(&authenticated(false, false), &route(PENDING_PATH)),
            Verdict::Allow
        );
    }

    #[test]
    fn admin_bypasses_the_approval_gate() {
        assert_eq!(
            evaluate(&authenticated(true, false), &route(DEFAULT_LANDING)),
            Verdict::Allow
        );
        assert_eq!(
            evaluate(&authenticated(true, false), &route(ADMIN_PATH)),
            Verdict::Allow
        );
    }

    #[test]
    fn non_admin_is_bounced_off_the_admin_page_without_losing_the_session() {
        match evaluate(&authenticated(false, true), &route(ADMIN_PATH)) {
            Verdict::Redirect(redirect) => assert_eq!(redirect.to, DEFAULT_LANDING),
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn approved_user_reaches_protected_pages() {
        for path in [DEFAULT_LANDING, PROFILE_PATH, "/share/tok123"] {
            assert_eq!(
                evaluate(&authenticated(false, true), &route(path)),
                Verdict::Allow,
                "path {path}"
            );
        }
    }

    #[test]
    fn unknown_paths_have_no_route() {
        assert!(route_for("/definitely-not-a-page").is_none());
        assert!(route_for("/share/").is_none());
    }

    #[test]
    fn landing_forwards_by_session() {
        match evaluate(&SessionState::Anonymous, &route("/")) {
            Verdict::Redirect(redirect) => assert_eq!(redirect.to, LOGIN_PATH),
            other => panic!("unexpected verdict: {other:?}"),
        }
        match evaluate(&authenticated(false, true), &route("/")) {
            Verdict::Redirect(redirect) => assert_eq!(redirect.to, DEFAULT_LANDING),
            other => panic!("unexpected verdict: {other:?}"),
        }
    }
}
