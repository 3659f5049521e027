// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// The server-issued identity record for the logged-in account.
///
/// A principal is only ever replaced wholesale with what the server returned.
/// Local edits (say, a new phone number) go to the server first and the
/// confirmed record is swapped in afterward, so the client never drifts from
/// server truth.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct Principal {
    pub(crate) id: String,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) phone_number: Option<String>,
    #[serde(default)]
    pub(crate) is_approved: bool,
    #[serde(default)]
    pub(crate) is_admin: bool,
    #[serde(default)]
    pub(crate) created_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Administrators bypass the approval gate for navigation purposes even
    /// when their own approval flag was never set.
    pub(crate) const fn can_view_content(&self) -> bool {
        self.is_admin || self.is_approved
    }

    /// A profile is complete once a phone number is on file. This is a
    /// precondition for requesting approval, not for general navigation.
    pub(crate) fn profile_complete(&self) -> bool {
        self.phone_number.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    #[serde(serialize_with = "expose")]
    pub(crate) password: &'a SecretString,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub(crate) email: &'a str,
    #[serde(serialize_with = "expose")]
    pub(crate) password: &'a SecretString,
}

fn expose<S: serde::Serializer>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret())
}

/// What a successful login hands back: the bearer token together with the
/// principal it is scoped to. The two always travel as a pair.
#[derive(Clone, Deserialize)]
pub(crate) struct LoginGrant {
    pub(crate) token: String,
    pub(crate) user: Principal,
}

#[derive(Serialize)]
pub(crate) struct ProfileUpdate<'a> {
    pub(crate) phone_number: &'a str,
}

fn display_option(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Clone, Debug, Deserialize, Tabled)]
pub(crate) struct Album {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Description", display_with = "display_option")]
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[tabled(rename = "Videos")]
    #[serde(default)]
    pub(crate) video_count: u32,
}

#[derive(Clone, Debug, Deserialize, Tabled)]
pub(crate) struct Video {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Description", display_with = "display_option")]
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[tabled(rename = "URL")]
    pub(crate) url: String,
    #[tabled(skip)]
    #[serde(default)]
    pub(crate) share_token: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Tabled)]
pub(crate) struct PendingUser {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Email")]
    pub(crate) email: String,
    #[tabled(rename = "Phone", display_with = "display_option")]
    #[serde(default)]
    pub(crate) phone_number: Option<String>,
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn admin_implies_viewable_content() {
        assert!(principal(true, false).can_view_content());
        assert!(principal(false, true).can_view_content());
        assert!(!principal(false, false).can_view_content());
    }

    #[test]
    fn principal_decodes_snake_case_wire_names() {
        let p: Principal = serde_json::from_str(
            r#"{"id":"1","email":"a@b.com","is_admin":true,"is_approved":false,"phone_number":null}"#,
        )
        .unwrap();
        assert!(p.is_admin);
        assert!(!p.is_approved);
        assert!(!p.profile_complete());
    }

    #[test]
    fn login_request_serializes_password_value() {
        let req = LoginRequest {
            email: "a@b.com",
            password: &SecretString::new("x".to_owned()),
        };
        let encoded = serde_json::to_value(&req).unwrap();
        assert_eq!(encoded["password"], "x");
    }
}
