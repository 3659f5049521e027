// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_TTL_DAYS: i64 = 7;

/// The bearer credential proving a session to the portal.
///
/// The token is opaque to the client; only the server understands its
/// contents and its authoritative expiry. `expires_at` is the client-side
/// ceiling (default 7 days) after which the stored copy is discarded without
/// asking the server.
///
/// Trust boundary: the token is stored unencrypted. Its confidentiality
/// rests on the data directory's file permissions and on TLS in transit,
/// not on anything this type does.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Raw", into = "Raw")]
pub(crate) struct Credential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub(crate) fn new(token: String, ttl_days: i64) -> Self {
        Self {
            token: SecretString::new(token),
            expires_at: Utc::now() + Duration::days(ttl_days),
        }
    }

    pub(crate) fn token(&self) -> &SecretString {
        &self.token
    }

    pub(crate) fn expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Serialize, Deserialize)]
struct Raw {
    token: String,
    expires_at: DateTime<Utc>,
}

impl From<Credential> for Raw {
    fn from(value: Credential) -> Self {
        Self {
            token: value.token.expose_secret().clone(),
            expires_at: value.expires_at,
        }
    }
}

impl From<Raw> for Credential {
    fn from(value: Raw) -> Self {
        Self {
            token: SecretString::new(value.token),
            expires_at: value.expires_at,
        }
    }
}
