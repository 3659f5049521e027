// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL format error: {0}")]
    Url(#[from] url::ParseError),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("API error: {0}")]
    Api(#[from] Api),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("navigation error: {0}")]
    Navigation(#[from] Navigation),
    #[error("command execution failed")]
    Command,
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

/// Failures reported by the portal API, classified by what they mean for the
/// session: only `AuthRejected` and `SessionExpired` ever touch session state.
/// Everything else stays local to the operation that triggered it.
#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("the server rejected the supplied email address or password")]
    AuthRejected,
    #[error("the stored session is no longer valid, so you need to log in again")]
    SessionExpired,
    #[error("the server refused this operation: {0}")]
    Forbidden(String),
    #[error("the requested resource does not exist on the server")]
    NotFound,
    #[error("the server could not process the request (status {0}); retrying may help")]
    Upstream(reqwest::StatusCode),
}

impl Api {
    /// Whether this failure invalidates the session held by the client.
    pub(crate) const fn invalidates_session(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

#[derive(Error, Debug)]
pub(crate) enum Storage {
    #[error("stored credential data is malformed: {0}")]
    Corrupt(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Navigation {
    #[error(r#"navigating to "{}" produced more than {} redirects without settling"#, .0.escape_default(), .1)]
    RedirectLoop(String, usize),
}
