// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::Backend,
    error::Result,
    guard::{Destination, Resolution, RouteGuard},
    policy,
    session::SessionManager,
};

pub(crate) mod admin;
pub(crate) mod browse;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod profile;
pub(crate) mod register;
pub(crate) mod share;
pub(crate) mod status;

pub(crate) struct Context {
    pub(crate) session: SessionManager,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) guard: RouteGuard,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: Context) -> Result<()>;
}

pub(crate) fn password_from(flag: Option<String>, prompt: &str) -> Result<secrecy::SecretString> {
    match flag {
        Some(password) => Ok(secrecy::SecretString::new(password)),
        None => Ok(secrecy::SecretString::new(rpassword::prompt_password(
            prompt,
        )?)),
    }
}

/// If a navigation did not land where it was aimed, say why. Returns `None`
/// when the caller reached its page and should render content.
pub(crate) fn explain_detour(requested: &str, resolution: &Resolution) -> Option<String> {
    match resolution.destination {
        Destination::Page(ref route) if route.path == requested => None,
        Destination::Page(ref route) if route.path == policy::LOGIN_PATH => {
            let mut message = resolution
                .reason()
                .unwrap_or("Please log in to continue.")
                .to_owned();
            if let Some(return_path) = resolution.return_path() {
                message.push_str(&format!(
                    "\nAfter logging in you will be returned to {return_path}."
                ));
            }
            Some(message)
        }
        Destination::Page(ref route) if route.path == policy::PENDING_PATH => Some(
            "Your account is pending admin approval. You'll be able to access \
             all videos once approved; this can take up to 24 hours."
                .to_owned(),
        ),
        Destination::Page(ref route) => Some(format!("Redirected to {}.", route.path)),
        Destination::PendingNotice(_) => Some(
            "This shared link is valid, but your account is still awaiting \
             approval. Come back once an administrator has approved you."
                .to_owned(),
        ),
        Destination::NotFound(ref path) => Some(format!(
            "There is no page at {path}. The link may be invalid or the \
             content may have been removed."
        )),
    }
}
