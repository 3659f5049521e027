// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{
    error::Result,
    guard::Destination,
    policy,
    session::SessionState,
};

/// Log in to the portal and store the session for later commands.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address of the account.
    #[clap()]
    email: String,

    /// The account password. Prompted for interactively when omitted.
    #[clap(short, long)]
    password: Option<String>,

    /// A path to continue to after logging in, e.g. a shared video link
    /// carried over from an earlier redirect.
    #[clap(long)]
    next: Option<String>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        // The login page bounces anyone who already has a session.
        let entry = ctx.guard.resolve(policy::LOGIN_PATH).await?;
        if !matches!(
            entry.destination,
            Destination::Page(ref route) if route.path == policy::LOGIN_PATH
        ) {
            if let SessionState::Authenticated(principal) = ctx.session.current() {
                println!("You are already logged in as {}.", principal.email);
            }
            return Ok(());
        }

        let password = super::password_from(self.password, "Password: ")?;
        let principal = ctx.session.login(&self.email, &password).await?;
        println!("Logged in as {}.", principal.email);

        let next = self
            .next
            .unwrap_or_else(|| policy::DEFAULT_LANDING.to_owned());
        let resolution = ctx.guard.resolve(&next).await?;
        match super::explain_detour(&next, &resolution) {
            Some(message) => println!("{message}"),
            None => println!("You can now continue to {next}."),
        }

        Ok(())
    }
}
