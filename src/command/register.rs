// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::error::Result;

/// Create a new account. Registration does not log you in.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address to register with.
    #[clap()]
    email: String,

    /// The password for the new account. Prompted for interactively when
    /// omitted.
    #[clap(short, long)]
    password: Option<String>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: super::Context) -> Result<()> {
        let password = super::password_from(self.password, "Password: ")?;
        let principal = ctx.session.register(&self.email, &password).await?;

        println!("Registered {}.", principal.email);
        println!(
            "Next, log in, add a phone number to your profile, and request \
             approval. An administrator has to approve the account before \
             any videos become available."
        );

        Ok(())
    }
}
