// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, session::SessionState};

/// Show the current session and account standing.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        match ctx.guard.settled().await {
            SessionState::Anonymous => {
                println!("Not logged in.");
            }
            SessionState::Authenticated(principal) => {
                println!("Logged in as {}.", principal.email);
                println!(
                    "  Role:     {}",
                    if principal.is_admin {
                        "administrator"
                    } else {
                        "member"
                    }
                );
                println!(
                    "  Approval: {}",
                    if principal.can_view_content() {
                        "approved"
                    } else {
                        "pending"
                    }
                );
                match principal.phone_number {
                    Some(ref phone_number) => println!("  Phone:    {phone_number}"),
                    None => println!("  Phone:    not set (required to request approval)"),
                }
            }
            // settled() cannot return this, but render something sensible
            // rather than nothing if it ever does.
            SessionState::Unknown => println!("The session is still being established."),
        }

        Ok(())
    }
}
