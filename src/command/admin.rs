// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table};

use crate::{
    error::{Error, Result},
    guard::Destination,
    policy,
};

/// Administer the portal's accounts.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    operation: Operation,
}

#[derive(Debug, Subcommand)]
enum Operation {
    /// List the accounts waiting for approval.
    Pending,
    /// Approve an account, unlocking the portal's content for it.
    Approve {
        /// The ID of the user to approve.
        user_id: String,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        let resolution = ctx.guard.resolve(policy::ADMIN_PATH).await?;
        if !matches!(
            resolution.destination,
            Destination::Page(ref route) if route.path == policy::ADMIN_PATH
        ) {
            match super::explain_detour(policy::ADMIN_PATH, &resolution) {
                Some(message) if resolution.return_path().is_some() => println!("{message}"),
                _ => println!("Administrator access is required for this command."),
            }
            return Err(Error::Command);
        }

        match self.operation {
            Operation::Pending => {
                let users = ctx.backend.pending_users().await?;
                if users.is_empty() {
                    println!("No accounts are waiting for approval.");
                } else {
                    println!("{}", Table::new(&users).with(Style::rounded()));
                }
            }
            Operation::Approve { user_id } => {
                ctx.backend.approve_user(&user_id).await?;
                println!("User {user_id} approved.");
            }
        }

        Ok(())
    }
}
