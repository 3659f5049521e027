// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

/// View and edit your profile, and request account approval.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    operation: Operation,
}

#[derive(Debug, Subcommand)]
enum Operation {
    /// Show the profile on file for this account.
    Show,
    /// Set the phone number on your profile. A complete profile is required
    /// before approval can be requested.
    SetPhone {
        /// The phone number to put on file (at least 10 digits).
        phone_number: String,
    },
    /// Ask an administrator to approve this account.
    RequestApproval,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        // Profile operations are plain API calls, not page renders: they are
        // available to any authenticated account, approved or not, since
        // they are exactly what an unapproved account needs to get approved.
        let state = ctx.guard.settled().await;
        let Some(principal) = state.principal() else {
            println!("Please log in to manage your profile.");
            return Err(Error::Command);
        };

        match self.operation {
            Operation::Show => {
                println!("Email:    {}", principal.email);
                match principal.phone_number {
                    Some(ref phone_number) => println!("Phone:    {phone_number}"),
                    None => println!("Phone:    not set"),
                }
                println!(
                    "Status:   {}",
                    if principal.can_view_content() {
                        "approved"
                    } else {
                        "pending approval"
                    }
                );
            }
            Operation::SetPhone { phone_number } => {
                if phone_number.chars().filter(|c| c.is_ascii_digit()).count() < 10 {
                    println!("Please enter a valid phone number (at least 10 digits).");
                    return Err(Error::Command);
                }

                let updated = ctx.backend.update_profile(&phone_number).await?;
                let request_approval_hint = !updated.can_view_content();
                ctx.session.replace_principal(updated);
                println!("Profile updated.");
                if request_approval_hint {
                    println!(
                        "You can now request approval with `vidgate profile \
                         request-approval`."
                    );
                }
            }
            Operation::RequestApproval => {
                if principal.can_view_content() {
                    println!("This account is already approved.");
                    return Ok(());
                }
                if !principal.profile_complete() {
                    println!(
                        "Add a phone number to your profile first: `vidgate \
                         profile set-phone <number>`."
                    );
                    return Err(Error::Command);
                }

                ctx.backend.request_approval().await?;
                println!(
                    "Approval request sent. An administrator will review it; \
                     this can take up to 24 hours."
                );
            }
        }

        Ok(())
    }
}
