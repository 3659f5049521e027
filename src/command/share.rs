// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::{
    error::{self, Error, Result},
    policy,
};

/// Work with shareable video links.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    operation: Operation,
}

#[derive(Debug, Subcommand)]
enum Operation {
    /// Resolve a share token and display the video behind it.
    View {
        /// The token from the shared link.
        share_token: String,
    },
    /// Generate a shareable link for one of the portal's videos.
    Create {
        /// The ID of the video to share.
        video_id: String,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        match self.operation {
            Operation::View { share_token } => {
                let path = format!("{}{share_token}", policy::SHARE_PREFIX);
                let resolution = ctx.guard.resolve(&path).await?;
                if let Some(message) = super::explain_detour(&path, &resolution) {
                    println!("{message}");
                    return Ok(());
                }

                match ctx.backend.shared_video(&share_token).await {
                    Ok(video) => {
                        println!("{}", video.title);
                        println!("  {}", video.url);
                        if let Some(description) = video.description {
                            println!("  {description}");
                        }
                    }
                    Err(Error::Api(error::Api::NotFound)) => {
                        println!(
                            "Video not found. It may have been removed, or the \
                             link may be invalid."
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            Operation::Create { video_id } => {
                let resolution = ctx.guard.resolve(policy::DEFAULT_LANDING).await?;
                if let Some(message) = super::explain_detour(policy::DEFAULT_LANDING, &resolution)
                {
                    println!("{message}");
                    return Ok(());
                }

                let link = ctx.backend.create_share(&video_id).await?;
                println!(
                    "Anyone with an approved account can now view this video at \
                     {}{}.",
                    policy::SHARE_PREFIX,
                    link.share_token
                );
            }
        }

        Ok(())
    }
}
