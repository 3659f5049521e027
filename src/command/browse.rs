// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table};

use crate::{error::Result, policy};

/// List the available albums, or the videos inside one album.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The ID of an album to list videos from.
    #[clap()]
    album: Option<String>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, mut ctx: super::Context) -> Result<()> {
        let resolution = ctx.guard.resolve(policy::DEFAULT_LANDING).await?;
        if let Some(message) = super::explain_detour(policy::DEFAULT_LANDING, &resolution) {
            println!("{message}");
            return Ok(());
        }

        match self.album {
            None => {
                let albums = ctx.backend.albums().await?;
                if albums.is_empty() {
                    println!("There are no albums yet.");
                } else {
                    println!("{}", Table::new(&albums).with(Style::rounded()));
                }
            }
            Some(album) => {
                let videos = ctx.backend.album_videos(&album).await?;
                if videos.is_empty() {
                    println!("This album has no videos.");
                } else {
                    println!("{}", Table::new(&videos).with(Style::rounded()));
                }
            }
        }

        Ok(())
    }
}
