// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod command;
mod credential;
mod error;
mod gateway;
mod guard;
mod metadata;
mod model;
mod policy;
mod session;
mod storage;

use std::{process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use guard::RouteGuard;
use log::{debug, error, warn};
use session::SessionManager;
use storage::IsPersistent as _;
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Logout(command::logout::Command),
    Register(command::register::Command),
    Status(command::status::Command),
    Browse(command::browse::Command),
    Share(command::share::Command),
    Profile(command::profile::Command),
    Admin(command::admin::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, ctx: command::Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Register(cmd) => cmd.execute(ctx).await,
            Self::Status(cmd) => cmd.execute(ctx).await,
            Self::Browse(cmd) => cmd.execute(ctx).await,
            Self::Share(cmd) => cmd.execute(ctx).await,
            Self::Profile(cmd) => cmd.execute(ctx).await,
            Self::Admin(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the video portal API.
    #[arg(long, env = "VIDGATE_URL", default_value = "http://localhost:8000", value_parser = Url::parse)]
    url: Url,

    /// Keep the session credential in memory only instead of the on-disk
    /// store. The session then ends when this process exits.
    #[arg(long)]
    no_store: bool,

    #[clap(subcommand)]
    command: Command,
}

fn get_credential_storage(args: &Args) -> Box<dyn storage::Storage> {
    if !args.no_store {
        if let Some(file_storage) = storage::File::new("session.json") {
            return Box::new(file_storage);
        }

        warn!("We could not find a usable data directory, so the session will not outlive this process");
    }

    Box::new(storage::Memory::new())
}

async fn run(args: Args) -> Result<()> {
    let credential_storage = get_credential_storage(&args);
    if !credential_storage.is_persistent() {
        debug!("The session credential is held in memory only");
    }
    let storage: storage::Shared = Arc::new(Mutex::new(credential_storage));

    let (state, session_rx) = SessionManager::channel();
    let gateway = gateway::Gateway::new(
        args.url.clone(),
        Arc::clone(&storage),
        session::invalidation_hook(Arc::clone(&state)),
    )?;
    let backend: Arc<dyn api::Backend> = Arc::new(api::HttpBackend::new(gateway));
    let session = SessionManager::new(Arc::clone(&backend), storage, state);

    // Rehydration must finish before the guard hands out its first verdict;
    // every command goes through the guard's settled state from here on.
    let _state = session.rehydrate().await;

    let ctx = command::Context {
        session,
        backend,
        guard: RouteGuard::new(session_rx),
    };

    command::Command::execute(args.command, ctx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("VIDGATE_LOG", "warn")
        .write_style("VIDGATE_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
