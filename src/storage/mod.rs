// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Durable client-side keeping of the bearer credential.
//!
//! Exactly one credential is held per store; writing a new one replaces any
//! prior session unconditionally. The file backend is what lets a session
//! survive process restarts within its expiry window.

mod file;
mod memory;

use async_trait::async_trait;

use crate::{credential::Credential, error::Result};

pub(crate) use file::File;
pub(crate) use memory::Memory;

/// The process-wide credential store handle shared by the gateway and the
/// session manager.
pub(crate) type Shared = std::sync::Arc<tokio::sync::Mutex<Box<dyn Storage>>>;

pub(crate) trait IsPersistent {
    fn is_persistent(&self) -> bool;
}

impl<T: IsPersistent + ?Sized> IsPersistent for Box<T> {
    fn is_persistent(&self) -> bool {
        (**self).is_persistent()
    }
}

#[async_trait]
pub(crate) trait Storage: Send + Sync + IsPersistent {
    /// Retrieve the stored credential, if any. An expired credential is
    /// reported as absent.
    async fn get(&mut self) -> Result<Option<Credential>>;
    async fn update(&mut self, data: &Credential) -> Result<()>;
    async fn clear(&mut self) -> Result<()>;
}

#[async_trait]
impl<T: Storage + ?Sized> Storage for Box<T> {
    async fn get(&mut self) -> Result<Option<Credential>> {
        (**self).get().await
    }

    async fn update(&mut self, data: &Credential) -> Result<()> {
        (**self).update(data).await
    }

    async fn clear(&mut self) -> Result<()> {
        (**self).clear().await
    }
}
