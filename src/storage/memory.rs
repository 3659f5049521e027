// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{credential::Credential, error::Result};

use super::{IsPersistent, Storage};

pub(crate) struct Memory {
    data: Arc<RwLock<Option<Credential>>>,
}

impl Memory {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl IsPersistent for Memory {
    fn is_persistent(&self) -> bool {
        false
    }
}

#[async_trait]
impl Storage for Memory {
    async fn get(&mut self) -> Result<Option<Credential>> {
        let data = Arc::clone(&self.data);
        let mut guard = data.write().await;
        if guard
            .as_ref()
            .is_some_and(|credential| credential.expired_at(Utc::now()))
        {
            *guard = None;
        }
        Ok(guard.clone())
    }

    async fn update(&mut self, data: &Credential) -> Result<()> {
        let target_data = Arc::clone(&self.data);
        let mut guard = target_data.write_owned().await;
        *guard = Some(data.clone());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        let target_data = Arc::clone(&self.data);
        let mut guard = target_data.write_owned().await;
        *guard = None;
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(None)),
        }
    }
}
