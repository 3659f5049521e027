// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Typed surface over the portal's REST endpoints. The rest of the crate
//! depends on the `Backend` trait only, which is also the seam tests fake.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    error::Result,
    gateway::{Auth, Gateway},
    model,
};

#[derive(Clone, Deserialize)]
pub(crate) struct ShareLink {
    pub(crate) share_token: String,
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
}

#[async_trait]
pub(crate) trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &SecretString) -> Result<model::LoginGrant>;
    async fn register(&self, email: &str, password: &SecretString) -> Result<model::Principal>;
    async fn current_user(&self) -> Result<model::Principal>;
    async fn update_profile(&self, phone_number: &str) -> Result<model::Principal>;
    async fn request_approval(&self) -> Result<()>;
    async fn albums(&self) -> Result<Vec<model::Album>>;
    async fn album_videos(&self, album_id: &str) -> Result<Vec<model::Video>>;
    async fn shared_video(&self, share_token: &str) -> Result<model::Video>;
    async fn create_share(&self, video_id: &str) -> Result<ShareLink>;
    async fn pending_users(&self) -> Result<Vec<model::PendingUser>>;
    async fn approve_user(&self, user_id: &str) -> Result<()>;
}

pub(crate) struct HttpBackend {
    gateway: Gateway,
}

impl HttpBackend {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, email: &str, password: &SecretString) -> Result<model::LoginGrant> {
        self.gateway
            .post(
                Auth::Anonymous,
                "/api/auth/login",
                &model::LoginRequest { email, password },
            )
            .await
    }

    async fn register(&self, email: &str, password: &SecretString) -> Result<model::Principal> {
        self.gateway
            .post(
                Auth::Anonymous,
                "/api/auth/register",
                &model::RegisterRequest { email, password },
            )
            .await
    }

    async fn current_user(&self) -> Result<model::Principal> {
        self.gateway.get(Auth::Bearer, "/api/users/me").await
    }

    async fn update_profile(&self, phone_number: &str) -> Result<model::Principal> {
        self.gateway
            .put(
                Auth::Bearer,
                "/api/users/profile",
                &model::ProfileUpdate { phone_number },
            )
            .await
    }

    async fn request_approval(&self) -> Result<()> {
        let _ack: Ack = self
            .gateway
            .post_empty(Auth::Bearer, "/api/users/request-approval")
            .await?;
        Ok(())
    }

    async fn albums(&self) -> Result<Vec<model::Album>> {
        self.gateway.get(Auth::Bearer, "/api/videos/albums").await
    }

    async fn album_videos(&self, album_id: &str) -> Result<Vec<model::Video>> {
        self.gateway
            .get(
                Auth::Bearer,
                &format!("/api/videos/albums/{album_id}/videos"),
            )
            .await
    }

    async fn shared_video(&self, share_token: &str) -> Result<model::Video> {
        self.gateway
            .get(Auth::Bearer, &format!("/api/videos/share/{share_token}"))
            .await
    }

    async fn create_share(&self, video_id: &str) -> Result<ShareLink> {
        self.gateway
            .post_empty(Auth::Bearer, &format!("/api/videos/videos/{video_id}/share"))
            .await
    }

    async fn pending_users(&self) -> Result<Vec<model::PendingUser>> {
        self.gateway
            .get(Auth::Bearer, "/api/admin/users/pending")
            .await
    }

    async fn approve_user(&self, user_id: &str) -> Result<()> {
        let _ack: Ack = self
            .gateway
            .post_empty(Auth::Bearer, &format!("/api/admin/users/{user_id}/approve"))
            .await?;
        Ok(())
    }
}
