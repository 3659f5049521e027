// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The single choke point for talking to the portal.
//!
//! Every outbound request picks up the stored bearer credential here, and
//! every inbound failure is classified here, so no caller ever has to reason
//! about raw status codes. When the server rejects the credential we clear
//! the store and fire the invalidation hook before the error reaches the
//! caller, so no route guard can re-render against a revoked session.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret as _;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
    error::{self, Result},
    metadata,
    storage::{self, Storage as _},
};

/// Called after the credential store has been cleared in response to the
/// server revoking the session. Injected at construction; the session
/// manager supplies it.
pub(crate) type InvalidationHook = Arc<dyn Fn() + Send + Sync>;

/// How a request authenticates itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Never attach a credential. A 401 here means the caller's own inline
    /// credentials (email/password) were rejected, not that a session died.
    Anonymous,
    /// Attach the stored bearer credential when one exists. A 401 here means
    /// the session is gone.
    Bearer,
}

pub(crate) struct Gateway {
    client: reqwest::Client,
    base_url: Url,
    storage: storage::Shared,
    on_invalidated: InvalidationHook,
}

// FastAPI error payloads carry a human-readable "detail" field.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl Gateway {
    pub(crate) fn new(
        base_url: Url,
        storage: storage::Shared,
        on_invalidated: InvalidationHook,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(metadata::CLIENT_USER_AGENT.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url,
            storage,
            on_invalidated,
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, auth: Auth, path: &str) -> Result<T> {
        self.request(auth, Method::GET, path, Option::<&()>::None)
            .await
    }

    pub(crate) async fn post<B: Serialize + Sync + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(auth, Method::POST, path, Some(body)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, auth: Auth, path: &str) -> Result<T> {
        self.request(auth, Method::POST, path, Option::<&()>::None)
            .await
    }

    pub(crate) async fn put<B: Serialize + Sync + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(auth, Method::PUT, path, Some(body)).await
    }

    async fn request<B: Serialize + Sync + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.base_url.join(path)?;
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        if auth == Auth::Bearer {
            let mut storage = self.storage.lock().await;
            if let Some(credential) = storage.get().await? {
                builder = builder.bearer_auth(credential.token().expose_secret());
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);
        let failure = classify(auth, status, detail);
        if failure.invalidates_session() {
            debug!("The server revoked the stored credential (path {path})");
            // Ordering is load-bearing: the credential must be gone and the
            // session marked anonymous before the caller sees the failure. A
            // store that cannot be cleared must not keep the hook from firing
            // or hide the classified failure behind a storage error.
            {
                let mut storage = self.storage.lock().await;
                if let Err(e) = storage.clear().await {
                    warn!("Could not remove the revoked credential: {e}");
                }
            }
            (self.on_invalidated)();
        }

        Err(failure.into())
    }
}

fn classify(auth: Auth, status: StatusCode, detail: Option<String>) -> error::Api {
    // LINT: Deliberate fall-through so future status codes degrade to the
    // retryable class instead of something session-affecting.
    #[allow(clippy::wildcard_enum_match_arm)]
    match status {
        StatusCode::UNAUTHORIZED if auth == Auth::Anonymous => error::Api::AuthRejected,
        StatusCode::UNAUTHORIZED => error::Api::SessionExpired,
        StatusCode::FORBIDDEN => error::Api::Forbidden(
            detail.unwrap_or_else(|| "you do not have permission to do this".to_owned()),
        ),
        StatusCode::NOT_FOUND => error::Api::NotFound,
        _ => error::Api::Upstream(status),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead as _, BufReader, Write as _},
        net::{SocketAddr, TcpListener},
        sync::atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::{
        credential::{Credential, DEFAULT_TTL_DAYS},
        model::Principal,
    };

    use super::*;

    const UNAUTHORIZED_RESPONSE: &str = "HTTP/1.1 401 Unauthorized\r\n\
         content-type: application/json\r\n\
         content-length: 26\r\n\
         connection: close\r\n\
         \r\n\
         {\"detail\":\"Invalid token\"}";

    /// Answer exactly one HTTP request with a canned response.
    fn serve_once(response: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let _handle = std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap_or(0) > 2 {
                    line.clear();
                }
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        addr
    }

    struct FlakyStorage {
        credential: Option<Credential>,
        fail_clear: bool,
        clear_calls: Arc<AtomicUsize>,
    }

    impl storage::IsPersistent for FlakyStorage {
        fn is_persistent(&self) -> bool {
            false
        }
    }

    #[async_trait]
    impl storage::Storage for FlakyStorage {
        async fn get(&mut self) -> Result<Option<Credential>> {
            Ok(self.credential.clone())
        }

        async fn update(&mut self, data: &Credential) -> Result<()> {
            self.credential = Some(data.clone());
            Ok(())
        }

        async fn clear(&mut self) -> Result<()> {
            let _count = self.clear_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_clear {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "store is read-only",
                )
                .into());
            }
            self.credential = None;
            Ok(())
        }
    }

    fn gateway_with(
        addr: SocketAddr,
        fail_clear: bool,
    ) -> (Gateway, storage::Shared, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let clear_calls = Arc::new(AtomicUsize::new(0));
        let storage: storage::Shared = Arc::new(Mutex::new(Box::new(FlakyStorage {
            credential: Some(Credential::new("T1".to_owned(), DEFAULT_TTL_DAYS)),
            fail_clear,
            clear_calls: Arc::clone(&clear_calls),
        }) as Box<dyn storage::Storage>));

        let hook_fires = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hook_fires);
        let gateway = Gateway::new(
            Url::parse(&format!("http://{addr}/")).unwrap(),
            Arc::clone(&storage),
            Arc::new(move || {
                let _count = counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        (gateway, storage, hook_fires, clear_calls)
    }

    #[tokio::test]
    async fn bearer_rejection_clears_the_store_and_fires_the_hook() {
        let addr = serve_once(UNAUTHORIZED_RESPONSE);
        let (gateway, storage, hook_fires, clear_calls) = gateway_with(addr, false);

        let result = gateway.get::<Principal>(Auth::Bearer, "/api/users/me").await;
        assert!(matches!(
            result,
            Err(error::Error::Api(error::Api::SessionExpired))
        ));
        assert_eq!(clear_calls.load(Ordering::SeqCst), 1);
        assert_eq!(hook_fires.load(Ordering::SeqCst), 1);

        let mut guard = storage.lock().await;
        assert!(guard.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_credential_cleanup_still_invalidates_the_session() {
        let addr = serve_once(UNAUTHORIZED_RESPONSE);
        let (gateway, _storage, hook_fires, clear_calls) = gateway_with(addr, true);

        // Even when the store refuses to forget the credential, the caller
        // must see the session failure and the hook must still fire.
        let result = gateway.get::<Principal>(Auth::Bearer, "/api/users/me").await;
        assert!(matches!(
            result,
            Err(error::Error::Api(error::Api::SessionExpired))
        ));
        assert_eq!(clear_calls.load(Ordering::SeqCst), 1);
        assert_eq!(hook_fires.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn login_rejection_is_not_a_session_failure() {
        let failure = classify(Auth::Anonymous, StatusCode::UNAUTHORIZED, None);
        assert!(matches!(failure, error::Api::AuthRejected));
        assert!(!failure.invalidates_session());
    }

    #[test]
    fn bearer_rejection_invalidates_the_session() {
        let failure = classify(Auth::Bearer, StatusCode::UNAUTHORIZED, None);
        assert!(matches!(failure, error::Api::SessionExpired));
        assert!(failure.invalidates_session());
    }

    #[test]
    fn forbidden_keeps_the_session_and_carries_the_detail() {
        let failure = classify(
            Auth::Bearer,
            StatusCode::FORBIDDEN,
            Some("Account pending approval".to_owned()),
        );
        match failure {
            error::Api::Forbidden(detail) => assert_eq!(detail, "Account pending approval"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn server_failures_are_retryable_not_session_ending() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let failure = classify(Auth::Bearer, status, None);
            assert!(matches!(failure, error::Api::Upstream(s) if s == status));
            assert!(!failure.invalidates_session());
        }
    }

    #[test]
    fn not_found_keeps_the_session() {
        assert!(!classify(Auth::Bearer, StatusCode::NOT_FOUND, None).invalidates_session());
    }
}
