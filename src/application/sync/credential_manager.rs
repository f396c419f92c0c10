//! Credential Manager - caches the target-system access token.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::sync::{AuthFailure, Credential, FailureClass, SyncError};
use crate::ports::{TargetError, TargetSystemClient};

/// Owns the cached credential and the client-credentials exchange.
///
/// The credential is created lazily on first `acquire` and replaced in place
/// on refresh. Readers share a valid credential under the read lock; a refresh
/// holds the write lock for the duration of the exchange.
pub struct CredentialManager {
    target: Arc<dyn TargetSystemClient>,
    client_id: String,
    client_secret: SecretString,
    refresh_margin: Duration,
    cached: RwLock<Option<Credential>>,
}

impl CredentialManager {
    pub fn new(
        target: Arc<dyn TargetSystemClient>,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            target,
            client_id: client_id.into(),
            client_secret,
            refresh_margin,
            cached: RwLock::new(None),
        }
    }

    /// Returns a non-expired credential, refreshing if the cached one is
    /// absent or stale.
    pub async fn acquire(&self) -> Result<Credential, AuthFailure> {
        {
            let cached = self.cached.read().await;
            if let Some(credential) = cached.as_ref().filter(|c| !c.is_expired()) {
                debug!("Using cached target credential");
                return Ok(credential.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(credential) = cached.as_ref().filter(|c| !c.is_expired()) {
            return Ok(credential.clone());
        }

        let credential = self.exchange().await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    /// Discards the cached credential and exchanges for a new one.
    pub async fn force_refresh(&self) -> Result<Credential, AuthFailure> {
        let mut cached = self.cached.write().await;
        *cached = None;

        let credential = self.exchange().await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    /// Runs `op` with a valid credential, refreshing and retrying exactly once
    /// if the target rejects the credential.
    ///
    /// A second rejection is returned as `SyncError::CredentialExpired`; other
    /// failures are classified without retry.
    pub async fn call_with_refresh<T, F, Fut>(&self, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Result<T, TargetError>>,
    {
        let credential = self.acquire().await?;
        match op(credential).await {
            Ok(value) => return Ok(value),
            Err(err) if FailureClass::of(&err) == FailureClass::CredentialExpired => {
                warn!(error = %err, attempt = 1, "Target rejected credential, refreshing");
            }
            Err(err) => return Err(into_sync_error(err)),
        }

        let credential = self.force_refresh().await?;
        op(credential).await.map_err(|err| {
            if FailureClass::of(&err) == FailureClass::CredentialExpired {
                warn!(error = %err, attempt = 2, "Target rejected refreshed credential");
            }
            into_sync_error(err)
        })
    }

    async fn exchange(&self) -> Result<Credential, AuthFailure> {
        let issued = self
            .target
            .exchange_credential(&self.client_id, &self.client_secret)
            .await
            .map_err(|err| {
                let payload = match err {
                    TargetError::CredentialRejected { payload } => payload,
                    other => other.to_string(),
                };
                error!(client_id = %self.client_id, payload = %payload, "Credential exchange failed");
                AuthFailure::new(payload)
            })?;

        if issued.access_token.is_empty() {
            error!(client_id = %self.client_id, "Credential exchange returned an empty token");
            return Err(AuthFailure::new("issuer returned an empty access_token"));
        }

        let credential = Credential::issued(
            issued.access_token,
            issued.expires_in_secs,
            self.refresh_margin,
            Utc::now(),
        );
        info!(
            expires_in_secs = issued.expires_in_secs,
            expires_at = %credential.expires_at(),
            "Refreshed target credential"
        );
        Ok(credential)
    }
}

fn into_sync_error(err: TargetError) -> SyncError {
    match FailureClass::of(&err) {
        FailureClass::CredentialExpired => SyncError::credential_expired(err.to_string()),
        FailureClass::ListNotFound => SyncError::list_not_found(err.to_string()),
        FailureClass::Other => SyncError::transport(err.to_string()),
    }
}
