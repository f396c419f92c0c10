//! Membership Synchronizer - applies one add/remove against a target list.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use super::SyncContext;
use crate::domain::subscriber::SubscriberIdentity;
use crate::domain::sync::{
    AuthFailure, FailureClass, IdentityOutcome, ListHandle, ListRef, MembershipAction,
    MutationOutcome,
};
use crate::ports::{MemberStatus, MembershipResult};

/// Applies membership mutations through the shared `SyncContext`.
///
/// Expected provider failures come back as `MutationOutcome` values; only
/// `AuthFailure` is returned as an error.
pub struct MembershipSynchronizer {
    context: Arc<SyncContext>,
}

impl MembershipSynchronizer {
    pub fn new(context: Arc<SyncContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<SyncContext> {
        &self.context
    }

    /// Applies `action` for a single identity.
    pub async fn apply(
        &self,
        action: MembershipAction,
        identity: &SubscriberIdentity,
        list_ref: &ListRef,
    ) -> Result<MutationOutcome, AuthFailure> {
        if let Err(err) = identity.validate() {
            warn!(email = %identity.email, %action, error = %err, "Rejected malformed identity");
            return Ok(MutationOutcome::rejected(err.to_string()));
        }

        let handle = match self.context.lists().resolve(list_ref).await {
            Ok(handle) => handle,
            Err(err) => {
                let outcome = err.into_outcome()?;
                warn!(list = %list_ref, %action, outcome = outcome.label(), "List resolution failed");
                return Ok(outcome);
            }
        };

        let outcome = self
            .apply_batch(action, std::slice::from_ref(identity), &handle)
            .await?
            .pop()
            .map(|item| item.outcome)
            .unwrap_or_else(|| MutationOutcome::transport("no result for identity"));
        Ok(outcome)
    }

    /// Applies `action` for many identities in one provider request.
    ///
    /// Each identity gets its own outcome. When the whole request fails every
    /// identity carries that failure.
    pub async fn apply_batch(
        &self,
        action: MembershipAction,
        identities: &[SubscriberIdentity],
        handle: &ListHandle,
    ) -> Result<Vec<IdentityOutcome>, AuthFailure> {
        if identities.is_empty() {
            return Ok(Vec::new());
        }

        let target = self.context.target();
        let list_id = handle.id();
        let result = self
            .context
            .credentials()
            .call_with_refresh(|credential| async move {
                target
                    .mutate_membership(credential.token(), list_id, action, identities)
                    .await
            })
            .await;

        match result {
            Ok(results) => {
                debug!(list_id, %action, count = identities.len(), "Applied membership batch");
                Ok(match_results(action, identities, results))
            }
            Err(err) => {
                let outcome = err.into_outcome()?;
                warn!(
                    list_id,
                    %action,
                    count = identities.len(),
                    outcome = outcome.label(),
                    "Membership batch failed"
                );
                Ok(identities
                    .iter()
                    .map(|identity| IdentityOutcome::new(&identity.email, action, outcome.clone()))
                    .collect())
            }
        }
    }
}

/// Pairs each identity with its provider result by exact email. Repeated
/// emails take their results in order.
fn match_results(
    action: MembershipAction,
    identities: &[SubscriberIdentity],
    results: Vec<MembershipResult>,
) -> Vec<IdentityOutcome> {
    let mut by_email: HashMap<String, VecDeque<MembershipResult>> = HashMap::new();
    for result in results {
        by_email.entry(result.email.clone()).or_default().push_back(result);
    }

    identities
        .iter()
        .map(|identity| {
            let outcome = match by_email
                .get_mut(&identity.email)
                .and_then(VecDeque::pop_front)
            {
                Some(result) => result_outcome(result),
                None => MutationOutcome::transport("identity missing from provider result"),
            };
            if !outcome.is_success() {
                warn!(email = %identity.email, %action, outcome = outcome.label(), "Identity mutation failed");
            }
            IdentityOutcome::new(&identity.email, action, outcome)
        })
        .collect()
}

fn result_outcome(result: MembershipResult) -> MutationOutcome {
    match result.status {
        MemberStatus::Added | MemberStatus::Removed | MemberStatus::NotMember => {
            MutationOutcome::Success
        }
        MemberStatus::Skipped => {
            let detail = if result.reasons.is_empty() {
                "skipped by target system".to_string()
            } else {
                result
                    .reasons
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            let list_missing = result
                .reasons
                .iter()
                .any(|reason| reason.class() == FailureClass::ListNotFound);
            if list_missing {
                MutationOutcome::ListNotFound { detail }
            } else {
                MutationOutcome::TransportError { detail }
            }
        }
    }
}
