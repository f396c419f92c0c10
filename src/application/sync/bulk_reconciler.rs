//! Bulk Reconciler - drives a full subscriber snapshot onto a target list.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::MembershipSynchronizer;
use crate::domain::foundation::SyncRunId;
use crate::domain::subscriber::SubscriberIdentity;
use crate::domain::sync::{
    ActionTally, AuthFailure, IdentityOutcome, ListHandle, ListRef, MembershipAction,
    MutationOutcome,
};

/// Reconciler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Identities per provider request.
    pub batch_size: usize,

    /// Batches of the same action run concurrently within a phase.
    pub concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            batch_size: 300,
            concurrency: 1,
        }
    }
}

/// A run of consecutive snapshot items with no repeated email (ignoring ASCII case).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phase {
    pub adds: Vec<SubscriberIdentity>,
    pub removes: Vec<SubscriberIdentity>,
}

impl Phase {
    fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

/// Splits a snapshot into phases, starting a new phase whenever an email
/// repeats (ignoring ASCII case). Within a phase ADDs are executed before REMOVEs, so per-email
/// order always follows snapshot order.
pub fn plan_phases(snapshot: &[SubscriberIdentity]) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut current = Phase::default();
    let mut seen: HashSet<String> = HashSet::new();

    for identity in snapshot {
        // The target keys leads case-insensitively.
        let key = identity.email.to_ascii_lowercase();
        if seen.contains(&key) {
            phases.push(std::mem::take(&mut current));
            seen.clear();
        }
        seen.insert(key);
        if identity.should_be_member() {
            current.adds.push(identity.clone());
        } else {
            current.removes.push(identity.clone());
        }
    }

    if !current.is_empty() {
        phases.push(current);
    }
    phases
}

fn action_for(identity: &SubscriberIdentity) -> MembershipAction {
    if identity.should_be_member() {
        MembershipAction::Add
    } else {
        MembershipAction::Remove
    }
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub run_id: SyncRunId,
    pub list: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub added: ActionTally,
    pub removed: ActionTally,
    pub failures: Vec<IdentityOutcome>,
}

impl ReconcileReport {
    /// `Success` when nothing failed, otherwise `PartialSuccess`.
    pub fn outcome(&self) -> MutationOutcome {
        if self.failures.is_empty() {
            MutationOutcome::Success
        } else {
            MutationOutcome::PartialSuccess {
                failures: self.failures.clone(),
            }
        }
    }

    pub fn succeeded(&self) -> usize {
        self.added.succeeded + self.removed.succeeded
    }

    pub fn failed(&self) -> usize {
        self.added.failed + self.removed.failed
    }

    fn record(&mut self, item: IdentityOutcome) {
        match item.action {
            MembershipAction::Add => self.added.record(&item.outcome),
            MembershipAction::Remove => self.removed.record(&item.outcome),
        }
        if !item.is_success() {
            self.failures.push(item);
        }
    }
}

/// Reconciles a snapshot against a target list in batches.
pub struct BulkReconciler {
    synchronizer: Arc<MembershipSynchronizer>,
    config: ReconcilerConfig,
}

impl BulkReconciler {
    pub fn new(synchronizer: Arc<MembershipSynchronizer>, config: ReconcilerConfig) -> Self {
        Self {
            synchronizer,
            config: ReconcilerConfig {
                batch_size: config.batch_size.max(1),
                concurrency: config.concurrency.max(1),
            },
        }
    }

    /// Applies ADD for every identity that should be present and REMOVE for
    /// the rest. Never halts on a single identity; fails only on `AuthFailure`.
    pub async fn reconcile(
        &self,
        snapshot: &[SubscriberIdentity],
        list_ref: &ListRef,
    ) -> Result<ReconcileReport, AuthFailure> {
        let mut report = ReconcileReport {
            run_id: SyncRunId::new(),
            list: list_ref.to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            added: ActionTally::default(),
            removed: ActionTally::default(),
            failures: Vec::new(),
        };
        info!(run_id = %report.run_id, list = %list_ref, snapshot = snapshot.len(), "Starting reconciliation");

        let mut valid = Vec::with_capacity(snapshot.len());
        for identity in snapshot {
            match identity.validate() {
                Ok(()) => valid.push(identity.clone()),
                Err(err) => {
                    warn!(run_id = %report.run_id, email = %identity.email, error = %err, "Rejected malformed identity");
                    report.record(IdentityOutcome::new(
                        &identity.email,
                        action_for(identity),
                        MutationOutcome::rejected(err.to_string()),
                    ));
                }
            }
        }

        match self.synchronizer.context().lists().resolve(list_ref).await {
            Ok(handle) => {
                for phase in plan_phases(&valid) {
                    for item in self.run_phase(&phase, &handle).await? {
                        report.record(item);
                    }
                }
            }
            Err(err) => {
                let outcome = err.into_outcome()?;
                warn!(run_id = %report.run_id, list = %list_ref, outcome = outcome.label(), "List resolution failed");
                for identity in &valid {
                    report.record(IdentityOutcome::new(
                        &identity.email,
                        action_for(identity),
                        outcome.clone(),
                    ));
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            run_id = %report.run_id,
            added = report.added.succeeded,
            removed = report.removed.succeeded,
            failed = report.failed(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    async fn run_phase(
        &self,
        phase: &Phase,
        handle: &ListHandle,
    ) -> Result<Vec<IdentityOutcome>, AuthFailure> {
        let mut outcomes = self
            .run_action(MembershipAction::Add, &phase.adds, handle)
            .await?;
        outcomes.extend(
            self.run_action(MembershipAction::Remove, &phase.removes, handle)
                .await?,
        );
        Ok(outcomes)
    }

    async fn run_action(
        &self,
        action: MembershipAction,
        identities: &[SubscriberIdentity],
        handle: &ListHandle,
    ) -> Result<Vec<IdentityOutcome>, AuthFailure> {
        let requests: Vec<_> = identities
            .chunks(self.config.batch_size)
            .map(|batch| self.synchronizer.apply_batch(action, batch, handle))
            .collect();
        let batches: Vec<_> = stream::iter(requests)
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut outcomes = Vec::with_capacity(identities.len());
        for batch in batches {
            outcomes.extend(batch?);
        }
        Ok(outcomes)
    }
}
