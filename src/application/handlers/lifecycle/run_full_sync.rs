//! RunFullSyncHandler - reconciles the whole source subscriber base.

use std::sync::Arc;

use tracing::error;

use crate::application::sync::{BulkReconciler, ReconcileReport};
use crate::domain::sync::{ListRef, SyncError};
use crate::ports::SourceSystemClient;

/// Handler for a one-shot full reconciliation.
pub struct RunFullSyncHandler {
    source: Arc<dyn SourceSystemClient>,
    reconciler: Arc<BulkReconciler>,
    list: ListRef,
}

impl RunFullSyncHandler {
    pub fn new(
        source: Arc<dyn SourceSystemClient>,
        reconciler: Arc<BulkReconciler>,
        list: ListRef,
    ) -> Self {
        Self {
            source,
            reconciler,
            list,
        }
    }

    /// Fetches the subscriber snapshot and reconciles it onto the list.
    pub async fn handle(&self) -> Result<ReconcileReport, SyncError> {
        let snapshot = self.source.list_subscribers().await.map_err(|err| {
            error!(error = %err, "Failed to fetch subscriber snapshot");
            SyncError::source(err.to_string())
        })?;

        Ok(self.reconciler.reconcile(&snapshot, &self.list).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::marketo::MockTargetSystem;
    use crate::adapters::noticeable::MockSourceSystem;
    use crate::application::sync::{
        MembershipSynchronizer, ReconcilerConfig, SyncContext, SyncContextConfig,
    };
    use crate::domain::subscriber::{SubscriberIdentity, SubscriberStatus};
    use crate::ports::SourceError;
    use secrecy::SecretString;

    fn handler(target: &MockTargetSystem, source: &MockSourceSystem) -> RunFullSyncHandler {
        let config = SyncContextConfig::new("client", SecretString::new("secret".into()));
        let context = Arc::new(SyncContext::new(Arc::new(target.clone()), config));
        let synchronizer = Arc::new(MembershipSynchronizer::new(context));
        let reconciler = Arc::new(BulkReconciler::new(synchronizer, ReconcilerConfig::default()));
        RunFullSyncHandler::new(Arc::new(source.clone()), reconciler, ListRef::Id(42))
    }

    #[tokio::test]
    async fn reconciles_source_snapshot() {
        let target = MockTargetSystem::new().with_list(42, "Newsletter");
        target.add_member(42, "left@x.com");
        let source = MockSourceSystem::with_subscribers(vec![
            SubscriberIdentity::new("a@x.com"),
            SubscriberIdentity::new("left@x.com").with_status(SubscriberStatus::Unsubscribed),
        ]);

        let report = handler(&target, &source).handle().await.unwrap();

        assert_eq!(report.added.succeeded, 1);
        assert_eq!(report.removed.succeeded, 1);
        assert_eq!(target.members(42), vec!["a@x.com".to_string()]);
    }

    #[tokio::test]
    async fn source_failure_is_reported_without_target_calls() {
        let target = MockTargetSystem::new().with_list(42, "Newsletter");
        let source = MockSourceSystem::new();
        source.set_error(SourceError::Network("dns".into()));

        let err = handler(&target, &source).handle().await.unwrap_err();

        assert!(matches!(err, SyncError::Source { .. }));
        assert!(target.calls().is_empty());
    }
}
