//! HandleLifecycleEventHandler - routes inbound lifecycle events to the sync engine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{PublishContentCommand, PublishContentHandler, PublishContentResult};
use crate::application::sync::MembershipSynchronizer;
use crate::domain::subscriber::{LifecycleEvent, PublishedContent, SubscriberIdentity};
use crate::domain::sync::{AuthFailure, ListRef, MembershipAction, MutationOutcome};
use crate::ports::SourceSystemClient;

/// Command to handle one lifecycle event.
#[derive(Debug, Clone)]
pub struct HandleLifecycleEventCommand {
    pub event: LifecycleEvent,
}

/// Result of lifecycle event processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleLifecycleEventResult {
    /// Membership mutation attempted.
    Membership {
        action: MembershipAction,
        email: String,
        outcome: MutationOutcome,
    },

    /// Content publication processed.
    Published(PublishContentResult),
}

impl HandleLifecycleEventResult {
    /// Short label for responses and logs.
    pub fn label(&self) -> &'static str {
        match self {
            HandleLifecycleEventResult::Membership { outcome, .. } => outcome.label(),
            HandleLifecycleEventResult::Published(PublishContentResult::TokenUpdated { .. }) => {
                "success"
            }
            HandleLifecycleEventResult::Published(PublishContentResult::NotConfigured) => {
                "ignored"
            }
            HandleLifecycleEventResult::Published(PublishContentResult::Failed(outcome)) => {
                outcome.label()
            }
        }
    }
}

/// Handler for subscriber lifecycle events.
///
/// Created subscribers are added to the target list, deleted ones removed.
/// Expected downstream failures are returned as outcomes; only `AuthFailure`
/// is an error.
pub struct HandleLifecycleEventHandler {
    synchronizer: Arc<MembershipSynchronizer>,
    source: Arc<dyn SourceSystemClient>,
    publisher: Arc<PublishContentHandler>,
    list: ListRef,
}

impl HandleLifecycleEventHandler {
    pub fn new(
        synchronizer: Arc<MembershipSynchronizer>,
        source: Arc<dyn SourceSystemClient>,
        publisher: Arc<PublishContentHandler>,
        list: ListRef,
    ) -> Self {
        Self {
            synchronizer,
            source,
            publisher,
            list,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleLifecycleEventCommand,
    ) -> Result<HandleLifecycleEventResult, AuthFailure> {
        match cmd.event {
            LifecycleEvent::SubscriberCreated(identity) => {
                let email = identity.email.clone();
                let outcome = self.handle_created(identity).await?;
                Ok(HandleLifecycleEventResult::Membership {
                    action: MembershipAction::Add,
                    email,
                    outcome,
                })
            }
            LifecycleEvent::SubscriberDeleted(identity) => {
                let email = identity.email.clone();
                let outcome = self.handle_deleted(identity).await?;
                Ok(HandleLifecycleEventResult::Membership {
                    action: MembershipAction::Remove,
                    email,
                    outcome,
                })
            }
            LifecycleEvent::ContentPublished(content) => Ok(
                HandleLifecycleEventResult::Published(self.handle_published(content).await?),
            ),
        }
    }

    /// Adds a newly created subscriber to the target list.
    pub async fn handle_created(
        &self,
        identity: SubscriberIdentity,
    ) -> Result<MutationOutcome, AuthFailure> {
        let identity = self.enrich(identity).await;
        let outcome = self
            .synchronizer
            .apply(MembershipAction::Add, &identity, &self.list)
            .await?;
        log_outcome(MembershipAction::Add, &identity.email, &outcome);
        Ok(outcome)
    }

    /// Removes a deleted subscriber from the target list.
    pub async fn handle_deleted(
        &self,
        identity: SubscriberIdentity,
    ) -> Result<MutationOutcome, AuthFailure> {
        let outcome = self
            .synchronizer
            .apply(MembershipAction::Remove, &identity, &self.list)
            .await?;
        log_outcome(MembershipAction::Remove, &identity.email, &outcome);
        Ok(outcome)
    }

    pub async fn handle_published(
        &self,
        content: PublishedContent,
    ) -> Result<PublishContentResult, AuthFailure> {
        self.publisher
            .handle(PublishContentCommand { content })
            .await
    }

    /// Fills missing name and creation time from the source system.
    ///
    /// Lookup failures are logged and the webhook data is used unchanged.
    async fn enrich(&self, identity: SubscriberIdentity) -> SubscriberIdentity {
        if identity.display_name.is_some() && identity.created_at.is_some() {
            return identity;
        }

        match self.source.get_subscriber(&identity.email).await {
            Ok(Some(found)) => {
                debug!(email = %identity.email, "Enriched identity from source system");
                SubscriberIdentity {
                    display_name: identity.display_name.or(found.display_name),
                    created_at: identity.created_at.or(found.created_at),
                    status: found.status,
                    archived: found.archived,
                    email: identity.email,
                }
            }
            Ok(None) => identity,
            Err(err) => {
                warn!(email = %identity.email, error = %err, "Subscriber lookup failed, using webhook data");
                identity
            }
        }
    }
}

fn log_outcome(action: MembershipAction, email: &str, outcome: &MutationOutcome) {
    if outcome.is_success() {
        info!(%email, %action, "Membership synchronized");
    } else {
        warn!(%email, %action, outcome = outcome.label(), ?outcome, "Membership synchronization failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::marketo::MockTargetSystem;
    use crate::adapters::noticeable::MockSourceSystem;
    use crate::application::handlers::lifecycle::ProgramTokenConfig;
    use crate::application::sync::{SyncContext, SyncContextConfig};
    use crate::ports::{SourceError, TargetError};
    use secrecy::SecretString;

    const LIST_ID: u64 = 42;

    fn handler(target: &MockTargetSystem, source: &MockSourceSystem) -> HandleLifecycleEventHandler {
        let config = SyncContextConfig::new("client", SecretString::new("secret".into()));
        let context = Arc::new(SyncContext::new(Arc::new(target.clone()), config));
        let publisher = Arc::new(PublishContentHandler::new(
            context.clone(),
            ProgramTokenConfig {
                program_id: Some(7),
                token_name: "my.Release-Notes".into(),
            },
        ));
        HandleLifecycleEventHandler::new(
            Arc::new(MembershipSynchronizer::new(context)),
            Arc::new(source.clone()),
            publisher,
            ListRef::Id(LIST_ID),
        )
    }

    #[tokio::test]
    async fn created_event_adds_exactly_once() {
        let target = MockTargetSystem::new().with_list(LIST_ID, "Newsletter");
        let source = MockSourceSystem::new();

        let result = handler(&target, &source)
            .handle(HandleLifecycleEventCommand {
                event: LifecycleEvent::SubscriberCreated(SubscriberIdentity::new("a@x.com")),
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            HandleLifecycleEventResult::Membership {
                action: MembershipAction::Add,
                email: "a@x.com".into(),
                outcome: MutationOutcome::Success,
            }
        );
        assert_eq!(
            target.mutations(),
            vec![("add".to_string(), vec!["a@x.com".to_string()])]
        );
    }

    #[tokio::test]
    async fn deleted_event_removes() {
        let target = MockTargetSystem::new().with_list(LIST_ID, "Newsletter");
        target.add_member(LIST_ID, "a@x.com");
        let source = MockSourceSystem::new();

        let outcome = handler(&target, &source)
            .handle_deleted(SubscriberIdentity::new("a@x.com"))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert!(target.members(LIST_ID).is_empty());
        assert!(source.lookups().is_empty());
    }

    #[tokio::test]
    async fn created_identity_is_enriched_from_source() {
        let target = MockTargetSystem::new().with_list(LIST_ID, "Newsletter");
        let source = MockSourceSystem::with_subscribers(vec![
            SubscriberIdentity::new("a@x.com").with_display_name("Ada Lovelace")
        ]);
        let handler = handler(&target, &source);

        let identity = handler.enrich(SubscriberIdentity::new("a@x.com")).await;

        assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(source.lookups(), vec!["a@x.com".to_string()]);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_webhook_data() {
        let target = MockTargetSystem::new().with_list(LIST_ID, "Newsletter");
        let source = MockSourceSystem::new();
        source.set_error(SourceError::Network("timeout".into()));

        let outcome = handler(&target, &source)
            .handle_created(SubscriberIdentity::new("a@x.com"))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert!(target.is_member(LIST_ID, "a@x.com"));
    }

    #[tokio::test]
    async fn downstream_failure_is_an_outcome() {
        let target = MockTargetSystem::new().with_list(LIST_ID, "Newsletter");
        target.fail_always("mutate_membership", TargetError::Network("reset".into()));
        let source = MockSourceSystem::new();

        let outcome = handler(&target, &source)
            .handle_created(SubscriberIdentity::new("a@x.com"))
            .await
            .unwrap();

        assert!(matches!(outcome, MutationOutcome::TransportError { .. }));
    }

    #[tokio::test]
    async fn published_event_updates_token() {
        let target = MockTargetSystem::new();
        let source = MockSourceSystem::new();

        let result = handler(&target, &source)
            .handle(HandleLifecycleEventCommand {
                event: LifecycleEvent::ContentPublished(PublishedContent {
                    title: None,
                    content: "hello".into(),
                }),
            })
            .await
            .unwrap();

        assert_eq!(result.label(), "success");
        assert_eq!(target.text_tokens()[0].program_id, 7);
    }
}
