//! PublishContentHandler - mirrors published content into a program text token.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::sync::SyncContext;
use crate::domain::subscriber::PublishedContent;
use crate::domain::sync::{AuthFailure, MutationOutcome};
use crate::ports::TextTokenUpdate;

/// Command to publish content to the target program token.
#[derive(Debug, Clone)]
pub struct PublishContentCommand {
    pub content: PublishedContent,
}

/// Result of content publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishContentResult {
    /// Token written on the program.
    TokenUpdated { program_id: u64 },

    /// No program configured; event acknowledged and ignored.
    NotConfigured,

    /// Target refused or failed the update.
    Failed(MutationOutcome),
}

/// Target program token settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTokenConfig {
    pub program_id: Option<u64>,
    pub token_name: String,
}

/// Handler for `post.published` events.
pub struct PublishContentHandler {
    context: Arc<SyncContext>,
    config: ProgramTokenConfig,
}

impl PublishContentHandler {
    pub fn new(context: Arc<SyncContext>, config: ProgramTokenConfig) -> Self {
        Self { context, config }
    }

    pub async fn handle(
        &self,
        cmd: PublishContentCommand,
    ) -> Result<PublishContentResult, AuthFailure> {
        let Some(program_id) = self.config.program_id else {
            info!("No target program configured, ignoring published content");
            return Ok(PublishContentResult::NotConfigured);
        };

        let token = TextTokenUpdate {
            program_id,
            name: self.config.token_name.clone(),
            value: cmd.content.content,
        };

        let target = self.context.target();
        let update = &token;
        let result = self
            .context
            .credentials()
            .call_with_refresh(|credential| async move {
                target.update_text_token(credential.token(), update).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(program_id, token = %token.name, "Updated program text token");
                Ok(PublishContentResult::TokenUpdated { program_id })
            }
            Err(err) => {
                let outcome = err.into_outcome()?;
                warn!(program_id, outcome = outcome.label(), "Program text token update failed");
                Ok(PublishContentResult::Failed(outcome))
            }
        }
    }
}
