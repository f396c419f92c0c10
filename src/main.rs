//! subscriber-sync binary.
//!
//! Serves the webhook receiver by default. `subscriber-sync full-sync` runs a
//! single reconciliation, prints the JSON report and exits.
//!
//! Configuration comes from `SUBSCRIBER_SYNC__*` environment variables (see
//! [`subscriber_sync::config::AppConfig`]).

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use subscriber_sync::adapters::http::{webhook_router, WebhookAppState};
use subscriber_sync::adapters::marketo::{self, MarketoClient};
use subscriber_sync::adapters::noticeable::{self, NoticeableClient};
use subscriber_sync::application::{
    BulkReconciler, HandleLifecycleEventHandler, MembershipSynchronizer, ProgramTokenConfig,
    PublishContentHandler, ReconcilerConfig, RunFullSyncHandler, SyncContext, SyncContextConfig,
};
use subscriber_sync::config::AppConfig;
use subscriber_sync::ports::{SourceSystemClient, TargetSystemClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let state = build_state(&config)?;

    if std::env::args().nth(1).as_deref() == Some("full-sync") {
        let report = state.full_sync.handle().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let app = webhook_router(state).layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "subscriber-sync listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_state(config: &AppConfig) -> Result<WebhookAppState, Box<dyn Error>> {
    let list = config.marketo.list_ref()?;

    let target: Arc<dyn TargetSystemClient> = Arc::new(MarketoClient::new(
        marketo::MarketoConfig::new(&config.marketo.base_url)
            .with_timeout(Duration::from_secs(config.marketo.request_timeout_secs)),
    )?);

    let source: Arc<dyn SourceSystemClient> = Arc::new(NoticeableClient::new(
        noticeable::NoticeableConfig::new(
            config.noticeable.api_key.clone(),
            &config.noticeable.project_id,
        )
        .with_endpoint(&config.noticeable.graphql_endpoint)
        .with_page_size(config.noticeable.page_size)
        .with_timeout(Duration::from_secs(config.noticeable.request_timeout_secs)),
    )?);

    let margin = i64::try_from(config.marketo.token_refresh_margin_secs)
        .map_err(|_| "token_refresh_margin_secs is out of range")?;
    let context = Arc::new(SyncContext::new(
        target,
        SyncContextConfig::new(&config.marketo.client_id, config.marketo.client_secret.clone())
            .with_refresh_margin(chrono::Duration::seconds(margin))
            .with_list_page_size(config.sync.list_page_size)
            .with_max_list_pages(config.sync.max_list_pages),
    ));

    let synchronizer = Arc::new(MembershipSynchronizer::new(Arc::clone(&context)));
    let reconciler = Arc::new(BulkReconciler::new(
        Arc::clone(&synchronizer),
        ReconcilerConfig {
            batch_size: config.sync.batch_size,
            concurrency: config.sync.bulk_concurrency,
        },
    ));
    let publisher = Arc::new(PublishContentHandler::new(
        context,
        ProgramTokenConfig {
            program_id: config.marketo.program_id,
            token_name: config.marketo.text_token_name.clone(),
        },
    ));

    Ok(WebhookAppState {
        lifecycle: Arc::new(HandleLifecycleEventHandler::new(
            Arc::clone(&synchronizer),
            Arc::clone(&source),
            publisher,
            list.clone(),
        )),
        full_sync: Arc::new(RunFullSyncHandler::new(source, reconciler, list)),
        admin_token: config.sync.admin_token.clone(),
        ack_budget: Duration::from_millis(config.server.webhook_ack_budget_ms),
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    })
}
