use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pledgeboard_core::{
    confirmation::{ConfirmationService, ConfirmationServiceTrait},
    drafts::{EditorSessions, ReviewQueueService, ReviewQueueServiceTrait},
    events::DomainEventSink,
    export::CsvReportExporter,
    extraction::FormExtractor,
    intake::{IntakeService, IntakeServiceTrait},
    ledger::{LedgerService, LedgerServiceTrait},
    lifecycle::{LifecycleService, LifecycleServiceTrait},
    live_sync::LiveSyncBroadcaster,
};
use pledgeboard_storage_sqlite::{db, DraftRepository, EventRepository, LedgerRepository};
use pledgeboard_vision::OpenAiVisionExtractor;

use crate::{config::Config, domain_events::WebDomainEventSink};

pub struct AppState {
    pub lifecycle_service: Arc<dyn LifecycleServiceTrait>,
    pub intake_service: Arc<dyn IntakeServiceTrait>,
    pub review_queue_service: Arc<dyn ReviewQueueServiceTrait>,
    pub confirmation_service: Arc<dyn ConfirmationServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub broadcaster: LiveSyncBroadcaster,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("PB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Builds the state with the configured vision extractor.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let extractor: Arc<dyn FormExtractor> =
        Arc::new(OpenAiVisionExtractor::new(config.vision.clone()));
    build_state_with_extractor(config, extractor).await
}

pub async fn build_state_with_extractor(
    config: &Config,
    extractor: Arc<dyn FormExtractor>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone())?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let event_repository = Arc::new(EventRepository::new(pool.clone(), writer.clone()));
    let draft_repository = Arc::new(DraftRepository::new(pool.clone(), writer.clone()));
    let ledger_repository = Arc::new(LedgerRepository::new(pool.clone(), writer.clone()));

    let broadcaster = LiveSyncBroadcaster::new(config.intake.subscriber_queue_capacity);
    let domain_event_sink: Arc<dyn DomainEventSink> =
        Arc::new(WebDomainEventSink::new(broadcaster.clone()));
    let sessions = Arc::new(EditorSessions::new());
    let exporter = Arc::new(CsvReportExporter::new(&config.report_dir));

    let lifecycle_service: Arc<dyn LifecycleServiceTrait> = Arc::new(LifecycleService::new(
        event_repository.clone(),
        exporter,
        domain_event_sink.clone(),
    ));
    let intake_service: Arc<dyn IntakeServiceTrait> = Arc::new(IntakeService::new(
        event_repository.clone(),
        draft_repository.clone(),
        extractor,
        &config.intake,
        domain_event_sink.clone(),
    ));
    let review_queue_service: Arc<dyn ReviewQueueServiceTrait> = Arc::new(
        ReviewQueueService::new(
            draft_repository.clone(),
            event_repository.clone(),
            sessions.clone(),
        ),
    );
    let confirmation_service: Arc<dyn ConfirmationServiceTrait> =
        Arc::new(ConfirmationService::new(
            draft_repository,
            event_repository.clone(),
            ledger_repository.clone(),
            &config.intake,
            sessions,
            domain_event_sink,
        ));
    let ledger_service: Arc<dyn LedgerServiceTrait> =
        Arc::new(LedgerService::new(ledger_repository, event_repository));

    prime_broadcaster(&broadcaster, lifecycle_service.as_ref(), ledger_service.as_ref())?;

    Ok(Arc::new(AppState {
        lifecycle_service,
        intake_service,
        review_queue_service,
        confirmation_service,
        ledger_service,
        broadcaster,
        upload_dir: config.upload_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
        db_path,
    }))
}

/// Seeds the ordering baseline of every active event from its stored ledger,
/// so deltas committed after a restart are released in order.
fn prime_broadcaster(
    broadcaster: &LiveSyncBroadcaster,
    lifecycle_service: &dyn LifecycleServiceTrait,
    ledger_service: &dyn LedgerServiceTrait,
) -> anyhow::Result<()> {
    let active: Vec<_> = lifecycle_service
        .list_events()?
        .into_iter()
        .filter(|event| event.is_active())
        .collect();
    for event in &active {
        let aggregate = ledger_service.aggregate(&event.id)?;
        broadcaster.prime(&event.id, aggregate.last_seq);
    }
    if !active.is_empty() {
        tracing::info!("Resumed live sync for {} active event(s)", active.len());
    }
    Ok(())
}
