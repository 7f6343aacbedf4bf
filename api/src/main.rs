use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use gg_api::config::init_tracing;
use gg_api::{create_app, AppState};
use gg_core::services::audit::{AuditChannelTrait, AuditService, AuditServiceConfig};
use gg_core::services::gate::TenantGate;
use gg_core::services::verification::{
    PlatformServiceTrait, VerificationGateway, VerificationServiceConfig, VerificationWorkflow,
};
use gg_infra::{
    create_email_service, BackupService, DiscordRestPlatform, SqliteLedgerRepository,
    StoreMultiplexer,
};
use gg_shared::AppConfig;

/// How often expired codes and idle user locks are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        data_dir = %config.storage.data_dir.display(),
        allowed_domains = ?config.verification.allowed_domains,
        "Starting GuildGate"
    );
    if config.server.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, export and import are disabled");
    }

    // Storage: one SQLite ledger per tenant, shared by the workflow and the backup manager
    let stores = Arc::new(StoreMultiplexer::new(config.storage.clone()));
    let gate = Arc::new(TenantGate::new());
    let ledger = Arc::new(SqliteLedgerRepository::new(Arc::clone(&stores)));

    // External collaborators
    let email = create_email_service(&config.email).context("failed to create email service")?;
    let discord = Arc::new(
        DiscordRestPlatform::new(config.platform.clone()).context("failed to create Discord client")?,
    );
    let platform: Arc<dyn PlatformServiceTrait> = discord.clone();
    let audit_channel: Arc<dyn AuditChannelTrait> = discord;
    let audit_config = AuditServiceConfig {
        channel_name: config.verification.audit_channel_name.clone(),
        async_writes: true,
    };

    let workflow = Arc::new(
        VerificationWorkflow::new(
            ledger,
            email,
            platform,
            AuditService::new(Arc::clone(&audit_channel), audit_config.clone()),
            VerificationServiceConfig::from(&config.verification),
        )
        .with_gate(Arc::clone(&gate)),
    );
    let backup = Arc::new(BackupService::new(
        Arc::clone(&stores),
        Arc::clone(&gate),
        AuditService::new(audit_channel, audit_config),
    ));

    let sweeper = {
        let workflow = Arc::clone(&workflow);
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let purged = workflow.purge_expired_codes();
                let pruned = gate.prune_idle();
                if purged > 0 || pruned > 0 {
                    tracing::debug!(purged, pruned, "Swept expired codes and idle locks");
                }
            }
        })
    };

    let verification: Arc<dyn VerificationGateway> = workflow;
    let app_state = web::Data::new(AppState::new(verification, backup));
    let admin_token = config.server.admin_token.clone();
    let max_payload_size = config.server.max_payload_size;
    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "HTTP server binding");

    HttpServer::new(move || create_app(app_state.clone(), admin_token.clone(), max_payload_size))
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    sweeper.abort();
    stores.close_all().await;
    tracing::info!("GuildGate stopped");
    Ok(())
}
