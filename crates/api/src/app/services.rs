//! Service wiring: stores, audit sink, room client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use innkeep_infra::store::postgres::migrate;
use innkeep_infra::{
    AuditRecorder, AuditSink, BookingSaga, ElasticsearchAuditSink, HttpRoomClient,
    InMemoryRoomStore, InMemorySaleStore, LocalRoomClient, PostgresRoomStore, PostgresSaleStore,
    RoomRegistry, RoomServiceClient, RoomStore, SaleLedger, SaleStore, TracingAuditSink,
};
use innkeep_rooms::TransitionPolicy;

use crate::config::{AppConfig, Role};

/// Everything the rooms routes need.
#[derive(Debug)]
pub struct RoomServices {
    pub registry: Arc<RoomRegistry>,
}

impl RoomServices {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// In-memory registry (dev/test).
    pub fn in_memory(audit: AuditRecorder, policy: TransitionPolicy) -> Self {
        Self::new(Arc::new(RoomRegistry::new(
            Arc::new(InMemoryRoomStore::new()),
            audit,
            policy,
        )))
    }
}

/// Everything the sales routes need.
#[derive(Debug)]
pub struct SalesServices {
    pub saga: BookingSaga,
}

impl SalesServices {
    pub fn new(saga: BookingSaga) -> Self {
        Self { saga }
    }

    /// In-memory ledger over the given room client (dev/test).
    pub fn in_memory(
        rooms: Arc<dyn RoomServiceClient>,
        audit: AuditRecorder,
        remote_timeout: Duration,
    ) -> Self {
        let ledger = SaleLedger::new(Arc::new(InMemorySaleStore::new()));
        Self::new(BookingSaga::new(rooms, ledger, audit, remote_timeout))
    }

    pub fn ledger(&self) -> &SaleLedger {
        self.saga.ledger()
    }
}

#[derive(Debug)]
pub struct AppServices {
    pub rooms: Arc<RoomServices>,
    pub sales: Arc<SalesServices>,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let (room_store, sale_store) = build_stores(config).await?;
    let audit = build_audit(config)?;

    let registry = Arc::new(RoomRegistry::new(
        room_store,
        audit.clone(),
        config.transition_policy,
    ));

    let room_client: Arc<dyn RoomServiceClient> = match config.role {
        Role::All => Arc::new(LocalRoomClient::new(registry.clone())),
        Role::Rooms | Role::Sales => Arc::new(
            HttpRoomClient::new(&config.rooms_url, config.room_call_timeout)
                .context("failed to build room service client")?,
        ),
    };

    let saga = BookingSaga::new(
        room_client,
        SaleLedger::new(sale_store),
        audit,
        config.room_call_timeout,
    );

    Ok(AppServices {
        rooms: Arc::new(RoomServices::new(registry)),
        sales: Arc::new(SalesServices::new(saga)),
    })
}

async fn build_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn RoomStore>, Arc<dyn SaleStore>)> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set; using in-memory stores");
        return Ok((
            Arc::new(InMemoryRoomStore::new()),
            Arc::new(InMemorySaleStore::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    migrate(&pool).await.context("failed to run migrations")?;
    tracing::info!("using Postgres stores");

    Ok((
        Arc::new(PostgresRoomStore::new(pool.clone())),
        Arc::new(PostgresSaleStore::new(pool)),
    ))
}

fn build_audit(config: &AppConfig) -> anyhow::Result<AuditRecorder> {
    let sink: Arc<dyn AuditSink> = match config.audit_url.as_deref() {
        Some(url) => {
            let sink = ElasticsearchAuditSink::new(url, &config.audit_index, config.audit_timeout)
                .context("failed to build audit sink")?;
            tracing::info!(endpoint = %sink.endpoint(), "audit entries go to the search index");
            Arc::new(sink)
        }
        None => Arc::new(TracingAuditSink),
    };
    Ok(AuditRecorder::new(sink, config.audit_timeout))
}
