use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fitlog_core::activities::ActivityService;
use fitlog_core::activity_types::ActivityTypeService;
use fitlog_core::dashboard::AggregationService;
use fitlog_core::owners::OwnerProfileService;
use fitlog_core::sync::NetworkMonitor;
use fitlog_offline_sync::{ApiClient, ClientConfig, SyncEngine};
use fitlog_storage_sqlite::db::spawn_writer;
use fitlog_storage_sqlite::{
    create_pool, init, run_migrations, ActivityRepository, ActivityTypeRepository,
    ClientIdentityRepository, OfflineQueueRepository, OwnerRepository,
};
use tracing::debug;

/// Everything a command needs, wired once per invocation.
pub struct ServiceContext {
    pub owner_id: String,
    pub client: Arc<ApiClient>,
    pub engine: Arc<SyncEngine>,
    pub identity: ClientIdentityRepository,
    pub activity_type_service: ActivityTypeService,
    pub owner_profile_service: OwnerProfileService,
    pub activity_service: ActivityService,
    pub aggregation_service: AggregationService,
}

impl ServiceContext {
    pub async fn build(data_dir: &Path, config: ClientConfig, online: bool) -> Result<Self> {
        let data_dir = data_dir.to_string_lossy();
        let db_path = init(&data_dir).context("initializing data directory")?;
        run_migrations(&db_path).context("running migrations")?;
        let pool = create_pool(&db_path)?;
        let writer = spawn_writer(pool.as_ref().clone());

        let identity = ClientIdentityRepository::new(pool.clone(), writer.clone());
        let owner_id = identity.get_or_create_owner_id().await?;
        debug!("Using owner id {}", owner_id);

        let network = Arc::new(NetworkMonitor::new(online));
        let client = Arc::new(ApiClient::new(&config, network.clone())?);
        client.set_owner_id(&owner_id)?;

        let queue = Arc::new(OfflineQueueRepository::new(pool.clone(), writer.clone()));
        let engine = SyncEngine::new(queue, client.clone(), network);
        engine.attach()?;

        let activity_types = Arc::new(ActivityTypeRepository::new(pool.clone(), writer.clone()));
        let owners = Arc::new(OwnerRepository::new(pool.clone(), writer.clone()));
        let activities = Arc::new(ActivityRepository::new(pool.clone(), writer.clone()));

        Ok(Self {
            owner_id,
            client,
            engine,
            identity,
            activity_type_service: ActivityTypeService::new(activity_types.clone()),
            owner_profile_service: OwnerProfileService::new(owners.clone()),
            activity_service: ActivityService::new(
                activities.clone(),
                activity_types.clone(),
                owners,
            ),
            aggregation_service: AggregationService::new(activities, activity_types),
        })
    }
}
