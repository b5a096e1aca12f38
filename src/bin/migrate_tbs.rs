//! One-shot import of the legacy TBS customers and visits.

use dotenvy::dotenv;

use medequip_erp::db::{
    ConnectionOptions, establish_connection_pool, establish_connection_pool_with,
};
use medequip_erp::domain::types::HubId;
use medequip_erp::legacy::TbsDatabase;
use medequip_erp::models::config::ServerConfig;
use medequip_erp::repository::DieselRepository;
use medequip_erp::services::migration::migrate_legacy;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let hub_id = match HubId::new(server_config.migration_hub_id) {
        Ok(hub_id) => hub_id,
        Err(e) => {
            log::error!("Invalid migration hub: {e}");
            std::process::exit(1);
        }
    };

    let legacy_pool = match establish_connection_pool_with(
        &server_config.legacy_database_url,
        ConnectionOptions::read_only(),
    ) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to open TBS database: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let source = TbsDatabase::new(legacy_pool);
    let repo = DieselRepository::new(pool);

    match migrate_legacy(&source, &repo, hub_id) {
        Ok(report) => {
            log::info!(
                "Imported {} clients and {} visits, skipped {} clients and {} visits, {} failures",
                report.clients_imported,
                report.visits_imported,
                report.clients_skipped,
                report.visits_skipped,
                report.failures
            );
            if report.failures > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => {
            log::error!("TBS migration failed: {e}");
            std::process::exit(1);
        }
    }
}
