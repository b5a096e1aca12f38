//! Background worker reminding engineers about upcoming maintenance visits.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;

use medequip_erp::db::establish_connection_pool;
use medequip_erp::models::config::ServerConfig;
use medequip_erp::notifications::ZmqNotifier;
use medequip_erp::repository::DieselRepository;
use medequip_erp::services::reminders::run_reminder_pass;

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

    let notifier = match ZmqNotifier::connect(&server_config.zmq_notifications_pub) {
        Ok(notifier) => notifier,
        Err(e) => {
            log::error!("Failed to connect notification publisher: {e}");
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

    let repo = DieselRepository::new(pool);

    let interval = Duration::from_secs(server_config.reminder_interval_secs);
    let retry_delay = Duration::from_secs(server_config.retry_delay_secs);
    let window = chrono::Duration::hours(server_config.reminder_window_hours);

    log::info!("Starting visit reminder worker");

    loop {
        let now = Utc::now().naive_utc();
        match run_reminder_pass(&repo, &notifier, now, window) {
            Ok(reminded) => {
                log::info!("Sent {reminded} visit reminders");
                thread::sleep(interval);
            }
            Err(e) => {
                log::error!("Reminder pass failed: {e}");
                thread::sleep(retry_delay);
            }
        }
    }
}
