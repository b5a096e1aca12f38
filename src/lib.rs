#[cfg(feature = "server")]
use std::sync::Arc;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::gateway::{OfflineGateway, PaymentGateway};
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::notifications::{Notifier, ZmqNotifier};
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

pub mod auth;
pub mod db;
pub mod domain;
pub mod error_conversions;
pub mod legacy;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod gateway;
#[cfg(feature = "server")]
pub mod notifications;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "erp";
pub const SERVICE_ADMIN_ROLE: &str = "erp_admin";
pub const SALES_MANAGER_ROLE: &str = "erp_sales_manager";
pub const SALESMAN_ROLE: &str = "erp_salesman";
pub const MAINTENANCE_MANAGER_ROLE: &str = "erp_maintenance_manager";
pub const ENGINEER_ROLE: &str = "erp_engineer";
pub const CUSTOMER_ROLE: &str = "erp_customer";
pub const ACCOUNTANT_ROLE: &str = "erp_accountant";
pub const WAREHOUSE_ROLE: &str = "erp_warehouse";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Publisher for role and e-mail notifications fanned out by the push gateway.
    let notifier = ZmqNotifier::connect(&server_config.zmq_notifications_pub)
        .map_err(|e| std::io::Error::other(format!("Failed to start ZMQ notifier: {e}")))?;
    let notifier: Arc<dyn Notifier> = Arc::new(notifier);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(OfflineGateway);

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting ERP server for {} on {}:{}",
        server_config.domain,
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(web::scope("/api/v1").configure(routes::configure))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::from(notifier.clone()))
            .app_data(web::Data::from(gateway.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
