//! JSON handlers of the `/api/v1` surface.
//!
//! Handlers stay thin: they extract the caller, the path and the body, call
//! one service function and turn its result into a response.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::json;

use crate::services::{ServiceError, ServiceResult};

pub mod clients;
pub mod deals;
pub mod employees;
pub mod offers;
pub mod reports;
pub mod spare_parts;
pub mod visits;

/// Status code a service failure is reported with.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unauthorized => StatusCode::FORBIDDEN,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_)
        | ServiceError::TypeConstraint(_)
        | ServiceError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) | ServiceError::InvalidTransition(_) => StatusCode::CONFLICT,
        ServiceError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a service failure as `{"error": "..."}`. Internal details are
/// logged, not returned.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let status = error_status(&err);
    let message = match &err {
        ServiceError::Internal(details) => {
            log::error!("Internal error while handling request: {details}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    HttpResponse::build(status).json(json!({ "error": message }))
}

pub(crate) fn respond<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    respond_with(StatusCode::OK, result)
}

pub(crate) fn respond_created<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    respond_with(StatusCode::CREATED, result)
}

fn respond_with<T: Serialize>(status: StatusCode, result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::build(status).json(body),
        Err(err) => error_response(err),
    }
}

/// Registers every API handler. Mounted under `/api/v1` by the server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(clients::list_clients)
        .service(clients::create_client)
        .service(clients::upload_clients)
        .service(clients::get_client)
        .service(clients::update_client)
        .service(clients::delete_client)
        .service(clients::list_activities)
        .service(clients::record_activity)
        .service(employees::list_employees)
        .service(employees::assign_clients)
        .service(visits::list_visits)
        .service(visits::create_visit)
        .service(visits::get_visit)
        .service(visits::change_visit_status)
        .service(visits::reschedule_visit)
        .service(visits::assign_engineer)
        .service(visits::request_spare_part)
        .service(spare_parts::list_spare_parts)
        .service(spare_parts::decide_spare_part)
        .service(spare_parts::fulfil_spare_part)
        .service(offers::list_offers)
        .service(offers::create_offer)
        .service(offers::get_offer)
        .service(offers::send_offer)
        .service(offers::accept_offer)
        .service(offers::reject_offer)
        .service(deals::list_deals)
        .service(deals::get_deal)
        .service(deals::approve_deal)
        .service(deals::reject_deal)
        .service(deals::list_payments)
        .service(deals::record_payment)
        .service(reports::accounting_report);
}
