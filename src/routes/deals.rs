use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::deals::DealsQuery;
use crate::forms::deals::RejectDealForm;
use crate::forms::payments::PaymentForm;
use crate::gateway::PaymentGateway;
use crate::notifications::Notifier;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::{deals, payments};

#[get("/deals")]
pub async fn list_deals(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<DealsQuery>,
) -> impl Responder {
    respond(deals::list_deals(repo.get_ref(), &user, query.into_inner()))
}

#[get("/deals/{deal_id}")]
pub async fn get_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(deals::get_deal(repo.get_ref(), &user, deal_id.into_inner()))
}

#[post("/deals/{deal_id}/approve")]
pub async fn approve_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
) -> impl Responder {
    respond(deals::approve_deal(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        deal_id.into_inner(),
    ))
}

#[post("/deals/{deal_id}/reject")]
pub async fn reject_deal(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<RejectDealForm>,
) -> impl Responder {
    respond(deals::reject_deal(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        deal_id.into_inner(),
        form,
    ))
}

#[get("/deals/{deal_id}/payments")]
pub async fn list_payments(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(payments::list_payments(
        repo.get_ref(),
        &user,
        deal_id.into_inner(),
    ))
}

#[post("/deals/{deal_id}/payments")]
pub async fn record_payment(
    deal_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<dyn PaymentGateway>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<PaymentForm>,
) -> impl Responder {
    respond_created(payments::record_payment(
        repo.get_ref(),
        gateway.get_ref(),
        notifier.get_ref(),
        &user,
        deal_id.into_inner(),
        form,
    ))
}
