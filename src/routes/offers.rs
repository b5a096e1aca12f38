use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::offers::OffersQuery;
use crate::forms::offers::CreateOfferForm;
use crate::notifications::Notifier;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::offers;

#[get("/offers")]
pub async fn list_offers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<OffersQuery>,
) -> impl Responder {
    respond(offers::list_offers(repo.get_ref(), &user, query.into_inner()))
}

#[post("/offers")]
pub async fn create_offer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateOfferForm>,
) -> impl Responder {
    respond_created(offers::create_offer(repo.get_ref(), &user, form))
}

#[get("/offers/{offer_id}")]
pub async fn get_offer(
    offer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(offers::get_offer(repo.get_ref(), &user, offer_id.into_inner()))
}

#[post("/offers/{offer_id}/send")]
pub async fn send_offer(
    offer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
) -> impl Responder {
    respond(offers::send_offer(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        offer_id.into_inner(),
    ))
}

#[post("/offers/{offer_id}/accept")]
pub async fn accept_offer(
    offer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
) -> impl Responder {
    respond_created(offers::accept_offer(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        offer_id.into_inner(),
    ))
}

#[post("/offers/{offer_id}/reject")]
pub async fn reject_offer(
    offer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(offers::reject_offer(repo.get_ref(), &user, offer_id.into_inner()))
}
