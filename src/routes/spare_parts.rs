use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::visits::SparePartsQuery;
use crate::forms::spare_parts::SparePartDecisionForm;
use crate::notifications::Notifier;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::spare_parts;

#[get("/spare-parts")]
pub async fn list_spare_parts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<SparePartsQuery>,
) -> impl Responder {
    respond(spare_parts::list_spare_parts(
        repo.get_ref(),
        &user,
        query.into_inner(),
    ))
}

#[post("/spare-parts/{request_id}/decision")]
pub async fn decide_spare_part(
    request_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<SparePartDecisionForm>,
) -> impl Responder {
    respond(spare_parts::decide_spare_part(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        request_id.into_inner(),
        form,
    ))
}

#[post("/spare-parts/{request_id}/fulfil")]
pub async fn fulfil_spare_part(
    request_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
) -> impl Responder {
    respond(spare_parts::fulfil_spare_part(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        request_id.into_inner(),
    ))
}
