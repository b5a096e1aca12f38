use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::visits::VisitsQuery;
use crate::forms::spare_parts::SparePartRequestForm;
use crate::forms::visits::{
    AssignEngineerForm, ChangeVisitStatusForm, CreateVisitForm, RescheduleVisitForm,
};
use crate::notifications::Notifier;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::{spare_parts, visits};

#[get("/visits")]
pub async fn list_visits(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<VisitsQuery>,
) -> impl Responder {
    respond(visits::list_visits(repo.get_ref(), &user, query.into_inner()))
}

#[post("/visits")]
pub async fn create_visit(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<CreateVisitForm>,
) -> impl Responder {
    respond_created(visits::create_visit(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        form,
    ))
}

#[get("/visits/{visit_id}")]
pub async fn get_visit(
    visit_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(visits::get_visit(repo.get_ref(), &user, visit_id.into_inner()))
}

#[post("/visits/{visit_id}/status")]
pub async fn change_visit_status(
    visit_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<ChangeVisitStatusForm>,
) -> impl Responder {
    respond(visits::change_visit_status(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        visit_id.into_inner(),
        form,
    ))
}

#[post("/visits/{visit_id}/reschedule")]
pub async fn reschedule_visit(
    visit_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<RescheduleVisitForm>,
) -> impl Responder {
    respond(visits::reschedule_visit(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        visit_id.into_inner(),
        form,
    ))
}

#[post("/visits/{visit_id}/engineer")]
pub async fn assign_engineer(
    visit_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<AssignEngineerForm>,
) -> impl Responder {
    respond(visits::assign_engineer(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        visit_id.into_inner(),
        form,
    ))
}

#[post("/visits/{visit_id}/spare-parts")]
pub async fn request_spare_part(
    visit_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn Notifier>,
    web::Json(form): web::Json<SparePartRequestForm>,
) -> impl Responder {
    respond_created(spare_parts::request_spare_part(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        visit_id.into_inner(),
        form,
    ))
}
