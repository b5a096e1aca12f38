use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::dto::clients::{ActivitiesQuery, ClientsQuery};
use crate::forms::activities::ActivityForm;
use crate::forms::clients::{ClientForm, UploadClientsForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, respond, respond_created};
use crate::services::{ServiceError, activities, clients};

#[get("/clients")]
pub async fn list_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<ClientsQuery>,
) -> impl Responder {
    respond(clients::list_clients(
        repo.get_ref(),
        &user,
        query.into_inner(),
    ))
}

#[post("/clients")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    respond_created(clients::create_client(repo.get_ref(), &user, form))
}

#[post("/clients/upload")]
pub async fn upload_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadClientsForm>,
) -> impl Responder {
    let file = match form.csv.file.reopen() {
        Ok(file) => file,
        Err(err) => {
            log::error!("Failed to reopen uploaded CSV: {err}");
            return error_response(ServiceError::Internal(err.to_string()));
        }
    };
    respond(clients::import_clients_csv(repo.get_ref(), &user, file))
}

#[get("/clients/{client_id}")]
pub async fn get_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(clients::get_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    respond(clients::update_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        form,
    ))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match clients::delete_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[get("/clients/{client_id}/activities")]
pub async fn list_activities(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<ActivitiesQuery>,
) -> impl Responder {
    respond(activities::list_activities(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        query.into_inner(),
    ))
}

#[post("/clients/{client_id}/activities")]
pub async fn record_activity(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ActivityForm>,
) -> impl Responder {
    respond_created(activities::record_activity(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        form,
    ))
}
