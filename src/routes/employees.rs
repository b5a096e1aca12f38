use actix_web::{Responder, get, post, web};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::forms::employees::AssignClientsForm;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::employees;

#[get("/employees")]
pub async fn list_employees(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(employees::list_employees(repo.get_ref(), &user))
}

#[post("/employees/assign")]
pub async fn assign_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AssignClientsForm>,
) -> impl Responder {
    respond(
        employees::assign_clients(repo.get_ref(), &user, form)
            .map(|assigned| json!({ "assigned": assigned })),
    )
}
