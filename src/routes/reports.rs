use actix_web::{Responder, get, web};

use crate::auth::AuthenticatedUser;
use crate::dto::reports::ReportQuery;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::reports;

#[get("/reports/accounting")]
pub async fn accounting_report(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<ReportQuery>,
) -> impl Responder {
    respond(reports::accounting_report(
        repo.get_ref(),
        &user,
        query.into_inner(),
    ))
}
