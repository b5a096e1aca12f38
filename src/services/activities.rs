//! Manual entries in the client activity log.

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::employee::NewEmployee;
use crate::dto::clients::{ActivitiesQuery, ActivityEntry};
use crate::forms::activities::{ActivityForm, ActivityPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ActivityListQuery, ActivityReader, ActivityWriter, ClientReader};
use crate::services::{ServiceResult, requested_page};
use crate::services::clients::load_accessible_client;

/// Records an activity written by the caller. The author is upserted as an
/// employee in the same transaction as the entry.
pub fn record_activity<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ActivityForm,
) -> ServiceResult<ActivityEntry>
where
    R: ClientReader + ActivityWriter + ?Sized,
{
    let client = load_accessible_client(repo, user, client_id)?;
    let payload = ActivityPayload::try_from(form)?;
    let author = NewEmployee::try_from(user)?;

    let recorded = repo
        .record_activity(&author, client.id, &payload.kind, &payload.payload)
        .map_err(|err| {
            log::error!("Failed to record activity for client {}: {err}", client.id);
            err
        })?;

    Ok(ActivityEntry::from(recorded))
}

/// Lists the client's timeline, newest first.
pub fn list_activities<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    query: ActivitiesQuery,
) -> ServiceResult<Paginated<ActivityEntry>>
where
    R: ClientReader + ActivityReader + ?Sized,
{
    let client = load_accessible_client(repo, user, client_id)?;

    let page = requested_page(query.page)?;
    let mut list_query = ActivityListQuery::new(client.id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(kind) = query.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        list_query = list_query.kind(ActivityKind::from(kind));
    }

    let (total, activities) = repo.list_activities(list_query)?;

    Ok(Paginated::new(
        activities.into_iter().map(ActivityEntry::from).collect(),
        page,
        total,
        DEFAULT_ITEMS_PER_PAGE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        client, comment, employee, expect_activities, user_with_email,
    };

    #[test]
    fn activity_is_recorded_for_the_caller() {
        let mut repo = MockRepository::new();
        repo.expect_check_client_assigned_to_employee()
            .returning(|_, _| Ok(true));
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(client(id.get()))));
        expect_activities(&mut repo);

        let salesman = user_with_email("sales@example.com", &[crate::SALESMAN_ROLE]);
        let form = ActivityForm {
            kind: "Call".to_string(),
            text: "Discussed the service contract".to_string(),
        };
        let entry = record_activity(&repo, &salesman, 3, form).unwrap();

        assert_eq!(entry.activity.kind, ActivityKind::Call);
        assert_eq!(entry.author.email.as_str(), "sales@example.com");
    }

    #[test]
    fn empty_text_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(client(id.get()))));
        repo.expect_record_activity().times(0);

        let admin = user_with_email("admin@example.com", &[crate::SERVICE_ADMIN_ROLE]);
        let form = ActivityForm {
            kind: "Call".to_string(),
            text: String::new(),
        };
        assert!(matches!(
            record_activity(&repo, &admin, 3, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn kind_filter_is_forwarded() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(client(id.get()))));
        repo.expect_list_activities()
            .withf(|query| query.kind == Some(ActivityKind::Comment))
            .returning(|_| Ok((1, vec![(comment(3), employee(7, "sales@example.com"))])));

        let admin = user_with_email("admin@example.com", &[crate::SERVICE_ADMIN_ROLE]);
        let query = ActivitiesQuery {
            kind: Some("Comment".to_string()),
            page: None,
        };
        let page = list_activities(&repo, &admin, 3, query).unwrap();
        assert_eq!(page.total, 1);
    }
}
