//! Reminders for upcoming maintenance visits.

use chrono::{Duration, NaiveDateTime};

use crate::MAINTENANCE_MANAGER_ROLE;
use crate::domain::notification::Notification;
use crate::notifications::{Notifier, notify_or_log};
use crate::repository::{EmployeeReader, VisitReader, VisitWriter};
use crate::services::ServiceResult;
use crate::services::visits::notify_engineer;

/// Notifies about every scheduled visit starting within `window` after `now`
/// that was not reminded yet. Returns the number of visits marked reminded.
///
/// A visit whose reminder cannot be stored is logged and skipped so the rest
/// of the pass still runs; it is picked up again on the next pass.
pub fn run_reminder_pass<R, N>(
    repo: &R,
    notifier: &N,
    now: NaiveDateTime,
    window: Duration,
) -> ServiceResult<usize>
where
    R: EmployeeReader + VisitReader + VisitWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let due = repo.list_due_visits(now, now + window)?;
    log::info!("Reminder pass found {} due visits", due.len());

    let mut reminded = 0;
    for visit in due {
        let title = "Upcoming maintenance visit";
        let message = format!(
            "Visit #{} for {} is scheduled at {}",
            visit.id,
            visit.equipment,
            visit.scheduled_at.format("%Y-%m-%d %H:%M")
        );

        if !notify_engineer(repo, notifier, &visit, title, &message) {
            notify_or_log(
                notifier,
                &Notification::to_role(visit.hub_id, MAINTENANCE_MANAGER_ROLE, title, &message),
            );
        }

        match repo.mark_visit_reminded(visit.id) {
            Ok(()) => reminded += 1,
            Err(err) => log::error!("Failed to mark visit {} as reminded: {err}", visit.id),
        }
    }

    Ok(reminded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::Recipient;
    use crate::domain::types::{EmployeeId, VisitId};
    use crate::domain::visit::VisitStatus;
    use crate::notifications::RecordingNotifier;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{at, employee, visit};

    #[test]
    fn engineer_is_reminded_and_visit_marked() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_visits()
            .withf(|from, until| *from == at(9, 9) && *until == at(10, 9))
            .returning(|_, _| {
                let mut assigned = visit(4, VisitStatus::Scheduled);
                assigned.engineer_id = Some(EmployeeId::new(8).unwrap());
                Ok(vec![assigned])
            });
        repo.expect_get_employee_by_id()
            .returning(|_, _| Ok(Some(employee(8, "engineer@example.com"))));
        repo.expect_mark_visit_reminded()
            .withf(|id| *id == VisitId::new(4).unwrap())
            .times(1)
            .returning(|_| Ok(()));

        let notifier = RecordingNotifier::new();
        let count = run_reminder_pass(&repo, &notifier, at(9, 9), Duration::hours(24)).unwrap();

        assert_eq!(count, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].recipient,
            Recipient::Email("engineer@example.com".to_string())
        );
    }

    #[test]
    fn unassigned_visits_go_to_maintenance_managers() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_visits()
            .returning(|_, _| Ok(vec![visit(5, VisitStatus::Scheduled)]));
        repo.expect_mark_visit_reminded().returning(|_| Ok(()));

        let notifier = RecordingNotifier::new();
        let count = run_reminder_pass(&repo, &notifier, at(9, 9), Duration::hours(24)).unwrap();

        assert_eq!(count, 1);
        assert_eq!(
            notifier.sent()[0].recipient,
            Recipient::Role(MAINTENANCE_MANAGER_ROLE.to_string())
        );
    }

    #[test]
    fn failed_mark_does_not_stop_the_pass() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_visits().returning(|_, _| {
            Ok(vec![
                visit(5, VisitStatus::Scheduled),
                visit(6, VisitStatus::Scheduled),
            ])
        });
        repo.expect_mark_visit_reminded().returning(|id| {
            if id.get() == 5 {
                Err(RepositoryError::NotFound)
            } else {
                Ok(())
            }
        });

        let notifier = RecordingNotifier::new();
        let count = run_reminder_pass(&repo, &notifier, at(9, 9), Duration::hours(24)).unwrap();

        assert_eq!(count, 1);
        assert_eq!(notifier.sent().len(), 2);
    }
}
