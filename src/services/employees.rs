//! Services handling employee administration workflows.

use crate::auth::AuthenticatedUser;
use crate::dto::clients::EmployeeWithClients;
use crate::forms::employees::{AssignClientsForm, AssignClientsPayload};
use crate::repository::{ClientReader, EmployeeReader, EmployeeWriter};
use crate::services::{ServiceError, ServiceResult, ensure_any_role, user_hub};
use crate::{SALES_MANAGER_ROLE, SERVICE_ADMIN_ROLE};

const STAFF_ADMIN_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, SALES_MANAGER_ROLE];

/// Loads all employees of the hub with the clients assigned to them.
pub fn list_employees<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<EmployeeWithClients>>
where
    R: EmployeeReader + ?Sized,
{
    ensure_any_role(user, STAFF_ADMIN_ROLES)?;

    let hub_id = user_hub(user)?;

    let employees = repo.list_employees_with_clients(hub_id)?;

    Ok(employees
        .into_iter()
        .map(|(employee, clients)| EmployeeWithClients { employee, clients })
        .collect())
}

/// Replaces the set of clients assigned to the employee.
pub fn assign_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AssignClientsForm,
) -> ServiceResult<usize>
where
    R: ClientReader + EmployeeReader + EmployeeWriter + ?Sized,
{
    ensure_any_role(user, STAFF_ADMIN_ROLES)?;

    let hub_id = user_hub(user)?;
    let payload = AssignClientsPayload::try_from(form)?;

    let employee = repo
        .get_employee_by_id(payload.employee_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    for client_id in &payload.client_ids {
        if repo.get_client_by_id(*client_id, hub_id)?.is_none() {
            log::warn!("Client {client_id} is not part of hub {hub_id}");
            return Err(ServiceError::NotFound);
        }
    }

    let assigned = repo
        .assign_clients_to_employee(employee.id, &payload.client_ids)
        .map_err(|err| {
            log::error!("Failed to assign clients to employee {}: {err}", employee.id);
            err
        })?;

    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{client, employee, user};

    #[test]
    fn salesmen_cannot_reassign_clients() {
        let mut repo = MockRepository::new();
        repo.expect_assign_clients_to_employee().times(0);

        let salesman = user(&[crate::SALESMAN_ROLE]);
        let form = AssignClientsForm {
            employee_id: 7,
            client_ids: vec![3],
        };
        assert!(matches!(
            assign_clients(&repo, &salesman, form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn clients_outside_the_hub_abort_assignment() {
        let mut repo = MockRepository::new();
        repo.expect_get_employee_by_id()
            .returning(|id, _| Ok(Some(employee(id.get(), "sales@example.com"))));
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok((id.get() == 3).then(|| client(3))));
        repo.expect_assign_clients_to_employee().times(0);

        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let form = AssignClientsForm {
            employee_id: 7,
            client_ids: vec![3, 4],
        };
        assert!(matches!(
            assign_clients(&repo, &admin, form),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn assignment_replaces_the_set() {
        let mut repo = MockRepository::new();
        repo.expect_get_employee_by_id()
            .returning(|id, _| Ok(Some(employee(id.get(), "sales@example.com"))));
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(client(id.get()))));
        repo.expect_assign_clients_to_employee()
            .withf(|employee_id, client_ids| employee_id.get() == 7 && client_ids.len() == 2)
            .times(1)
            .returning(|_, client_ids| Ok(client_ids.len()));

        let manager = user(&[SALES_MANAGER_ROLE]);
        let form = AssignClientsForm {
            employee_id: 7,
            client_ids: vec![4, 3, 4],
        };
        assert_eq!(assign_clients(&repo, &manager, form).unwrap(), 2);
    }

    #[test]
    fn listing_pairs_employees_with_clients() {
        let mut repo = MockRepository::new();
        repo.expect_list_employees_with_clients()
            .returning(|_| Ok(vec![(employee(7, "sales@example.com"), vec![client(3)])]));

        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let listed = list_employees(&repo, &admin).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].clients[0].id.get(), 3);
    }
}
