use super::principal::{Principal, Target};
use super::Action;
use crate::models::user::Role;
use uuid::Uuid;

/// Role-pair assignment table. Self-assignment is handled by [`can`].
pub fn may_assign(assignor: Role, assignee: Role) -> bool {
    use Role::*;

    match assignor {
        Lawyer => true,
        Secretary => matches!(assignee, Attache | LegalAssistant),
        LegalAssistant => matches!(assignee, Attache | Secretary | LegalAssistant),
        Attache => false,
    }
}

/// Decides whether `principal` may perform `action` on `target`.
///
/// Pure function of its inputs. A target that does not fit the action denies.
pub fn can(principal: &Principal, action: Action, target: &Target) -> bool {
    match (action, target) {
        (Action::AssignTask, Target::Assignee { user_id, role }) => {
            *user_id != principal.user_id && may_assign(principal.role, *role)
        }
        (Action::ViewTask | Action::UpdateTask, Target::Task { assignor_id, assignee_id }) => {
            principal.is(*assignor_id) || principal.is(*assignee_id)
        }
        (Action::DeleteTask, Target::Task { assignor_id, .. }) => principal.is(*assignor_id),
        (Action::CreateCase, Target::None) => principal.role == Role::Lawyer,
        (Action::ViewCase, Target::Case { .. }) => true,
        (Action::UpdateCase | Action::DeleteCase, Target::Case { lawyer_id }) => {
            principal.is(*lawyer_id)
        }
        (Action::UploadDocument, Target::None) => true,
        (Action::UploadDocument, Target::Case { lawyer_id }) => principal.is(*lawyer_id),
        (Action::ViewDocument, Target::Document { owner_id, case_id }) => {
            *owner_id == principal.user_id || case_id.is_some()
        }
        _ => false,
    }
}

/// Whose cases a dashboard summarises: lawyers their own, everyone else the whole firm.
pub fn dashboard_case_owner(principal: &Principal) -> Option<Uuid> {
    match principal.role {
        Role::Lawyer => Some(principal.user_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role)
    }

    fn assignee(role: Role) -> Target {
        Target::Assignee { user_id: Uuid::new_v4(), role }
    }

    #[test]
    fn assignment_table_matches_every_role_pair() {
        use Role::*;

        let expected = [
            (Lawyer, Lawyer, true),
            (Lawyer, Secretary, true),
            (Lawyer, Attache, true),
            (Lawyer, LegalAssistant, true),
            (Secretary, Lawyer, false),
            (Secretary, Secretary, false),
            (Secretary, Attache, true),
            (Secretary, LegalAssistant, true),
            (LegalAssistant, Lawyer, false),
            (LegalAssistant, Secretary, true),
            (LegalAssistant, Attache, true),
            (LegalAssistant, LegalAssistant, true),
            (Attache, Lawyer, false),
            (Attache, Secretary, false),
            (Attache, Attache, false),
            (Attache, LegalAssistant, false),
        ];
        assert_eq!(expected.len(), Role::ALL.len() * Role::ALL.len());

        for (from, to, allowed) in expected {
            assert_eq!(may_assign(from, to), allowed, "{from} -> {to}");
            assert_eq!(
                can(&principal(from), Action::AssignTask, &assignee(to)),
                allowed,
                "{from} -> {to} through can()"
            );
        }
    }

    #[test]
    fn nobody_assigns_to_themselves() {
        for role in Role::ALL {
            let me = principal(*role);
            let target = Target::Assignee { user_id: me.user_id, role: *role };
            assert!(!can(&me, Action::AssignTask, &target), "{role} self-assignment");
        }
    }

    #[test]
    fn task_mutation_follows_participation() {
        let assignor = principal(Role::Lawyer);
        let assignee_p = principal(Role::Attache);
        let outsider = principal(Role::Lawyer);
        let task = Target::Task {
            assignor_id: Some(assignor.user_id),
            assignee_id: Some(assignee_p.user_id),
        };

        assert!(can(&assignor, Action::UpdateTask, &task));
        assert!(can(&assignee_p, Action::UpdateTask, &task));
        assert!(!can(&outsider, Action::UpdateTask, &task));

        assert!(can(&assignor, Action::DeleteTask, &task));
        assert!(!can(&assignee_p, Action::DeleteTask, &task));
        assert!(!can(&outsider, Action::DeleteTask, &task));

        assert!(can(&assignee_p, Action::ViewTask, &task));
        assert!(!can(&outsider, Action::ViewTask, &task));
    }

    #[test]
    fn orphaned_task_cannot_be_deleted() {
        let p = principal(Role::Lawyer);
        let task = Target::Task { assignor_id: None, assignee_id: Some(p.user_id) };
        assert!(!can(&p, Action::DeleteTask, &task));
        assert!(can(&p, Action::UpdateTask, &task));
    }

    #[test]
    fn only_lawyers_create_cases() {
        for role in Role::ALL {
            assert_eq!(
                can(&principal(*role), Action::CreateCase, &Target::None),
                *role == Role::Lawyer
            );
        }
    }

    #[test]
    fn cases_are_readable_by_all_and_writable_by_owner() {
        let owner = principal(Role::Lawyer);
        let case = Target::Case { lawyer_id: Some(owner.user_id) };

        for role in Role::ALL {
            let other = principal(*role);
            assert!(can(&other, Action::ViewCase, &case));
            assert!(!can(&other, Action::UpdateCase, &case));
            assert!(!can(&other, Action::DeleteCase, &case));
        }

        assert!(can(&owner, Action::UpdateCase, &case));
        assert!(can(&owner, Action::DeleteCase, &case));

        let orphan = Target::Case { lawyer_id: None };
        assert!(!can(&owner, Action::UpdateCase, &orphan));
        assert!(can(&owner, Action::ViewCase, &orphan));
    }

    #[test]
    fn document_rules() {
        let owner = principal(Role::Lawyer);
        let other = principal(Role::Secretary);

        assert!(can(&other, Action::UploadDocument, &Target::None));
        let case = Target::Case { lawyer_id: Some(owner.user_id) };
        assert!(can(&owner, Action::UploadDocument, &case));
        assert!(!can(&other, Action::UploadDocument, &case));

        let private = Target::Document { owner_id: owner.user_id, case_id: None };
        assert!(can(&owner, Action::ViewDocument, &private));
        assert!(!can(&other, Action::ViewDocument, &private));

        let linked = Target::Document { owner_id: owner.user_id, case_id: Some(Uuid::new_v4()) };
        assert!(can(&other, Action::ViewDocument, &linked));
    }

    #[test]
    fn mismatched_target_denies() {
        let p = principal(Role::Lawyer);
        assert!(!can(&p, Action::AssignTask, &Target::None));
        assert!(!can(&p, Action::DeleteCase, &Target::None));
        assert!(!can(&p, Action::CreateCase, &Target::Case { lawyer_id: Some(p.user_id) }));
    }

    #[test]
    fn dashboard_scopes_cases_to_lawyers_only() {
        let lawyer = principal(Role::Lawyer);
        assert_eq!(dashboard_case_owner(&lawyer), Some(lawyer.user_id));

        for role in [Role::Secretary, Role::Attache, Role::LegalAssistant] {
            assert_eq!(dashboard_case_owner(&principal(role)), None);
        }
    }
}
