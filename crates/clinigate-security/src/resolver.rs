//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Subject permission resolution over a catalog."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
//! Every operation is a pure function of the borrowed catalog and the
//! caller-supplied subject. A missing subject (`None`) denies every check,
//! ranks at level `0` and holds no permissions.

use indexmap::IndexSet;

use crate::catalog::Catalog;
use crate::rbac::{Permission, Role, MANAGE_USERS};
use crate::subject::Subject;

/// Read-only view answering authorization queries against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct AccessResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> AccessResolver<'a> {
    /// Borrow a catalog for resolution.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Catalog backing this resolver.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    fn resolved_roles<'s>(&self, subject: &'s Subject) -> impl Iterator<Item = &'a Role> + 's
    where
        'a: 's,
    {
        let catalog = self.catalog;
        subject.roles.iter().filter_map(move |id| catalog.role(id))
    }

    /// Direct grant, or any resolvable role that grants the permission.
    pub fn has_permission(&self, subject: Option<&Subject>, permission_id: &str) -> bool {
        let Some(subject) = subject else {
            return false;
        };
        subject.permissions.iter().any(|id| id == permission_id)
            || self
                .resolved_roles(subject)
                .any(|role| role.grants(permission_id))
    }

    /// At least one of the permissions is held. An empty list denies.
    pub fn has_any_permission<S: AsRef<str>>(
        &self,
        subject: Option<&Subject>,
        permission_ids: &[S],
    ) -> bool {
        permission_ids
            .iter()
            .any(|id| self.has_permission(subject, id.as_ref()))
    }

    /// Every one of the permissions is held. An empty list is satisfied.
    pub fn has_all_permissions<S: AsRef<str>>(
        &self,
        subject: Option<&Subject>,
        permission_ids: &[S],
    ) -> bool {
        permission_ids
            .iter()
            .all(|id| self.has_permission(subject, id.as_ref()))
    }

    /// Literal membership of `role_id` in the subject's assigned roles.
    ///
    /// Unlike catalog lookups this comparison is case-sensitive.
    pub fn has_role(&self, subject: Option<&Subject>, role_id: &str) -> bool {
        subject.is_some_and(|subject| subject.roles.iter().any(|id| id == role_id))
    }

    /// At least one of the roles is assigned.
    pub fn has_any_role<S: AsRef<str>>(&self, subject: Option<&Subject>, role_ids: &[S]) -> bool {
        role_ids.iter().any(|id| self.has_role(subject, id.as_ref()))
    }

    /// Highest hierarchy among resolvable roles, `0` when none resolve.
    pub fn user_hierarchy_level(&self, subject: Option<&Subject>) -> u32 {
        subject
            .and_then(|subject| self.resolved_roles(subject).map(|role| role.hierarchy).max())
            .unwrap_or(0)
    }

    /// Union of direct grants and role-derived permission ids.
    ///
    /// Direct ids come first, then role grants in role order. Ids are not
    /// checked against the catalog here.
    pub fn effective_permission_ids<'s>(&self, subject: Option<&'s Subject>) -> IndexSet<&'s str>
    where
        'a: 's,
    {
        let mut ids = IndexSet::new();
        if let Some(subject) = subject {
            ids.extend(subject.permissions.iter().map(String::as_str));
            for role in self.resolved_roles(subject) {
                ids.extend(role.permissions.iter().map(String::as_str));
            }
        }
        ids
    }

    /// Effective permissions resolved to catalog records, in catalog order.
    ///
    /// Ids unknown to the catalog are dropped.
    pub fn user_permissions(&self, subject: Option<&Subject>) -> Vec<&'a Permission> {
        let ids = self.effective_permission_ids(subject);
        if ids.is_empty() {
            return Vec::new();
        }
        self.catalog
            .permissions()
            .filter(|permission| ids.contains(permission.id.as_str()))
            .collect()
    }

    /// `acting` outranks `target` strictly and holds `manage_users`.
    pub fn can_manage_user(&self, acting: Option<&Subject>, target: Option<&Subject>) -> bool {
        if acting.is_none() || target.is_none() {
            return false;
        }
        self.user_hierarchy_level(acting) > self.user_hierarchy_level(target)
            && self.has_permission(acting, MANAGE_USERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::clinical_default().unwrap()
    }

    #[test]
    fn empty_subject_is_denied_everything() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::default();
        for permission in catalog.permissions() {
            assert!(!resolver.has_permission(Some(&subject), &permission.id));
            assert!(!resolver.has_permission(None, &permission.id));
        }
        assert_eq!(resolver.user_hierarchy_level(Some(&subject)), 0);
        assert!(resolver.user_permissions(Some(&subject)).is_empty());
    }

    #[test]
    fn absent_subject_fails_closed() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        assert!(!resolver.has_role(None, "NURSE"));
        assert!(!resolver.has_any_role(None, &["NURSE"]));
        assert!(!resolver.has_any_permission(None, &["view_patient_data"]));
        assert!(!resolver.has_all_permissions(None, &["view_patient_data"]));
        assert_eq!(resolver.user_hierarchy_level(None), 0);
        assert!(resolver.user_permissions(None).is_empty());
        assert!(resolver.effective_permission_ids(None).is_empty());
    }

    #[test]
    fn pharmacist_scenario() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::with_roles(["pharmacist"]);
        assert!(!resolver.has_permission(Some(&subject), "prescribe_medications"));
        assert!(resolver.has_permission(Some(&subject), "view_patient_data"));
    }

    #[test]
    fn direct_grant_without_roles() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::default().granting(["view_audit_logs"]);
        assert!(resolver.has_permission(Some(&subject), "view_audit_logs"));
        assert_eq!(resolver.user_hierarchy_level(Some(&subject)), 0);
    }

    #[test]
    fn vacuous_quantifiers() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let none: [&str; 0] = [];
        for subject in [Subject::default(), Subject::with_roles(["super_admin"])] {
            assert!(!resolver.has_any_permission(Some(&subject), &none));
            assert!(resolver.has_all_permissions(Some(&subject), &none));
        }
    }

    #[test]
    fn any_and_all_permissions() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let nurse = Subject::with_roles(["NURSE"]);
        assert!(resolver.has_any_permission(
            Some(&nurse),
            &["prescribe_medications", "view_patient_data"]
        ));
        assert!(!resolver.has_all_permissions(
            Some(&nurse),
            &["prescribe_medications", "view_patient_data"]
        ));
        assert!(resolver.has_all_permissions(
            Some(&nurse),
            &["view_patient_data", "conduct_assessments"]
        ));
    }

    #[test]
    fn catalog_lookup_ignores_case_but_membership_does_not() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::with_roles(["oncologist"]);
        assert!(resolver.has_permission(Some(&subject), "manage_protocols"));
        assert!(!resolver.has_role(Some(&subject), "ONCOLOGIST"));
        assert!(resolver.has_role(Some(&subject), "oncologist"));
        assert!(resolver.has_any_role(Some(&subject), &["NURSE", "oncologist"]));
        assert!(!resolver.has_any_role(Some(&subject), &["NURSE", "ONCOLOGIST"]));
    }

    #[test]
    fn hierarchy_is_max_of_resolved_roles() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::with_roles(["nurse", "unknown", "Pharmacist"]);
        assert_eq!(resolver.user_hierarchy_level(Some(&subject)), 60);
        let unresolved = Subject::with_roles(["surgeon"]);
        assert_eq!(resolver.user_hierarchy_level(Some(&unresolved)), 0);
    }

    #[test]
    fn user_permissions_is_deduplicated_union() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::with_roles(["viewer", "ghost_role"])
            .granting(["view_audit_logs", "view_protocols", "not_a_permission"]);
        let ids: Vec<_> = resolver
            .user_permissions(Some(&subject))
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["view_protocols", "view_audit_logs"]);

        let effective = resolver.effective_permission_ids(Some(&subject));
        assert_eq!(
            effective.into_iter().collect::<Vec<_>>(),
            vec!["view_audit_logs", "view_protocols", "not_a_permission"]
        );
    }

    #[test]
    fn management_requires_rank_and_capability() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let admin = Subject::with_roles(["super_admin"]);
        let nurse = Subject::with_roles(["nurse"]);
        assert!(resolver.can_manage_user(Some(&admin), Some(&nurse)));
        assert!(!resolver.can_manage_user(Some(&nurse), Some(&admin)));

        let peer = Subject::with_roles(["SUPER_ADMIN"]);
        assert!(!resolver.can_manage_user(Some(&admin), Some(&peer)));

        // outranks a nurse but lacks manage_users
        let oncologist = Subject::with_roles(["oncologist"]);
        assert!(!resolver.can_manage_user(Some(&oncologist), Some(&nurse)));

        // holds the capability directly but shares the target's rank
        let lateral = Subject::with_roles(["nurse"]).granting(["manage_users"]);
        assert!(!resolver.can_manage_user(Some(&lateral), Some(&nurse)));

        assert!(!resolver.can_manage_user(Some(&admin), None));
        assert!(!resolver.can_manage_user(None, Some(&nurse)));
    }

    #[test]
    fn repeated_queries_are_stable() {
        let catalog = catalog();
        let resolver = AccessResolver::new(&catalog);
        let subject = Subject::with_roles(["physician"]).granting(["export_data"]);
        let first = resolver.user_permissions(Some(&subject));
        for _ in 0..3 {
            assert_eq!(resolver.user_permissions(Some(&subject)), first);
            assert_eq!(resolver.user_hierarchy_level(Some(&subject)), 70);
        }
    }
}
