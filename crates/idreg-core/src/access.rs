//! Role-based access control
//!
//! A small capability table: roles are an explicit enum and membership is a
//! set of addresses per role.

use crate::errors::AccessError;
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Privileged roles recognised by the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Configures parameters and pauses
    Owner,
    /// Name registry administration
    Admin,
    /// Grants storage credits
    Operator,
    /// Withdraws collected fees
    Treasurer,
    /// Reclaims names
    Moderator,
    /// Registers names during the trusted-only phase
    Trusted,
}

/// Role membership table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControl {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a single owner
    pub fn with_owner(owner: Address) -> Self {
        let mut access = Self::new();
        access.grant(Role::Owner, owner);
        access
    }

    /// Builder-style grant
    pub fn granting(mut self, role: Role, subject: Address) -> Self {
        self.grant(role, subject);
        self
    }

    /// Grant `role` to `subject`; returns false if already granted
    pub fn grant(&mut self, role: Role, subject: Address) -> bool {
        self.members.entry(role).or_default().insert(subject)
    }

    /// Revoke `role` from `subject`; returns false if not granted
    pub fn revoke(&mut self, role: Role, subject: Address) -> bool {
        self.members
            .get_mut(&role)
            .map(|set| set.remove(&subject))
            .unwrap_or(false)
    }

    /// Whether `subject` holds `role`
    pub fn has_role(&self, subject: &Address, role: Role) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(subject))
    }

    /// Whether `subject` holds any of `roles`
    pub fn has_any(&self, subject: &Address, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(subject, *role))
    }

    /// Fail unless `subject` holds `role`
    pub fn require(&self, subject: &Address, role: Role) -> Result<(), AccessError> {
        if self.has_role(subject, role) {
            Ok(())
        } else {
            tracing::warn!(subject = %subject, ?role, "privileged call refused");
            Err(AccessError::MissingRole {
                subject: *subject,
                role,
            })
        }
    }

    /// Fail unless `subject` holds one of `roles`; reports the first role
    pub fn require_any(&self, subject: &Address, roles: &[Role]) -> Result<(), AccessError> {
        if self.has_any(subject, roles) {
            return Ok(());
        }
        let role = roles.first().copied().unwrap_or(Role::Owner);
        tracing::warn!(subject = %subject, ?roles, "privileged call refused");
        Err(AccessError::MissingRole {
            subject: *subject,
            role,
        })
    }

    /// Members of `role`
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members.get(&role).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn grant_and_revoke() {
        let alice = Address::repeat_byte(1);
        let mut access = AccessControl::new();
        assert!(!access.has_role(&alice, Role::Operator));
        assert!(access.grant(Role::Operator, alice));
        assert!(!access.grant(Role::Operator, alice));
        assert!(access.has_role(&alice, Role::Operator));
        assert!(!access.has_role(&alice, Role::Owner));
        assert!(access.revoke(Role::Operator, alice));
        assert!(!access.has_role(&alice, Role::Operator));
    }

    #[test]
    fn require_reports_missing_role() {
        let access = AccessControl::with_owner(Address::repeat_byte(1));
        let stranger = Address::repeat_byte(9);
        assert_matches!(
            access.require(&stranger, Role::Owner),
            Err(AccessError::MissingRole { role: Role::Owner, .. })
        );
        assert!(access.require_any(&Address::repeat_byte(1), &[Role::Treasurer, Role::Owner]).is_ok());
    }
}
