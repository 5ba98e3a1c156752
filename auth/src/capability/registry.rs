use std::collections::BTreeSet;

use super::errors::CapabilityError;
use super::models::Action;
use super::models::Capability;
use super::models::Resource;
use super::models::Role;

/// Ordered set of capabilities granted to a role.
pub type CapabilitySet = BTreeSet<Capability>;

/// One row of the static role table.
///
/// Rows with `allow_edit = false` are declared but not granted.
#[derive(Debug, Clone, Copy)]
struct CapabilityRule {
    resource: Resource,
    action: Action,
    allow_edit: bool,
}

const fn rule(resource: Resource, action: Action, allow_edit: bool) -> CapabilityRule {
    CapabilityRule {
        resource,
        action,
        allow_edit,
    }
}

const USER_RULES: &[CapabilityRule] = &[
    rule(Resource::UserAttrs, Action::Update, true),
    rule(Resource::UserSettings, Action::Update, true),
    rule(Resource::UserPassword, Action::Update, true),
    rule(Resource::Users, Action::Read, false),
];

const ADMIN_RULES: &[CapabilityRule] = &[
    rule(Resource::Users, Action::Read, true),
    rule(Resource::Users, Action::Update, true),
    rule(Resource::Users, Action::Delete, true),
];

fn rules_for(role: Role) -> Vec<&'static [CapabilityRule]> {
    match role {
        Role::User => vec![USER_RULES],
        Role::Admin => vec![USER_RULES, ADMIN_RULES],
    }
}

/// Role to capability mapping, resolved once from the static table.
///
/// Immutable after construction and cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    user: CapabilitySet,
    admin: CapabilitySet,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            user: Self::resolve(Role::User),
            admin: Self::resolve(Role::Admin),
        }
    }

    fn resolve(role: Role) -> CapabilitySet {
        // A grant in any table wins over a withheld row for the same pair.
        rules_for(role)
            .into_iter()
            .flatten()
            .filter(|rule| rule.allow_edit)
            .map(|rule| Capability::new(rule.resource, rule.action))
            .collect()
    }

    /// Capabilities granted to `role`.
    pub fn capabilities_for(&self, role: Role) -> &CapabilitySet {
        match role {
            Role::User => &self.user,
            Role::Admin => &self.admin,
        }
    }

    /// Capabilities granted to the role named `name`.
    ///
    /// # Errors
    /// * `UnknownRole` - No role has this name
    pub fn capabilities_for_name(&self, name: &str) -> Result<&CapabilitySet, CapabilityError> {
        let role: Role = name.parse()?;
        Ok(self.capabilities_for(role))
    }

    /// Pure membership test.
    pub fn has_capability(set: &CapabilitySet, required: &Capability) -> bool {
        set.contains(required)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
