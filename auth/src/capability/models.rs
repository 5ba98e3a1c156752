use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use super::errors::CapabilityError;

/// Role assigned to a user account.
///
/// Closed set: a role that is not listed here cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CapabilityError::UnknownRole(s.to_string()))
    }
}

/// Thing a capability grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    UserAttrs,
    UserSettings,
    UserPassword,
    Users,
}

impl Resource {
    const ALL: [Resource; 4] = [
        Resource::UserAttrs,
        Resource::UserSettings,
        Resource::UserPassword,
        Resource::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::UserAttrs => "user_attrs",
            Resource::UserSettings => "user_settings",
            Resource::UserPassword => "user_password",
            Resource::Users => "users",
        }
    }
}

/// Operation a capability permits on its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// A permitted (resource, action) pair.
///
/// Rendered on the wire as `"resource:action"`, e.g. `user_attrs:update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability {
    pub resource: Resource,
    pub action: Action,
}

impl Capability {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

impl FromStr for Capability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CapabilityError::InvalidCapability(s.to_string());

        let (resource, action) = s.split_once(':').ok_or_else(invalid)?;
        let resource = Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == resource)
            .ok_or_else(invalid)?;
        let action = Action::ALL
            .into_iter()
            .find(|a| a.as_str() == action)
            .ok_or_else(invalid)?;

        Ok(Self { resource, action })
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_display_and_parse() {
        let capability = Capability::new(Resource::UserAttrs, Action::Update);
        assert_eq!(capability.to_string(), "user_attrs:update");
        assert_eq!("user_attrs:update".parse::<Capability>().unwrap(), capability);
    }

    #[test]
    fn test_capability_parse_rejects_garbage() {
        for raw in ["", "user_attrs", "user_attrs:", ":update", "user_attrs:fly", "a:b:c"] {
            assert!(
                matches!(
                    raw.parse::<Capability>(),
                    Err(CapabilityError::InvalidCapability(_))
                ),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn test_capability_serializes_as_string() {
        let capability = Capability::new(Resource::Users, Action::Delete);
        let json = serde_json::to_string(&capability).unwrap();
        assert_eq!(json, "\"users:delete\"");

        let back: Capability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, capability);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!(
            "root".parse::<Role>(),
            Err(CapabilityError::UnknownRole(name)) if name == "root"
        ));
    }
}
