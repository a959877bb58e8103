//! Profile types
//!
//! User profiles keyed by the identity provider's user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role; fixed at sign-up and never transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Agent,
}

crate::impl_domain_enum_conversions!(Role {
    Customer => "customer",
    Agent => "agent"
});

impl Role {
    /// Whether this role carries agent privileges
    pub const fn is_agent(self) -> bool {
        matches!(self, Self::Agent)
    }
}

/// User profile stored alongside tickets
///
/// Exactly one profile exists per identity; the id equals the identity
/// provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    /// Not collected at sign-up; populated later, if at all
    pub full_name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::from_str("AGENT").unwrap(), Role::Agent);
        assert_eq!(Role::from_str("Customer").unwrap(), Role::Customer);
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn test_agent_privileges() {
        assert!(Role::Agent.is_agent());
        assert!(!Role::Customer.is_agent());
    }
}
