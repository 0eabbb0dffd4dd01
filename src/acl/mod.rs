//! Access control lists for gRPC consumers
//!
//! An ACL payload maps consumer names to the fully-qualified methods they may
//! call:
//!
//! ```json
//! {
//!     "logger":    ["/logger.Admin/Logging"],
//!     "biz_admin": ["/logger.Biz/*"]
//! }
//! ```
//!
//! The payload is parsed once at startup into one [`AclTable`] per
//! [`ServiceGroup`]. Tables are immutable afterwards and are shared between
//! request handlers without locking.
//!
//! A method component of `*` grants every method of the named service.

mod method;
mod table;

pub use method::FullMethod;
pub use table::{AclEntry, AclTable, AclTables};

use std::fmt;

/// Method component granting access to every method of a service
pub const WILDCARD: &str = "*";

/// The two service groups an ACL payload may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceGroup {
    /// Business service (`Biz`)
    Business,
    /// Administrative service (`Admin`)
    Admin,
}

impl ServiceGroup {
    /// Resolve a bare service name (without package) to its group
    pub fn from_service_name(name: &str) -> Option<Self> {
        match name {
            "Biz" => Some(Self::Business),
            "Admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Bare service name as it appears in full method names
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Business => "Biz",
            Self::Admin => "Admin",
        }
    }

    /// Methods implemented by the group's service
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            Self::Business => &["Check", "Add", "Test"],
            Self::Admin => &["Logging", "Statistics"],
        }
    }
}

impl fmt::Display for ServiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

/// Errors raised while building ACL tables
///
/// Every variant is fatal: the service must not start with a partial table.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("invalid ACL payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid method name {0:?}, expected /<package>.<service>/<method>")]
    InvalidMethod(String),

    #[error("unknown service {service:?} in ACL entry {entry:?} for consumer {consumer:?}")]
    UnknownService {
        consumer: String,
        entry: String,
        service: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_group_names() {
        assert_eq!(ServiceGroup::from_service_name("Biz"), Some(ServiceGroup::Business));
        assert_eq!(ServiceGroup::from_service_name("Admin"), Some(ServiceGroup::Admin));
        assert_eq!(ServiceGroup::from_service_name("biz"), None);
        assert_eq!(ServiceGroup::Admin.to_string(), "Admin");
        assert!(ServiceGroup::Business.methods().contains(&"Test"));
        assert!(!ServiceGroup::Admin.methods().contains(&"Check"));
    }
}
