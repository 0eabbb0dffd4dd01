//! Full gRPC method name parsing

use super::{AclError, WILDCARD};

/// A parsed `/<package>.<service>/<method>` name
///
/// The package is optional: `/Biz/Check` parses with an empty package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullMethod<'a> {
    pub package: &'a str,
    pub service: &'a str,
    pub method: &'a str,
}

impl<'a> FullMethod<'a> {
    /// Split a full method name into its components.
    ///
    /// The leading `/` may be omitted. Exactly two non-empty path segments
    /// are required.
    pub fn parse(name: &'a str) -> Result<Self, AclError> {
        let invalid = || AclError::InvalidMethod(name.to_string());

        let path = name.strip_prefix('/').unwrap_or(name);
        let (qualified, method) = path.split_once('/').ok_or_else(invalid)?;

        if method.is_empty() || method.contains('/') {
            return Err(invalid());
        }

        let (package, service) = match qualified.rsplit_once('.') {
            Some((package, service)) => (package, service),
            None => ("", qualified),
        };

        if service.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            package,
            service,
            method,
        })
    }

    /// Whether the method component is the wildcard
    pub fn is_wildcard(&self) -> bool {
        self.method == WILDCARD
    }
}
