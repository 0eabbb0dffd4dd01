//! ACL tables built from the JSON configuration payload

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use tracing::debug;

use super::{AclError, FullMethod, ServiceGroup, WILDCARD};

/// One permission: `consumer` may call `method` on `service`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub consumer: String,
    pub service: String,
    /// Method name, or [`WILDCARD`]
    pub method: String,
}

impl AclEntry {
    /// Whether this entry grants `service`/`method`
    pub fn permits(&self, service: &str, method: &str) -> bool {
        self.service == service && (self.method == method || self.method == WILDCARD)
    }
}

/// Per-consumer permissions for a single service group
#[derive(Debug, Clone)]
pub struct AclTable {
    group: ServiceGroup,
    entries: HashMap<String, Vec<AclEntry>>,
}

impl AclTable {
    /// Create an empty table for `group`
    pub fn new(group: ServiceGroup) -> Self {
        Self {
            group,
            entries: HashMap::new(),
        }
    }

    pub fn group(&self) -> ServiceGroup {
        self.group
    }

    /// Returns true iff `consumer` holds an entry matching `service` and
    /// either `method` exactly or the wildcard.
    pub fn lookup(&self, consumer: &str, service: &str, method: &str) -> bool {
        self.entries
            .get(consumer)
            .map(|entries| entries.iter().any(|e| e.permits(service, method)))
            .unwrap_or(false)
    }

    /// Entries for a consumer in configuration order
    pub fn entries(&self, consumer: &str) -> &[AclEntry] {
        self.entries.get(consumer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of consumers with at least one entry
    pub fn consumer_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: AclEntry) {
        self.entries
            .entry(entry.consumer.clone())
            .or_default()
            .push(entry);
    }
}

/// The business and admin tables built from one payload
#[derive(Debug, Clone)]
pub struct AclTables {
    pub business: AclTable,
    pub admin: AclTable,
}

impl AclTables {
    /// Parse a JSON payload of the form `{"consumer": ["/pkg.Svc/Method", ...]}`.
    ///
    /// Any malformed entry aborts the whole build.
    pub fn parse(payload: &str) -> Result<Self, AclError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(payload)?;

        let mut tables = Self {
            business: AclTable::new(ServiceGroup::Business),
            admin: AclTable::new(ServiceGroup::Admin),
        };

        for (consumer, methods) in raw {
            for full_name in methods {
                let parsed = FullMethod::parse(&full_name)?;
                let group = ServiceGroup::from_service_name(parsed.service).ok_or_else(|| {
                    AclError::UnknownService {
                        consumer: consumer.clone(),
                        entry: full_name.clone(),
                        service: parsed.service.to_string(),
                    }
                })?;

                let entry = AclEntry {
                    consumer: consumer.clone(),
                    service: parsed.service.to_string(),
                    method: parsed.method.to_string(),
                };
                tables.table_mut(group).push(entry);
            }
        }

        debug!(
            business_consumers = tables.business.consumer_count(),
            admin_consumers = tables.admin.consumer_count(),
            "ACL tables built"
        );

        Ok(tables)
    }

    /// Table governing `group`
    pub fn table(&self, group: ServiceGroup) -> &AclTable {
        match group {
            ServiceGroup::Business => &self.business,
            ServiceGroup::Admin => &self.admin,
        }
    }

    fn table_mut(&mut self, group: ServiceGroup) -> &mut AclTable {
        match group {
            ServiceGroup::Business => &mut self.business,
            ServiceGroup::Admin => &mut self.admin,
        }
    }
}

impl FromStr for AclTables {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
