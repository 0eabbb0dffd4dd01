//! gRPC Biz service implementation
//!
//! The business methods carry no logic of their own. Authorization and
//! telemetry happen in the interceptor before a handler runs.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use crate::acl::{AclTable, AclTables, ServiceGroup};
use crate::auth::{AuthorizedCallExt, Governed};
use crate::hub::TelemetryHub;
use crate::proto::{biz_server::Biz, Nothing};

/// gRPC Biz service implementation
pub struct BizService {
    acl: Arc<AclTables>,
    hub: Arc<TelemetryHub>,
}

impl BizService {
    pub fn new(acl: Arc<AclTables>, hub: Arc<TelemetryHub>) -> Self {
        Self { acl, hub }
    }

    fn handle(&self, name: &str, request: &Request<Nothing>) -> Result<Response<Nothing>, Status> {
        debug!(consumer = ?request.consumer(), method = name, "Processing Biz request");
        Ok(Response::new(Nothing::default()))
    }
}

impl Governed for BizService {
    fn service_group(&self) -> ServiceGroup {
        ServiceGroup::Business
    }

    fn acl_table(&self) -> &AclTable {
        &self.acl.business
    }

    fn telemetry(&self) -> &Arc<TelemetryHub> {
        &self.hub
    }
}

#[tonic::async_trait]
impl Biz for BizService {
    async fn check(&self, request: Request<Nothing>) -> Result<Response<Nothing>, Status> {
        self.handle("Check", &request)
    }

    async fn add(&self, request: Request<Nothing>) -> Result<Response<Nothing>, Status> {
        self.handle("Add", &request)
    }

    async fn test(&self, request: Request<Nothing>) -> Result<Response<Nothing>, Status> {
        self.handle("Test", &request)
    }
}
