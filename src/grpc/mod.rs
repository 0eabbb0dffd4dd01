//! gRPC service implementations
//!
//! `Biz` and `Admin` are each wrapped in an [`AclLayer`] that authorizes the
//! call and publishes it to the telemetry hub before the handler runs.

mod admin;
mod biz;
mod interceptor;

pub use admin::AdminService;
pub use biz::BizService;
pub use interceptor::{AclLayer, AclService, UNKNOWN_HOST};
