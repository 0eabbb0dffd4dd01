//! Protocol buffer definitions for the async-logger gRPC API

#![allow(clippy::all)]
#![allow(unused_imports)]

// Generated from proto/logger.proto (see build.rs)
include!("logger.rs");
