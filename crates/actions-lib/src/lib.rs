//! Library for correlating Turbonomic actions with Kubernetes pod groups
//!
//! This crate provides the core functionality for:
//! - Cursor-based pagination over the Turbonomic REST API
//! - Bounded-concurrency fan-out for per-group lookups
//! - Pod group expansion through supply-chain membership
//! - Correlation of pending actions with pod groups
//! - Structured logging of run events

pub mod api;
pub mod bounded;
pub mod correlate;
pub mod models;
pub mod observability;
pub mod paginate;
pub mod pipeline;
pub mod workload;

pub use api::{ClientConfig, Credentials, MonitoringApi, Page, Session, TurboClient};
pub use correlate::{correlate_actions, ActionIndex};
pub use models::*;
pub use observability::StructuredLogger;
pub use paginate::{PageInfo, Paginator};
pub use pipeline::{collect_container_actions, PipelineOptions};
pub use workload::{WorkloadName, WorkloadNameError};
