//! Decoding of pod group display names
//!
//! Turbonomic names pod groups `<Type>/<namespace>/<name> Pods`, for example
//! `Deployment/payments/api Pods`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suffix Turbonomic appends to pod group display names
pub const POD_GROUP_SUFFIX: &str = " Pods";

const SEGMENT_COUNT: usize = 3;

/// Reasons a display name cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadNameError {
    #[error("expected 3 '/'-separated segments in {name:?}, found {found}")]
    SegmentCount { name: String, found: usize },

    #[error("empty segment in {name:?}")]
    EmptySegment { name: String },
}

/// Kubernetes workload identity decoded from a pod group display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadName {
    pub resource_type: String,
    pub namespace: String,
    pub name: String,
}

impl WorkloadName {
    /// Decode a pod group display name, stripping the trailing ` Pods` suffix
    pub fn parse(display_name: &str) -> Result<Self, WorkloadNameError> {
        let trimmed = display_name
            .strip_suffix(POD_GROUP_SUFFIX)
            .unwrap_or(display_name);

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(WorkloadNameError::SegmentCount {
                name: display_name.to_string(),
                found: segments.len(),
            });
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(WorkloadNameError::EmptySegment {
                name: display_name.to_string(),
            });
        }

        Ok(Self {
            resource_type: segments[0].to_string(),
            namespace: segments[1].to_string(),
            name: segments[2].to_string(),
        })
    }
}

impl FromStr for WorkloadName {
    type Err = WorkloadNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.resource_type, self.namespace, self.name)
    }
}
