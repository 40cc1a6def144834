// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the object model.
//!
//! Native creation failures surface as an `Err` carrying one of these
//! types; the out-handle the caller asked for is never produced and no
//! side-data is registered for it. Caller-contract violations (stale or
//! null handles on lookup-style calls) are not errors: those calls return
//! `Option`/no-op instead.

use crate::registry::ObjectKind;
use std::fmt;

/// An error related to the creation of a pipeline state object or layout.
#[derive(Debug)]
pub enum PipelineError {
    /// The backend failed to compile the full pipeline state object.
    CreationFailed {
        /// A descriptive label for the pipeline, if one was set.
        label: Option<String>,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// Failed to create a pipeline layout from the provided parameters.
    LayoutCreationFailed(String),
    /// A subobject combination is not expressible on this backend.
    InvalidSubobject {
        /// Description of the offending subobject.
        subobject: String,
    },
    /// A required graphics feature is not supported by the device.
    FeatureNotSupported(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::CreationFailed { label, details } => {
                write!(
                    f,
                    "Pipeline creation failed for '{}': {}",
                    label.as_deref().unwrap_or("Unknown"),
                    details
                )
            }
            PipelineError::LayoutCreationFailed(msg) => {
                write!(f, "Pipeline layout creation failed: {msg}")
            }
            PipelineError::InvalidSubobject { subobject } => {
                write!(f, "Invalid pipeline subobject: {subobject}")
            }
            PipelineError::FeatureNotSupported(msg) => {
                write!(f, "Feature not supported: {msg}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU object
/// (resources, views, samplers, descriptor sets, query pools).
#[derive(Debug)]
pub enum ResourceError {
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// The driver refused to create an object of the given kind.
    CreationFailed {
        /// The kind of object that failed to create.
        kind: ObjectKind,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// The device or host ran out of memory for the allocation.
    OutOfMemory,
    /// The handle used to reference an object is the null sentinel or
    /// was never registered with this device.
    InvalidHandle,
    /// The format/usage combination is not supported by the device.
    UnsupportedFormat {
        /// Human-readable description of the rejected combination.
        details: String,
    },
    /// Results were requested before the GPU finished producing them.
    NotReady,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::CreationFailed { kind, details } => {
                write!(f, "Failed to create {kind:?}: {details}")
            }
            ResourceError::OutOfMemory => write!(f, "Out of memory for the requested allocation."),
            ResourceError::InvalidHandle => write!(f, "Invalid object handle."),
            ResourceError::UnsupportedFormat { details } => {
                write!(f, "Unsupported format/usage combination: {details}")
            }
            ResourceError::NotReady => write!(f, "Results are not ready yet."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::CreationFailed {
            label: Some("BlitPipeline".to_string()),
            details: "stage count mismatch".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Pipeline creation failed for 'BlitPipeline': stage count mismatch"
        );

        let err_layout = PipelineError::LayoutCreationFailed("too many ranges".to_string());
        assert_eq!(
            format!("{err_layout}"),
            "Pipeline layout creation failed: too many ranges"
        );
    }

    #[test]
    fn resource_error_display_wrapping_pipeline_error() {
        let pipe_err = PipelineError::FeatureNotSupported("geometry shaders".to_string());
        let res_err: ResourceError = pipe_err.into();
        assert_eq!(
            format!("{res_err}"),
            "Pipeline resource error: Feature not supported: geometry shaders"
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn resource_error_display_creation_failed() {
        let err = ResourceError::CreationFailed {
            kind: ObjectKind::Resource,
            details: "VK_ERROR_OUT_OF_DEVICE_MEMORY".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to create Resource: VK_ERROR_OUT_OF_DEVICE_MEMORY"
        );
        assert!(err.source().is_none());
    }
}
