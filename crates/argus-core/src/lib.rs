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

//! # Argus Core
//!
//! Foundational crate containing the capability-based GPU object model that
//! the Argus backends implement and the effect runtime and addons consume.
//!
//! This crate defines the "common language" for all native graphics
//! backends: opaque [`api`] handles and descriptors, the [`ApiObject`]
//! metadata channel, the [`GraphicsDevice`] capability trait, and the
//! handle-addressed bookkeeping machinery ([`ObjectRegistry`],
//! [`DescriptorPoolRing`], [`RenderPassCache`]) shared by every backend.
//! The 'how' is handled by a concrete backend crate (e.g. `argus-vulkan`)
//! which implements these traits; consumers use them without needing to
//! know which underlying driver is active.

#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod object;
pub mod pass_cache;
pub mod registry;
pub mod traits;
pub mod transient;
pub mod utils;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{PipelineError, ResourceError};
pub use self::object::{ApiObject, ApiObjectWrapper, Guid, MetadataStore, NativeHandle};
pub use self::pass_cache::RenderPassCache;
pub use self::registry::{AnyObjectRegistry, ObjectKind, ObjectRegistry};
pub use self::traits::{CommandQueue, GraphicsDevice};
pub use self::transient::DescriptorPoolRing;
