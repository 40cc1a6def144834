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

//! The native-object abstraction: every handle-like object a backend
//! exposes carries a uniform capability surface, made of its raw native
//! handle plus a GUID-keyed metadata channel that external code (addons,
//! the effect runtime) can attach arbitrary 64-bit values to.
//!
//! - [`MetadataStore`]: the per-object GUID → value mapping.
//! - [`ApiObjectWrapper`]: pairs one native handle with one store.
//! - [`ApiObject`]: the capability trait concrete device/queue types
//!   implement by delegating to their embedded wrapper.

mod metadata;
mod wrapper;

pub use self::metadata::{Guid, MetadataStore};
pub use self::wrapper::{ApiObject, ApiObjectWrapper, NativeHandle};
