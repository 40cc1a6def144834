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

use crate::error::ResourceError;
use crate::object::ApiObject;
use std::fmt::Debug;

/// One logical submission queue of a device.
///
/// Queue objects are independent of each other: operations against
/// different queues proceed without cross-queue locking. Operations
/// against the *same* queue from multiple threads are not assumed safe
/// and must be externally serialized by the caller.
pub trait CommandQueue: ApiObject + Debug + Send + Sync {
    /// Index of the native queue family this queue belongs to.
    fn family_index(&self) -> u32;

    /// Blocks until all work submitted to this queue has completed.
    fn wait_idle(&self) -> Result<(), ResourceError>;
}
