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

//! Render-pass begin records and the cache key they are stored under.

use argus_core::api::{Format, ResourceView};
use ash::vk;

/// How an attachment's previous contents are handled when the pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentLoadOp {
    /// Preserve the previous contents.
    Load,
    /// Clear to a constant value.
    Clear,
    /// Previous contents are irrelevant.
    DontCare,
}

impl AttachmentLoadOp {
    pub(crate) fn into_vk(self) -> vk::AttachmentLoadOp {
        match self {
            AttachmentLoadOp::Load => vk::AttachmentLoadOp::LOAD,
            AttachmentLoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
            AttachmentLoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
        }
    }
}

/// Whether an attachment's contents survive the end of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentStoreOp {
    /// Write results out to the attachment.
    Store,
    /// Results are irrelevant after the pass.
    DontCare,
}

impl AttachmentStoreOp {
    pub(crate) fn into_vk(self) -> vk::AttachmentStoreOp {
        match self {
            AttachmentStoreOp::Store => vk::AttachmentStoreOp::STORE,
            AttachmentStoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
        }
    }
}

/// One attachment of a render pass request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPassAttachment {
    /// The view bound as the attachment.
    pub view: ResourceView,
    /// Load behavior at pass begin.
    pub load_op: AttachmentLoadOp,
    /// Store behavior at pass end.
    pub store_op: AttachmentStoreOp,
}

/// The full attachment configuration of a requested render pass.
///
/// This doubles as the cache key: it derives `Hash`/`Eq` over every
/// field, so two requests share a cached begin record exactly when their
/// configurations are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RenderPassDesc {
    /// Color attachments, in attachment order.
    pub render_targets: Vec<RenderPassAttachment>,
    /// Optional depth/stencil attachment.
    pub depth_stencil: Option<RenderPassAttachment>,
    /// Samples per pixel of every attachment.
    pub samples: u32,
}

/// The key the render-pass cache is addressed by: the attachment
/// configuration plus the formats resolved from the view records (the
/// same views re-created with a different format must not alias).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RenderPassKey {
    pub desc: RenderPassDesc,
    pub formats: Vec<Format>,
}

/// A cached, ready-to-begin render pass: the expensive native objects
/// plus the area they cover.
#[derive(Debug)]
pub struct RenderPassBegin {
    /// The native render pass.
    pub render_pass: vk::RenderPass,
    /// The framebuffer binding the attachment views.
    pub framebuffer: vk::Framebuffer,
    /// The full render area of the framebuffer.
    pub render_area: vk::Rect2D,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(samples: u32, format: Format) -> RenderPassKey {
        RenderPassKey {
            desc: RenderPassDesc {
                render_targets: vec![RenderPassAttachment {
                    view: ResourceView(0x10),
                    load_op: AttachmentLoadOp::Clear,
                    store_op: AttachmentStoreOp::Store,
                }],
                depth_stencil: None,
                samples,
            },
            formats: vec![format],
        }
    }

    #[test]
    fn identical_configurations_compare_equal() {
        assert_eq!(key(1, Format::R8G8B8A8Unorm), key(1, Format::R8G8B8A8Unorm));
    }

    #[test]
    fn sample_count_and_format_distinguish_keys() {
        assert_ne!(key(1, Format::R8G8B8A8Unorm), key(4, Format::R8G8B8A8Unorm));
        assert_ne!(
            key(1, Format::R8G8B8A8Unorm),
            key(1, Format::R16G16B16A16Float)
        );

        // Same views with a different load op are a different pass.
        let mut other = key(1, Format::R8G8B8A8Unorm);
        other.desc.render_targets[0].load_op = AttachmentLoadOp::Load;
        assert_ne!(key(1, Format::R8G8B8A8Unorm), other);
    }
}
