//! Vertex and index buffers owned by frontend objects.

use crate::video::assets::prelude::*;
use crate::video::errors::Result;
use crate::video::system::{SharedReleases, VideoSystem};

/// A GPU buffer. Dropping it releases the underlying buffer object at the next frame
/// boundary.
pub struct Buffer {
    handle: BufferHandle,
    params: BufferParams,
    releases: SharedReleases,
}

impl Buffer {
    pub fn new(video: &mut VideoSystem, params: BufferParams, data: Option<&[u8]>) -> Result<Self> {
        let handle = video.create_buffer(params, data)?;
        Ok(Buffer {
            handle,
            params,
            releases: video.releases(),
        })
    }

    /// Creates a dynamic vertex buffer of `size` bytes.
    pub fn vertex(video: &mut VideoSystem, size: usize) -> Result<Self> {
        let params = BufferParams {
            kind: BufferKind::Vertex,
            hint: BufferHint::Dynamic,
            size,
        };

        Buffer::new(video, params, None)
    }

    /// Creates an immutable index buffer of 16-bit `indices`.
    pub fn index(video: &mut VideoSystem, indices: &[u16]) -> Result<Self> {
        let mut bytes = Vec::with_capacity(indices.len() * 2);
        for v in indices {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let params = BufferParams {
            kind: BufferKind::Index,
            hint: BufferHint::Immutable,
            size: bytes.len(),
        };

        Buffer::new(video, params, Some(&bytes))
    }

    #[inline]
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.params.kind
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.params.size
    }

    #[inline]
    pub fn update(&self, video: &mut VideoSystem, bytes: &[u8]) -> Result<()> {
        video.update_buffer(self.handle, bytes)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.releases.borrow_mut().buffers.push(self.handle);
    }
}
