//! Vertex and index buffer objects.

use crate::video::errors::{Error, Result};

impl_handle!(BufferHandle);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferKind {
    Vertex,
    /// 16-bit indices.
    Index,
}

/// Hint abouts the intended update strategy of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferHint {
    /// Initialized with data and cannot be changed later.
    Immutable,
    /// Re-written by the CPU, usually once or more per frame.
    Dynamic,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BufferParams {
    pub kind: BufferKind,
    pub hint: BufferHint,
    /// Size in bytes.
    pub size: usize,
}

impl BufferParams {
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        if self.size == 0 {
            return Err(Error::ResourceCreationFailure(
                "Buffer must not be empty.".into(),
            ));
        }

        if let Some(buf) = data {
            if buf.len() > self.size {
                return Err(Error::OutOfBounds);
            }
        }

        if data.is_none() && self.hint == BufferHint::Immutable {
            return Err(Error::ResourceCreationFailure(
                "Immutable buffer must be initialized with data.".into(),
            ));
        }

        Ok(())
    }
}
