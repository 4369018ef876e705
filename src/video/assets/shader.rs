//! Vertex and pixel shader stages. A program is formed at draw time out of the bound pair.

use crate::math::prelude::{Matrix4, Vector2, Vector3, Vector4};

use crate::video::errors::{Error, Result};

impl_handle!(ShaderHandle);

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderParams {
    pub stage: ShaderStage,
}

impl ShaderParams {
    pub fn validate(&self, source: &str) -> Result<()> {
        if source.trim().is_empty() {
            return Err(Error::ShaderCreationFailure(format!(
                "{:?} shader source is empty.",
                self.stage
            )));
        }

        Ok(())
    }
}

/// Uniform variable of a shader stage. Matrices are supplied in column major order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix4f([[f32; 4]; 4]),
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(v.into())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(v.into())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(v.into())
    }
}
