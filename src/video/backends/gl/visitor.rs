use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::math::prelude::{Color, Matrix4, Vector2};
use crate::utils::prelude::DataVec;

use super::super::super::assets::prelude::*;
use super::super::super::convention::{Convention, NativeRect};
use super::super::super::state::{AddressMode, BlendMode, Filtering, PrimitiveMode};
use super::super::super::MAX_TEXTURES;
use super::super::Visitor;
use super::capabilities::Capabilities;
use super::types;

/// Names of vertex attributes, bound to locations 0, 1 and 2.
const ATTRIBUTES: [&str; 3] = ["a_Position", "a_Texcoord", "a_Color"];
const VERTEX_STRIDE: GLsizei = 32;

#[derive(Debug, Clone)]
struct GLTextureData {
    id: GLuint,
    fbo: Option<GLuint>,
    params: TextureParams,
}

#[derive(Debug, Clone)]
struct GLBufferData {
    id: GLuint,
    params: BufferParams,
}

#[derive(Debug, Clone)]
struct GLShaderData {
    id: GLuint,
    params: ShaderParams,
    uniforms: HashMap<String, UniformVariable>,
}

#[derive(Debug, Clone)]
struct GLProgramData {
    id: GLuint,
    locations: HashMap<String, GLint>,
}

impl GLProgramData {
    unsafe fn uniform_location(&mut self, name: &str) -> Result<GLint> {
        if let Some(&location) = self.locations.get(name) {
            return Ok(location);
        }

        let c_name = CString::new(name.as_bytes())?;
        let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
        check()?;

        self.locations.insert(name.to_owned(), location);
        Ok(location)
    }
}

struct GLMutableState {
    projection: Matrix4<f32>,
    model_view: Matrix4<f32>,
    depth_write: bool,
    framebuffer: GLuint,
    textures: [GLuint; MAX_TEXTURES],
    shaders: (Option<ShaderHandle>, Option<ShaderHandle>),
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
}

/// The OpenGL 3.3 backend.
///
/// Vertex and pixel stages are compiled separately and linked lazily into one program per
/// pair. Uniform values are kept per stage and uploaded before each draw call.
pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
    vao: GLuint,
    textures: DataVec<GLTextureData>,
    buffers: DataVec<GLBufferData>,
    shaders: DataVec<GLShaderData>,
    programs: HashMap<(ShaderHandle, ShaderHandle), GLProgramData>,
}

impl GLVisitor {
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.check()?;

        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        gl::BindVertexArray(vao);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        check()?;

        let state = GLMutableState {
            projection: Matrix4::from_scale(1.0),
            model_view: Matrix4::from_scale(1.0),
            depth_write: false,
            framebuffer: 0,
            textures: [0; MAX_TEXTURES],
            shaders: (None, None),
            vertex_buffer: None,
            index_buffer: None,
        };

        Ok(GLVisitor {
            state,
            capabilities,
            vao,
            textures: DataVec::new(),
            buffers: DataVec::new(),
            shaders: DataVec::new(),
            programs: HashMap::new(),
        })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Drop for GLVisitor {
    fn drop(&mut self) {
        unsafe {
            for (_, v) in self.programs.drain() {
                gl::DeleteProgram(v.id);
            }

            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

impl Visitor for GLVisitor {
    fn convention(&self) -> Convention {
        Convention::BottomLeft
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate texture object.");
        }

        gl::BindTexture(gl::TEXTURE_2D, id);

        let mut dimensions = params.dimensions;
        for level in 0..params.mip_levels.max(1) {
            let pixels = data
                .and_then(|v| v.levels.get(level as usize))
                .map(|v| v.as_ptr() as *const _)
                .unwrap_or(ptr::null());

            gl::TexImage2D(
                gl::TEXTURE_2D,
                level as GLint,
                gl::RGBA8 as GLint,
                dimensions.x as GLsizei,
                dimensions.y as GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels,
            );

            dimensions.x = (dimensions.x / 2).max(1);
            dimensions.y = (dimensions.y / 2).max(1);
        }

        bind_texture_params(AddressMode::Clamp, Filtering::Linear, params.mip_levels)?;

        let fbo = if params.kind.is_render_target() {
            let mut fbo = 0;
            gl::GenFramebuffers(1, &mut fbo);
            gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                id,
                0,
            );

            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.state.framebuffer);

            if status != gl::FRAMEBUFFER_COMPLETE {
                gl::DeleteFramebuffers(1, &fbo);
                gl::DeleteTextures(1, &id);
                bail!("[GL] Framebuffer of {:?} is incomplete ({:#x}).", handle, status);
            }

            Some(fbo)
        } else {
            None
        };

        gl::BindTexture(gl::TEXTURE_2D, self.state.textures[0]);
        check()?;

        self.textures.create(handle, GLTextureData { id, fbo, params });
        Ok(())
    }

    unsafe fn update_texture(&mut self, handle: TextureHandle, bytes: &[u8]) -> Result<()> {
        let texture = self
            .textures
            .get(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        gl::BindTexture(gl::TEXTURE_2D, texture.id);
        gl::TexSubImage2D(
            gl::TEXTURE_2D,
            0,
            0,
            0,
            texture.params.dimensions.x as GLsizei,
            texture.params.dimensions.y as GLsizei,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            bytes.as_ptr() as *const _,
        );

        gl::BindTexture(gl::TEXTURE_2D, self.state.textures[0]);
        check()
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self
            .textures
            .free(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        if let Some(fbo) = texture.fbo {
            gl::DeleteFramebuffers(1, &fbo);
        }

        gl::DeleteTextures(1, &texture.id);
        check()
    }

    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate buffer object.");
        }

        let tp: GLenum = params.kind.into();
        let value = match data {
            Some(v) if !v.is_empty() => v.as_ptr() as *const _,
            _ => ptr::null(),
        };

        gl::BindBuffer(tp, id);
        gl::BufferData(tp, params.size as isize, value, params.hint.into());
        check()?;

        self.buffers.create(handle, GLBufferData { id, params });
        Ok(())
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let buffer = self
            .buffers
            .get(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        let tp: GLenum = buffer.params.kind.into();
        gl::BindBuffer(tp, buffer.id);
        gl::BufferSubData(tp, 0, bytes.len() as isize, bytes.as_ptr() as *const _);
        check()
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let buffer = self
            .buffers
            .free(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        gl::DeleteBuffers(1, &buffer.id);
        check()
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        source: &str,
    ) -> Result<()> {
        let stage = match params.stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Pixel => gl::FRAGMENT_SHADER,
        };

        let id = compile(stage, source)?;
        let data = GLShaderData {
            id,
            params,
            uniforms: HashMap::new(),
        };

        self.shaders.create(handle, data);
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        let stale: Vec<_> = self
            .programs
            .keys()
            .filter(|&&(vs, ps)| vs == handle || ps == handle)
            .cloned()
            .collect();

        for key in stale {
            if let Some(program) = self.programs.remove(&key) {
                gl::DeleteProgram(program.id);
            }
        }

        gl::DeleteShader(shader.id);
        check()
    }

    unsafe fn update_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: UniformVariable,
    ) -> Result<()> {
        let shader = self
            .shaders
            .get_mut(handle)
            .ok_or_else(|| format_err!("{:?} is invalid.", handle))?;

        shader.uniforms.insert(name.to_owned(), variable);
        Ok(())
    }

    unsafe fn set_clear_color(&mut self, color: Color) -> Result<()> {
        gl::ClearColor(color.r, color.g, color.b, color.a);
        check()
    }

    unsafe fn bind_render_target(&mut self, target: Option<TextureHandle>) -> Result<()> {
        let fbo = match target {
            Some(handle) => self
                .textures
                .get(handle)
                .and_then(|v| v.fbo)
                .ok_or_else(|| format_err!("{:?} is not a render target.", handle))?,
            None => 0,
        };

        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        self.state.framebuffer = fbo;
        check()
    }

    unsafe fn bind_texture(
        &mut self,
        slot: usize,
        texture: Option<TextureHandle>,
        filtering: Filtering,
        address: AddressMode,
    ) -> Result<()> {
        let units = self.capabilities.max_combined_texture_image_units as usize;
        if slot >= MAX_TEXTURES || slot >= units {
            bail!("Texture slot {} is out of range.", slot);
        }

        gl::ActiveTexture(gl::TEXTURE0 + slot as GLenum);

        let textures = &self.textures;
        match texture.and_then(|v| textures.get(v)) {
            Some(texture) => {
                gl::BindTexture(gl::TEXTURE_2D, texture.id);
                bind_texture_params(address, filtering, texture.params.mip_levels)?;
                self.state.textures[slot] = texture.id;
            }
            None => {
                gl::BindTexture(gl::TEXTURE_2D, 0);
                self.state.textures[slot] = 0;
            }
        }

        gl::ActiveTexture(gl::TEXTURE0);
        check()
    }

    unsafe fn set_blend_mode(&mut self, mode: BlendMode) -> Result<()> {
        match types::blend_func(mode) {
            Some((src, dst)) => {
                gl::Enable(gl::BLEND);
                gl::BlendEquation(gl::FUNC_ADD);
                gl::BlendFunc(src, dst);
            }
            None => gl::Disable(gl::BLEND),
        }

        check()
    }

    unsafe fn set_viewport(&mut self, rect: NativeRect) -> Result<()> {
        gl::Viewport(rect.x, rect.y, rect.width, rect.height);
        check()
    }

    unsafe fn set_scissor_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            gl::Enable(gl::SCISSOR_TEST);
        } else {
            gl::Disable(gl::SCISSOR_TEST);
        }

        check()
    }

    unsafe fn set_back_face_cull(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            gl::Enable(gl::CULL_FACE);
            gl::CullFace(gl::BACK);
        } else {
            gl::Disable(gl::CULL_FACE);
        }

        check()
    }

    unsafe fn set_scissor(&mut self, rect: NativeRect) -> Result<()> {
        gl::Scissor(rect.x, rect.y, rect.width, rect.height);
        check()
    }

    unsafe fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<()> {
        self.state.projection = *projection;
        Ok(())
    }

    unsafe fn set_model_view(&mut self, model_view: &Matrix4<f32>) -> Result<()> {
        self.state.model_view = *model_view;
        Ok(())
    }

    unsafe fn set_depth_write(&mut self, enabled: bool) -> Result<()> {
        gl::DepthMask(enabled as GLboolean);
        self.state.depth_write = enabled;
        check()
    }

    unsafe fn set_depth_test(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
        } else {
            gl::Disable(gl::DEPTH_TEST);
        }

        check()
    }

    unsafe fn bind_shaders(
        &mut self,
        vs: Option<ShaderHandle>,
        ps: Option<ShaderHandle>,
    ) -> Result<()> {
        self.state.shaders = (vs, ps);
        Ok(())
    }

    unsafe fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        let buffers = &self.buffers;
        let id = buffer.and_then(|v| buffers.get(v)).map(|v| v.id).unwrap_or(0);
        gl::BindBuffer(gl::ARRAY_BUFFER, id);

        if id != 0 {
            for (location, &(size, offset)) in [(2, 0), (2, 8), (4, 16)].iter().enumerate() {
                gl::EnableVertexAttribArray(location as GLuint);
                gl::VertexAttribPointer(
                    location as GLuint,
                    size,
                    gl::FLOAT,
                    gl::FALSE,
                    VERTEX_STRIDE,
                    offset as usize as *const _,
                );
            }
        }

        self.state.vertex_buffer = buffer;
        check()
    }

    unsafe fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        let buffers = &self.buffers;
        let id = buffer.and_then(|v| buffers.get(v)).map(|v| v.id).unwrap_or(0);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id);
        self.state.index_buffer = buffer;
        check()
    }

    unsafe fn clear(&mut self) -> Result<()> {
        gl::Clear(gl::COLOR_BUFFER_BIT);
        check()
    }

    unsafe fn clear_depth(&mut self) -> Result<()> {
        // Depth writes must be enabled for the clear to take effect.
        if !self.state.depth_write {
            gl::DepthMask(gl::TRUE);
        }

        gl::ClearDepth(1.0);
        gl::Clear(gl::DEPTH_BUFFER_BIT);

        if !self.state.depth_write {
            gl::DepthMask(gl::FALSE);
        }

        check()
    }

    unsafe fn draw(&mut self, primitive: PrimitiveMode, vertices: u32) -> Result<()> {
        self.prepare_draw()?;
        gl::DrawArrays(primitive.into(), 0, vertices as GLsizei);
        check()
    }

    unsafe fn draw_indexed(&mut self, primitive: PrimitiveMode, indices: u32) -> Result<()> {
        self.prepare_draw()?;
        gl::DrawElements(
            primitive.into(),
            indices as GLsizei,
            gl::UNSIGNED_SHORT,
            ptr::null(),
        );
        check()
    }

    unsafe fn resize(&mut self, _: Vector2<u32>) -> Result<()> {
        Ok(())
    }

    unsafe fn advance(&mut self) -> Result<()> {
        gl::Flush();
        check()
    }
}

impl GLVisitor {
    /// Re-binds the current buffers, since creations and updates go through the same
    /// binding points, then makes the program of current shader pair active with all
    /// of its uniforms.
    unsafe fn prepare_draw(&mut self) -> Result<()> {
        let (vs, ps) = match self.state.shaders {
            (Some(vs), Some(ps)) => (vs, ps),
            _ => bail!("Draws without shaders."),
        };

        if self.state.vertex_buffer.is_none() {
            bail!("Draws without vertex buffer.");
        }

        if !self.programs.contains_key(&(vs, ps)) {
            let program = self.link_program(vs, ps)?;
            self.programs.insert((vs, ps), program);
        }

        let vertex_buffer = self.state.vertex_buffer;
        let index_buffer = self.state.index_buffer;
        gl::BindVertexArray(self.vao);
        self.bind_vertex_buffer(vertex_buffer)?;
        self.bind_index_buffer(index_buffer)?;

        let shaders = &self.shaders;
        let state = &self.state;
        let program = self
            .programs
            .get_mut(&(vs, ps))
            .ok_or_else(|| format_err!("Program of {:?} is missing.", (vs, ps)))?;

        gl::UseProgram(program.id);

        let location = program.uniform_location("u_Projection")?;
        bind_uniform_variable(location, &UniformVariable::from(state.projection))?;
        let location = program.uniform_location("u_ModelView")?;
        bind_uniform_variable(location, &UniformVariable::from(state.model_view))?;

        for slot in 0..MAX_TEXTURES {
            let location = program.uniform_location(&format!("u_Texture{}", slot))?;
            bind_uniform_variable(location, &UniformVariable::I32(slot as i32))?;
        }

        for handle in &[vs, ps] {
            if let Some(shader) = shaders.get(*handle) {
                for (name, variable) in &shader.uniforms {
                    let location = program.uniform_location(name)?;
                    bind_uniform_variable(location, variable)?;
                }
            }
        }

        check()
    }

    unsafe fn link_program(&self, vs: ShaderHandle, ps: ShaderHandle) -> Result<GLProgramData> {
        let vs = self
            .shaders
            .get(vs)
            .ok_or_else(|| format_err!("{:?} is invalid.", vs))?;

        let ps = self
            .shaders
            .get(ps)
            .ok_or_else(|| format_err!("{:?} is invalid.", ps))?;

        if vs.params.stage != ShaderStage::Vertex || ps.params.stage != ShaderStage::Pixel {
            bail!("Shader stages mismatch.");
        }

        let id = link(vs.id, ps.id)?;
        Ok(GLProgramData {
            id,
            locations: HashMap::new(),
        })
    }
}

unsafe fn bind_texture_params(
    address: AddressMode,
    filtering: Filtering,
    levels: u32,
) -> Result<()> {
    let wrap: GLenum = address.into();
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);

    let (min_filter, mag_filter) = types::filters(filtering, levels);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);

    if levels > 1 {
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_BASE_LEVEL, 0);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, (levels - 1) as GLint);
    }

    check()
}

unsafe fn bind_uniform_variable(location: GLint, variable: &UniformVariable) -> Result<()> {
    if location == -1 {
        return Ok(());
    }

    match *variable {
        UniformVariable::I32(v) => gl::Uniform1i(location, v),
        UniformVariable::F32(v) => gl::Uniform1f(location, v),
        UniformVariable::Vector2f(v) => gl::Uniform2fv(location, 1, v.as_ptr()),
        UniformVariable::Vector3f(v) => gl::Uniform3fv(location, 1, v.as_ptr()),
        UniformVariable::Vector4f(v) => gl::Uniform4fv(location, 1, v.as_ptr()),
        UniformVariable::Matrix4f(v) => {
            gl::UniformMatrix4fv(location, 1, gl::FALSE, v[0].as_ptr())
        }
    }

    check()
}

unsafe fn compile(shader: GLenum, src: &str) -> Result<GLuint> {
    let shader = gl::CreateShader(shader);
    // Attempt to compile the shader
    let c_str = CString::new(src.as_bytes())?;
    gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    // Get the compile status
    let mut status = GLint::from(gl::FALSE);
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

    // Fail on error
    if status != GLint::from(gl::TRUE) {
        let mut len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        gl::DeleteShader(shader);

        bail!("{}\n{}", String::from_utf8_lossy(&buf), src);
    } else {
        Ok(shader)
    }
}

unsafe fn link(vs: GLuint, ps: GLuint) -> Result<GLuint> {
    let program = gl::CreateProgram();
    gl::AttachShader(program, vs);
    gl::AttachShader(program, ps);

    for (location, name) in ATTRIBUTES.iter().enumerate() {
        let c_name = CString::new(name.as_bytes())?;
        gl::BindAttribLocation(program, location as GLuint, c_name.as_ptr());
    }

    gl::LinkProgram(program);
    // Get the link status
    let mut status = GLint::from(gl::FALSE);
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

    // Fail on error
    if status != GLint::from(gl::TRUE) {
        let mut len: GLint = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        gl::DeleteProgram(program);

        bail!("{}", String::from_utf8_lossy(&buf));
    } else {
        gl::DetachShader(program, vs);
        gl::DetachShader(program, ps);
        Ok(program)
    }
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            r"[GL] The command is trying to render to or read from the framebuffer while the \
            currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
