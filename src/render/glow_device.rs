//! 基于 glow 的图形设备

use glow::HasContext;

use crate::core::{RenderError, RenderResult};

use super::device::{
    BufferId, BufferTarget, ClearMask, FramebufferId, GraphicsDevice, ProgramId, SamplerParams,
    ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, UniformLocation, UniformValue,
    VertexArrayId, VertexAttrib,
};
use super::texture::TextureFormat;

/// 持有 `glow::Context` 的设备
///
/// 只能在创建它的上下文为当前上下文的线程上使用。
pub struct GlowDevice {
    gl: glow::Context,
}

impl std::fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowDevice").finish_non_exhaustive()
    }
}

fn creation_error(kind: &'static str, reason: String) -> RenderError {
    RenderError::ObjectCreation { kind, reason }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn filter(filter: TextureFilter, mipmapped: bool) -> i32 {
    (match (filter, mipmapped) {
        (TextureFilter::Nearest, false) => glow::NEAREST,
        (TextureFilter::Linear, false) => glow::LINEAR,
        (TextureFilter::Nearest, true) => glow::NEAREST_MIPMAP_LINEAR,
        (TextureFilter::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn format_enums(format: TextureFormat) -> (i32, u32) {
    match format {
        TextureFormat::Rgb => (glow::RGB8 as i32, glow::RGB),
        TextureFormat::Rgba => (glow::RGBA8 as i32, glow::RGBA),
    }
}

impl GlowDevice {
    /// # Safety
    ///
    /// `gl` 对应的上下文必须在当前线程上处于激活状态。
    pub unsafe fn new(gl: glow::Context) -> Self {
        // 脚本传入的 RGB 行不一定 4 字节对齐
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        Self { gl }
    }

    /// 用平台提供的函数加载器创建
    ///
    /// # Safety
    ///
    /// 同 [`GlowDevice::new`]。
    pub unsafe fn from_loader<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        Self::new(glow::Context::from_loader_function(loader))
    }
}

impl GraphicsDevice for GlowDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderId> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(|e| creation_error(ShaderId::KIND, e))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            Ok(ShaderId::from_raw(shader.0))
        }
    }

    fn shader_compile_log(&self, shader: ShaderId) -> Option<String> {
        let shader = glow::NativeShader(shader.raw());
        unsafe {
            if self.gl.get_shader_compile_status(shader) {
                None
            } else {
                Some(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.raw())) }
    }

    fn link_program(&mut self, shaders: &[ShaderId]) -> RenderResult<ProgramId> {
        unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(|e| creation_error(ProgramId::KIND, e))?;
            for shader in shaders {
                self.gl.attach_shader(program, glow::NativeShader(shader.raw()));
            }
            self.gl.link_program(program);
            for shader in shaders {
                self.gl.detach_shader(program, glow::NativeShader(shader.raw()));
            }
            Ok(ProgramId::from_raw(program.0))
        }
    }

    fn program_link_log(&self, program: ProgramId) -> Option<String> {
        let program = glow::NativeProgram(program.raw());
        unsafe {
            if self.gl.get_program_link_status(program) {
                None
            } else {
                Some(self.gl.get_program_info_log(program))
            }
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        unsafe {
            self.gl
                .use_program(program.map(|p| glow::NativeProgram(p.raw())))
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.raw()), name)
                .map(|loc| UniformLocation(loc.0))
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let loc = glow::NativeUniformLocation(location.0);
        let loc = Some(&loc);
        unsafe {
            match value {
                UniformValue::F1(x) => self.gl.uniform_1_f32(loc, x),
                UniformValue::F3([x, y, z]) => self.gl.uniform_3_f32(loc, x, y, z),
                UniformValue::F4([x, y, z, w]) => self.gl.uniform_4_f32(loc, x, y, z, w),
                UniformValue::I1(x) => self.gl.uniform_1_i32(loc, x),
                UniformValue::Mat4 { transpose, value } => {
                    self.gl.uniform_matrix_4_f32_slice(loc, transpose, &value)
                }
            }
        }
    }

    fn create_buffer(&mut self) -> RenderResult<BufferId> {
        unsafe {
            self.gl
                .create_buffer()
                .map(|b| BufferId::from_raw(b.0))
                .map_err(|e| creation_error(BufferId::KIND, e))
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl.bind_buffer(
                buffer_target(target),
                buffer.map(|b| glow::NativeBuffer(b.raw())),
            )
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, glow::STATIC_DRAW)
        }
    }

    fn create_vertex_array(&mut self) -> RenderResult<VertexArrayId> {
        unsafe {
            self.gl
                .create_vertex_array()
                .map(|v| VertexArrayId::from_raw(v.0))
                .map_err(|e| creation_error(VertexArrayId::KIND, e))
        }
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vao.map(|v| glow::NativeVertexArray(v.raw())))
        }
    }

    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attrib.index,
                attrib.size,
                glow::FLOAT,
                attrib.normalized,
                attrib.stride,
                attrib.offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn draw_elements(&mut self, count: i32, byte_offset: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, byte_offset)
        }
    }

    fn create_texture(&mut self) -> RenderResult<TextureId> {
        unsafe {
            self.gl
                .create_texture()
                .map(|t| TextureId::from_raw(t.0))
                .map_err(|e| creation_error(TextureId::KIND, e))
        }
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        unsafe {
            self.gl.bind_texture(
                glow::TEXTURE_2D,
                texture.map(|t| glow::NativeTexture(t.raw())),
            )
        }
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn set_sampler(&mut self, params: SamplerParams) {
        let wrap = match params.wrap {
            TextureWrap::Repeat => glow::REPEAT,
            TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        } as i32;
        unsafe {
            let gl = &self.gl;
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                filter(params.min_filter, params.mipmaps),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                filter(params.mag_filter, false),
            );
        }
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, format: TextureFormat, pixels: Option<&[u8]>) {
        let (internal, format) = format_enums(format);
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                pixels,
            )
        }
    }

    fn generate_mipmap(&mut self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn create_framebuffer(&mut self) -> RenderResult<FramebufferId> {
        unsafe {
            self.gl
                .create_framebuffer()
                .map(|f| FramebufferId::from_raw(f.0))
                .map_err(|e| creation_error(FramebufferId::KIND, e))
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        unsafe {
            self.gl.bind_framebuffer(
                glow::FRAMEBUFFER,
                framebuffer.map(|f| glow::NativeFramebuffer(f.raw())),
            )
        }
    }

    fn attach_color_texture(&mut self, texture: TextureId) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(glow::NativeTexture(texture.raw())),
                0,
            )
        }
    }

    fn framebuffer_status(&self) -> Result<(), u32> {
        let status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        if status == glow::FRAMEBUFFER_COMPLETE {
            Ok(())
        } else {
            Err(status)
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn clear_color(&mut self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&mut self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) }
    }

    fn enable_alpha_blending(&mut self) {
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    fn flush(&mut self) {
        unsafe { self.gl.flush() }
    }
}
