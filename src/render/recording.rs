//! 记录型图形设备
//!
//! 不访问任何驱动，只记录调用并模拟 GL 对象状态（缓冲区内容、纹理像素、
//! uniform 值）。无头平台和测试都使用它。
//!
//! 模拟规则：
//! - 句柄从 1 开始递增分配
//! - 着色器源码中出现 `#error` 视为编译失败，任一失败的着色器会让链接失败
//! - uniform 位置按 `uniform <type> <name>;` 声明顺序在每个程序内从 0 编号

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::RenderResult;

use super::device::{
    BufferId, BufferTarget, ClearMask, FramebufferId, GraphicsDevice, ProgramId, SamplerParams,
    ShaderId, ShaderStage, TextureId, UniformLocation, UniformValue, VertexArrayId, VertexAttrib,
};
use super::texture::TextureFormat;

/// 一条被记录的 GL 调用
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CompileShader { shader: ShaderId, stage: ShaderStage },
    DeleteShader(ShaderId),
    LinkProgram { program: ProgramId, shaders: Vec<ShaderId> },
    UseProgram(Option<ProgramId>),
    SetUniform { location: UniformLocation, value: UniformValue },
    CreateBuffer(BufferId),
    BindBuffer { target: BufferTarget, buffer: Option<BufferId> },
    BufferData { target: BufferTarget, len: usize },
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    VertexAttribPointer(VertexAttrib),
    EnableVertexAttribArray(u32),
    DrawElements { count: i32, byte_offset: i32 },
    CreateTexture(TextureId),
    BindTexture(Option<TextureId>),
    ActiveTexture(u32),
    SetSampler(SamplerParams),
    TexImage2D { width: u32, height: u32, format: TextureFormat, has_pixels: bool },
    GenerateMipmap,
    CreateFramebuffer(FramebufferId),
    BindFramebuffer(Option<FramebufferId>),
    AttachColorTexture(TextureId),
    Viewport([i32; 4]),
    Scissor([i32; 4]),
    ClearColor([f32; 4]),
    Clear(ClearMask),
    EnableAlphaBlending,
    Flush,
}

#[derive(Debug, Clone)]
struct RecordedShader {
    source: String,
    error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct RecordedProgram {
    uniforms: Vec<String>,
    error: Option<String>,
    values: HashMap<u32, UniformValue>,
}

/// 纹理的模拟状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub format: Option<TextureFormat>,
    pub pixels: Option<Vec<u8>>,
    pub sampler: Option<SamplerParams>,
    pub mipmapped: bool,
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u32,
    calls: Vec<GlCall>,
    shaders: HashMap<ShaderId, RecordedShader>,
    programs: HashMap<ProgramId, RecordedProgram>,
    current_program: Option<ProgramId>,
    bound_buffers: HashMap<BufferTarget, BufferId>,
    buffers: HashMap<BufferId, Vec<u8>>,
    bound_vertex_array: Option<VertexArrayId>,
    active_unit: u32,
    bound_texture: Option<TextureId>,
    textures: HashMap<TextureId, RecordedTexture>,
    bound_framebuffer: Option<FramebufferId>,
    framebuffers: HashMap<FramebufferId, Option<TextureId>>,
    viewport: [i32; 4],
    clear_color: [f32; 4],
}

impl Recorded {
    fn allocate(&mut self) -> std::num::NonZeroU32 {
        self.next_id += 1;
        std::num::NonZeroU32::new(self.next_id).unwrap_or(std::num::NonZeroU32::MIN)
    }
}

/// 提取 `uniform <type> <name>;` 声明的名字
fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("uniform "))
        .filter_map(|line| {
            let decl = line.split(';').next()?;
            let name = decl.split_whitespace().last()?;
            Some(name.split('[').next().unwrap_or(name).to_string())
        })
}

/// 记录型设备
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: Rc<RefCell<Recorded>>,
}

/// 与设备共享状态的只读视图
#[derive(Debug, Clone)]
pub struct Recorder {
    state: Rc<RefCell<Recorded>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> Recorder {
        Recorder {
            state: Rc::clone(&self.state),
        }
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderId> {
        let mut state = self.state.borrow_mut();
        let shader = ShaderId::from_raw(state.allocate());
        let error = source
            .lines()
            .find(|line| line.trim_start().starts_with("#error"))
            .map(|line| format!("0:1: error: {}", line.trim()));
        state.shaders.insert(
            shader,
            RecordedShader {
                source: source.to_string(),
                error,
            },
        );
        state.calls.push(GlCall::CompileShader { shader, stage });
        Ok(shader)
    }

    fn shader_compile_log(&self, shader: ShaderId) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|s| s.error.clone())
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        // 源码保留，方便测试检查
        self.record(GlCall::DeleteShader(shader));
    }

    fn link_program(&mut self, shaders: &[ShaderId]) -> RenderResult<ProgramId> {
        let mut state = self.state.borrow_mut();
        let program = ProgramId::from_raw(state.allocate());
        let mut recorded = RecordedProgram::default();
        for shader in shaders {
            let Some(source) = state.shaders.get(shader) else {
                recorded.error = Some(format!("invalid shader {}", shader.get()));
                continue;
            };
            if source.error.is_some() {
                recorded.error = Some("attached shader failed to compile".to_string());
            }
            for name in declared_uniforms(&source.source) {
                if !recorded.uniforms.contains(&name) {
                    recorded.uniforms.push(name);
                }
            }
        }
        state.programs.insert(program, recorded);
        state.calls.push(GlCall::LinkProgram {
            program,
            shaders: shaders.to_vec(),
        });
        Ok(program)
    }

    fn program_link_log(&self, program: ProgramId) -> Option<String> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.error.clone())
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let mut state = self.state.borrow_mut();
        state.current_program = program;
        state.calls.push(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let state = self.state.borrow();
        let recorded = state.programs.get(&program)?;
        if recorded.error.is_some() {
            return None;
        }
        recorded
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|index| UniformLocation(index as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        if let Some(program) = state.current_program {
            if let Some(recorded) = state.programs.get_mut(&program) {
                recorded.values.insert(location.0, value);
            }
        }
        state.calls.push(GlCall::SetUniform { location, value });
    }

    fn create_buffer(&mut self) -> RenderResult<BufferId> {
        let mut state = self.state.borrow_mut();
        let buffer = BufferId::from_raw(state.allocate());
        state.buffers.insert(buffer, Vec::new());
        state.calls.push(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        match buffer {
            Some(buffer) => state.bound_buffers.insert(target, buffer),
            None => state.bound_buffers.remove(&target),
        };
        state.calls.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(buffer) = state.bound_buffers.get(&target).copied() {
            state.buffers.insert(buffer, data.to_vec());
        }
        state.calls.push(GlCall::BufferData {
            target,
            len: data.len(),
        });
    }

    fn create_vertex_array(&mut self) -> RenderResult<VertexArrayId> {
        let mut state = self.state.borrow_mut();
        let vao = VertexArrayId::from_raw(state.allocate());
        state.calls.push(GlCall::CreateVertexArray(vao));
        Ok(vao)
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        let mut state = self.state.borrow_mut();
        state.bound_vertex_array = vao;
        state.calls.push(GlCall::BindVertexArray(vao));
    }

    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib) {
        self.record(GlCall::VertexAttribPointer(attrib));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn draw_elements(&mut self, count: i32, byte_offset: i32) {
        self.record(GlCall::DrawElements { count, byte_offset });
    }

    fn create_texture(&mut self) -> RenderResult<TextureId> {
        let mut state = self.state.borrow_mut();
        let texture = TextureId::from_raw(state.allocate());
        state.textures.insert(texture, RecordedTexture::default());
        state.calls.push(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        state.bound_texture = texture;
        state.calls.push(GlCall::BindTexture(texture));
    }

    fn active_texture(&mut self, unit: u32) {
        let mut state = self.state.borrow_mut();
        state.active_unit = unit;
        state.calls.push(GlCall::ActiveTexture(unit));
    }

    fn set_sampler(&mut self, params: SamplerParams) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.bound_texture {
            if let Some(recorded) = state.textures.get_mut(&texture) {
                recorded.sampler = Some(params);
            }
        }
        state.calls.push(GlCall::SetSampler(params));
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, format: TextureFormat, pixels: Option<&[u8]>) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.bound_texture {
            if let Some(recorded) = state.textures.get_mut(&texture) {
                recorded.width = width;
                recorded.height = height;
                recorded.format = Some(format);
                recorded.pixels = pixels.map(<[u8]>::to_vec);
                recorded.mipmapped = false;
            }
        }
        state.calls.push(GlCall::TexImage2D {
            width,
            height,
            format,
            has_pixels: pixels.is_some(),
        });
    }

    fn generate_mipmap(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.bound_texture {
            if let Some(recorded) = state.textures.get_mut(&texture) {
                recorded.mipmapped = true;
            }
        }
        state.calls.push(GlCall::GenerateMipmap);
    }

    fn create_framebuffer(&mut self) -> RenderResult<FramebufferId> {
        let mut state = self.state.borrow_mut();
        let framebuffer = FramebufferId::from_raw(state.allocate());
        state.framebuffers.insert(framebuffer, None);
        state.calls.push(GlCall::CreateFramebuffer(framebuffer));
        Ok(framebuffer)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let mut state = self.state.borrow_mut();
        state.bound_framebuffer = framebuffer;
        state.calls.push(GlCall::BindFramebuffer(framebuffer));
    }

    fn attach_color_texture(&mut self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        if let Some(framebuffer) = state.bound_framebuffer {
            state.framebuffers.insert(framebuffer, Some(texture));
        }
        state.calls.push(GlCall::AttachColorTexture(texture));
    }

    fn framebuffer_status(&self) -> Result<(), u32> {
        const INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;
        let state = self.state.borrow();
        match state.bound_framebuffer {
            None => Ok(()),
            Some(framebuffer) => match state.framebuffers.get(&framebuffer) {
                Some(Some(_)) => Ok(()),
                _ => Err(INCOMPLETE_MISSING_ATTACHMENT),
            },
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.viewport = [x, y, width, height];
        state.calls.push(GlCall::Viewport([x, y, width, height]));
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor([x, y, width, height]));
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        state.clear_color = color;
        state.calls.push(GlCall::ClearColor(color));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(GlCall::Clear(mask));
    }

    fn enable_alpha_blending(&mut self) {
        self.record(GlCall::EnableAlphaBlending);
    }

    fn flush(&mut self) {
        self.record(GlCall::Flush);
    }
}

impl Recorder {
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    /// 所有着色器的完整源码（含 GLSL 头），按编译顺序
    pub fn shader_sources(&self) -> Vec<String> {
        let state = self.state.borrow();
        let mut shaders: Vec<_> = state.shaders.iter().collect();
        shaders.sort_by_key(|(id, _)| **id);
        shaders.into_iter().map(|(_, s)| s.source.clone()).collect()
    }

    pub fn buffer_data(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    pub fn texture(&self, texture: TextureId) -> Option<RecordedTexture> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    pub fn framebuffer_attachment(&self, framebuffer: FramebufferId) -> Option<TextureId> {
        self.state.borrow().framebuffers.get(&framebuffer).copied().flatten()
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_framebuffer
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array
    }

    pub fn active_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    pub fn viewport(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    /// 某程序中按名字查询最近一次设置的 uniform 值
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let recorded = state.programs.get(&program)?;
        let index = recorded.uniforms.iter().position(|u| u == name)?;
        recorded.values.get(&(index as u32)).copied()
    }
}
