//! 图形设备抽象
//!
//! 脚本需要的每个 GL 入口点在这里都有一个对应方法。`GlowDevice` 把它们转发给
//! 驱动，`RecordingDevice` 只做记录，供测试和无头运行使用。

use std::num::NonZeroU32;

use crate::core::{BindingError, BindingResult, RenderResult};

use super::texture::TextureFormat;

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub const KIND: &'static str = $kind;

            /// `0` 在 GL 中表示“无对象”
            pub fn new(id: u32) -> Option<Self> {
                NonZeroU32::new(id).map(Self)
            }

            pub fn from_raw(id: NonZeroU32) -> Self {
                Self(id)
            }

            pub fn raw(self) -> NonZeroU32 {
                self.0
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gl_handle!(ShaderId, "shader");
gl_handle!(ProgramId, "program");
gl_handle!(BufferId, "buffer");
gl_handle!(VertexArrayId, "vertex array");
gl_handle!(TextureId, "texture");
gl_handle!(FramebufferId, "framebuffer");

/// Uniform 位置。与其它句柄不同，位置 0 是合法值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F1(f32),
    F3([f32; 3]),
    F4([f32; 4]),
    I1(i32),
    Mat4 { transpose: bool, value: [f32; 16] },
}

/// `GL_FLOAT` 顶点属性，步长与偏移以字节计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib {
    pub index: u32,
    pub size: i32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

impl VertexAttrib {
    pub const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;

    /// 脚本以“浮点个数”描述步长和偏移；换算成字节后溢出 `i32` 时报错
    pub fn in_floats(
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) -> BindingResult<Self> {
        let bytes = |what: &'static str, floats: i32| {
            floats
                .checked_mul(Self::FLOAT_SIZE)
                .ok_or(BindingError::InvalidInteger {
                    what,
                    value: floats as f64,
                })
        };
        Ok(Self {
            index,
            size,
            normalized,
            stride: bytes("stride", stride)?,
            offset: bytes("offset", offset)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

/// 当前绑定纹理的采样参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerParams {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap: TextureWrap,
    /// 缩小过滤是否采样 mipmap 链
    pub mipmaps: bool,
}

impl SamplerParams {
    pub const LINEAR_REPEAT: Self = Self {
        min_filter: TextureFilter::Linear,
        mag_filter: TextureFilter::Linear,
        wrap: TextureWrap::Repeat,
        mipmaps: true,
    };

    pub const NEAREST_CLAMP: Self = Self {
        min_filter: TextureFilter::Nearest,
        mag_filter: TextureFilter::Nearest,
        wrap: TextureWrap::ClampToEdge,
        mipmaps: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self {
        color: true,
        depth: false,
    };
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// 绑定层使用的 GL 命令集合
///
/// 所有方法都作用于当前线程上的上下文，句柄不做任何有效性跟踪。
pub trait GraphicsDevice {
    /// 创建、设置源码并编译；编译失败不会返回错误，用 `shader_compile_log` 查询
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderId>;
    /// 编译成功时为 `None`，否则为 info log
    fn shader_compile_log(&self, shader: ShaderId) -> Option<String>;
    fn delete_shader(&mut self, shader: ShaderId);
    /// 附加着色器并链接；链接失败用 `program_link_log` 查询
    fn link_program(&mut self, shaders: &[ShaderId]) -> RenderResult<ProgramId>;
    fn program_link_log(&self, program: ProgramId) -> Option<String>;
    fn use_program(&mut self, program: Option<ProgramId>);
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn create_buffer(&mut self) -> RenderResult<BufferId>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    /// `GL_STATIC_DRAW` 上传到当前绑定的缓冲区
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);

    fn create_vertex_array(&mut self) -> RenderResult<VertexArrayId>;
    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);
    fn vertex_attrib_pointer(&mut self, attrib: VertexAttrib);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    /// `GL_TRIANGLES` + `GL_UNSIGNED_INT`
    fn draw_elements(&mut self, count: i32, byte_offset: i32);

    fn create_texture(&mut self) -> RenderResult<TextureId>;
    fn bind_texture(&mut self, texture: Option<TextureId>);
    /// `GL_TEXTURE0 + unit`
    fn active_texture(&mut self, unit: u32);
    fn set_sampler(&mut self, params: SamplerParams);
    /// `pixels` 为空时只分配存储
    fn tex_image_2d(&mut self, width: u32, height: u32, format: TextureFormat, pixels: Option<&[u8]>);
    fn generate_mipmap(&mut self);

    fn create_framebuffer(&mut self) -> RenderResult<FramebufferId>;
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);
    fn attach_color_texture(&mut self, texture: TextureId);
    /// 完整时为 `Ok`，否则返回状态码
    fn framebuffer_status(&self) -> Result<(), u32>;

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, color: [f32; 4]);
    fn clear(&mut self, mask: ClearMask);
    /// `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`
    fn enable_alpha_blending(&mut self);
    fn flush(&mut self);
}
