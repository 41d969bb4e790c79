//! # 渲染模块
//!
//! 脚本可见的 GL 命令全部经过 [`GraphicsDevice`]：
//!
//! - [`GlowDevice`]: 转发给驱动
//! - [`RecordingDevice`]: 记录调用并模拟对象状态，用于测试与无头运行
//!
//! 其余子模块是建立在设备之上的小工具：着色器构建、纹理上传、离屏目标和
//! `drawSquare` 使用的内置方块渲染器。

pub mod device;
pub mod framebuffer;
pub mod glow_device;
pub mod immediate;
pub mod recording;
pub mod shader;
pub mod texture;

pub use device::{
    BufferId, BufferTarget, ClearMask, FramebufferId, GraphicsDevice, ProgramId, SamplerParams,
    ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, UniformLocation, UniformValue,
    VertexArrayId, VertexAttrib,
};
pub use framebuffer::{begin_render_target, create_render_target, end_render_target, RenderTarget};
pub use glow_device::GlowDevice;
pub use immediate::{screen_projection, QuadRenderer, Square};
pub use recording::{GlCall, Recorder, RecordingDevice};
pub use shader::{build_program, ShaderFailure};
pub use texture::{upload_pixels, TextureFormat};
