//! 离屏渲染目标

use crate::core::{RenderError, RenderResult};

use super::device::{FramebufferId, GraphicsDevice, SamplerParams, TextureId};
use super::texture::TextureFormat;

/// 帧缓冲及其颜色附件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub fbo: FramebufferId,
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
}

/// 创建带 RGBA 颜色纹理（最近邻过滤、边缘截取）的帧缓冲
///
/// 返回前恢复默认帧缓冲与纹理绑定。
pub fn create_render_target(
    device: &mut dyn GraphicsDevice,
    width: u32,
    height: u32,
) -> RenderResult<RenderTarget> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let fbo = device.create_framebuffer()?;
    let texture = device.create_texture()?;

    device.bind_texture(Some(texture));
    device.set_sampler(SamplerParams::NEAREST_CLAMP);
    device.tex_image_2d(width, height, TextureFormat::Rgba, None);

    device.bind_framebuffer(Some(fbo));
    device.attach_color_texture(texture);
    let status = device.framebuffer_status();

    device.bind_framebuffer(None);
    device.bind_texture(None);

    if let Err(status) = status {
        return Err(RenderError::FramebufferIncomplete(status));
    }

    tracing::debug!(target: "render", fbo = fbo.get(), width, height, "render target created");
    Ok(RenderTarget {
        fbo,
        texture,
        width,
        height,
    })
}

/// 绑定目标并把视口、裁剪区设为它的尺寸
pub fn begin_render_target(device: &mut dyn GraphicsDevice, target: &RenderTarget) {
    device.bind_framebuffer(Some(target.fbo));
    let (w, h) = (target.width as i32, target.height as i32);
    device.viewport(0, 0, w, h);
    device.scissor(0, 0, w, h);
}

/// 回到默认帧缓冲，视口、裁剪区恢复为屏幕尺寸
pub fn end_render_target(device: &mut dyn GraphicsDevice, screen_width: i32, screen_height: i32) {
    device.bind_framebuffer(None);
    device.viewport(0, 0, screen_width, screen_height);
    device.scissor(0, 0, screen_width, screen_height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{GlCall, RecordingDevice};

    #[test]
    fn test_render_target_texture_is_rgba_nearest() {
        let mut device = RecordingDevice::new();
        let recorder = device.recorder();
        let target = create_render_target(&mut device, 64, 32).unwrap();

        let texture = recorder.texture(target.texture).unwrap();
        assert_eq!((texture.width, texture.height), (64, 32));
        assert_eq!(texture.format, Some(TextureFormat::Rgba));
        assert_eq!(texture.sampler, Some(SamplerParams::NEAREST_CLAMP));
        assert_eq!(recorder.framebuffer_attachment(target.fbo), Some(target.texture));
        assert_eq!(recorder.bound_framebuffer(), None);
    }

    #[test]
    fn test_begin_and_end_set_viewport_and_scissor() {
        let mut device = RecordingDevice::new();
        let recorder = device.recorder();
        let target = create_render_target(&mut device, 64, 32).unwrap();
        recorder.clear_calls();

        begin_render_target(&mut device, &target);
        assert_eq!(recorder.bound_framebuffer(), Some(target.fbo));
        assert_eq!(recorder.viewport(), [0, 0, 64, 32]);

        end_render_target(&mut device, 400, 300);
        assert_eq!(recorder.bound_framebuffer(), None);
        assert_eq!(
            recorder.calls()[recorder.calls().len() - 1],
            GlCall::Scissor([0, 0, 400, 300])
        );
    }

    #[test]
    fn test_zero_sized_target_rejected() {
        let mut device = RecordingDevice::new();
        assert!(matches!(
            create_render_target(&mut device, 0, 10),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }
}
