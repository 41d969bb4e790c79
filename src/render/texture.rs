//! 纹理上传

use crate::core::{RenderError, RenderResult};

use super::device::{GraphicsDevice, SamplerParams};

/// 像素格式，均为每通道 8 位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb,
    Rgba,
}

impl TextureFormat {
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba => 4,
        }
    }

    /// 由像素缓冲大小推断格式
    ///
    /// `width * height * 3` 字节为 RGB，`width * height * 4` 字节为 RGBA，
    /// 其它大小一律拒绝。
    pub fn infer(width: u32, height: u32, len: usize) -> RenderResult<Self> {
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n > 0)
            .ok_or(RenderError::InvalidDimensions { width, height })?;

        if pixels.checked_mul(3) == Some(len) {
            Ok(TextureFormat::Rgb)
        } else if pixels.checked_mul(4) == Some(len) {
            Ok(TextureFormat::Rgba)
        } else {
            Err(RenderError::PixelSizeMismatch { width, height, len })
        }
    }
}

/// 把像素上传到当前绑定的纹理：线性过滤、重复寻址，并生成 mipmap
pub fn upload_pixels(
    device: &mut dyn GraphicsDevice,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> RenderResult<TextureFormat> {
    let format = TextureFormat::infer(width, height, pixels.len())?;
    device.set_sampler(SamplerParams::LINEAR_REPEAT);
    device.tex_image_2d(width, height, format, Some(pixels));
    device.generate_mipmap();
    tracing::trace!(target: "render", width, height, ?format, "texture uploaded");
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_infer_rgb_and_rgba() {
        assert_eq!(TextureFormat::infer(4, 2, 24).unwrap(), TextureFormat::Rgb);
        assert_eq!(TextureFormat::infer(4, 2, 32).unwrap(), TextureFormat::Rgba);
    }

    #[test]
    fn test_infer_rejects_other_sizes() {
        assert_eq!(
            TextureFormat::infer(4, 2, 16),
            Err(RenderError::PixelSizeMismatch {
                width: 4,
                height: 2,
                len: 16
            })
        );
        assert_eq!(
            TextureFormat::infer(0, 2, 0),
            Err(RenderError::InvalidDimensions {
                width: 0,
                height: 2
            })
        );
    }

    proptest! {
        #[test]
        fn prop_only_three_or_four_channels_accepted(
            width in 1u32..64,
            height in 1u32..64,
            extra in 1usize..5,
        ) {
            let pixels = (width * height) as usize;
            prop_assert_eq!(TextureFormat::infer(width, height, pixels * 3), Ok(TextureFormat::Rgb));
            prop_assert_eq!(TextureFormat::infer(width, height, pixels * 4), Ok(TextureFormat::Rgba));
            prop_assert!(TextureFormat::infer(width, height, pixels * 4 + extra).is_err());
            prop_assert!(TextureFormat::infer(width, height, pixels * 3 - 1).is_err());
        }
    }
}
