//! 资源加载
//!
//! 脚本源码、文本文件和图片都经过 [`AssetLoader`]，相对路径以资源根目录解析。

use std::path::{Path, PathBuf};

use crate::core::{AssetError, AssetResult};

/// 解码后的图片，像素按行从上到下排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// 3 (RGB) 或 4 (RGBA)
    pub channels: u8,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    root: Option<PathBuf>,
}

impl AssetLoader {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.root = root;
    }

    /// 绝对路径原样返回，相对路径拼到资源根目录下
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn load_bytes(&self, path: impl AsRef<Path>) -> AssetResult<Vec<u8>> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|source| AssetError::Open {
            path: resolved.display().to_string(),
            source,
        })
    }

    pub fn load_text(&self, path: impl AsRef<Path>) -> AssetResult<String> {
        let resolved = self.resolve(path);
        let text = std::fs::read_to_string(&resolved).map_err(|source| AssetError::Open {
            path: resolved.display().to_string(),
            source,
        })?;
        tracing::debug!(target: "assets", path = %resolved.display(), bytes = text.len(), "text loaded");
        Ok(text)
    }

    /// 解码 PNG/JPEG；不带 alpha 的图片保持 RGB，其余转换为 RGBA
    pub fn load_image(&self, path: impl AsRef<Path>) -> AssetResult<ImageData> {
        let resolved = self.resolve(path);
        let display = resolved.display().to_string();
        let bytes = std::fs::read(&resolved).map_err(|source| AssetError::Open {
            path: display.clone(),
            source,
        })?;
        let image = decode_image(&bytes).map_err(|reason| AssetError::Decode {
            path: display.clone(),
            reason,
        })?;
        tracing::debug!(
            target: "assets",
            path = %resolved.display(),
            width = image.width,
            height = image.height,
            channels = image.channels,
            "image loaded"
        );
        Ok(image)
    }
}

/// 从内存解码图片
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let (width, height) = (decoded.width(), decoded.height());
    let image = if decoded.color().has_alpha() {
        ImageData {
            width,
            height,
            channels: 4,
            pixels: decoded.into_rgba8().into_raw(),
        }
    } else {
        ImageData {
            width,
            height,
            channels: 3,
            pixels: decoded.into_rgb8().into_raw(),
        }
    };
    Ok(image)
}
