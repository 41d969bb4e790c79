use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// 初始宽度（屏幕坐标）
    pub width: u32,

    /// 初始高度（屏幕坐标）
    pub height: u32,

    /// 窗口标题
    pub title: String,

    /// 垂直同步（swap interval 1）
    pub vsync: bool,

    /// 锁定宽高比，为空则不锁定
    pub aspect_ratio: Option<(u32, u32)>,
}

impl_default!(WindowConfig {
    width: 400,
    height: 400,
    title: "Zhuobu".to_string(),
    vsync: true,
    aspect_ratio: Some((1, 1)),
});

impl WindowConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid window size".to_string(),
            ));
        }
        if let Some((numer, denom)) = self.aspect_ratio {
            if numer == 0 || denom == 0 {
                return Err(ConfigError::ValidationError(
                    "Invalid aspect ratio".to_string(),
                ));
            }
        }
        Ok(())
    }
}
