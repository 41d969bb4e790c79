/// 音频配置

use serde::{Deserialize, Serialize};
use super::{ConfigResult, ConfigError};

/// 音频配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// 主音量 (0.0 - 1.0)，与每次播放的音量相乘
    pub master_volume: f32,

    /// 同时加载的声音上限
    pub max_sounds: usize,

    /// 是否静音（使用静默后端，不打开输出设备）
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            max_sounds: 4,
            muted: false,
        }
    }
}

impl AudioConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::ValidationError("Invalid master volume".to_string()));
        }
        // 句柄低 16 位存放槽位下标
        if self.max_sounds == 0 || self.max_sounds > usize::from(u16::MAX) {
            return Err(ConfigError::ValidationError("Invalid max_sounds".to_string()));
        }
        Ok(())
    }
}
