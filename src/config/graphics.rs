use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// 拼接在每段脚本着色器源码前的 GLSL 头
    pub glsl_header: String,

    /// 着色器编译/链接失败时抛出脚本异常，而不是只记录日志
    pub strict_shaders: bool,

    /// 初始化时开启 alpha 混合
    pub alpha_blending: bool,

    /// 初始清屏颜色
    pub clear_color: [f32; 4],
}

impl_default!(GraphicsConfig {
    glsl_header: "#version 330 core\n".to_string(),
    strict_shaders: false,
    alpha_blending: true,
    clear_color: [0.0, 0.0, 0.0, 1.0],
});

impl GraphicsConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.glsl_header.trim_start().starts_with("#version") {
            return Err(ConfigError::ValidationError(
                "glsl_header must start with a #version directive".to_string(),
            ));
        }
        Ok(())
    }
}
