use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 脚本绑定配置
///
/// 每个开关对应函数表中的一组绑定。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    /// 挂载全部绑定的全局对象名
    pub namespace: String,

    /// 导出全部绑定的原生模块名，`import { ... } from "context"`
    pub module: String,

    /// 同时把绑定挂到全局作用域
    pub install_globals: bool,

    /// 窗口与帧控制：initContext、beginFrame、drawSquare ...
    pub frame: bool,

    /// GL 命令：缓冲区、着色器、纹理、帧缓冲
    pub graphics: bool,

    /// 音频：loadAudio、playAudio ...
    pub audio: bool,

    /// 资源：loadText、loadImage
    pub assets: bool,
}

impl_default!(BindingsConfig {
    namespace: "zhuobu".to_string(),
    module: "context".to_string(),
    install_globals: true,
    frame: true,
    graphics: true,
    audio: true,
    assets: true,
});

impl BindingsConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        let valid_ident = self
            .namespace
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && self
                .namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_ident {
            return Err(ConfigError::ValidationError(format!(
                "Invalid binding namespace '{}'",
                self.namespace
            )));
        }
        if self.module.is_empty() || self.module.starts_with('.') || self.module.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "Invalid binding module name '{}'",
                self.module
            )));
        }
        Ok(())
    }
}
