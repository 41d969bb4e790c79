//! 核心模块
//!
//! - `error` - 错误类型定义
//! - `logging` - tracing 初始化
//! - `macros` - 配置默认值宏

pub mod error;
pub mod logging;
#[macro_use]
pub mod macros;

pub use error::{
    AssetError, AssetResult, AudioError, AudioResult, BindingError, BindingResult, EngineError,
    EngineResult, PlatformError, PlatformResult, RenderError, RenderResult, ScriptError,
    ScriptResult,
};
