//! 统一错误处理模块
//!
//! 提供绑定层范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **平台层** (`PlatformError`): 窗口、GL 上下文创建
//! - **渲染层** (`RenderError`): GL 对象创建、纹理尺寸校验
//! - **音频层** (`AudioError`): 音频设备、解码、槽位表
//! - **资源层** (`AssetError`): 文本与图片读取
//! - **绑定层** (`BindingError`): 脚本参数的类型与形状校验
//!
//! `EngineError` 汇总以上所有错误；脚本侧看到的是它的 `Display` 文本。

use thiserror::Error;

use crate::config::ConfigError;

/// 顶层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid argument: {0}")]
    Binding(#[from] BindingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Context not initialized: call initContext() first")]
    NotInitialized,

    #[error("Context already initialized")]
    AlreadyInitialized,

    #[error("Context has been terminated")]
    Terminated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 渲染系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to create {kind}: {reason}")]
    ObjectCreation { kind: &'static str, reason: String },

    #[error("Invalid {kind} handle: {id}")]
    InvalidHandle { kind: &'static str, id: u32 },

    #[error("Shader compilation failed ({stage}): {log}")]
    ShaderCompilation { stage: &'static str, log: String },

    #[error("Program link failed: {0}")]
    ProgramLink(String),

    #[error("Uniform not found: {0}")]
    UniformNotFound(String),

    #[error("Invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer of {len} bytes matches neither RGB nor RGBA for {width}x{height}")]
    PixelSizeMismatch { width: u32, height: u32, len: usize },

    #[error("Framebuffer incomplete: 0x{0:x}")]
    FramebufferIncomplete(u32),
}

/// 资源管理错误
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// 音频系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Failed to initialize audio device: {0}")]
    DeviceInit(String),

    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to decode audio {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Sound table is full ({capacity} slots)")]
    CapacityExhausted { capacity: usize },

    #[error("Invalid sound handle: {0}")]
    InvalidHandle(u32),

    #[error("Playback error: {0}")]
    Playback(String),
}

/// 脚本系统错误
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to create script runtime: {0}")]
    Runtime(String),

    #[error("Uncaught exception in {name}: {message}")]
    Exception { name: String, message: String },

    #[error("Script function not found: {0}")]
    FunctionNotFound(String),

    #[error("Invalid script binding: {0}")]
    InvalidBinding(String),
}

/// 平台层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Failed to initialize windowing system: {0}")]
    Init(String),

    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    #[error("Platform not supported: {0}")]
    NotSupported(String),
}

/// 脚本参数错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("element {index} is not a number")]
    NotANumber { index: usize },

    #[error("expected {expected} elements, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("missing property '{0}'")]
    MissingProperty(&'static str),

    #[error("{what} must be a non-negative integer, got {value}")]
    InvalidInteger { what: &'static str, value: f64 },

    #[error("cannot read property '{name}': {reason}")]
    Property { name: String, reason: String },
}

/// 结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type RenderResult<T> = Result<T, RenderError>;
pub type AssetResult<T> = Result<T, AssetError>;
pub type AudioResult<T> = Result<T, AudioError>;
pub type ScriptResult<T> = Result<T, ScriptError>;
pub type PlatformResult<T> = Result<T, PlatformError>;
pub type BindingResult<T> = Result<T, BindingError>;
