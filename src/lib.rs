//! # Zhuobu
//!
//! QuickJS bindings for GLFW windowing, OpenGL rendering, image loading and
//! audio playback.
//!
//! ## Features
//!
//! - **Function table**: one script-visible function per native entry point,
//!   grouped into capability flags (`frame`, `graphics`, `audio`, `assets`),
//!   also exported as the native ES module `context`
//! - **GL façade**: every GL command goes through a [`render::GraphicsDevice`],
//!   backed by `glow` or by a recording device for tests and headless runs
//! - **Audio**: a bounded, generation-checked table of loaded sounds over `rodio`
//! - **Headless mode**: the whole binding surface runs without a display or an
//!   audio device
//!
//! ### Example
//!
//! ```ignore
//! use zhuobu::audio::default_backend_factory;
//! use zhuobu::config::EngineConfig;
//! use zhuobu::platform::HeadlessPlatform;
//! use zhuobu::scripting::ScriptHost;
//!
//! let config = EngineConfig::default();
//! let audio = default_backend_factory(&config.audio);
//! let host = ScriptHost::new(config, Box::new(HeadlessPlatform::new()), audio)?;
//! host.eval("initContext(); beginFrame(); drawSquare([0, 0], 0, [1, 1], [1, 0, 0, 1]); endFrame();", "demo")?;
//! ```
//!
//! ## Modules
//!
//! - [`core`]: errors, logging and macros
//! - [`config`]: TOML/JSON configuration with environment overrides
//! - [`platform`]: window abstraction (GLFW and headless)
//! - [`context`]: window/context manager driven by the frame bindings
//! - [`render`]: graphics device and GL helpers
//! - [`audio`]: sound table and playback backends
//! - [`resources`]: text and image loading
//! - [`marshal`]: script value conversion
//! - [`scripting`]: QuickJS host and function table

/// Errors, logging and shared macros
pub mod core;
/// Configuration system
pub mod config;
/// Platform abstraction layer
pub mod platform;
/// Window and GL context management
pub mod context;
/// Graphics device abstraction and GL helpers
pub mod render;
/// Audio playback
pub mod audio;
/// Text and image loading
pub mod resources;
/// Script value marshalling
pub mod marshal;
/// QuickJS host and bindings
pub mod scripting;
