//! 绑定共享的宿主状态

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::AudioFacade;
use crate::config::EngineConfig;
use crate::context::WindowContext;
use crate::core::{EngineError, EngineResult};
use crate::platform::Platform;
use crate::render::ShaderFailure;
use crate::resources::AssetLoader;

/// 绑定闭包通过它访问窗口、音频和资源
pub type SharedState = Rc<RefCell<HostState>>;

pub struct HostState {
    config: EngineConfig,
    platform: Box<dyn Platform>,
    context: Option<WindowContext>,
    terminated: bool,
    pub audio: AudioFacade,
    pub assets: AssetLoader,
}

impl std::fmt::Debug for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostState")
            .field("context", &self.context)
            .field("terminated", &self.terminated)
            .field("audio", &self.audio)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

impl HostState {
    pub fn new(config: EngineConfig, platform: Box<dyn Platform>, audio: AudioFacade) -> Self {
        let assets = AssetLoader::new(config.assets.root.clone());
        Self {
            config,
            platform,
            context: None,
            terminated: false,
            audio,
            assets,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn shader_failure(&self) -> ShaderFailure {
        if self.config.graphics.strict_shaders {
            ShaderFailure::Reject
        } else {
            ShaderFailure::Log
        }
    }

    /// `initContext`：只能调用一次
    pub fn init_context(&mut self) -> EngineResult<()> {
        if self.terminated {
            return Err(EngineError::Terminated);
        }
        if self.context.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        let context = WindowContext::open(
            self.platform.as_mut(),
            &self.config.window,
            &self.config.graphics,
        )?;
        self.context = Some(context);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// 终止后的调用一律失败
    pub fn ensure_running(&self) -> EngineResult<()> {
        if self.terminated {
            Err(EngineError::Terminated)
        } else {
            Ok(())
        }
    }

    /// 已初始化且未终止的上下文
    pub fn context(&mut self) -> EngineResult<&mut WindowContext> {
        self.ensure_running()?;
        self.context.as_mut().ok_or(EngineError::NotInitialized)
    }

    /// 关闭窗口、停止所有声音，并把宿主标记为已终止
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.audio.stop_all();
        self.context = None;
        self.terminated = true;
        tracing::info!(target: "scripting", "host terminated");
    }
}
