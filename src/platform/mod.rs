#[cfg(feature = "native")]
pub mod desktop;
pub mod headless;

#[cfg(feature = "native")]
pub use desktop::GlfwPlatform;
pub use headless::{HeadlessController, HeadlessPlatform, HeadlessWindow};

use crate::config::WindowConfig;
use crate::core::PlatformResult;
use crate::render::GraphicsDevice;

// ============================================================================
// Platform Window Abstraction
// ============================================================================

/// 平台窗口抽象：GLFW 窗口或无头窗口
pub trait Window {
    /// 帧缓冲尺寸（像素）
    fn framebuffer_size(&self) -> (u32, u32);
    /// 窗口左上角位置（屏幕坐标）
    fn position(&self) -> (i32, i32);
    /// 窗口尺寸（屏幕坐标）
    fn size(&self) -> (u32, u32);

    fn should_close(&self) -> bool;
    fn set_should_close(&mut self, value: bool);

    fn is_fullscreen(&self) -> bool;
    /// 切换到主显示器全屏；没有可用显示器时返回 `false`
    fn enter_fullscreen(&mut self) -> bool;
    /// 退出全屏并恢复到给定的窗口矩形
    fn leave_fullscreen(&mut self, restore: WindowedRect);

    fn swap_buffers(&mut self);
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// 自 `set_time` 以来的秒数
    fn time(&self) -> f64;
    fn set_time(&mut self, seconds: f64);
}

/// 创建窗口和绑定到当前线程的 GL 上下文
pub trait Platform {
    fn create_window(
        &mut self,
        config: &WindowConfig,
    ) -> PlatformResult<(Box<dyn Window>, Box<dyn GraphicsDevice>)>;
}

/// 窗口模式下的位置与尺寸，用于退出全屏时恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowedRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// Input Abstraction
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    FramebufferResized { width: u32, height: u32 },
    Key(KeyEvent),
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// GLFW 键码，脚本侧 `getKey` 使用同一套编码
    pub key: i32,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        logo: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
        logo: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// GLFW 键码
pub mod keys {
    pub const SPACE: i32 = 32;
    pub const MINUS: i32 = 45;
    pub const EQUAL: i32 = 61;
    pub const M: i32 = 77;
    pub const N: i32 = 78;
    pub const ESCAPE: i32 = 256;
    pub const ENTER: i32 = 257;
    pub const BACKSPACE: i32 = 259;
    pub const RIGHT: i32 = 262;
    pub const LEFT: i32 = 263;
    pub const DOWN: i32 = 264;
    pub const UP: i32 = 265;
    pub const F11: i32 = 300;
}
