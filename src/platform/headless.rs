//! 无头平台
//!
//! 不打开任何窗口，配合 [`RecordingDevice`] 使用。`HeadlessController`
//! 与窗口共享状态，测试通过它注入按键、关闭请求和尺寸变化。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::WindowConfig;
use crate::core::{PlatformError, PlatformResult};
use crate::render::{GraphicsDevice, Recorder, RecordingDevice};

use super::{KeyAction, KeyEvent, Modifiers, Platform, Window, WindowEvent, WindowedRect};

/// 每次 `poll_events` 推进的时间（秒）
pub const FRAME_STEP: f64 = 1.0 / 60.0;

const DEFAULT_POSITION: (i32, i32) = (100, 100);
const DEFAULT_MONITOR: (u32, u32) = (1920, 1080);

#[derive(Debug)]
struct HeadlessState {
    created: bool,
    position: (i32, i32),
    size: (u32, u32),
    framebuffer: (u32, u32),
    fullscreen: bool,
    should_close: bool,
    time: f64,
    swaps: u64,
    pending: VecDeque<WindowEvent>,
    monitor: Option<(u32, u32)>,
    failure: Option<String>,
    recorder: Option<Recorder>,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            created: false,
            position: DEFAULT_POSITION,
            size: (0, 0),
            framebuffer: (0, 0),
            fullscreen: false,
            should_close: false,
            time: 0.0,
            swaps: 0,
            pending: VecDeque::new(),
            monitor: Some(DEFAULT_MONITOR),
            failure: None,
            recorder: None,
        }
    }
}

type Shared = Rc<RefCell<HeadlessState>>;

/// 无头平台
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    state: Shared,
}

/// 无头窗口
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Shared,
}

/// 从外部驱动无头窗口
#[derive(Debug, Clone)]
pub struct HeadlessController {
    state: Shared,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// `create_window` 总是失败，模拟没有显示环境
    pub fn failing(reason: impl Into<String>) -> Self {
        let platform = Self::default();
        platform.state.borrow_mut().failure = Some(reason.into());
        platform
    }

    /// 没有显示器时全屏切换无效
    pub fn without_monitor(self) -> Self {
        self.state.borrow_mut().monitor = None;
        self
    }

    pub fn controller(&self) -> HeadlessController {
        HeadlessController {
            state: Rc::clone(&self.state),
        }
    }
}

impl Platform for HeadlessPlatform {
    fn create_window(
        &mut self,
        config: &WindowConfig,
    ) -> PlatformResult<(Box<dyn Window>, Box<dyn GraphicsDevice>)> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.failure {
            return Err(PlatformError::WindowCreation(reason.clone()));
        }
        if state.created {
            return Err(PlatformError::WindowCreation(
                "headless platform supports a single window".to_string(),
            ));
        }

        let device = RecordingDevice::new();
        state.created = true;
        state.size = (config.width, config.height);
        state.framebuffer = (config.width, config.height);
        state.recorder = Some(device.recorder());
        tracing::debug!(target: "platform", width = config.width, height = config.height, "headless window created");

        let window = HeadlessWindow {
            state: Rc::clone(&self.state),
        };
        Ok((Box::new(window), Box::new(device)))
    }
}

impl Window for HeadlessWindow {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.state.borrow().framebuffer
    }

    fn position(&self) -> (i32, i32) {
        self.state.borrow().position
    }

    fn size(&self) -> (u32, u32) {
        self.state.borrow().size
    }

    fn should_close(&self) -> bool {
        self.state.borrow().should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.state.borrow_mut().should_close = value;
    }

    fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    fn enter_fullscreen(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        let Some((width, height)) = state.monitor else {
            return false;
        };
        state.fullscreen = true;
        state.position = (0, 0);
        state.size = (width, height);
        state.framebuffer = (width, height);
        state
            .pending
            .push_back(WindowEvent::FramebufferResized { width, height });
        true
    }

    fn leave_fullscreen(&mut self, restore: WindowedRect) {
        let mut state = self.state.borrow_mut();
        state.fullscreen = false;
        state.position = (restore.x, restore.y);
        state.size = (restore.width, restore.height);
        state.framebuffer = (restore.width, restore.height);
        state.pending.push_back(WindowEvent::FramebufferResized {
            width: restore.width,
            height: restore.height,
        });
    }

    fn swap_buffers(&mut self) {
        self.state.borrow_mut().swaps += 1;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut state = self.state.borrow_mut();
        state.time += FRAME_STEP;
        let events: Vec<_> = state.pending.drain(..).collect();
        for event in &events {
            match *event {
                WindowEvent::CloseRequested => state.should_close = true,
                WindowEvent::FramebufferResized { width, height } => {
                    state.framebuffer = (width, height)
                }
                WindowEvent::Key(_) => {}
            }
        }
        events
    }

    fn time(&self) -> f64 {
        self.state.borrow().time
    }

    fn set_time(&mut self, seconds: f64) {
        self.state.borrow_mut().time = seconds;
    }
}

impl HeadlessController {
    /// 下一次 `poll_events` 时送达
    pub fn push_event(&self, event: WindowEvent) {
        self.state.borrow_mut().pending.push_back(event);
    }

    pub fn press_key(&self, key: i32, modifiers: Modifiers) {
        self.push_event(WindowEvent::Key(KeyEvent {
            key,
            action: KeyAction::Press,
            modifiers,
        }));
    }

    pub fn release_key(&self, key: i32) {
        self.push_event(WindowEvent::Key(KeyEvent {
            key,
            action: KeyAction::Release,
            modifiers: Modifiers::NONE,
        }));
    }

    /// 模拟点击关闭按钮
    pub fn request_close(&self) {
        self.push_event(WindowEvent::CloseRequested);
    }

    pub fn resize_framebuffer(&self, width: u32, height: u32) {
        self.push_event(WindowEvent::FramebufferResized { width, height });
    }

    /// 模拟用户拖动窗口
    pub fn move_window(&self, x: i32, y: i32) {
        self.state.borrow_mut().position = (x, y);
    }

    pub fn advance_time(&self, seconds: f64) {
        self.state.borrow_mut().time += seconds;
    }

    pub fn window_rect(&self) -> WindowedRect {
        let state = self.state.borrow();
        WindowedRect {
            x: state.position.0,
            y: state.position.1,
            width: state.size.0,
            height: state.size.1,
        }
    }

    pub fn is_created(&self) -> bool {
        self.state.borrow().created
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    pub fn swap_count(&self) -> u64 {
        self.state.borrow().swaps
    }

    /// 窗口创建后可用
    pub fn recorder(&self) -> Option<Recorder> {
        self.state.borrow().recorder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (HeadlessController, Box<dyn Window>) {
        let mut platform = HeadlessPlatform::new();
        let controller = platform.controller();
        let (window, _device) = platform.create_window(&WindowConfig::default()).unwrap();
        (controller, window)
    }

    #[test]
    fn test_window_uses_configured_size() {
        let (controller, window) = open();
        assert!(controller.is_created());
        assert_eq!(window.framebuffer_size(), (400, 400));
        assert!(controller.recorder().is_some());
    }

    #[test]
    fn test_close_request_delivered_on_poll() {
        let (controller, mut window) = open();
        controller.request_close();
        assert!(!window.should_close());
        let events = window.poll_events();
        assert_eq!(events, vec![WindowEvent::CloseRequested]);
        assert!(window.should_close());
    }

    #[test]
    fn test_poll_advances_time() {
        let (_controller, mut window) = open();
        window.poll_events();
        window.poll_events();
        assert!((window.time() - 2.0 * FRAME_STEP).abs() < 1e-12);
        window.set_time(0.0);
        assert_eq!(window.time(), 0.0);
    }

    #[test]
    fn test_failing_platform() {
        let mut platform = HeadlessPlatform::failing("no display");
        let err = platform.create_window(&WindowConfig::default()).err().unwrap();
        assert_eq!(err, PlatformError::WindowCreation("no display".to_string()));
    }

    #[test]
    fn test_fullscreen_without_monitor_is_noop() {
        let mut platform = HeadlessPlatform::new().without_monitor();
        let (mut window, _device) = platform.create_window(&WindowConfig::default()).unwrap();
        assert!(!window.enter_fullscreen());
        assert!(!window.is_fullscreen());
    }
}
