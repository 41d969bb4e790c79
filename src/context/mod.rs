//! # 窗口上下文
//!
//! 一个窗口、它的 GL 设备以及脚本可见的帧状态：
//!
//! - 帧缓冲尺寸与视口保持同步
//! - `Escape` 请求关闭，`Alt+Enter` / `F11` 切换全屏
//! - 按键集合供 `getKey` 查询
//! - 帧时钟：`beginFrame` 采样时间，`now()` 返回毫秒

use std::collections::HashSet;

use glam::Mat4;

use crate::config::{GraphicsConfig, WindowConfig};
use crate::core::{PlatformResult, RenderResult};
use crate::platform::{
    keys, KeyAction, KeyEvent, Modifiers, Platform, Window, WindowEvent, WindowedRect,
};
use crate::render::{
    begin_render_target, end_render_target, screen_projection, ClearMask, GraphicsDevice,
    QuadRenderer, RenderTarget, Square,
};

/// `beginFrame` 采样得到的时间
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    /// 自初始化以来的秒数
    pub time: f64,
    /// 与上一帧的间隔（秒）
    pub delta: f64,
}

pub struct WindowContext {
    window: Box<dyn Window>,
    device: Box<dyn GraphicsDevice>,
    width: u32,
    height: u32,
    windowed: WindowedRect,
    pressed: HashSet<i32>,
    frame: FrameTiming,
    projection: Mat4,
    view: Mat4,
    quads: QuadRenderer,
    glsl_header: String,
}

impl std::fmt::Debug for WindowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fullscreen", &self.window.is_fullscreen())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl WindowContext {
    /// 创建窗口与 GL 上下文，设置视口、混合模式，并把时钟归零
    pub fn open(
        platform: &mut dyn Platform,
        window_config: &WindowConfig,
        graphics: &GraphicsConfig,
    ) -> PlatformResult<Self> {
        let (mut window, mut device) = platform.create_window(window_config)?;
        let (width, height) = window.framebuffer_size();

        device.viewport(0, 0, width as i32, height as i32);
        if graphics.alpha_blending {
            device.enable_alpha_blending();
        }
        device.clear_color(graphics.clear_color);
        window.set_time(0.0);

        let (x, y) = window.position();
        let (w, h) = window.size();
        tracing::info!(target: "context", width, height, "context initialized");

        Ok(Self {
            window,
            device,
            width,
            height,
            windowed: WindowedRect {
                x,
                y,
                width: w,
                height: h,
            },
            pressed: HashSet::new(),
            frame: FrameTiming::default(),
            projection: screen_projection(width as f32, height as f32),
            view: Mat4::IDENTITY,
            quads: QuadRenderer::new(),
            glsl_header: graphics.glsl_header.clone(),
        })
    }

    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    pub fn glsl_header(&self) -> &str {
        &self.glsl_header
    }

    // ------------------------------------------------------------------
    // 事件
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::FramebufferResized { width, height } => self.apply_size(width, height),
            WindowEvent::CloseRequested => self.window.set_should_close(true),
            WindowEvent::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, event: KeyEvent) {
        match event.action {
            KeyAction::Press | KeyAction::Repeat => {
                self.pressed.insert(event.key);
            }
            KeyAction::Release => {
                self.pressed.remove(&event.key);
            }
        }
        if event.action != KeyAction::Press {
            return;
        }

        if event.key == keys::ESCAPE && event.modifiers.is_empty() {
            tracing::debug!(target: "context", "escape pressed, closing window");
            self.window.set_should_close(true);
        } else if (event.key == keys::ENTER && event.modifiers == Modifiers::ALT) || event.key == keys::F11 {
            self.toggle_fullscreen();
        }
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.device.viewport(0, 0, width as i32, height as i32);
        tracing::debug!(target: "context", width, height, "framebuffer resized");
    }

    /// 进入全屏前记录窗口矩形，退出时精确恢复
    pub fn toggle_fullscreen(&mut self) {
        if self.window.is_fullscreen() {
            self.window.leave_fullscreen(self.windowed);
            tracing::info!(target: "context", rect = ?self.windowed, "left fullscreen");
        } else {
            let (x, y) = self.window.position();
            let (width, height) = self.window.size();
            let rect = WindowedRect {
                x,
                y,
                width,
                height,
            };
            if self.window.enter_fullscreen() {
                self.windowed = rect;
                tracing::info!(target: "context", "entered fullscreen");
            }
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.window.is_fullscreen()
    }

    pub fn windowed_rect(&self) -> WindowedRect {
        self.windowed
    }

    pub fn key_down(&self, key: i32) -> bool {
        self.pressed.contains(&key)
    }

    // ------------------------------------------------------------------
    // 帧
    // ------------------------------------------------------------------

    /// 采样时钟、清除颜色与深度，并重置投影和视图矩阵
    pub fn begin_frame(&mut self) -> FrameTiming {
        let time = self.window.time();
        self.frame = FrameTiming {
            time,
            delta: time - self.frame.time,
        };
        self.device.clear(ClearMask::COLOR_DEPTH);
        self.projection = screen_projection(self.width as f32, self.height as f32);
        self.view = Mat4::IDENTITY;
        self.frame
    }

    pub fn end_frame(&mut self) {
        self.device.flush();
        self.swap_buffers();
        self.poll_events();
    }

    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    pub fn poll_events(&mut self) {
        for event in self.window.poll_events() {
            self.handle_event(event);
        }
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    pub fn request_close(&mut self) {
        self.window.set_should_close(true);
    }

    /// 上一次 `begin_frame` 的时间（毫秒）
    pub fn now_ms(&self) -> f64 {
        self.frame.time * 1000.0
    }

    /// 自初始化以来的秒数
    pub fn time(&self) -> f64 {
        self.window.time()
    }

    pub fn frame_timing(&self) -> FrameTiming {
        self.frame
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 重新查询帧缓冲尺寸并重设视口
    pub fn refresh_size(&mut self) -> (u32, u32) {
        let (width, height) = self.window.framebuffer_size();
        self.apply_size(width, height);
        (width, height)
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.device.clear_color(color);
    }

    /// 只清除颜色缓冲
    pub fn clear(&mut self) {
        self.device.clear(ClearMask::COLOR);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn draw_square(&mut self, square: &Square) -> RenderResult<()> {
        let view_projection = self.projection * self.view;
        self.quads
            .draw(self.device.as_mut(), &self.glsl_header, view_projection, square)
    }

    pub fn begin_render_target(&mut self, target: &RenderTarget) {
        begin_render_target(self.device.as_mut(), target);
    }

    pub fn end_render_target(&mut self) {
        end_render_target(self.device.as_mut(), self.width as i32, self.height as i32);
    }
}
