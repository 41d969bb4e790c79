//! GLFW 平台实现

use glfw::Context as _;

use crate::config::WindowConfig;
use crate::core::{PlatformError, PlatformResult};
use crate::render::{GlowDevice, GraphicsDevice};

use super::{KeyAction, KeyEvent, Modifiers, Platform, Window, WindowEvent, WindowedRect};

/// GLFW 平台：一个进程只创建一个窗口
#[derive(Default)]
pub struct GlfwPlatform {
    glfw: Option<glfw::Glfw>,
}

impl GlfwPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for GlfwPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlfwPlatform")
            .field("initialized", &self.glfw.is_some())
            .finish()
    }
}

pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    fullscreen: bool,
}

impl Platform for GlfwPlatform {
    fn create_window(
        &mut self,
        config: &WindowConfig,
    ) -> PlatformResult<(Box<dyn Window>, Box<dyn GraphicsDevice>)> {
        let mut glfw = match self.glfw.take() {
            Some(glfw) => glfw,
            None => glfw::init(glfw::log_errors).map_err(|e| PlatformError::Init(format!("{:?}", e)))?,
        };

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or_else(|| {
                PlatformError::WindowCreation(format!(
                    "glfwCreateWindow({}x{}) returned null",
                    config.width, config.height
                ))
            })?;

        window.make_current();
        if let Some((numer, denom)) = config.aspect_ratio {
            window.set_aspect_ratio(numer, denom);
        }
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });
        window.set_key_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        let device = unsafe { GlowDevice::from_loader(|name| window.get_proc_address(name) as *const _) };

        tracing::info!(target: "platform", width = config.width, height = config.height, title = %config.title, "GLFW window created");
        let window = GlfwWindow {
            glfw,
            window,
            events,
            fullscreen: false,
        };
        Ok((Box::new(window), Box::new(device)))
    }
}

fn convert_modifiers(mods: glfw::Modifiers) -> Modifiers {
    Modifiers {
        shift: mods.contains(glfw::Modifiers::Shift),
        ctrl: mods.contains(glfw::Modifiers::Control),
        alt: mods.contains(glfw::Modifiers::Alt),
        logo: mods.contains(glfw::Modifiers::Super),
    }
}

fn convert_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
    match event {
        glfw::WindowEvent::FramebufferSize(width, height) => Some(WindowEvent::FramebufferResized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Key(key, _scancode, action, mods) => {
            let action = match action {
                glfw::Action::Press => KeyAction::Press,
                glfw::Action::Release => KeyAction::Release,
                glfw::Action::Repeat => KeyAction::Repeat,
            };
            Some(WindowEvent::Key(KeyEvent {
                key: key as i32,
                action,
                modifiers: convert_modifiers(mods),
            }))
        }
        glfw::WindowEvent::Close => Some(WindowEvent::CloseRequested),
        _ => None,
    }
}

impl Window for GlfwWindow {
    fn framebuffer_size(&self) -> (u32, u32) {
        let (w, h) = self.window.get_framebuffer_size();
        (w.max(0) as u32, h.max(0) as u32)
    }

    fn position(&self) -> (i32, i32) {
        self.window.get_pos()
    }

    fn size(&self) -> (u32, u32) {
        let (w, h) = self.window.get_size();
        (w.max(0) as u32, h.max(0) as u32)
    }

    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, value: bool) {
        self.window.set_should_close(value);
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn enter_fullscreen(&mut self) -> bool {
        let window = &mut self.window;
        let entered = self.glfw.with_primary_monitor(|_, monitor| {
            let Some(monitor) = monitor else {
                return false;
            };
            let Some(mode) = monitor.get_video_mode() else {
                return false;
            };
            window.set_monitor(
                glfw::WindowMode::FullScreen(monitor),
                0,
                0,
                mode.width,
                mode.height,
                Some(mode.refresh_rate),
            );
            true
        });
        if entered {
            self.fullscreen = true;
        } else {
            tracing::warn!(target: "platform", "no primary monitor, staying windowed");
        }
        entered
    }

    fn leave_fullscreen(&mut self, restore: WindowedRect) {
        self.window.set_monitor(
            glfw::WindowMode::Windowed,
            restore.x,
            restore.y,
            restore.width,
            restore.height,
            None,
        );
        self.fullscreen = false;
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| convert_event(event))
            .collect()
    }

    fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn set_time(&mut self, seconds: f64) {
        self.glfw.set_time(seconds);
    }
}
