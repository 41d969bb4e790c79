//! 函数表
//!
//! 每一项对应一个脚本可见函数：名字、声明的参数个数、所属分组，以及创建
//! QuickJS 函数的安装器。分组由 `BindingsConfig` 中的开关控制。

use std::fmt;

use rquickjs::{Ctx, Function};

use crate::config::BindingsConfig;

use super::bindings::{assets, audio, frame, gl};
use super::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingGroup {
    /// 窗口、帧控制与内置方块
    Frame,
    /// GL 命令
    Graphics,
    Audio,
    /// 文本与图片
    Assets,
}

impl BindingGroup {
    pub fn name(self) -> &'static str {
        match self {
            BindingGroup::Frame => "frame",
            BindingGroup::Graphics => "graphics",
            BindingGroup::Audio => "audio",
            BindingGroup::Assets => "assets",
        }
    }

    pub fn enabled(self, config: &BindingsConfig) -> bool {
        match self {
            BindingGroup::Frame => config.frame,
            BindingGroup::Graphics => config.graphics,
            BindingGroup::Audio => config.audio,
            BindingGroup::Assets => config.assets,
        }
    }
}

impl fmt::Display for BindingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type Installer = for<'js> fn(&Ctx<'js>, &SharedState) -> rquickjs::Result<Function<'js>>;

#[derive(Clone, Copy)]
pub struct BindingSpec {
    pub name: &'static str,
    pub arity: usize,
    pub group: BindingGroup,
    pub install: Installer,
}

impl fmt::Debug for BindingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

macro_rules! table {
    ($($group:ident { $($name:literal / $arity:literal => $install:path,)* })*) => {
        &[$($(BindingSpec {
            name: $name,
            arity: $arity,
            group: BindingGroup::$group,
            install: $install,
        },)*)*]
    };
}

pub static FUNCTION_TABLE: &[BindingSpec] = table! {
    Frame {
        "initContext" / 0 => frame::init_context,
        "uninitContext" / 0 => frame::terminate,
        "terminate" / 0 => frame::terminate,
        "shouldClose" / 0 => frame::should_close,
        "shouldCloseWindow" / 0 => frame::should_close,
        "beginFrame" / 0 => frame::begin_frame,
        "endFrame" / 0 => frame::end_frame,
        "swapBuffers" / 0 => frame::swap_buffers,
        "pollEvents" / 0 => frame::poll_events,
        "now" / 0 => frame::now,
        "getTime" / 0 => frame::get_time,
        "getKey" / 1 => frame::get_key,
        "getScreenWidth" / 0 => frame::get_screen_width,
        "getScreenHeight" / 0 => frame::get_screen_height,
        "resize" / 0 => frame::resize,
        "setClearColor" / 4 => frame::set_clear_color,
        "clearColor" / 4 => frame::set_clear_color,
        "clear" / 0 => frame::clear,
        "drawSquare" / 4 => frame::draw_square,
    }
    Graphics {
        "createShaderProgram" / 2 => gl::create_shader_program,
        "useProgram" / 1 => gl::use_program,
        "getUniformLocation" / 2 => gl::get_uniform_location,
        "uniform1f" / 2 => gl::uniform1f,
        "uniform3f" / 4 => gl::uniform3f,
        "uniform4f" / 5 => gl::uniform4f,
        "uniform1i" / 2 => gl::uniform1i,
        "uniformMatrix4fv" / 3 => gl::uniform_matrix4fv,
        "createBuffer" / 0 => gl::create_buffer,
        "bindVBO" / 1 => gl::bind_vbo,
        "bindEBO" / 1 => gl::bind_ebo,
        "bufferData" / 1 => gl::buffer_data,
        "bufferDataElement" / 1 => gl::buffer_data_element,
        "createVAO" / 0 => gl::create_vao,
        "bindVAO" / 1 => gl::bind_vao,
        "setVertexAttributePointer" / 5 => gl::set_vertex_attribute_pointer,
        "enableVertexAttribute" / 1 => gl::enable_vertex_attribute,
        "drawElements" / 2 => gl::draw_elements,
        "createTexture" / 0 => gl::create_texture,
        "bindTexture" / 1 => gl::bind_texture,
        "activeTexture" / 1 => gl::active_texture,
        "updateTexture" / 1 => gl::update_texture,
        "createFramebuffer" / 2 => gl::create_framebuffer,
        "beginFramebuffer" / 1 => gl::begin_framebuffer,
        "endFramebuffer" / 0 => gl::end_framebuffer,
    }
    Audio {
        "loadAudio" / 1 => audio::load_audio,
        "playAudio" / 3 => audio::play_audio,
        "stopAudio" / 1 => audio::stop_audio,
        "unloadAudio" / 1 => audio::unload_audio,
    }
    Assets {
        "loadText" / 1 => assets::load_text,
        "loadImage" / 1 => assets::load_image,
    }
};

/// 配置中启用的表项
pub fn enabled_bindings(config: &BindingsConfig) -> impl Iterator<Item = &'static BindingSpec> + '_ {
    FUNCTION_TABLE.iter().filter(move |spec| spec.group.enabled(config))
}

pub fn find(name: &str) -> Option<&'static BindingSpec> {
    FUNCTION_TABLE.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = FUNCTION_TABLE.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), FUNCTION_TABLE.len());
    }

    #[test]
    fn test_every_group_is_populated() {
        for group in [
            BindingGroup::Frame,
            BindingGroup::Graphics,
            BindingGroup::Audio,
            BindingGroup::Assets,
        ] {
            assert!(FUNCTION_TABLE.iter().any(|s| s.group == group), "{}", group);
        }
    }

    #[test]
    fn test_disabled_group_is_filtered() {
        let config = BindingsConfig {
            audio: false,
            ..BindingsConfig::default()
        };
        assert!(enabled_bindings(&config).all(|s| s.group != BindingGroup::Audio));
        assert!(enabled_bindings(&config).any(|s| s.name == "initContext"));
    }

    #[test]
    fn test_find() {
        let spec = find("uniformMatrix4fv").unwrap();
        assert_eq!(spec.arity, 3);
        assert_eq!(spec.group, BindingGroup::Graphics);
        assert!(find("glBegin").is_none());
    }
}
