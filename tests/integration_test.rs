//! 无头端到端测试：脚本经函数表驱动 RecordingDevice 与 SilentBackend

use std::path::Path;

use tempfile::TempDir;
use zhuobu::audio::{AudioBackend, BackendFactory, SilentBackend, SilentProbe};
use zhuobu::config::EngineConfig;
use zhuobu::core::AudioError;
use zhuobu::platform::{keys, HeadlessController, HeadlessPlatform, Modifiers, WindowedRect};
use zhuobu::render::{
    BufferId, GlCall, ProgramId, Recorder, TextureFormat, TextureId, UniformValue, VertexAttrib,
};
use zhuobu::scripting::{ScriptHost, FUNCTION_TABLE};

struct Harness {
    host: ScriptHost,
    controller: HeadlessController,
    probe: SilentProbe,
}

impl Harness {
    fn new(config: EngineConfig) -> Self {
        Self::with_platform(config, HeadlessPlatform::new())
    }

    fn with_platform(config: EngineConfig, platform: HeadlessPlatform) -> Self {
        let controller = platform.controller();
        let backend = SilentBackend::new();
        let probe = backend.probe();
        let mut backend = Some(backend);
        let factory: BackendFactory = Box::new(move || {
            backend
                .take()
                .map(|b| Box::new(b) as Box<dyn AudioBackend>)
                .ok_or_else(|| AudioError::DeviceInit("opened twice".to_string()))
        });
        let host = ScriptHost::new(config, Box::new(platform), factory).unwrap();
        Self {
            host,
            controller,
            probe,
        }
    }

    fn run(&self, source: &str) {
        self.host.eval(source, "test").unwrap();
    }

    /// 脚本应当抛出异常，返回异常文本
    fn fails(&self, source: &str) -> String {
        self.host.eval(source, "test").unwrap_err().to_string()
    }

    fn number(&self, source: &str) -> f64 {
        self.host.eval_as::<f64>(source).unwrap()
    }

    fn recorder(&self) -> Recorder {
        self.controller.recorder().expect("initContext() not called")
    }
}

fn default_harness() -> Harness {
    Harness::new(EngineConfig::default())
}

fn assets_config(dir: &Path) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.assets.root = Some(dir.to_path_buf());
    config
}

fn sound_dir(count: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..count {
        std::fs::write(dir.path().join(format!("s{}.wav", i)), b"RIFF").unwrap();
    }
    dir
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// ----------------------------------------------------------------------
// 函数表
// ----------------------------------------------------------------------

#[test]
fn test_every_binding_is_installed() {
    let harness = default_harness();
    for spec in FUNCTION_TABLE {
        let global: bool = harness
            .host
            .eval_as(&format!("typeof {} === 'function'", spec.name))
            .unwrap();
        let namespaced: bool = harness
            .host
            .eval_as(&format!("typeof zhuobu.{} === 'function'", spec.name))
            .unwrap();
        assert!(global && namespaced, "{} missing", spec.name);

        let length = harness.number(&format!("zhuobu.{}.length", spec.name));
        assert_eq!(length as usize, spec.arity, "{} length", spec.name);
    }
}

#[test]
fn test_disabled_group_is_absent() {
    let config = EngineConfig::from_toml_str(
        r#"
        [bindings]
        audio = false
        install_globals = false
        namespace = "engine"
        "#,
    )
    .unwrap();
    let harness = Harness::new(config);

    let absent: bool = harness
        .host
        .eval_as("typeof engine.loadAudio === 'undefined' && typeof playAudio === 'undefined'")
        .unwrap();
    assert!(absent);

    let present: bool = harness
        .host
        .eval_as("typeof engine.initContext === 'function' && typeof initContext === 'undefined'")
        .unwrap();
    assert!(present);
}

#[test]
fn test_console_is_available() {
    let harness = default_harness();
    harness.run("console.log('hello', 1, {a: 2}); console.warn(); console.debug(null);");
}

// ----------------------------------------------------------------------
// 窗口与帧
// ----------------------------------------------------------------------

#[test]
fn test_should_close_after_close_request() {
    let harness = default_harness();
    harness.run("initContext()");
    assert!(!harness.host.eval_as::<bool>("shouldClose()").unwrap());

    harness.controller.request_close();
    harness.run("pollEvents()");
    assert!(harness.host.eval_as::<bool>("shouldCloseWindow()").unwrap());
}

#[test]
fn test_escape_requests_close() {
    let harness = default_harness();
    harness.run("initContext()");
    harness.controller.press_key(keys::ESCAPE, Modifiers::NONE);
    harness.run("endFrame()");
    assert!(harness.host.eval_as::<bool>("shouldClose()").unwrap());
    assert_eq!(harness.controller.swap_count(), 1);
}

#[test]
fn test_fullscreen_toggle_restores_window_rect() {
    let harness = default_harness();
    harness.run("initContext()");
    harness.controller.move_window(30, 40);

    harness.controller.press_key(keys::ENTER, Modifiers::ALT);
    harness.run("pollEvents(); pollEvents();");
    assert!(harness.controller.is_fullscreen());
    assert_eq!(harness.number("getScreenWidth()"), 1920.0);

    harness.controller.press_key(keys::F11, Modifiers::NONE);
    harness.run("pollEvents(); pollEvents();");
    assert!(!harness.controller.is_fullscreen());
    assert_eq!(
        harness.controller.window_rect(),
        WindowedRect {
            x: 30,
            y: 40,
            width: 400,
            height: 400
        }
    );
    assert_eq!(harness.number("getScreenWidth()"), 400.0);
    assert_eq!(harness.recorder().viewport(), [0, 0, 400, 400]);
}

#[test]
fn test_get_key_tracks_press_and_release() {
    let harness = default_harness();
    harness.run("initContext()");
    harness.controller.press_key(keys::M, Modifiers::NONE);
    harness.run("pollEvents()");
    assert!(harness.host.eval_as::<bool>(&format!("getKey({})", keys::M)).unwrap());

    harness.controller.release_key(keys::M);
    harness.run("pollEvents()");
    assert!(!harness.host.eval_as::<bool>(&format!("getKey({})", keys::M)).unwrap());
}

#[test]
fn test_resize_event_updates_screen_size() {
    let harness = default_harness();
    harness.run("initContext()");
    harness.controller.resize_framebuffer(800, 600);
    harness.run("pollEvents()");
    assert_eq!(harness.number("getScreenWidth()"), 800.0);
    assert_eq!(harness.number("getScreenHeight()"), 600.0);
    assert_eq!(harness.recorder().viewport(), [0, 0, 800, 600]);
}

#[test]
fn test_frame_clock() {
    let harness = default_harness();
    harness.run("initContext()");
    assert_eq!(harness.number("getTime()"), 0.0);
    harness.controller.advance_time(0.5);
    assert_eq!(harness.number("beginFrame(); now()"), 500.0);
}

#[test]
fn test_context_required() {
    let harness = default_harness();
    assert!(harness.fails("beginFrame()").contains("initContext"));
    harness.run("initContext()");
    assert!(harness.fails("initContext()").contains("already initialized"));
}

#[test]
fn test_window_creation_failure_is_an_exception() {
    let harness =
        Harness::with_platform(EngineConfig::default(), HeadlessPlatform::failing("no display"));
    let message = harness.fails("initContext()");
    assert!(message.contains("no display"), "{}", message);

    let caught: bool = harness
        .host
        .eval_as("try { initContext(); false } catch (e) { e instanceof Error }")
        .unwrap();
    assert!(caught);
}

#[test]
fn test_terminate_marks_host_terminated() {
    let harness = default_harness();
    harness.run("initContext(); terminate();");
    assert!(harness.host.is_terminated());
    assert!(harness.fails("beginFrame()").contains("terminated"));
    assert!(harness.fails("initContext()").contains("terminated"));
    harness.run("uninitContext()");
}

#[test]
fn test_clear_color_and_draw_square() {
    let harness = default_harness();
    harness.run(
        "initContext();
         setClearColor(0.1, 0.2, 0.3);
         beginFrame();
         clear();
         drawSquare([10, 20], 0.5, [2, 2], [1, 0, 0]);
         endFrame();",
    );
    let recorder = harness.recorder();
    assert_eq!(recorder.clear_color(), [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(
        recorder.count(|c| matches!(c, GlCall::DrawElements { count: 6, byte_offset: 0 })),
        1
    );
    assert_eq!(recorder.current_program(), None);
    assert_eq!(harness.controller.swap_count(), 1);
}

#[test]
fn test_draw_square_rejects_short_position() {
    let harness = default_harness();
    harness.run("initContext()");
    let message = harness.fails("drawSquare([1], 0, [1, 1], [1, 1, 1, 1])");
    assert!(message.contains("expected 2 elements, got 1"), "{}", message);
}

// ----------------------------------------------------------------------
// GL 命令
// ----------------------------------------------------------------------

#[test]
fn test_buffer_data_preserves_order() {
    let harness = default_harness();
    let vbo = harness.number(
        "initContext();
         const vbo = createBuffer();
         bindVBO(vbo);
         bufferData([1.0, 2.0, 3.0]);
         vbo",
    );
    let recorder = harness.recorder();
    let id = BufferId::new(vbo as u32).unwrap();
    assert_eq!(recorder.buffer_data(id).unwrap(), f32_bytes(&[1.0, 2.0, 3.0]));

    harness.run("bufferData(new Float32Array([4, 5]))");
    assert_eq!(recorder.buffer_data(id).unwrap(), f32_bytes(&[4.0, 5.0]));
}

#[test]
fn test_nested_binding_call_reports_reentrancy() {
    let harness = default_harness();
    harness.run("initContext(); bindVBO(createBuffer());");
    let message = harness.fails(
        "bufferData({ get length() { getScreenWidth(); return 0; } });",
    );
    assert!(message.contains("re-entrant call"), "{}", message);
}

#[test]
fn test_element_data_is_u32() {
    let harness = default_harness();
    let ebo = harness.number(
        "initContext();
         const ebo = createBuffer();
         bindEBO(ebo);
         bufferDataElement([0, 1, 2, 0, 2, 3]);
         ebo",
    );
    let expected: Vec<u8> = [0u32, 1, 2, 0, 2, 3]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let id = BufferId::new(ebo as u32).unwrap();
    assert_eq!(harness.recorder().buffer_data(id).unwrap(), expected);
}

#[test]
fn test_non_numeric_element_is_rejected_with_index() {
    let harness = default_harness();
    harness.run("initContext(); bindVBO(createBuffer());");
    let message = harness.fails("bufferData([1, 'x', 3])");
    assert!(message.contains("element 1 is not a number"), "{}", message);
    assert_eq!(
        harness
            .recorder()
            .count(|c| matches!(c, GlCall::BufferData { .. })),
        0
    );
}

#[test]
fn test_shader_program_and_uniforms() {
    let harness = default_harness();
    let program = harness.number(
        r#"
        initContext();
        const program = createShaderProgram(
            "uniform mat4 u_projection;\nvoid main() {}",
            "uniform vec4 u_color;\nuniform float u_time;\nvoid main() {}"
        );
        useProgram(program);
        uniform4f(getUniformLocation(program, "u_color"), 1, 0.5, 0, 1);
        uniform1f(getUniformLocation(program, "u_time"), 2);
        uniformMatrix4fv(getUniformLocation(program, "u_projection"), false,
            [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]);
        program
        "#,
    );
    let recorder = harness.recorder();
    let id = ProgramId::new(program as u32).unwrap();
    assert_eq!(recorder.current_program(), Some(id));
    assert!(recorder
        .shader_sources()
        .iter()
        .all(|s| s.starts_with("#version 330 core\n")));
    assert_eq!(
        recorder.uniform_value(id, "u_color"),
        Some(UniformValue::F4([1.0, 0.5, 0.0, 1.0]))
    );
    assert_eq!(recorder.uniform_value(id, "u_time"), Some(UniformValue::F1(2.0)));
    assert!(matches!(
        recorder.uniform_value(id, "u_projection"),
        Some(UniformValue::Mat4 { transpose: false, .. })
    ));
    // 着色器对象在链接后删除
    assert_eq!(recorder.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);

    let message = harness.fails(&format!("getUniformLocation({}, 'u_missing')", program));
    assert!(message.contains("Uniform not found: u_missing"), "{}", message);

    let message = harness.fails("uniformMatrix4fv(0, false, [1, 2, 3])");
    assert!(message.contains("expected 16 elements, got 3"), "{}", message);

    harness.run("uniform1f(null, 3)");
}

#[test]
fn test_failed_shader_still_returns_handle() {
    let harness = default_harness();
    let program = harness.number("initContext(); createShaderProgram('#error broken', 'void main() {}')");
    assert!(program > 0.0);
}

#[test]
fn test_strict_shaders_raise() {
    let mut config = EngineConfig::default();
    config.graphics.strict_shaders = true;
    let harness = Harness::new(config);
    harness.run("initContext()");
    let message = harness.fails("createShaderProgram('#error broken', 'void main() {}')");
    assert!(message.contains("Shader compilation failed (vertex)"), "{}", message);
}

#[test]
fn test_vertex_layout_and_draw() {
    let harness = default_harness();
    harness.run(
        "initContext();
         const vao = createVAO();
         bindVAO(vao);
         setVertexAttributePointer(1, 2, false, 5, 3);
         enableVertexAttribute(1);
         drawElements(6, 12);
         bindVAO(null);",
    );
    let recorder = harness.recorder();
    let calls = recorder.calls();
    assert!(calls.contains(&GlCall::VertexAttribPointer(VertexAttrib {
        index: 1,
        size: 2,
        normalized: false,
        stride: 20,
        offset: 12,
    })));
    assert!(calls.contains(&GlCall::EnableVertexAttribArray(1)));
    assert!(calls.contains(&GlCall::DrawElements {
        count: 12,
        byte_offset: 24
    }));
    assert_eq!(recorder.bound_vertex_array(), None);
}

#[test]
fn test_oversized_stride_is_an_exception() {
    let harness = default_harness();
    harness.run("initContext();");
    let message = harness.fails("setVertexAttributePointer(0, 3, false, 1000000000, 0);");
    assert!(message.contains("stride"), "{}", message);
    let message = harness.fails("setVertexAttributePointer(0, 3, false, 3, 2147483647);");
    assert!(message.contains("offset"), "{}", message);
    assert_eq!(
        harness
            .recorder()
            .count(|call| matches!(call, GlCall::VertexAttribPointer(_))),
        0
    );
}

#[test]
fn test_update_texture_infers_format() {
    let harness = default_harness();
    let texture = harness.number("initContext(); const t = createTexture(); bindTexture(t); t");
    let id = TextureId::new(texture as u32).unwrap();

    assert_eq!(
        harness.number("updateTexture({width: 2, height: 2, data: new Uint8Array(12)})"),
        3.0
    );
    assert_eq!(harness.recorder().texture(id).unwrap().format, Some(TextureFormat::Rgb));

    assert_eq!(
        harness.number("updateTexture({width: 2, height: 2, data: new Uint8Array(16)})"),
        4.0
    );
    let recorded = harness.recorder().texture(id).unwrap();
    assert_eq!(recorded.format, Some(TextureFormat::Rgba));
    assert!(recorded.mipmapped);

    let message = harness.fails("updateTexture({width: 2, height: 2, data: new Uint8Array(5)})");
    assert!(message.contains("matches neither RGB nor RGBA"), "{}", message);
}

#[test]
fn test_active_texture_unit() {
    let harness = default_harness();
    harness.run("initContext(); activeTexture(3);");
    assert_eq!(harness.recorder().active_unit(), 3);
}

#[test]
fn test_framebuffer_round_trip() {
    let harness = default_harness();
    harness.run(
        "initContext();
         globalThis.fb = createFramebuffer(64, 32);
         beginFramebuffer(fb);",
    );
    let recorder = harness.recorder();
    assert_eq!(recorder.viewport(), [0, 0, 64, 32]);
    let fbo = recorder.bound_framebuffer().unwrap();
    let texture = TextureId::new(harness.number("fb.texture") as u32).unwrap();
    assert_eq!(recorder.framebuffer_attachment(fbo), Some(texture));
    assert_eq!(harness.number("fb.width"), 64.0);

    harness.run("endFramebuffer()");
    assert_eq!(recorder.bound_framebuffer(), None);
    assert_eq!(recorder.viewport(), [0, 0, 400, 400]);
}

// ----------------------------------------------------------------------
// 资源
// ----------------------------------------------------------------------

#[test]
fn test_loaded_image_uploads_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let sprite = image::RgbaImage::from_fn(3, 2, |x, y| {
        image::Rgba([x as u8 * 80, y as u8 * 100, 7, 200])
    });
    sprite.save(dir.path().join("sprite.png")).unwrap();

    let harness = Harness::new(assets_config(dir.path()));
    let texture = harness.number(
        "initContext();
         const img = loadImage('sprite.png');
         const t = createTexture();
         bindTexture(t);
         updateTexture(img);
         t",
    );
    assert_eq!(harness.number("loadImage('sprite.png').channels"), 4.0);

    let recorded = harness
        .recorder()
        .texture(TextureId::new(texture as u32).unwrap())
        .unwrap();
    assert_eq!((recorded.width, recorded.height), (3, 2));
    assert_eq!(recorded.pixels.unwrap(), sprite.into_raw());
}

#[test]
fn test_rgb_image_keeps_three_channels() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]))
        .save(dir.path().join("plain.png"))
        .unwrap();
    let harness = Harness::new(assets_config(dir.path()));
    assert_eq!(harness.number("loadImage('plain.png').channels"), 3.0);
    assert_eq!(harness.number("loadImage('plain.png').data.length"), 12.0);
}

#[test]
fn test_load_text_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shader.vert"), "void main() {}").unwrap();
    let harness = Harness::new(assets_config(dir.path()));
    let text: String = harness.host.eval_as("loadText('shader.vert')").unwrap();
    assert_eq!(text, "void main() {}");
    assert!(harness.fails("loadText('missing.txt')").contains("Failed to open"));
}

// ----------------------------------------------------------------------
// 音频
// ----------------------------------------------------------------------

#[test]
fn test_fifth_sound_exceeds_capacity() {
    let dir = sound_dir(5);
    let harness = Harness::new(assets_config(dir.path()));
    let handles: Vec<u32> = harness
        .host
        .eval_as("[0, 1, 2, 3].map(i => loadAudio(`s${i}.wav`))")
        .unwrap();
    assert_eq!(handles, vec![0, 1, 2, 3]);

    let message = harness.fails("loadAudio('s4.wav')");
    assert!(message.contains("Sound table is full (4 slots)"), "{}", message);

    harness.run("for (let i = 0; i < 4; i++) playAudio(i, 1, false);");
    assert_eq!(harness.probe.plays().len(), 4);
    assert_eq!(harness.probe.loaded(), 4);
}

#[test]
fn test_play_defaults_and_master_volume() {
    let dir = sound_dir(1);
    let mut config = assets_config(dir.path());
    config.audio.master_volume = 0.5;
    let harness = Harness::new(config);
    harness.run("const s = loadAudio('s0.wav'); playAudio(s); playAudio(s, 0.5, true);");
    let plays = harness.probe.plays();
    assert_eq!(plays.len(), 2);
    assert_eq!((plays[0].volume, plays[0].looped), (0.5, false));
    assert_eq!((plays[1].volume, plays[1].looped), (0.25, true));

    harness.run("stopAudio(s)");
    assert!(!harness.probe.is_playing(0));
}

#[test]
fn test_same_path_returns_same_handle() {
    let dir = sound_dir(1);
    let harness = Harness::new(assets_config(dir.path()));
    let same: bool = harness
        .host
        .eval_as("loadAudio('s0.wav') === loadAudio('s0.wav')")
        .unwrap();
    assert!(same);
}

#[test]
fn test_unloaded_handle_is_stale() {
    let dir = sound_dir(2);
    let mut config = assets_config(dir.path());
    config.audio.max_sounds = 1;
    let harness = Harness::new(config);

    harness.run("globalThis.first = loadAudio('s0.wav'); unloadAudio(first);");
    let message = harness.fails("playAudio(first, 1, false)");
    assert!(message.contains("Invalid sound handle: 0"), "{}", message);

    let second = harness.number("loadAudio('s1.wav')");
    assert_eq!(second, (1u32 << 16) as f64);
    harness.run(&format!("playAudio({}, 1, false)", second));
}

#[test]
fn test_missing_sound_file() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(assets_config(dir.path()));
    assert!(harness.fails("loadAudio('nope.ogg')").contains("Audio file not found"));
}

// ----------------------------------------------------------------------
// 脚本入口
// ----------------------------------------------------------------------

#[test]
fn test_run_file_resolves_assets_next_to_script() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.txt"), "42").unwrap();
    let script = dir.path().join("main.js");
    std::fs::write(&script, "globalThis.answer = Number(loadText('data.txt'));").unwrap();

    let harness = default_harness();
    harness.host.run_file(&script).unwrap();
    assert_eq!(harness.number("answer"), 42.0);
}

#[test]
fn test_call_global_drives_async_main() {
    let harness = default_harness();
    harness.run(
        "async function mainQuickjs() {
             initContext();
             while (!shouldClose()) {
                 beginFrame();
                 await null;
                 endFrame();
                 if (getTime() > 0.05) break;
             }
             terminate();
         }",
    );
    harness.host.call_global("mainQuickjs").unwrap();
    assert!(harness.host.is_terminated());
    assert!(harness.controller.swap_count() >= 3);
}

#[test]
fn test_call_global_reports_rejection() {
    let harness = default_harness();
    harness.run("async function main() { await null; beginFrame(); }");
    let message = harness.host.call_global("main").unwrap_err().to_string();
    assert!(message.contains("initContext"), "{}", message);
}

#[test]
fn test_call_global_missing_function() {
    let harness = default_harness();
    let message = harness.host.call_global("nope").unwrap_err().to_string();
    assert_eq!(message, "Script function not found: nope");
}

#[test]
fn test_module_entry_imports_native_bindings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("libs.js"),
        "export { initContext, pollEvents, shouldCloseWindow, swapBuffers, terminate } from \"context\";
         export const MAX_FRAMES = 3;",
    )
    .unwrap();
    let script = dir.path().join("run.js");
    std::fs::write(
        &script,
        "import { initContext, pollEvents, shouldCloseWindow, swapBuffers, terminate, MAX_FRAMES } from \"./libs.js\";
         import context from \"context\";

         export async function mainQuickjs() {
             initContext();
             let frames = 0;
             do {
                 swapBuffers();
                 pollEvents();
                 frames++;
                 await null;
             } while (!shouldCloseWindow() && frames < MAX_FRAMES);
             globalThis.frames = frames;
             globalThis.sameBinding = context.initContext === initContext;
             terminate();
         }",
    )
    .unwrap();

    let harness = default_harness();
    harness.host.run_file(&script).unwrap();
    assert!(!harness.host.is_terminated());

    harness.host.call_global("mainQuickjs").unwrap();
    assert!(harness.host.is_terminated());
    assert_eq!(harness.controller.swap_count(), 3);
    assert_eq!(harness.number("frames"), 3.0);
    assert!(harness.host.eval_as::<bool>("sameBinding").unwrap());
}

#[test]
fn test_module_name_follows_config() {
    let config = EngineConfig::from_toml_str(
        r#"
        [bindings]
        module = "engine"
        install_globals = false
        "#,
    )
    .unwrap();
    let harness = Harness::new(config);
    harness
        .host
        .eval_module(
            "import { initContext, getScreenWidth } from \"engine\";
             initContext();
             globalThis.width = getScreenWidth();",
            "main.js",
        )
        .unwrap();
    assert_eq!(harness.number("width"), 400.0);

    let message = harness
        .host
        .eval_module("import { initContext } from \"context\";", "other.js")
        .unwrap_err()
        .to_string();
    assert!(message.contains("context"), "{}", message);
}

#[test]
fn test_module_exports_take_precedence_over_globals() {
    let harness = default_harness();
    harness.run("function main() { globalThis.picked = 'global'; }");
    harness
        .host
        .eval_module(
            "export function main() { globalThis.picked = 'module'; }",
            "entry.js",
        )
        .unwrap();
    harness.host.call_global("main").unwrap();
    assert!(harness.host.eval_as::<bool>("picked === 'module'").unwrap());
}
