//! 着色器程序构建

use crate::core::{RenderError, RenderResult};

use super::device::{GraphicsDevice, ProgramId, ShaderStage};

/// 编译失败的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderFailure {
    /// 记录日志并照常返回程序句柄
    Log,
    /// 返回错误
    Reject,
}

/// 拼接 GLSL 头，保证 `#version` 独占第一行
pub fn with_header(header: &str, source: &str) -> String {
    let mut full = String::with_capacity(header.len() + source.len() + 1);
    full.push_str(header);
    if !header.ends_with('\n') {
        full.push('\n');
    }
    full.push_str(source);
    full
}

/// 编译顶点/片元着色器并链接
///
/// `ShaderFailure::Log` 下即使编译或链接失败也返回程序句柄，之后对它的绘制调用
/// 由驱动决定结果。
pub fn build_program(
    device: &mut dyn GraphicsDevice,
    header: &str,
    vertex_source: &str,
    fragment_source: &str,
    on_failure: ShaderFailure,
) -> RenderResult<ProgramId> {
    let mut shaders = Vec::with_capacity(2);
    for (stage, source) in [
        (ShaderStage::Vertex, vertex_source),
        (ShaderStage::Fragment, fragment_source),
    ] {
        let shader = device.compile_shader(stage, &with_header(header, source))?;
        if let Some(log) = device.shader_compile_log(shader) {
            tracing::error!(target: "render", stage = stage.name(), "shader compilation failed: {}", log);
            if on_failure == ShaderFailure::Reject {
                for shader in shaders.into_iter().chain(Some(shader)) {
                    device.delete_shader(shader);
                }
                return Err(RenderError::ShaderCompilation {
                    stage: stage.name(),
                    log,
                });
            }
        }
        shaders.push(shader);
    }

    let program = device.link_program(&shaders);
    for shader in shaders {
        device.delete_shader(shader);
    }
    let program = program?;

    if let Some(log) = device.program_link_log(program) {
        tracing::error!(target: "render", program = program.get(), "program link failed: {}", log);
        if on_failure == ShaderFailure::Reject {
            return Err(RenderError::ProgramLink(log));
        }
    }

    tracing::debug!(target: "render", program = program.get(), "shader program created");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{GlCall, RecordingDevice};

    const VS: &str = "layout(location = 0) in vec3 aPos;\nvoid main() { gl_Position = vec4(aPos, 1.0); }";
    const FS: &str = "out vec4 color;\nvoid main() { color = vec4(1.0); }";

    #[test]
    fn test_header_on_its_own_line() {
        assert_eq!(with_header("#version 330 core", "x"), "#version 330 core\nx");
        assert_eq!(with_header("#version 330 core\n", "x"), "#version 330 core\nx");
    }

    #[test]
    fn test_build_program_deletes_shaders() {
        let mut device = RecordingDevice::new();
        let recorder = device.recorder();
        let program = build_program(&mut device, "#version 330 core\n", VS, FS, ShaderFailure::Log).unwrap();

        assert!(device.program_link_log(program).is_none());
        let deleted = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, GlCall::DeleteShader(_)))
            .count();
        assert_eq!(deleted, 2);
        assert!(recorder.shader_sources().iter().all(|s| s.starts_with("#version 330 core\n")));
    }

    #[test]
    fn test_compile_failure_still_returns_program() {
        let mut device = RecordingDevice::new();
        let broken = "#error broken\nvoid main() {}";
        let program = build_program(&mut device, "#version 330 core\n", broken, FS, ShaderFailure::Log);
        let program = program.expect("log-only mode returns the program");
        assert!(device.program_link_log(program).is_some());
    }

    #[test]
    fn test_compile_failure_rejected_when_strict() {
        let mut device = RecordingDevice::new();
        let broken = "#error broken\nvoid main() {}";
        let err = build_program(&mut device, "#version 330 core\n", VS, broken, ShaderFailure::Reject)
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompilation { stage: "fragment", .. }));
    }
}
