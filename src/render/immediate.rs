//! 内置方块绘制
//!
//! `drawSquare` 在核心配置文件下没有立即模式可用，这里用一个惰性创建的
//! 小程序和 VAO 画 8×8 的四边形。

use glam::{Mat4, Quat, Vec3};

use crate::core::{RenderError, RenderResult};

use super::device::{
    BufferTarget, GraphicsDevice, ProgramId, UniformLocation, UniformValue, VertexArrayId,
    VertexAttrib,
};
use super::shader::{build_program, ShaderFailure};

/// 方块边长（像素）
pub const SQUARE_SIZE: f32 = 8.0;

const QUAD_VERTICES: [f32; 8] = [
    0.0, 0.0, //
    SQUARE_SIZE, 0.0, //
    SQUARE_SIZE, SQUARE_SIZE, //
    0.0, SQUARE_SIZE,
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

const QUAD_VS: &str = r#"layout(location = 0) in vec2 aPos;
uniform mat4 uMvp;
void main() {
    gl_Position = uMvp * vec4(aPos, 0.0, 1.0);
}
"#;

const QUAD_FS: &str = r#"precision mediump float;
uniform vec4 uColor;
out vec4 fragColor;
void main() {
    fragColor = uColor;
}
"#;

/// 一次 `drawSquare` 调用的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    pub position: Vec3,
    /// 绕 Z 轴的弧度
    pub rotation: f32,
    pub scale: Vec3,
    pub color: [f32; 4],
}

impl Square {
    /// 平移 × 旋转 × 缩放
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_z(self.rotation),
            self.position,
        )
    }
}

/// 屏幕坐标投影：原点在左上角，y 轴向下
pub fn screen_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
struct QuadPipeline {
    program: ProgramId,
    vao: VertexArrayId,
    mvp: UniformLocation,
    color: UniformLocation,
}

/// 惰性创建 GL 对象的方块渲染器
#[derive(Debug, Default)]
pub struct QuadRenderer {
    pipeline: Option<QuadPipeline>,
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn pipeline(&mut self, device: &mut dyn GraphicsDevice, header: &str) -> RenderResult<QuadPipeline> {
        if let Some(pipeline) = self.pipeline {
            return Ok(pipeline);
        }

        let program = build_program(device, header, QUAD_VS, QUAD_FS, ShaderFailure::Reject)?;
        let uniform = |device: &dyn GraphicsDevice, name: &str| {
            device
                .uniform_location(program, name)
                .ok_or_else(|| RenderError::UniformNotFound(name.to_string()))
        };
        let mvp = uniform(device, "uMvp")?;
        let color = uniform(device, "uColor")?;

        let vao = device.create_vertex_array()?;
        let vbo = device.create_buffer()?;
        let ebo = device.create_buffer()?;
        device.bind_vertex_array(Some(vao));
        device.bind_buffer(BufferTarget::Array, Some(vbo));
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&QUAD_VERTICES));
        device.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        device.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&QUAD_INDICES));
        device.vertex_attrib_pointer(VertexAttrib {
            index: 0,
            size: 2,
            normalized: false,
            stride: 2 * VertexAttrib::FLOAT_SIZE,
            offset: 0,
        });
        device.enable_vertex_attrib_array(0);
        device.bind_vertex_array(None);

        let pipeline = QuadPipeline {
            program,
            vao,
            mvp,
            color,
        };
        self.pipeline = Some(pipeline);
        tracing::debug!(target: "render", program = program.get(), "quad pipeline created");
        Ok(pipeline)
    }

    /// 用给定投影画一个方块，结束后解绑程序和 VAO
    pub fn draw(
        &mut self,
        device: &mut dyn GraphicsDevice,
        header: &str,
        projection: Mat4,
        square: &Square,
    ) -> RenderResult<()> {
        let pipeline = self.pipeline(device, header)?;
        let mvp = projection * square.model_matrix();

        device.use_program(Some(pipeline.program));
        device.set_uniform(
            pipeline.mvp,
            UniformValue::Mat4 {
                transpose: false,
                value: mvp.to_cols_array(),
            },
        );
        device.set_uniform(pipeline.color, UniformValue::F4(square.color));
        device.bind_vertex_array(Some(pipeline.vao));
        device.draw_elements(QUAD_INDICES.len() as i32, 0);
        device.bind_vertex_array(None);
        device.use_program(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{GlCall, RecordingDevice};
    use glam::Vec4;

    const HEADER: &str = "#version 330 core\n";

    fn square() -> Square {
        Square {
            position: Vec3::new(100.0, 50.0, 0.0),
            rotation: 0.0,
            scale: Vec3::new(2.0, 2.0, 1.0),
            color: [1.0, 0.0, 0.0, 1.0],
        }
    }

    #[test]
    fn test_projection_maps_corners() {
        let projection = screen_projection(400.0, 300.0);
        let top_left = projection * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = projection * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_model_matrix_translates_then_scales() {
        let corner = square().model_matrix().transform_point3(Vec3::new(SQUARE_SIZE, SQUARE_SIZE, 0.0));
        assert!((corner - Vec3::new(116.0, 66.0, 0.0)).length() < 1e-5);

        let rotated = Square {
            rotation: std::f32::consts::FRAC_PI_2,
            ..square()
        };
        let corner = rotated.model_matrix().transform_point3(Vec3::new(SQUARE_SIZE, 0.0, 0.0));
        assert!((corner - Vec3::new(100.0, 66.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_pipeline_created_once() {
        let mut device = RecordingDevice::new();
        let recorder = device.recorder();
        let mut quads = QuadRenderer::new();
        let projection = screen_projection(400.0, 400.0);

        quads.draw(&mut device, HEADER, projection, &square()).unwrap();
        quads.draw(&mut device, HEADER, projection, &square()).unwrap();

        assert_eq!(recorder.count(|c| matches!(c, GlCall::LinkProgram { .. })), 1);
        assert_eq!(
            recorder.count(|c| matches!(c, GlCall::DrawElements { count: 6, byte_offset: 0 })),
            2
        );
        assert_eq!(recorder.current_program(), None);
    }

    #[test]
    fn test_color_uniform_uploaded() {
        let mut device = RecordingDevice::new();
        let recorder = device.recorder();
        let mut quads = QuadRenderer::new();
        quads
            .draw(&mut device, HEADER, screen_projection(400.0, 400.0), &square())
            .unwrap();

        let program = recorder
            .calls()
            .iter()
            .find_map(|c| match c {
                GlCall::LinkProgram { program, .. } => Some(*program),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            recorder.uniform_value(program, "uColor"),
            Some(UniformValue::F4([1.0, 0.0, 0.0, 1.0]))
        );
    }
}
