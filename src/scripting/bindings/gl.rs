//! GL 命令绑定
//!
//! 句柄以数字形式往返于脚本，不做有效性跟踪。

use std::rc::Rc;

use rquickjs::{Ctx, Function, Object, Result, Value};

use crate::core::{BindingError, BindingResult, EngineResult, RenderError};
use crate::marshal::{self, ElementEncoding};
use crate::render::{
    build_program, create_render_target, upload_pixels, BufferId, BufferTarget, GraphicsDevice,
    ProgramId, TextureId, UniformLocation, UniformValue, VertexArrayId, VertexAttrib,
};
use crate::scripting::state::SharedState;

use super::with_state;

/// 借用当前上下文的图形设备
fn with_device<T>(
    ctx: &Ctx<'_>,
    state: &SharedState,
    f: impl FnOnce(&mut dyn GraphicsDevice) -> EngineResult<T>,
) -> Result<T> {
    with_state(ctx, state, |host| f(host.context()?.device()))
}

/// Uniform 位置：`null`、`undefined` 表示忽略本次上传，`0` 是合法位置
fn location(value: &Value<'_>) -> BindingResult<Option<UniformLocation>> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    marshal::unsigned(value, "uniform location").map(|n| Some(UniformLocation(n)))
}

fn int(value: &Value<'_>, what: &'static str) -> BindingResult<i32> {
    let n = marshal::unsigned(value, what)?;
    i32::try_from(n).map_err(|_| BindingError::InvalidInteger {
        what,
        value: n as f64,
    })
}

fn upload_uniform(
    ctx: &Ctx<'_>,
    state: &SharedState,
    loc: &Value<'_>,
    value: impl FnOnce() -> BindingResult<UniformValue>,
) -> Result<()> {
    with_device(ctx, state, |device| {
        if let Some(loc) = location(loc)? {
            device.set_uniform(loc, value()?);
        }
        Ok(())
    })
}

// ----------------------------------------------------------------------
// 着色器
// ----------------------------------------------------------------------

/// `createShaderProgram(vs, fs)`
pub(crate) fn create_shader_program<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, vs: Value<'js>, fs: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<u32> {
            let vertex = marshal::string(&vs)?;
            let fragment = marshal::string(&fs)?;
            let failure = host.shader_failure();
            let context = host.context()?;
            let header = context.glsl_header().to_string();
            let program = build_program(context.device(), &header, &vertex, &fragment, failure)?;
            Ok(program.get())
        })
    })
}

pub(crate) fn use_program<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, program: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let program = marshal::optional_handle(&program, "program")?.map(ProgramId::from_raw);
            device.use_program(program);
            Ok(())
        })
    })
}

/// 不存在的 uniform 抛出异常
pub(crate) fn get_uniform_location<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, program: Value<'js>, name: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let program = ProgramId::from_raw(marshal::handle(&program, "program")?);
            let name = marshal::string(&name)?;
            let location = device
                .uniform_location(program, &name)
                .ok_or(RenderError::UniformNotFound(name))?;
            Ok(location.0)
        })
    })
}

pub(crate) fn uniform1f<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, loc: Value<'js>, x: Value<'js>| {
        upload_uniform(&ctx, &state, &loc, || {
            Ok(UniformValue::F1(marshal::number(&x)? as f32))
        })
    })
}

pub(crate) fn uniform3f<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, loc: Value<'js>, x: Value<'js>, y: Value<'js>, z: Value<'js>| {
            upload_uniform(&ctx, &state, &loc, || {
                Ok(UniformValue::F3([
                    marshal::number(&x)? as f32,
                    marshal::number(&y)? as f32,
                    marshal::number(&z)? as f32,
                ]))
            })
        },
    )
}

pub(crate) fn uniform4f<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>,
              loc: Value<'js>,
              x: Value<'js>,
              y: Value<'js>,
              z: Value<'js>,
              w: Value<'js>| {
            upload_uniform(&ctx, &state, &loc, || {
                Ok(UniformValue::F4([
                    marshal::number(&x)? as f32,
                    marshal::number(&y)? as f32,
                    marshal::number(&z)? as f32,
                    marshal::number(&w)? as f32,
                ]))
            })
        },
    )
}

pub(crate) fn uniform1i<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, loc: Value<'js>, x: Value<'js>| {
        upload_uniform(&ctx, &state, &loc, || {
            Ok(UniformValue::I1(marshal::number(&x)? as i32))
        })
    })
}

/// `uniformMatrix4fv(loc, transpose, m)`，`m` 必须正好 16 个元素
pub(crate) fn uniform_matrix4fv<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, loc: Value<'js>, transpose: Value<'js>, m: Value<'js>| {
            upload_uniform(&ctx, &state, &loc, || {
                Ok(UniformValue::Mat4 {
                    transpose: marshal::truthy(&transpose),
                    value: marshal::fixed_f32::<16>(&m)?,
                })
            })
        },
    )
}

// ----------------------------------------------------------------------
// 缓冲区与顶点数组
// ----------------------------------------------------------------------

pub(crate) fn create_buffer<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_device(&ctx, &state, |device| Ok(device.create_buffer()?.get()))
    })
}

fn bind_buffer_fn<'js>(
    ctx: &Ctx<'js>,
    state: &SharedState,
    target: BufferTarget,
) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, buffer: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let buffer = marshal::optional_handle(&buffer, "buffer")?.map(BufferId::from_raw);
            device.bind_buffer(target, buffer);
            Ok(())
        })
    })
}

pub(crate) fn bind_vbo<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    bind_buffer_fn(ctx, state, BufferTarget::Array)
}

pub(crate) fn bind_ebo<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    bind_buffer_fn(ctx, state, BufferTarget::ElementArray)
}

fn buffer_data_fn<'js>(
    ctx: &Ctx<'js>,
    state: &SharedState,
    target: BufferTarget,
    encoding: ElementEncoding,
) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, data: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let bytes = marshal::buffer_bytes(&data, encoding)?;
            device.buffer_data(target, &bytes);
            Ok(())
        })
    })
}

/// 普通数组按 `f32` 编码
pub(crate) fn buffer_data<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    buffer_data_fn(ctx, state, BufferTarget::Array, ElementEncoding::F32)
}

/// 普通数组按 `u32` 编码
pub(crate) fn buffer_data_element<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    buffer_data_fn(ctx, state, BufferTarget::ElementArray, ElementEncoding::U32)
}

pub(crate) fn create_vao<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_device(&ctx, &state, |device| Ok(device.create_vertex_array()?.get()))
    })
}

pub(crate) fn bind_vao<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, vao: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let vao = marshal::optional_handle(&vao, "vertex array")?.map(VertexArrayId::from_raw);
            device.bind_vertex_array(vao);
            Ok(())
        })
    })
}

/// 步长与偏移以浮点个数计
pub(crate) fn set_vertex_attribute_pointer<'js>(
    ctx: &Ctx<'js>,
    state: &SharedState,
) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>,
              index: Value<'js>,
              size: Value<'js>,
              normalized: Value<'js>,
              stride: Value<'js>,
              offset: Value<'js>| {
            with_device(&ctx, &state, |device| {
                let attrib = VertexAttrib::in_floats(
                    marshal::unsigned(&index, "attribute index")?,
                    int(&size, "attribute size")?,
                    marshal::truthy(&normalized),
                    int(&stride, "stride")?,
                    int(&offset, "offset")?,
                )?;
                device.vertex_attrib_pointer(attrib);
                Ok(())
            })
        },
    )
}

pub(crate) fn enable_vertex_attribute<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, index: Value<'js>| {
        with_device(&ctx, &state, |device| {
            device.enable_vertex_attrib_array(marshal::unsigned(&index, "attribute index")?);
            Ok(())
        })
    })
}

/// `drawElements(offset, count)`，`offset` 以索引个数计
pub(crate) fn draw_elements<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, offset: Value<'js>, count: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let offset = int(&offset, "offset")?;
            let byte_offset = offset
                .checked_mul(std::mem::size_of::<u32>() as i32)
                .ok_or(BindingError::InvalidInteger {
                    what: "offset",
                    value: offset as f64,
                })?;
            device.draw_elements(int(&count, "count")?, byte_offset);
            Ok(())
        })
    })
}

// ----------------------------------------------------------------------
// 纹理与帧缓冲
// ----------------------------------------------------------------------

pub(crate) fn create_texture<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_device(&ctx, &state, |device| Ok(device.create_texture()?.get()))
    })
}

pub(crate) fn bind_texture<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, texture: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let texture = marshal::optional_handle(&texture, "texture")?.map(TextureId::from_raw);
            device.bind_texture(texture);
            Ok(())
        })
    })
}

/// `TEXTURE0 + unit`
pub(crate) fn active_texture<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, unit: Value<'js>| {
        with_device(&ctx, &state, |device| {
            device.active_texture(marshal::unsigned(&unit, "texture unit")?);
            Ok(())
        })
    })
}

/// 上传到当前绑定的纹理，返回通道数
pub(crate) fn update_texture<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, image: Value<'js>| {
        with_device(&ctx, &state, |device| {
            let image = marshal::image_arg(&image)?;
            let format = upload_pixels(device, image.width, image.height, &image.data)?;
            Ok(format.channels() as u32)
        })
    })
}

/// 返回 `{fbo, texture, width, height}`
pub(crate) fn create_framebuffer<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, width: Value<'js>, height: Value<'js>| -> Result<Object<'js>> {
            let target = with_device(&ctx, &state, |device| {
                let width = marshal::unsigned(&width, "width")?;
                let height = marshal::unsigned(&height, "height")?;
                Ok(create_render_target(device, width, height)?)
            })?;
            marshal::render_target_object(&ctx, &target)
        },
    )
}

pub(crate) fn begin_framebuffer<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, target: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<()> {
            let target = marshal::render_target_arg(&target)?;
            host.context()?.begin_render_target(&target);
            Ok(())
        })
    })
}

pub(crate) fn end_framebuffer<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<()> {
            host.context()?.end_render_target();
            Ok(())
        })
    })
}
