//! # 参数编组
//!
//! 把脚本值转换为原生标量和缓冲区，以及把原生结果包装回脚本对象。
//!
//! - 数组类（`Array`、带 `length` 的对象、类型化数组）逐元素读取，遇到
//!   非数字元素立即失败并报告下标
//! - `bufferData` 的数据源：`ArrayBuffer` 与类型化数组按原始字节上传，
//!   普通数组按目标编码为 `f32` 或 `u32`
//! - 句柄：`null`、`undefined` 与 `0` 表示“无”

use std::num::NonZeroU32;

use rquickjs::convert::Coerced;
use rquickjs::{ArrayBuffer, Ctx, Exception, FromJs, Object, TypedArray, Value};

use crate::core::{BindingError, BindingResult};
use crate::render::{FramebufferId, RenderTarget, TextureId};
use crate::resources::ImageData;

/// 普通数组上传到缓冲区时的元素编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementEncoding {
    /// 顶点数据
    F32,
    /// 索引数据
    U32,
}

/// `updateTexture` 的参数 `{width, height, data}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArg {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

pub fn type_name(value: &Value<'_>) -> String {
    format!("{:?}", value.type_of()).to_lowercase()
}

fn mismatch(expected: &'static str, value: &Value<'_>) -> BindingError {
    BindingError::TypeMismatch {
        expected,
        found: type_name(value),
    }
}

/// 捕获的异常文本：`Error` 对象取消息和调用栈，其他值转为字符串
pub fn exception_text(caught: Value<'_>) -> String {
    let exception = caught
        .as_object()
        .and_then(|object| Exception::from_object(object.clone()));
    if let Some(exception) = exception {
        let message = exception.message().unwrap_or_default();
        return match exception.stack() {
            Some(stack) if !stack.trim().is_empty() => format!("{}\n{}", message, stack.trim_end()),
            _ => message,
        };
    }
    let ctx = caught.ctx().clone();
    match Coerced::<String>::from_js(&ctx, caught) {
        Ok(text) => text.0,
        Err(_) => "unknown exception".to_string(),
    }
}

/// 读取属性失败；getter 抛出的异常取出原文，不再以通用错误代替
fn access_error(object: &Object<'_>, name: String, error: rquickjs::Error) -> BindingError {
    let reason = match error {
        rquickjs::Error::Exception => exception_text(object.ctx().catch()),
        other => other.to_string(),
    };
    BindingError::Property { name, reason }
}

fn property<'js>(object: &Object<'js>, name: &str) -> BindingResult<Value<'js>> {
    object
        .get::<_, Value>(name)
        .map_err(|e| access_error(object, name.to_string(), e))
}

fn element<'js>(object: &Object<'js>, index: usize) -> BindingResult<Value<'js>> {
    object
        .get::<_, Value>(index as u32)
        .map_err(|e| access_error(object, index.to_string(), e))
}

fn required<'js>(object: &Object<'js>, name: &'static str) -> BindingResult<Value<'js>> {
    let value = property(object, name)?;
    if value.is_undefined() {
        return Err(BindingError::MissingProperty(name));
    }
    Ok(value)
}

/// 读取数字
pub fn number(value: &Value<'_>) -> BindingResult<f64> {
    value.as_number().ok_or_else(|| mismatch("number", value))
}

/// `undefined` 时取默认值
pub fn number_or(value: &Value<'_>, default: f64) -> BindingResult<f64> {
    if value.is_undefined() {
        Ok(default)
    } else {
        number(value)
    }
}

/// JavaScript 真值规则的简化版：布尔、数字、`null`/`undefined`，其余对象为真
pub fn truthy(value: &Value<'_>) -> bool {
    if let Some(b) = value.as_bool() {
        b
    } else if let Some(n) = value.as_number() {
        n != 0.0 && !n.is_nan()
    } else if let Some(s) = value.as_string() {
        s.to_string().map(|s| !s.is_empty()).unwrap_or(false)
    } else {
        !(value.is_null() || value.is_undefined())
    }
}

pub fn string(value: &Value<'_>) -> BindingResult<String> {
    let s = value.as_string().ok_or_else(|| mismatch("string", value))?;
    s.to_string().map_err(|e| BindingError::TypeMismatch {
        expected: "string",
        found: e.to_string(),
    })
}

/// 非负整数，不超过 `u32::MAX`
pub fn unsigned(value: &Value<'_>, what: &'static str) -> BindingResult<u32> {
    let n = number(value)?;
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Ok(n as u32)
    } else {
        Err(BindingError::InvalidInteger { what, value: n })
    }
}

/// GL 句柄；`null`、`undefined` 与 `0` 为 `None`
pub fn optional_handle(value: &Value<'_>, what: &'static str) -> BindingResult<Option<NonZeroU32>> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    unsigned(value, what).map(NonZeroU32::new)
}

/// 必须非零的 GL 句柄
pub fn handle(value: &Value<'_>, what: &'static str) -> BindingResult<NonZeroU32> {
    optional_handle(value, what)?.ok_or(BindingError::InvalidInteger { what, value: 0.0 })
}

fn array_length(object: &Object<'_>, value: &Value<'_>) -> BindingResult<usize> {
    let length = property(object, "length")?;
    if length.is_undefined() {
        return Err(mismatch("array", value));
    }
    unsigned(&length, "length").map(|n| n as usize)
}

/// 数组类转换为 `f64` 序列，保持顺序
pub fn numbers(value: &Value<'_>) -> BindingResult<Vec<f64>> {
    let object = value.as_object().ok_or_else(|| mismatch("array", value))?;
    let len = array_length(object, value)?;
    let mut out = Vec::with_capacity(len);
    for index in 0..len {
        let item = element(object, index)?;
        out.push(item.as_number().ok_or(BindingError::NotANumber { index })?);
    }
    Ok(out)
}

pub fn numbers_f32(value: &Value<'_>) -> BindingResult<Vec<f32>> {
    Ok(numbers(value)?.into_iter().map(|n| n as f32).collect())
}

/// 定长浮点数组，例如 `[f32; 16]` 矩阵
pub fn fixed_f32<const N: usize>(value: &Value<'_>) -> BindingResult<[f32; N]> {
    let values = numbers_f32(value)?;
    let found = values.len();
    values
        .try_into()
        .map_err(|_| BindingError::LengthMismatch { expected: N, found })
}

/// 至少 `min` 个元素，不足 `N` 的部分用 `fill` 补齐，多余的忽略
pub fn padded_f32<const N: usize>(value: &Value<'_>, min: usize, fill: f32) -> BindingResult<[f32; N]> {
    let values = numbers_f32(value)?;
    if values.len() < min {
        return Err(BindingError::LengthMismatch {
            expected: min,
            found: values.len(),
        });
    }
    let mut out = [fill; N];
    for (slot, v) in out.iter_mut().zip(values) {
        *slot = v;
    }
    Ok(out)
}

/// `ArrayBuffer` 视图（类型化数组、`DataView`）覆盖的字节
fn view_bytes(object: &Object<'_>) -> BindingResult<Option<Vec<u8>>> {
    let buffer = property(object, "buffer")?;
    let Ok(buffer) = buffer.get::<ArrayBuffer>() else {
        return Ok(None);
    };
    let offset = unsigned(&property(object, "byteOffset")?, "byteOffset")? as usize;
    let len = unsigned(&property(object, "byteLength")?, "byteLength")? as usize;
    let bytes = buffer.as_bytes().ok_or(BindingError::TypeMismatch {
        expected: "attached ArrayBuffer",
        found: "detached ArrayBuffer".to_string(),
    })?;
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    bytes
        .get(offset..end)
        .map(|slice| Some(slice.to_vec()))
        .ok_or(BindingError::LengthMismatch {
            expected: end,
            found: bytes.len(),
        })
}

/// 二进制数据源的原始字节；普通数组返回 `None`
fn raw_bytes(value: &Value<'_>) -> BindingResult<Option<Vec<u8>>> {
    let object = value.as_object().ok_or_else(|| mismatch("array or ArrayBuffer", value))?;
    if let Some(bytes) = view_bytes(object)? {
        return Ok(Some(bytes));
    }
    if let Ok(buffer) = value.get::<ArrayBuffer>() {
        let bytes = buffer.as_bytes().ok_or(BindingError::TypeMismatch {
            expected: "attached ArrayBuffer",
            found: "detached ArrayBuffer".to_string(),
        })?;
        return Ok(Some(bytes.to_vec()));
    }
    Ok(None)
}

/// `bufferData` / `bufferDataElement` 的上传字节
pub fn buffer_bytes(value: &Value<'_>, encoding: ElementEncoding) -> BindingResult<Vec<u8>> {
    if let Some(bytes) = raw_bytes(value)? {
        return Ok(bytes);
    }
    let values = numbers(value)?;
    let bytes = match encoding {
        ElementEncoding::F32 => {
            let floats: Vec<f32> = values.into_iter().map(|n| n as f32).collect();
            bytemuck::cast_slice(&floats).to_vec()
        }
        ElementEncoding::U32 => {
            let mut indices = Vec::with_capacity(values.len());
            for n in values {
                if !(n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64) {
                    return Err(BindingError::InvalidInteger { what: "index", value: n });
                }
                indices.push(n as u32);
            }
            bytemuck::cast_slice(&indices).to_vec()
        }
    };
    Ok(bytes)
}

/// 像素数据：原始字节，或每个元素为 0..=255 的普通数组
pub fn pixel_bytes(value: &Value<'_>) -> BindingResult<Vec<u8>> {
    if let Some(bytes) = raw_bytes(value)? {
        return Ok(bytes);
    }
    numbers(value)?
        .into_iter()
        .map(|n| {
            if n.is_finite() && (0.0..=255.0).contains(&n) && n.fract() == 0.0 {
                Ok(n as u8)
            } else {
                Err(BindingError::InvalidInteger { what: "pixel", value: n })
            }
        })
        .collect()
}

/// 读取 `{width, height, data}`
pub fn image_arg(value: &Value<'_>) -> BindingResult<ImageArg> {
    let object = value.as_object().ok_or_else(|| mismatch("image object", value))?;
    Ok(ImageArg {
        width: unsigned(&required(object, "width")?, "width")?,
        height: unsigned(&required(object, "height")?, "height")?,
        data: pixel_bytes(&required(object, "data")?)?,
    })
}

/// 读取 `{fbo, texture, width, height}`
pub fn render_target_arg(value: &Value<'_>) -> BindingResult<RenderTarget> {
    let object = value.as_object().ok_or_else(|| mismatch("framebuffer object", value))?;
    Ok(RenderTarget {
        fbo: FramebufferId::from_raw(handle(&required(object, "fbo")?, "fbo")?),
        texture: TextureId::from_raw(handle(&required(object, "texture")?, "texture")?),
        width: unsigned(&required(object, "width")?, "width")?,
        height: unsigned(&required(object, "height")?, "height")?,
    })
}

/// `{width, height, channels, data: Uint8Array}`
pub fn image_object<'js>(ctx: &Ctx<'js>, image: ImageData) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    object.set("width", image.width)?;
    object.set("height", image.height)?;
    object.set("channels", image.channels as u32)?;
    object.set("data", TypedArray::<u8>::new(ctx.clone(), image.pixels)?)?;
    Ok(object)
}

/// `{fbo, texture, width, height}`
pub fn render_target_object<'js>(ctx: &Ctx<'js>, target: &RenderTarget) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    object.set("fbo", target.fbo.get())?;
    object.set("texture", target.texture.get())?;
    object.set("width", target.width)?;
    object.set("height", target.height)?;
    Ok(object)
}
