//! 函数表中各项的原生实现
//!
//! 每个 `install_*` 函数创建一个捕获 [`SharedState`] 的 QuickJS 函数。
//! 原生错误统一转换为脚本异常，消息为 `EngineError` 的显示文本。

pub(crate) mod assets;
pub(crate) mod audio;
pub(crate) mod console;
pub(crate) mod frame;
pub(crate) mod gl;

use rquickjs::function::Opt;
use rquickjs::{Ctx, Exception, Value};

use crate::core::{EngineError, ScriptError};

use super::state::{HostState, SharedState};

pub(crate) fn to_exception(ctx: &Ctx<'_>, error: EngineError) -> rquickjs::Error {
    tracing::debug!(target: "scripting", %error, "binding raised exception");
    Exception::throw_message(ctx, &error.to_string())
}

/// 借用宿主状态执行 `f`，错误转换为脚本异常
pub(crate) fn with_state<T, E>(
    ctx: &Ctx<'_>,
    state: &SharedState,
    f: impl FnOnce(&mut HostState) -> Result<T, E>,
) -> rquickjs::Result<T>
where
    E: Into<EngineError>,
{
    let mut host = state.try_borrow_mut().map_err(|_| {
        to_exception(
            ctx,
            ScriptError::InvalidBinding("re-entrant call into the host".to_string()).into(),
        )
    })?;
    f(&mut host).map_err(|e| to_exception(ctx, e.into()))
}

/// 缺省参数视为 `undefined`
pub(crate) fn or_undefined<'js>(ctx: &Ctx<'js>, value: Opt<Value<'js>>) -> Value<'js> {
    value.0.unwrap_or_else(|| Value::new_undefined(ctx.clone()))
}
