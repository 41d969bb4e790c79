//! 窗口与帧控制

use std::rc::Rc;

use glam::Vec3;
use rquickjs::function::Opt;
use rquickjs::{Ctx, Function, IntoJs, Result, Value};

use crate::context::WindowContext;
use crate::core::{EngineError, EngineResult};
use crate::marshal;
use crate::render::Square;

use super::{or_undefined, with_state};
use crate::scripting::state::SharedState;

/// 无参数、作用于已初始化上下文的绑定
fn context_fn<'js, R>(
    ctx: &Ctx<'js>,
    state: &SharedState,
    f: fn(&mut WindowContext) -> R,
) -> Result<Function<'js>>
where
    R: IntoJs<'js> + 'js,
{
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_state(&ctx, &state, |host| Ok::<_, EngineError>(f(host.context()?)))
    })
}

pub(crate) fn init_context<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_state(&ctx, &state, |host| host.init_context())
    })
}

/// `terminate` 与 `uninitContext`
pub(crate) fn terminate<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
        with_state(&ctx, &state, |host| {
            host.terminate();
            Ok::<_, EngineError>(())
        })
    })
}

/// `shouldClose` 与 `shouldCloseWindow`
pub(crate) fn should_close<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| c.should_close())
}

pub(crate) fn begin_frame<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| {
        c.begin_frame();
    })
}

pub(crate) fn end_frame<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, WindowContext::end_frame)
}

pub(crate) fn swap_buffers<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, WindowContext::swap_buffers)
}

pub(crate) fn poll_events<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, WindowContext::poll_events)
}

/// 上一次 `beginFrame` 的毫秒数
pub(crate) fn now<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| c.now_ms())
}

/// 自 `initContext` 以来的秒数
pub(crate) fn get_time<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| c.time())
}

pub(crate) fn get_screen_width<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| c.screen_size().0)
}

pub(crate) fn get_screen_height<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| c.screen_size().1)
}

pub(crate) fn resize<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, |c| {
        c.refresh_size();
    })
}

/// 只清除颜色缓冲
pub(crate) fn clear<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    context_fn(ctx, state, WindowContext::clear)
}

pub(crate) fn get_key<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, key: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<bool> {
            let key = marshal::number(&key)?;
            Ok(host.context()?.key_down(key as i32))
        })
    })
}

/// `setClearColor` 与 `clearColor`
pub(crate) fn set_clear_color<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, r: Value<'js>, g: Value<'js>, b: Value<'js>, a: Opt<Value<'js>>| {
            let a = or_undefined(&ctx, a);
            with_state(&ctx, &state, |host| -> EngineResult<()> {
                let color = [
                    marshal::number(&r)? as f32,
                    marshal::number(&g)? as f32,
                    marshal::number(&b)? as f32,
                    marshal::number_or(&a, 1.0)? as f32,
                ];
                host.context()?.set_clear_color(color);
                Ok(())
            })
        },
    )
}

/// `drawSquare(position, rotation, scale, color)`
pub(crate) fn draw_square<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>,
              position: Value<'js>,
              rotation: Value<'js>,
              scale: Value<'js>,
              color: Value<'js>| {
            with_state(&ctx, &state, |host| -> EngineResult<()> {
                let square = Square {
                    position: Vec3::from_array(marshal::padded_f32::<3>(&position, 2, 0.0)?),
                    rotation: marshal::number_or(&rotation, 0.0)? as f32,
                    scale: Vec3::from_array(marshal::padded_f32::<3>(&scale, 2, 1.0)?),
                    color: marshal::padded_f32::<4>(&color, 3, 1.0)?,
                };
                host.context()?.draw_square(&square)?;
                Ok(())
            })
        },
    )
}
