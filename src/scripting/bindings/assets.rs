//! 文本与图片加载

use std::rc::Rc;

use rquickjs::{Ctx, Function, Object, Result, Value};

use crate::core::EngineResult;
use crate::marshal;
use crate::scripting::state::SharedState;

use super::with_state;

pub(crate) fn load_text<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, path: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<String> {
            host.ensure_running()?;
            Ok(host.assets.load_text(marshal::string(&path)?)?)
        })
    })
}

/// 返回 `{width, height, channels, data: Uint8Array}`
pub(crate) fn load_image<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, path: Value<'js>| -> Result<Object<'js>> {
            let image = with_state(&ctx, &state, |host| -> EngineResult<_> {
                host.ensure_running()?;
                Ok(host.assets.load_image(marshal::string(&path)?)?)
            })?;
            marshal::image_object(&ctx, image)
        },
    )
}
