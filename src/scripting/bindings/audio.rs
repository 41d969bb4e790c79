//! 音频绑定

use std::rc::Rc;

use rquickjs::function::Opt;
use rquickjs::{Ctx, Function, Result, Value};

use crate::audio::SoundHandle;
use crate::core::EngineResult;
use crate::marshal;
use crate::scripting::state::SharedState;

use super::{or_undefined, with_state};

fn sound(value: &Value<'_>) -> EngineResult<SoundHandle> {
    Ok(SoundHandle::from_raw(marshal::unsigned(value, "sound handle")?))
}

/// `loadAudio(path)`，相对路径以资源根目录解析
pub(crate) fn load_audio<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, path: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<u32> {
            host.ensure_running()?;
            let path = host.assets.resolve(marshal::string(&path)?);
            Ok(host.audio.load(&path)?.raw())
        })
    })
}

/// `playAudio(handle, volume = 1, loop = false)`
pub(crate) fn play_audio<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, handle: Value<'js>, volume: Opt<Value<'js>>, looped: Opt<Value<'js>>| {
            let volume = or_undefined(&ctx, volume);
            let looped = or_undefined(&ctx, looped);
            with_state(&ctx, &state, |host| -> EngineResult<()> {
                host.ensure_running()?;
                let handle = sound(&handle)?;
                let volume = marshal::number_or(&volume, 1.0)? as f32;
                host.audio.play(handle, volume, marshal::truthy(&looped))?;
                Ok(())
            })
        },
    )
}

pub(crate) fn stop_audio<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, handle: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<()> {
            host.ensure_running()?;
            host.audio.stop(sound(&handle)?)?;
            Ok(())
        })
    })
}

/// 停止播放并释放槽位
pub(crate) fn unload_audio<'js>(ctx: &Ctx<'js>, state: &SharedState) -> Result<Function<'js>> {
    let state = Rc::clone(state);
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, handle: Value<'js>| {
        with_state(&ctx, &state, |host| -> EngineResult<()> {
            host.ensure_running()?;
            host.audio.unload(sound(&handle)?)?;
            Ok(())
        })
    })
}
