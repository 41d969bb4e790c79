//! 脚本宿主
//!
//! 持有 QuickJS 运行时与上下文、共享的 [`HostState`]，以及异步函数的拒绝记录。
//! 入口文件按内容作为 ES 模块或经典脚本求值；函数表既挂在命名空间对象上，
//! 也作为原生模块导出。`async` 函数的 promise 由 [`ScriptHost::run_pending_jobs`] 驱动。

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use rquickjs::function::This;
use rquickjs::{Context, Ctx, FromJs, Function, Module, Object, Runtime, Undefined, Value};

use crate::audio::{AudioFacade, BackendFactory};
use crate::config::EngineConfig;
use crate::core::{AssetError, EngineResult, ScriptError, ScriptResult};
use crate::marshal;
use crate::platform::Platform;

use super::bindings::console;
use super::modules::{self, ModuleLoader, EXPORTS_KEY};
use super::state::{HostState, SharedState};
use super::table;

pub struct ScriptHost {
    runtime: Runtime,
    context: Context,
    state: SharedState,
    rejection: Rc<RefCell<Option<String>>>,
    /// 最近一次求值的入口模块名
    entry: RefCell<Option<String>>,
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHost")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn script_error(ctx: &Ctx<'_>, name: &str, error: rquickjs::Error) -> ScriptError {
    let message = match error {
        rquickjs::Error::Exception => marshal::exception_text(ctx.catch()),
        other => other.to_string(),
    };
    ScriptError::Exception {
        name: name.to_string(),
        message,
    }
}

impl ScriptHost {
    /// 创建运行时、安装 `console` 与已启用的绑定组
    pub fn new(
        config: EngineConfig,
        platform: Box<dyn Platform>,
        audio_factory: BackendFactory,
    ) -> ScriptResult<Self> {
        let runtime = Runtime::new().map_err(|e| ScriptError::Runtime(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| ScriptError::Runtime(e.to_string()))?;
        runtime.set_loader(
            ModuleLoader::new(config.bindings.module.as_str()),
            ModuleLoader::new(config.bindings.module.as_str()),
        );

        let bindings = config.bindings.clone();
        let audio = AudioFacade::new(&config.audio, audio_factory);
        let state: SharedState = Rc::new(RefCell::new(HostState::new(config, platform, audio)));

        let installed = context.with(|ctx| -> rquickjs::Result<usize> {
            console::install(&ctx)?;
            let globals = ctx.globals();
            let namespace = Object::new(ctx.clone())?;
            let mut installed = 0;
            for spec in table::enabled_bindings(&bindings) {
                let function = (spec.install)(&ctx, &state)?.with_length(spec.arity)?;
                if bindings.install_globals {
                    globals.set(spec.name, function.clone())?;
                }
                namespace.set(spec.name, function)?;
                installed += 1;
            }
            globals.set(EXPORTS_KEY, namespace.clone())?;
            globals.set(bindings.namespace.as_str(), namespace)?;
            Ok(installed)
        });
        let installed = installed
            .map_err(|e| ScriptError::InvalidBinding(format!("failed to install bindings: {}", e)))?;

        tracing::info!(
            target: "scripting",
            namespace = %bindings.namespace,
            module = %bindings.module,
            globals = bindings.install_globals,
            installed,
            "script host ready"
        );

        Ok(Self {
            runtime,
            context,
            state,
            rejection: Rc::new(RefCell::new(None)),
            entry: RefCell::new(None),
        })
    }

    /// 共享宿主状态
    pub fn state(&self) -> SharedState {
        Rc::clone(&self.state)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut HostState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    pub fn is_terminated(&self) -> bool {
        self.state.borrow().is_terminated()
    }

    /// 以经典脚本方式求值
    pub fn eval(&self, source: &str, name: &str) -> ScriptResult<()> {
        tracing::debug!(target: "scripting", name, bytes = source.len(), "evaluating script");
        self.context.with(|ctx| {
            ctx.eval::<Value, _>(source)
                .map(|_| ())
                .map_err(|e| script_error(&ctx, name, e))
        })
    }

    /// 求值并把结果转换为 `T`
    pub fn eval_as<T>(&self, source: &str) -> ScriptResult<T>
    where
        T: for<'js> FromJs<'js>,
    {
        self.context.with(|ctx| {
            ctx.eval::<T, _>(source)
                .map_err(|e| script_error(&ctx, "<eval>", e))
        })
    }

    /// 以 ES 模块方式求值；`name` 同时是相对导入的基准路径
    pub fn eval_module(&self, source: &str, name: &str) -> ScriptResult<()> {
        tracing::debug!(target: "scripting", name, bytes = source.len(), "evaluating module");
        self.context.with(|ctx| {
            Module::evaluate(ctx.clone(), name, source)
                .map(|_| ())
                .map_err(|e| script_error(&ctx, name, e))
        })?;
        *self.entry.borrow_mut() = Some(name.to_string());
        Ok(())
    }

    /// 运行脚本文件；未配置资源根目录时使用脚本所在目录
    pub fn run_file(&self, path: &Path) -> EngineResult<()> {
        let source = std::fs::read_to_string(path).map_err(|source| AssetError::Open {
            path: path.display().to_string(),
            source,
        })?;
        {
            let mut state = self.state.borrow_mut();
            if state.assets.root().is_none() {
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                state.assets.set_root(Some(dir));
            }
        }
        let name = modules::normalize(path);
        if modules::is_module(path, &source) {
            self.eval_module(&source, &name)?;
        } else {
            self.eval(&source, &name)?;
        }
        self.run_pending_jobs()?;
        Ok(())
    }

    /// 按名字找入口函数：先查入口模块的导出，再查全局
    fn entry_function<'js>(&self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Option<Function<'js>>> {
        if let Some(entry) = self.entry.borrow().as_deref() {
            let exports: Object = Module::import(ctx, entry)?;
            if let Some(function) = exports.get::<_, Value>(name)?.into_function() {
                return Ok(Some(function));
            }
        }
        Ok(ctx
            .globals()
            .get::<_, Value>(name)
            .ok()
            .and_then(|value| value.into_function()))
    }

    /// 调用入口模块导出的或全局的函数；返回 promise 时驱动到完成并报告拒绝
    pub fn call_global(&self, name: &str) -> ScriptResult<()> {
        tracing::debug!(target: "scripting", name, "calling entry function");
        self.context.with(|ctx| -> ScriptResult<()> {
            let function = self
                .entry_function(&ctx, name)
                .map_err(|e| script_error(&ctx, name, e))?
                .ok_or_else(|| ScriptError::FunctionNotFound(name.to_string()))?;

            let result: Value = function
                .call(())
                .map_err(|e| script_error(&ctx, name, e))?;
            self.watch_rejection(&ctx, result)
                .map_err(|e| script_error(&ctx, name, e))
        })?;

        self.run_pending_jobs()?;
        match self.rejection.borrow_mut().take() {
            Some(message) => Err(ScriptError::Exception {
                name: name.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    /// 对 thenable 结果挂一个拒绝回调，记录拒绝原因
    fn watch_rejection<'js>(&self, ctx: &Ctx<'js>, result: Value<'js>) -> rquickjs::Result<()> {
        let Some(object) = result.as_object() else {
            return Ok(());
        };
        let Ok(then) = object.get::<_, Function>("then") else {
            return Ok(());
        };
        let slot = Rc::clone(&self.rejection);
        let on_rejected = Function::new(ctx.clone(), move |reason: Value<'js>| {
            *slot.borrow_mut() = Some(marshal::exception_text(reason));
        })?;
        then.call::<_, Value>((This(object.clone()), Undefined, on_rejected))?;
        Ok(())
    }

    /// 执行所有待处理的 promise 任务
    pub fn run_pending_jobs(&self) -> ScriptResult<()> {
        while self.runtime.is_job_pending() {
            if self.runtime.execute_pending_job().is_err() {
                let message = self.context.with(|ctx| marshal::exception_text(ctx.catch()));
                return Err(ScriptError::Exception {
                    name: "<job>".to_string(),
                    message,
                });
            }
        }
        Ok(())
    }
}
