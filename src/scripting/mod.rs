//! # 脚本模块
//!
//! - [`host`]: QuickJS 运行时与脚本入口
//! - [`table`]: 函数表与绑定分组
//! - [`modules`]: 原生模块与 ES 模块加载
//! - [`state`]: 绑定闭包共享的宿主状态
//! - `bindings`: 函数表中各项的原生实现

pub(crate) mod bindings;
pub mod host;
pub mod modules;
pub mod state;
pub mod table;

pub use host::ScriptHost;
pub use state::{HostState, SharedState};
pub use table::{enabled_bindings, BindingGroup, BindingSpec, FUNCTION_TABLE};
