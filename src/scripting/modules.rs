//! ES 模块支持
//!
//! 函数表同时以原生模块的形式提供（默认名 `context`），入口脚本可以写
//! `import { initContext } from "context"`。相对路径的导入按导入方所在目录解析，
//! 从磁盘读取源码。

use std::path::{Component, Path, PathBuf};

use rquickjs::loader::{Loader, Resolver};
use rquickjs::module::{Declarations, Exports, ModuleData, ModuleDef};
use rquickjs::{Ctx, Error, Object, Result, Value};

use super::table::FUNCTION_TABLE;

/// 保存命名空间对象的全局键，原生模块求值时从这里取导出值
pub(crate) const EXPORTS_KEY: &str = "__zhuobu_exports__";

/// 把函数表导出为模块；未启用的分组导出 `undefined`
pub struct BindingModule;

impl ModuleDef for BindingModule {
    fn declare(declare: &mut Declarations) -> Result<()> {
        for spec in FUNCTION_TABLE {
            declare.declare(spec.name)?;
        }
        declare.declare("default")?;
        Ok(())
    }

    fn evaluate<'js>(ctx: &Ctx<'js>, exports: &mut Exports<'js>) -> Result<()> {
        let namespace: Object = ctx.globals().get(EXPORTS_KEY)?;
        for spec in FUNCTION_TABLE {
            exports.export(spec.name, namespace.get::<_, Value>(spec.name)?)?;
        }
        exports.export("default", namespace)?;
        Ok(())
    }
}

/// 去掉 `.`，折叠 `..`，使同一文件只对应一个模块名
pub fn normalize(path: &Path) -> String {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().into_owned()
}

/// `.mjs` 总是模块，`.cjs` 总是经典脚本；其余按是否有顶层 `import`/`export` 判断
pub fn is_module(path: &Path, source: &str) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mjs") => true,
        Some("cjs") => false,
        _ => source.lines().map(str::trim_start).any(|line| {
            line.starts_with("import ")
                || line.starts_with("import{")
                || line.starts_with("export ")
                || line.starts_with("export{")
        }),
    }
}

/// 模块解析与加载：原生模块名直接命中，其余按文件处理
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    native: String,
}

impl ModuleLoader {
    pub fn new(native: impl Into<String>) -> Self {
        Self {
            native: native.into(),
        }
    }

    pub fn native_name(&self) -> &str {
        &self.native
    }

    /// 相对名按 `base` 所在目录解析，其余原样返回
    pub fn resolve_name(&self, base: &str, name: &str) -> String {
        if name == self.native || !name.starts_with('.') {
            return name.to_string();
        }
        let dir = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
        normalize(&dir.join(name))
    }
}

impl Resolver for ModuleLoader {
    fn resolve<'js>(&mut self, _ctx: &Ctx<'js>, base: &str, name: &str) -> Result<String> {
        let resolved = self.resolve_name(base, name);
        tracing::trace!(target: "scripting", base, name, %resolved, "resolved module");
        Ok(resolved)
    }
}

impl Loader for ModuleLoader {
    fn load<'js>(&mut self, _ctx: &Ctx<'js>, name: &str) -> Result<ModuleData> {
        if name == self.native {
            return Ok(ModuleData::native::<BindingModule, _>(name));
        }
        let source = std::fs::read_to_string(name)
            .map_err(|e| Error::new_loading_message(name, e.to_string()))?;
        tracing::debug!(target: "scripting", name, bytes = source.len(), "loading module");
        Ok(ModuleData::source(name, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./scripts/./run.js")), "scripts/run.js");
        assert_eq!(normalize(Path::new("scripts/object/../libs.js")), "scripts/libs.js");
        assert_eq!(normalize(Path::new("../up.js")), "../up.js");
    }

    #[test]
    fn test_resolve_relative_to_importer() {
        let loader = ModuleLoader::new("context");
        assert_eq!(loader.resolve_name("scripts/run.js", "./libs.js"), "scripts/libs.js");
        assert_eq!(
            loader.resolve_name("scripts/object/atlas.js", "../libs.js"),
            "scripts/libs.js"
        );
        assert_eq!(loader.resolve_name("scripts/run.js", "context"), "context");
        assert_eq!(loader.resolve_name("", "./main.js"), "main.js");
    }

    #[test]
    fn test_module_detection() {
        assert!(is_module(Path::new("run.js"), "import { a } from './libs.js';\n"));
        assert!(is_module(Path::new("run.js"), "const x = 1;\nexport async function main() {}"));
        assert!(!is_module(Path::new("run.js"), "initContext();\n// import nothing"));
        assert!(is_module(Path::new("run.mjs"), ""));
        assert!(!is_module(Path::new("run.cjs"), "export const a = 1;"));
    }
}
