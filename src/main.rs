use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use zhuobu::audio::{default_backend_factory, BackendFactory};
use zhuobu::config::EngineConfig;
use zhuobu::core::{logging, EngineResult, ScriptError};
use zhuobu::platform::{HeadlessPlatform, Platform};
use zhuobu::scripting::{ScriptHost, FUNCTION_TABLE};

/// 运行绑定了窗口、GL 与音频的 QuickJS 脚本
#[derive(Debug, Parser)]
#[command(name = "zhuobu", version, about)]
struct Cli {
    /// 配置文件（TOML 或 JSON），缺省时自动查找
    #[arg(long)]
    config: Option<PathBuf>,

    /// 资源根目录，缺省为脚本所在目录
    #[arg(long)]
    assets: Option<PathBuf>,

    /// 不打开窗口和音频设备
    #[arg(long)]
    headless: bool,

    /// 脚本求值后调用的函数（入口模块的导出或全局函数），例如 `mainQuickjs`
    #[arg(long, value_name = "NAME")]
    call: Option<String>,

    /// 打印函数表后退出
    #[arg(long)]
    list_bindings: bool,

    /// 入口脚本
    #[arg(required_unless_present = "list_bindings")]
    script: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> EngineResult<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::load_or_default(),
    };
    config.apply_env_overrides();
    if let Some(root) = &cli.assets {
        config.assets.root = Some(root.clone());
    }
    if cli.headless {
        config.audio.muted = true;
    }
    config.validate()?;
    Ok(config)
}

fn platform(headless: bool) -> EngineResult<Box<dyn Platform>> {
    if headless {
        return Ok(Box::new(HeadlessPlatform::new()));
    }
    #[cfg(feature = "native")]
    {
        Ok(Box::new(zhuobu::platform::desktop::GlfwPlatform::new()))
    }
    #[cfg(not(feature = "native"))]
    {
        Err(zhuobu::core::PlatformError::NotSupported(
            "built without the `native` feature; run with --headless".to_string(),
        )
        .into())
    }
}

fn list_bindings() {
    println!("{:<28} {:>5}  group", "name", "arity");
    for spec in FUNCTION_TABLE {
        println!("{:<28} {:>5}  {}", spec.name, spec.arity, spec.group);
    }
}

fn run(cli: Cli) -> EngineResult<()> {
    let config = load_config(&cli)?;
    logging::init(&config.logging)?;

    if cli.list_bindings {
        list_bindings();
        return Ok(());
    }

    let script = cli
        .script
        .ok_or_else(|| ScriptError::Runtime("no script given".to_string()))?;

    let audio: BackendFactory = default_backend_factory(&config.audio);
    let host = ScriptHost::new(config, platform(cli.headless)?, audio)?;

    host.run_file(&script)?;
    if let Some(name) = &cli.call {
        host.call_global(name)?;
    }

    if host.is_terminated() {
        tracing::info!(target: "zhuobu", "script terminated the host");
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(target: "zhuobu", "{}", e);
            eprintln!("zhuobu: {}", e);
            ExitCode::FAILURE
        }
    }
}
