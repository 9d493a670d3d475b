//! 宿主启动程序（launcher）。
//!
//! 职责：
//! - 读取打包产物中的构建元数据（`build-metadata.json`，或 `--from-env` 时读取环境变量）
//! - 执行启动编排：解析地图密钥 → 初始化地图 SDK → 注册插件
//! - 提供诊断子命令：按键取值（resolve）、列出清单中的键（inspect）
//!
//! 失败策略：
//! - 构建元数据不可读、清单缺失/非法均为致命配置错误：`main` 返回 `Err`，进程以非零状态退出
//! - 清单中找不到地图密钥不是致命错误：跳过 SDK 初始化，继续注册插件
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mapkey_core::defines::{self, ResolvedSecret, GOOGLE_MAPS_KEY};
use mapkey_core::metadata::{BuildMetadata, EnvMetadata, MetadataSource, DART_DEFINES};
use mapkey_core::paths;
use mapkey_core::startup::{self, MapsSdk, PluginHost, StartupOutcome};
use tracing::info;

/// 命令行参数。
///
/// 说明：
/// - `metadata` 指向构建元数据文件（默认：可执行文件同目录下的 `build-metadata.json`）
/// - `from_env` 改为从进程环境变量读取元数据
/// - `silent` 用于自动化场景（launch 不输出状态行）
#[derive(Debug, Parser)]
#[command(name = "mapkey-launcher", version)]
struct Cli {
    #[arg(long)]
    metadata: Option<String>,

    #[arg(long, default_value_t = false)]
    from_env: bool,

    #[arg(long, default_value_t = false)]
    silent: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// launcher 支持的子命令。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 执行启动流程（默认）。
    Launch,
    /// 输出指定键的值（默认 GOOGLE_MAPS_KEY）；未找到时返回错误。
    Resolve {
        #[arg(long, default_value = GOOGLE_MAPS_KEY)]
        key: String,
    },
    /// 列出清单中所有合法定义的键名（不输出值）。
    Inspect,
}

/// 程序入口：初始化日志、解析参数并分发子命令。
///
/// 异常处理：
/// - 任意子命令失败返回 `Err`，由运行时输出错误链并以非零状态退出。
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let source = load_source(&cli)?;
    match &cli.command {
        None | Some(Commands::Launch) => launch(&cli, source.as_ref()),
        Some(Commands::Resolve { key }) => resolve(source.as_ref(), key),
        Some(Commands::Inspect) => inspect(source.as_ref()),
    }
}

/// 按参数选择元数据来源。
///
/// 异常处理：
/// - 元数据文件路径无法确定、读取或解析失败时返回错误（致命）
fn load_source(cli: &Cli) -> Result<Box<dyn MetadataSource>> {
    if cli.from_env {
        info!("从环境变量读取构建元数据");
        return Ok(Box::new(EnvMetadata));
    }
    let path = metadata_path(cli)?;
    info!("读取构建元数据: {}", path.display());
    let metadata = BuildMetadata::load(&path)?;
    Ok(Box::new(metadata))
}

/// 计算元数据文件路径：显式参数按当前目录解析，否则使用默认位置。
fn metadata_path(cli: &Cli) -> Result<PathBuf> {
    match cli.metadata.as_deref() {
        Some(raw) => {
            let cwd = std::env::current_dir().context("获取当前目录失败")?;
            paths::resolve_path(&cwd, raw)
        }
        None => paths::default_metadata_file(),
    }
}

/// 地图 SDK 适配器。
///
/// 说明：
/// - 真实宿主中此处调用第三方 SDK 的密钥注入入口；launcher 只记录交接结果
/// - 日志仅包含密钥长度，不输出明文
#[derive(Debug)]
struct LoggingMapsSdk;

impl MapsSdk for LoggingMapsSdk {
    fn provide_api_key(&mut self, api_key: ResolvedSecret) {
        info!("地图 SDK 已接收密钥（{} 字节）", api_key.len());
    }
}

/// 宿主运行时适配器（插件注册）。
#[derive(Debug, Default)]
struct LoggingPluginHost {
    registered: bool,
}

impl PluginHost for LoggingPluginHost {
    fn register_plugins(&mut self) {
        info!("注册宿主插件");
        self.registered = true;
    }
}

/// 执行启动流程。
///
/// 主要步骤：
/// 1) 从元数据读取 `DART_DEFINES`
/// 2) 解析 `GOOGLE_MAPS_KEY` 并交给地图 SDK
/// 3) 注册插件
///
/// 异常处理：
/// - 清单缺失/非法返回错误（致命），错误信息包含缺失的配置键名
fn launch(cli: &Cli, source: &dyn MetadataSource) -> Result<()> {
    let mut sdk = LoggingMapsSdk;
    let mut host = LoggingPluginHost::default();
    let outcome = startup::run_startup(source, &mut sdk, &mut host)
        .context("构建配置错误，终止启动")?;

    if !cli.silent {
        match outcome {
            StartupOutcome::SdkInitialized => println!("maps sdk initialized"),
            StartupOutcome::KeyNotFound => println!("maps key not found"),
        }
        if host.registered {
            println!("plugins registered");
        }
    }
    info!("启动完成");
    Ok(())
}

/// 输出指定键的值到 stdout。
///
/// 异常处理：
/// - 清单缺失/非法返回错误
/// - 键不存在返回错误（诊断命令中视为失败）
fn resolve(source: &dyn MetadataSource, key: &str) -> Result<()> {
    let manifest = startup::read_manifest(source, DART_DEFINES)?;
    let secret = defines::resolve_define(&manifest, key)
        .ok_or_else(|| anyhow!("{DART_DEFINES} 中未找到定义: {key}"))?;
    println!("{}", secret.into_inner());
    Ok(())
}

/// 按清单顺序列出合法定义的键名，并输出被丢弃的 token 数量。
fn inspect(source: &dyn MetadataSource) -> Result<()> {
    let manifest = startup::read_manifest(source, DART_DEFINES)?;
    for define in defines::parse_defines(&manifest) {
        println!("{}", define.key);
    }
    println!("dropped = {}", defines::count_dropped(&manifest));
    Ok(())
}
