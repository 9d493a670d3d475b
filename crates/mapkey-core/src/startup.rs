//! 启动编排：从构建元数据取出定义清单 → 解析地图密钥 → 初始化 SDK → 注册插件。
//!
//! 流程：
//! 1) 从 [`MetadataSource`] 读取 `DART_DEFINES`；缺失或非字符串属于致命配置错误，立即返回
//! 2) 解析 `GOOGLE_MAPS_KEY`；找到则调用一次 [`MapsSdk::provide_api_key`]
//! 3) 调用一次 [`PluginHost::register_plugins`]（密钥未找到时同样执行）
//!
//! 约束：
//! - 本模块只返回错误，不终止进程；终止进程由宿主入口（launcher）负责
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use thiserror::Error;
use tracing::{info, warn};

use crate::defines::{self, ResolvedSecret, GOOGLE_MAPS_KEY};
use crate::metadata::{MetadataSource, MetadataValue, DART_DEFINES};

/// 第三方地图 SDK 初始化入口。
///
/// 约定：
/// - 同步调用，无返回值；密钥所有权随调用转移给 SDK
pub trait MapsSdk {
    fn provide_api_key(&mut self, api_key: ResolvedSecret);
}

/// 宿主运行时（插件注册）。
pub trait PluginHost {
    fn register_plugins(&mut self);
}

/// 致命配置错误。
///
/// 说明：
/// - 两种错误都意味着构建产物配置有误，重试没有意义
/// - 错误文本包含缺失的配置键名，便于排障
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("{key} is missing in build metadata")]
    ManifestMissing { key: String },
    #[error("{key} is invalid in build metadata (expected a string)")]
    ManifestInvalid { key: String },
}

/// 非致命的启动结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// 已找到密钥并交给 SDK。
    SdkInitialized,
    /// 清单存在但不含目标键；SDK 未初始化。
    KeyNotFound,
}

/// 启动参数。
///
/// 说明：
/// - 默认值即生产配置（`DART_DEFINES` / `GOOGLE_MAPS_KEY`）
/// - 覆盖键名仅用于诊断命令
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub manifest_key: String,
    pub target_key: String,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            manifest_key: DART_DEFINES.to_string(),
            target_key: GOOGLE_MAPS_KEY.to_string(),
        }
    }
}

/// 从元数据中读取编码清单。
///
/// 返回值：
/// - 成功：清单字符串（可能为空字符串，空字符串不是错误）
///
/// 异常处理：
/// - 键不存在：[`StartupError::ManifestMissing`]
/// - 值不是字符串：[`StartupError::ManifestInvalid`]
pub fn read_manifest(
    source: &dyn MetadataSource,
    manifest_key: &str,
) -> Result<String, StartupError> {
    match source.lookup(manifest_key) {
        MetadataValue::Present(manifest) => Ok(manifest),
        MetadataValue::NotString => Err(StartupError::ManifestInvalid {
            key: manifest_key.to_string(),
        }),
        MetadataValue::Absent => Err(StartupError::ManifestMissing {
            key: manifest_key.to_string(),
        }),
    }
}

/// 使用默认参数执行启动编排。
pub fn run_startup(
    source: &dyn MetadataSource,
    sdk: &mut dyn MapsSdk,
    host: &mut dyn PluginHost,
) -> Result<StartupOutcome, StartupError> {
    run_startup_with(&StartupOptions::default(), source, sdk, host)
}

/// 执行启动编排。
///
/// 参数：
/// - `options`：清单键名与目标键名
/// - `source`：构建元数据来源
/// - `sdk`：地图 SDK
/// - `host`：宿主运行时
///
/// 返回值：
/// - `Ok(SdkInitialized)` / `Ok(KeyNotFound)`：启动继续
///
/// 异常处理：
/// - 清单缺失/非法时返回 [`StartupError`]，此时 SDK 与宿主均未被调用
pub fn run_startup_with(
    options: &StartupOptions,
    source: &dyn MetadataSource,
    sdk: &mut dyn MapsSdk,
    host: &mut dyn PluginHost,
) -> Result<StartupOutcome, StartupError> {
    let manifest = read_manifest(source, &options.manifest_key)?;

    let outcome = match defines::resolve_define(&manifest, &options.target_key) {
        Some(secret) => {
            info!(key = %options.target_key, "已解析地图密钥，初始化 SDK");
            sdk.provide_api_key(secret);
            StartupOutcome::SdkInitialized
        }
        None => {
            warn!(key = %options.target_key, "定义清单中未找到目标键，跳过 SDK 初始化");
            StartupOutcome::KeyNotFound
        }
    };

    host.register_plugins();
    Ok(outcome)
}
