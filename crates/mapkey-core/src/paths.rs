//! 元数据文件路径约定。
//!
//! 目标：
//! - 默认从可执行文件所在目录读取 `build-metadata.json`（与打包产物放在一起）
//! - 命令行传入的相对路径按调用方给定的基准目录解析
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// 打包产物中的构建元数据文件名。
pub const METADATA_FILE_NAME: &str = "build-metadata.json";

/// 当前可执行文件所在目录。
///
/// 异常处理：
/// - 无法获取可执行文件路径，或路径没有父目录时返回错误。
pub fn current_exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("获取当前可执行文件路径失败")?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("可执行文件路径没有父目录: {}", exe.display()))
}

/// 默认构建元数据文件路径。
///
/// 返回值：
/// - `<exe 所在目录>\build-metadata.json`
pub fn default_metadata_file() -> Result<PathBuf> {
    Ok(current_exe_dir()?.join(METADATA_FILE_NAME))
}

/// 将路径字符串解析为实际路径。
///
/// 参数：
/// - `base`：相对路径的基准目录
/// - `raw`：路径字符串
///
/// 返回值：
/// - `raw` 为绝对路径：直接返回
/// - `raw` 为相对路径：返回 `base.join(raw)`
///
/// 异常处理：
/// - `raw` 为空字符串时返回错误，避免误用导致读取基准目录本身。
pub fn resolve_path(base: &Path, raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(anyhow!("空路径"));
    }
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        Ok(p)
    } else {
        Ok(base.join(p))
    }
}
