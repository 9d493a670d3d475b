//! 构建元数据（build-metadata.json / 环境变量）读取。
//!
//! 该模块是定义清单的“配置加载协作者”：
//! - 宿主打包时生成的元数据以 JSON 对象形式落盘（键 -> 值）
//! - 启动流程通过 [`MetadataSource`] 按键查询，不直接访问全局状态
//!
//! 约定：
//! - 只有字符串值视为“存在”；键存在但值不是字符串时返回 [`MetadataValue::NotString`]
//! - 该模块不解析清单内容，解析见 [`crate::defines`]
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 构建元数据中存放定义清单的键名。
pub const DART_DEFINES: &str = "DART_DEFINES";

/// 元数据查询结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// 键存在且为字符串。
    Present(String),
    /// 键存在但值不是字符串（或环境变量不是合法 Unicode）。
    NotString,
    /// 键不存在。
    Absent,
}

impl MetadataValue {
    /// 仅当值为字符串时返回其内容。
    pub fn into_string(self) -> Option<String> {
        match self {
            MetadataValue::Present(s) => Some(s),
            MetadataValue::NotString | MetadataValue::Absent => None,
        }
    }
}

/// 元数据来源。
///
/// 实现方：
/// - [`BuildMetadata`]：JSON 文档
/// - [`EnvMetadata`]：进程环境变量
pub trait MetadataSource {
    /// 按键查询元数据。
    fn lookup(&self, key: &str) -> MetadataValue;
}

/// JSON 形式的构建元数据（对应 `build-metadata.json`）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildMetadata {
    entries: BTreeMap<String, serde_json::Value>,
}

impl BuildMetadata {
    /// 读取并解析元数据文件。
    ///
    /// 参数：
    /// - `path`：元数据文件路径
    ///
    /// 异常处理：
    /// - 文件读取失败（不存在/权限/IO）返回错误
    /// - JSON 解析失败（含顶层不是对象）返回错误
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("读取构建元数据失败: {}", path.display()))?;
        let metadata: BuildMetadata = serde_json::from_slice(&bytes)
            .with_context(|| format!("解析构建元数据 JSON 失败: {}", path.display()))?;
        debug!(entries = metadata.entries.len(), "已加载构建元数据");
        Ok(metadata)
    }

    /// 从 JSON 文本解析元数据。
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("解析构建元数据 JSON 失败")
    }

    /// 由字符串键值对直接构造（用于测试或嵌入场景）。
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataSource for BuildMetadata {
    fn lookup(&self, key: &str) -> MetadataValue {
        match self.entries.get(key) {
            Some(serde_json::Value::String(s)) => MetadataValue::Present(s.clone()),
            Some(_) => MetadataValue::NotString,
            None => MetadataValue::Absent,
        }
    }
}

/// 以进程环境变量作为元数据来源。
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMetadata;

impl MetadataSource for EnvMetadata {
    fn lookup(&self, key: &str) -> MetadataValue {
        match std::env::var(key) {
            Ok(s) => MetadataValue::Present(s),
            Err(std::env::VarError::NotUnicode(_)) => MetadataValue::NotString,
            Err(std::env::VarError::NotPresent) => MetadataValue::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 验证字符串、非字符串与缺失三种查询结果。
    fn build_metadata_lookup_variants() {
        let metadata = BuildMetadata::from_json_str(
            r#"{ "DART_DEFINES": "", "BUILD_NUMBER": 42 }"#,
        )
        .unwrap();
        assert_eq!(
            metadata.lookup(DART_DEFINES),
            MetadataValue::Present(String::new())
        );
        assert_eq!(metadata.lookup("BUILD_NUMBER"), MetadataValue::NotString);
        assert_eq!(metadata.lookup("MISSING"), MetadataValue::Absent);
    }

    #[test]
    /// 验证顶层不是 JSON 对象时解析失败。
    fn build_metadata_rejects_non_object() {
        assert!(BuildMetadata::from_json_str(r#"["DART_DEFINES"]"#).is_err());
    }

    #[test]
    /// 验证 `from_entries` 构造的值均为字符串。
    fn build_metadata_from_entries() {
        let metadata = BuildMetadata::from_entries([(DART_DEFINES, "abc")]);
        assert!(!metadata.is_empty());
        assert_eq!(
            metadata.lookup(DART_DEFINES).into_string().as_deref(),
            Some("abc")
        );
    }

    #[test]
    /// 验证环境变量不存在时返回 `Absent`。
    fn env_metadata_absent() {
        let key = "MAPKEY_TEST_SURELY_UNSET_VARIABLE";
        assert_eq!(EnvMetadata.lookup(key), MetadataValue::Absent);
    }
}
