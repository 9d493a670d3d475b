//! 构建期定义清单（DART_DEFINES）解码与按键取值。
//!
//! 清单格式（文本）：
//! - `<b64>,<b64>,...`，以英文逗号分隔
//! - 每个 token 为标准 base64（带 padding），解码后是 UTF-8 文本 `KEY=VALUE`
//!
//! 解析策略：
//! - 宽松解析：非 base64、非 UTF-8、缺少 `=` 的 token 直接丢弃，不视为错误
//! - 首个匹配生效：同名键重复出现时只取清单中最靠前的一个，其余不再解码
//! - “未找到”是正常结果（`None`），由调用方决定如何处理
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

/// 地图 SDK 密钥在定义清单中的键名（固定，不支持运行时配置）。
pub const GOOGLE_MAPS_KEY: &str = "GOOGLE_MAPS_KEY";

/// 键与值之间的分隔符。
pub const SEPARATOR: char = '=';

/// 清单中 token 之间的分隔符。
pub const TOKEN_DELIMITER: char = ',';

/// 一条解码后的定义（`KEY=VALUE`）。
///
/// 说明：
/// - `key` 为第一个 `=` 之前的部分
/// - `value` 为第一个 `=` 之后的全部内容（可再包含 `=`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub key: String,
    pub value: String,
}

impl Define {
    /// 从解码后的文本拆分出键值；缺少分隔符时返回 `None`。
    pub fn parse(text: &str) -> Option<Self> {
        let (key, value) = text.split_once(SEPARATOR)?;
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// 解析出的密钥值。
///
/// 安全注意：
/// - `Debug`/`Display` 输出均为脱敏文本，避免密钥经日志泄露
/// - 通过 [`ResolvedSecret::into_inner`] 取出明文后，本对象即被消耗，不再保留副本
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret(String);

impl ResolvedSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 借用明文（仅用于交给 SDK 或比较，不应写入日志）。
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 取出明文并消耗自身。
    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedSecret(<redacted, {} bytes>)", self.0.len())
    }
}

impl fmt::Display for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// 解码单个 token。
///
/// 返回值：
/// - 成功：UTF-8 文本
/// - base64 解码失败或非 UTF-8：`None`
fn decode_token(token: &str) -> Option<String> {
    let bytes = STANDARD.decode(token.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// 按清单顺序惰性解码全部 token。
///
/// 参数：
/// - `manifest`：编码后的清单字符串
///
/// 返回值：
/// - 依次产出解码成功的文本；解码失败的 token 被跳过（仅记录 debug 日志，且只记录位置）
///
/// 说明：
/// - 空清单（`""`）产出空序列；空 token（如 `a,,b` 中间项）同样被跳过
pub fn decode_defines(manifest: &str) -> impl Iterator<Item = String> + '_ {
    manifest
        .split(TOKEN_DELIMITER)
        .enumerate()
        .filter(|(_, token)| !token.is_empty())
        .filter_map(|(index, token)| {
            let decoded = decode_token(token);
            if decoded.is_none() {
                debug!(index, "丢弃无法解码的定义 token");
            }
            decoded
        })
}

/// 解码并拆分全部定义（缺少 `=` 的条目被丢弃）。
///
/// 用途：
/// - 诊断输出（列出清单中包含哪些键）；取值请使用 [`resolve_define`]
pub fn parse_defines(manifest: &str) -> Vec<Define> {
    decode_defines(manifest)
        .filter_map(|text| Define::parse(&text))
        .collect()
}

/// 统计清单中被丢弃的 token 数量（解码失败或缺少 `=`）。
pub fn count_dropped(manifest: &str) -> usize {
    let tokens = manifest
        .split(TOKEN_DELIMITER)
        .filter(|token| !token.is_empty())
        .count();
    tokens - parse_defines(manifest).len()
}

/// 在清单中查找指定键并返回其值。
///
/// 参数：
/// - `manifest`：编码后的清单字符串
/// - `key`：目标键名（通常为 [`GOOGLE_MAPS_KEY`]）
///
/// 返回值：
/// - `Some(secret)`：清单中第一个以 `key=` 开头的定义去掉前缀后的剩余部分
/// - `None`：扫描完所有 token 仍未找到
///
/// 说明：
/// - 找到后立即返回，后续 token 不再解码；重复键以首个为准
pub fn resolve_define(manifest: &str, key: &str) -> Option<ResolvedSecret> {
    let prefix = format!("{key}{SEPARATOR}");
    decode_defines(manifest).find_map(|define| {
        define
            .strip_prefix(prefix.as_str())
            .map(ResolvedSecret::new)
    })
}
