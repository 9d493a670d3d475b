//! MapKey 启动核心库（与平台/宿主框架无关）。
//!
//! 功能：
//! - 解码构建期定义清单（DART_DEFINES），按键取出地图 SDK 密钥
//! - 定义构建元数据来源（JSON 文件 / 环境变量）
//! - 编排启动流程：密钥交给 SDK，随后注册插件；清单缺失时返回致命配置错误
//! - 提供元数据文件路径约定
//!
//! 作者：MapKey 启动组件项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod defines;
pub mod metadata;
pub mod paths;
pub mod startup;
