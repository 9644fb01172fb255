//! # Wordweave Library
//!
//! 在网页中渐进式地把部分词语替换为目标语言译文，并能无损还原。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `translation` - 扫描、选词、缓存、改写与页面控制器
//! - `env` - 类型化的环境变量
//! - `logging` - 日志初始化

pub mod env;
pub mod logging;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use parsers::*;
pub use translation::{
    ExtensionConfig, Page, PageController, PipelineSettings, TranslationError, TranslationResult,
};
