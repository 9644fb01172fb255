//! 翻译管道模块
//!
//! 页面内文本转换管道：容器扫描、过滤、选词、DOM 改写与还原

pub mod filters;
pub mod language;
pub mod lexicon;
pub mod processed;
pub mod rewriter;
pub mod scanner;
pub mod selector;

// 重新导出主要类型
pub use filters::{count_alpha_runs, ExclusionContext, TextFilter};
pub use language::{detect_language, detect_or_fallback, LanguageDetection};
pub use processed::ProcessedSet;
pub use rewriter::{is_marker, DomRewriter, MarkerStyle};
pub use scanner::{owned_text, owned_text_nodes, Container, TextScanner};
pub use selector::{target_count, WordSelector};
