//! 存储管理模块

pub mod cache;

pub use cache::{normalize_token, CacheEntry, CacheKey, CacheStats, TranslationCache};
