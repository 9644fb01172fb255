//! 翻译缓存模块
//!
//! 以 (规范化词语, 目标语言) 为键的有界缓存。超过上限时按插入顺序淘汰最旧条目，
//! 过期条目在查询时惰性删除。缓存只在单一逻辑线程上访问，不需要加锁。

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::translation::config::{constants, PipelineSettings};

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub token: String,
    pub target_lang: String,
}

impl CacheKey {
    pub fn new(token: &str, target_lang: &str) -> Self {
        Self {
            token: normalize_token(token),
            target_lang: target_lang.trim().to_lowercase(),
        }
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub translated_text: String,
    pub inserted_at: Instant,
    pub last_used: Instant,
}

impl CacheEntry {
    fn new(translated_text: String) -> Self {
        let now = Instant::now();
        Self {
            translated_text,
            inserted_at: now,
            last_used: now,
        }
    }

    /// 检查条目是否过期
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 词语翻译缓存
#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<CacheKey, CacheEntry>,
    insertion_order: VecDeque<CacheKey>,
    max_entries: usize,
    ttl: Duration,
    stats: CacheStats,
}

/// 缓存键规范化：去除首尾空白并转小写
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for TranslationCache {
    fn default() -> Self {
        Self::with_config(constants::CACHE_MAX_ENTRIES, constants::CACHE_TTL)
    }
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            max_entries: max_entries.max(1),
            ttl,
            stats: CacheStats::default(),
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::with_config(settings.cache_max_entries, settings.cache_ttl())
    }

    /// 查询翻译；过期条目会被顺带删除
    pub fn get(&mut self, token: &str, target_lang: &str) -> Option<String> {
        let key = CacheKey::new(token, target_lang);

        let expired = match self.entries.get_mut(&key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                entry.last_used = Instant::now();
                self.stats.hits += 1;
                return Some(entry.translated_text.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_key(&key);
            self.stats.expirations += 1;
        }
        self.stats.misses += 1;
        None
    }

    /// 是否存在未过期的条目（不影响统计）
    pub fn contains(&self, token: &str, target_lang: &str) -> bool {
        let key = CacheKey::new(token, target_lang);
        self.entries
            .get(&key)
            .map(|entry| !entry.is_expired(self.ttl))
            .unwrap_or(false)
    }

    /// 插入或替换条目，超过上限时淘汰最早插入的条目
    pub fn insert(&mut self, token: &str, target_lang: &str, translated: String) {
        let key = CacheKey::new(token, target_lang);

        if self.entries.contains_key(&key) {
            self.remove_key(&key);
        }

        self.entries.insert(key.clone(), CacheEntry::new(translated));
        self.insertion_order.push_back(key);

        while self.entries.len() > self.max_entries {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.stats.evictions += 1;
                }
                None => break,
            }
        }
    }

    fn remove_key(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        if let Some(position) = self.insertion_order.iter().position(|k| k == key) {
            self.insertion_order.remove(position);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空缓存
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
