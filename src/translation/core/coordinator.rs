//! 翻译批次协调器
//!
//! 词语 → 译文的解析入口：先查缓存，未命中的词经网关逐个请求，
//! 请求之间保持最小间隔并限制同时在途数量。单个词失败只会使它缺席结果，
//! 只有一批中所有请求都失败才向调用方返回错误。

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep_until, Instant};

use super::gateway::TranslationGateway;
use crate::translation::config::{constants, ExtensionConfig, PipelineSettings};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::language::detect_or_fallback;
use crate::translation::storage::{normalize_token, TranslationCache};

/// 词语（小写）→ 译文
pub type TranslationMap = HashMap<String, String>;

/// 请求节流：为每个请求预约一个发送时刻，相邻时刻至少间隔 `spacing`
#[derive(Debug)]
pub struct RequestLimiter {
    spacing: Duration,
    next_slot: Cell<Option<Instant>>,
}

impl RequestLimiter {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: Cell::new(None),
        }
    }

    /// 等待属于自己的发送时刻
    pub async fn acquire(&self) {
        let now = Instant::now();
        let slot = match self.next_slot.get() {
            Some(reserved) if reserved > now => reserved,
            _ => now,
        };
        self.next_slot.set(Some(slot + self.spacing));

        if slot > now {
            sleep_until(slot).await;
        }
    }
}

/// 翻译协调器，持有缓存与网关
pub struct TranslationCoordinator {
    gateway: TranslationGateway,
    cache: TranslationCache,
    limiter: RequestLimiter,
    max_in_flight: usize,
}

impl TranslationCoordinator {
    pub fn new(gateway: TranslationGateway, settings: &PipelineSettings) -> Self {
        Self {
            gateway,
            cache: TranslationCache::from_settings(settings),
            limiter: RequestLimiter::new(settings.request_spacing()),
            max_in_flight: settings.max_in_flight_requests.max(1),
        }
    }

    pub fn gateway(&self) -> &TranslationGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// 清空缓存（与还原同时发生）
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn is_cached(&self, token: &str, target_lang: &str) -> bool {
        self.cache.contains(token, target_lang)
    }

    /// 决定请求使用的源语言
    ///
    /// 优先级：调用方显式指定 → 提供者自动检测（`auto`）→ 本地检测 → 配置的源语言。
    /// 本地检测置信度不足时退回配置的源语言，配置也为 `auto` 时退回默认语言。
    pub fn resolve_source_language(
        &self,
        explicit: Option<&str>,
        config: &ExtensionConfig,
        sample_text: &str,
    ) -> String {
        if let Some(source) = explicit.map(str::trim).filter(|s| !s.is_empty() && *s != "auto") {
            return source.to_lowercase();
        }

        let wants_detection = config.auto_detect_language || config.source_language == "auto";
        if !wants_detection {
            return config.source_language.clone();
        }

        if self.gateway.supports_auto_detect() {
            return "auto".to_string();
        }

        detect_or_fallback(sample_text, Self::configured_fallback(config)).to_string()
    }

    /// 具体的源语言（用于功能词过滤等本地逻辑），不会返回 `auto`
    pub fn concrete_source_language(
        &self,
        explicit: Option<&str>,
        config: &ExtensionConfig,
        sample_text: &str,
    ) -> String {
        let resolved = self.resolve_source_language(explicit, config, sample_text);
        if resolved == "auto" {
            detect_or_fallback(sample_text, Self::configured_fallback(config)).to_string()
        } else {
            resolved
        }
    }

    fn configured_fallback(config: &ExtensionConfig) -> &str {
        if config.source_language == "auto" {
            constants::FALLBACK_LANGUAGE
        } else {
            config.source_language.as_str()
        }
    }

    /// 解析一批词语的译文
    ///
    /// 缺少可用译文的词不出现在结果中。缓存写入在每个结果到达时同步完成。
    pub async fn resolve(
        &mut self,
        tokens: &[String],
        explicit_source: Option<&str>,
        config: &ExtensionConfig,
        sample_text: &str,
    ) -> TranslationResult<TranslationMap> {
        let target = config.target_language.trim().to_lowercase();
        let source = self.resolve_source_language(explicit_source, config, sample_text);
        let concrete_source = self.concrete_source_language(explicit_source, config, sample_text);

        let mut seen = HashSet::new();
        let unique: Vec<String> = tokens
            .iter()
            .map(|t| normalize_token(t))
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        if source != "auto" && source == target {
            return Ok(unique.into_iter().map(|t| (t.clone(), t)).collect());
        }

        let mut translations = TranslationMap::new();
        let mut pending = Vec::new();
        for token in unique {
            match self.cache.get(&token, &target) {
                Some(cached) => {
                    translations.insert(token, cached);
                }
                None => pending.push(token),
            }
        }

        if pending.is_empty() {
            return Ok(translations);
        }

        tracing::debug!(
            "请求 {} 个词的翻译 ({} -> {}), 缓存命中 {} 个",
            pending.len(),
            source,
            target,
            translations.len()
        );

        let Self {
            gateway,
            cache,
            limiter,
            max_in_flight,
        } = self;
        let gateway = &*gateway;
        let limiter = &*limiter;
        let source = source.as_str();
        let concrete_source = concrete_source.as_str();
        let target_ref = target.as_str();

        let attempted = pending.len();
        let mut failed = 0;
        let mut results = stream::iter(pending)
            .map(|token| async move {
                limiter.acquire().await;
                let result = gateway
                    .translate_with_source(&token, source, concrete_source, target_ref)
                    .await;
                (token, result)
            })
            .buffer_unordered(*max_in_flight);

        while let Some((token, result)) = results.next().await {
            match result {
                Ok(translated) => {
                    if is_usable_translation(&token, &translated) {
                        cache.insert(&token, target_ref, translated.clone());
                        translations.insert(token, translated);
                    }
                }
                Err(e) => {
                    tracing::warn!("词语 '{}' 翻译失败: {}", token, e);
                    failed += 1;
                }
            }
        }

        if failed == attempted {
            return Err(TranslationError::BatchFailed { attempted });
        }

        Ok(translations)
    }

    /// 单段文本的即时翻译（划词翻译），不读写词语缓存
    pub async fn translate_text(
        &self,
        text: &str,
        explicit_source: Option<&str>,
        explicit_target: Option<&str>,
        config: &ExtensionConfig,
    ) -> TranslationResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslationError::EmptyTranslation);
        }

        let target = explicit_target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(config.target_language.as_str())
            .to_lowercase();
        let source = self.resolve_source_language(explicit_source, config, text);

        if source != "auto" && source == target {
            return Ok(text.to_string());
        }

        let concrete_source = self.concrete_source_language(explicit_source, config, text);

        self.limiter.acquire().await;
        self.gateway
            .translate_with_source(text, &source, &concrete_source, &target)
            .await
    }
}

/// 非空且与原文不同的译文才可用
pub fn is_usable_translation(original: &str, translated: &str) -> bool {
    let translated = translated.trim();
    !translated.is_empty() && translated.to_lowercase() != normalize_token(original)
}
