//! 翻译网关
//!
//! 按顺序尝试主提供者与有限个备用提供者，每次调用都有超时上限。

use std::time::Duration;

use tokio::time::timeout;

use super::providers::TranslationProvider;
use crate::translation::config::{constants, PipelineSettings};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::detect_or_fallback;

/// 翻译网关
pub struct TranslationGateway {
    providers: Vec<Box<dyn TranslationProvider>>,
    timeout: Duration,
    max_fallback_providers: usize,
}

impl Default for TranslationGateway {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            timeout: constants::PROVIDER_TIMEOUT,
            max_fallback_providers: constants::MAX_FALLBACK_PROVIDERS,
        }
    }
}

impl TranslationGateway {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            providers: Vec::new(),
            timeout: settings.provider_timeout(),
            max_fallback_providers: settings.max_fallback_providers,
        }
    }

    /// 追加提供者；第一个为主提供者
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: TranslationProvider + 'static,
    {
        self.add_provider(Box::new(provider));
        self
    }

    pub fn add_provider(&mut self, provider: Box<dyn TranslationProvider>) {
        tracing::debug!("注册翻译服务: {}", provider.name());
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 主提供者是否支持源语言自动检测
    pub fn supports_auto_detect(&self) -> bool {
        self.providers
            .first()
            .map(|p| p.supports_auto_detect())
            .unwrap_or(false)
    }

    /// 翻译一段文本
    ///
    /// 空结果视为失败；全部候选提供者失败时返回最后一个错误。
    /// 源语言为 `auto` 时，不支持自动检测的提供者改用本地检测结果。
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let concrete_source = if source_lang == "auto" {
            detect_or_fallback(text, constants::FALLBACK_LANGUAGE)
        } else {
            source_lang
        };
        self.translate_with_source(text, source_lang, concrete_source, target_lang)
            .await
    }

    /// 同 [`translate`](Self::translate)，由调用方给出 `auto` 的具体替代语言
    pub async fn translate_with_source(
        &self,
        text: &str,
        source_lang: &str,
        concrete_source: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        if self.providers.is_empty() {
            return Err(TranslationError::NoProviders);
        }

        let mut last_error = TranslationError::NoProviders;

        for (attempt, provider) in self
            .providers
            .iter()
            .take(1 + self.max_fallback_providers)
            .enumerate()
        {
            if attempt > 0 {
                tracing::warn!("切换到备用翻译服务 {}: {}", provider.name(), last_error);
            }

            let source = if source_lang == "auto" && !provider.supports_auto_detect() {
                concrete_source
            } else {
                source_lang
            };

            let result = match timeout(
                self.timeout,
                provider.translate(text, source, target_lang),
            )
            .await
            {
                Ok(Ok(translated)) if translated.trim().is_empty() => {
                    Err(TranslationError::EmptyTranslation)
                }
                Ok(result) => result,
                Err(_) => Err(TranslationError::TimeoutError(format!(
                    "{} 超过 {:.1} 秒未响应",
                    provider.name(),
                    self.timeout.as_secs_f32()
                ))),
            };

            match result {
                Ok(translated) => return Ok(translated.trim().to_string()),
                Err(e) => {
                    tracing::debug!("翻译服务 {} 失败 '{}': {}", provider.name(), text, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
