//! 翻译服务提供者
//!
//! 网关只依赖 `TranslationProvider` 这一接口；任何失败（网络、响应格式、空结果）
//! 在网关看来都是同一种失败。

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 翻译服务提供者
#[async_trait(?Send)]
pub trait TranslationProvider {
    /// 提供者名称，用于日志与错误信息
    fn name(&self) -> &str;

    /// 是否支持 `source_lang = "auto"`
    fn supports_auto_detect(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String>;
}

fn build_client() -> TranslationResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("wordweave/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TranslationError::ConfigError(format!("创建 HTTP 客户端失败: {}", e)))
}

// ============================================================================
// DeepLX
// ============================================================================

#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct DeepLxResponse {
    code: i32,
    #[serde(default)]
    data: String,
    #[serde(default)]
    message: Option<String>,
}

/// DeepLX 兼容接口
#[derive(Debug, Clone)]
pub struct DeepLxProvider {
    client: reqwest::Client,
    api_url: String,
}

impl DeepLxProvider {
    pub fn new(api_url: &str) -> TranslationResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl TranslationProvider for DeepLxProvider {
    fn name(&self) -> &str {
        "deeplx"
    }

    fn supports_auto_detect(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let request = DeepLxRequest {
            text,
            source_lang: source_lang.to_uppercase(),
            target_lang: target_lang.to_uppercase(),
        };

        let response = self.client.post(&self.api_url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(helpers::provider_error(self.name(), format!("HTTP {}", status)));
        }

        let body: DeepLxResponse = response.json().await?;
        if body.code != 200 {
            return Err(helpers::provider_error(
                self.name(),
                body.message.unwrap_or_else(|| format!("code {}", body.code)),
            ));
        }

        Ok(body.data)
    }
}

// ============================================================================
// LibreTranslate
// ============================================================================

#[derive(Debug, Serialize)]
struct LibreTranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// LibreTranslate 接口
#[derive(Debug, Clone)]
pub struct LibreTranslateProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(api_url: &str) -> TranslationResult<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: api_url.to_string(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait(?Send)]
impl TranslationProvider for LibreTranslateProvider {
    fn name(&self) -> &str {
        "libretranslate"
    }

    fn supports_auto_detect(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let request = LibreTranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.api_url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("LibreTranslate 返回错误: {} - {}", status, body);
            return Err(helpers::provider_error(self.name(), format!("HTTP {}", status)));
        }

        let body: LibreTranslateResponse = response.json().await?;
        Ok(body.translated_text)
    }
}

// ============================================================================
// 离线词典
// ============================================================================

/// 离线词典
///
/// TOML 格式：每个目标语言一张表，键为小写原词。
///
/// ```toml
/// [es]
/// cat = "gato"
/// dog = "perro"
/// ```
#[derive(Debug, Clone, Default)]
pub struct DictionaryProvider {
    entries: HashMap<String, HashMap<String, String>>,
}

impl DictionaryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> TranslationResult<Self> {
        let tables: HashMap<String, HashMap<String, String>> = toml::from_str(content)?;
        let mut dictionary = Self::new();
        for (target, words) in tables {
            for (word, translation) in words {
                dictionary.insert(&target, &word, &translation);
            }
        }
        Ok(dictionary)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TranslationError::ConfigError(format!("读取词典 {} 失败: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn insert(&mut self, target_lang: &str, word: &str, translation: &str) {
        self.entries
            .entry(target_lang.trim().to_lowercase())
            .or_default()
            .insert(word.trim().to_lowercase(), translation.to_string());
    }

    pub fn with_entry(mut self, target_lang: &str, word: &str, translation: &str) -> Self {
        self.insert(target_lang, word, translation);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait(?Send)]
impl TranslationProvider for DictionaryProvider {
    fn name(&self) -> &str {
        "dictionary"
    }

    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        self.entries
            .get(&target_lang.trim().to_lowercase())
            .and_then(|words| words.get(&text.trim().to_lowercase()))
            .cloned()
            .ok_or_else(|| helpers::provider_error(self.name(), format!("词典中没有 '{}'", text)))
    }
}
