//! 配置管理器
//!
//! 扩展配置快照（与扩展存储中的 camelCase 结构一致）、管道调优参数，
//! 以及从 TOML 文件 + 环境变量加载配置的 `ConfigManager`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译强度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationRate {
    Minimal,
    Light,
    #[default]
    Moderate,
    Medium,
    Heavy,
    Intensive,
}

impl TranslationRate {
    /// 候选词中被翻译的比例
    pub fn fraction(self) -> f64 {
        match self {
            TranslationRate::Minimal => 0.03,
            TranslationRate::Light => 0.08,
            TranslationRate::Moderate => 0.15,
            TranslationRate::Medium => 0.25,
            TranslationRate::Heavy => 0.4,
            TranslationRate::Intensive => 0.6,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "minimal" => Some(TranslationRate::Minimal),
            "light" => Some(TranslationRate::Light),
            "moderate" => Some(TranslationRate::Moderate),
            "medium" => Some(TranslationRate::Medium),
            "heavy" => Some(TranslationRate::Heavy),
            "intensive" => Some(TranslationRate::Intensive),
            _ => None,
        }
    }
}

/// 选词策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStrategy {
    #[default]
    Random,
    Common,
    Uncommon,
    Balanced,
}

/// 标记字号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn css_value(self) -> &'static str {
        match self {
            FontSize::Small => "0.85em",
            FontSize::Medium => "1em",
            FontSize::Large => "1.15em",
        }
    }
}

/// 扩展配置快照
///
/// 每次处理过程只读取一份不可变快照；配置变更通过单一的更新事件送达。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionConfig {
    pub enabled: bool,
    pub translation_rate: TranslationRate,
    pub translation_strategy: TranslationStrategy,
    pub target_language: String,
    pub source_language: String,
    pub auto_detect_language: bool,
    pub highlight_color: String,
    pub font_size: FontSize,
    pub excluded_sites: Vec<String>,
    pub translate_headers: bool,
    pub translate_nav: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            translation_rate: TranslationRate::default(),
            translation_strategy: TranslationStrategy::default(),
            target_language: "es".to_string(),
            source_language: "en".to_string(),
            auto_detect_language: true,
            highlight_color: constants::DEFAULT_HIGHLIGHT_COLOR.to_string(),
            font_size: FontSize::default(),
            excluded_sites: Vec::new(),
            translate_headers: true,
            translate_nav: false,
        }
    }
}

impl ExtensionConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if !is_language_code(&self.target_language) {
            return Err(TranslationError::ConfigError(format!(
                "无效的目标语言: {}",
                self.target_language
            )));
        }

        if self.source_language != "auto" && !is_language_code(&self.source_language) {
            return Err(TranslationError::ConfigError(format!(
                "无效的源语言: {}",
                self.source_language
            )));
        }

        if !is_hex_color(&self.highlight_color) {
            return Err(TranslationError::ConfigError(format!(
                "无效的高亮颜色: {}",
                self.highlight_color
            )));
        }

        Ok(())
    }

    /// 主机名是否在排除列表中（子域名同样匹配）
    pub fn is_site_excluded(&self, hostname: &str) -> bool {
        let host = hostname.trim().trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return false;
        }

        self.excluded_sites.iter().any(|site| {
            let site = site.trim().trim_start_matches("www.").to_lowercase();
            !site.is_empty()
                && (host == site
                    || host.trim_start_matches("www.") == site
                    || host.ends_with(&format!(".{}", site)))
        })
    }

    /// 显式源语言；`auto` 表示交给检测流程
    pub fn explicit_source_language(&self) -> Option<&str> {
        if self.auto_detect_language || self.source_language == "auto" {
            None
        } else {
            Some(self.source_language.as_str())
        }
    }
}

fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7 && color.starts_with('#') && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// 管道调优参数
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub min_container_chars: usize,
    pub min_alpha_runs: usize,
    pub interactive_escape_min_chars: usize,
    pub max_containers_per_pass: usize,
    pub min_token_chars: usize,
    pub max_token_chars: usize,
    pub cache_max_entries: usize,
    pub cache_ttl_secs: u64,
    pub request_spacing_ms: u64,
    pub max_in_flight_requests: usize,
    pub provider_timeout_ms: u64,
    pub max_fallback_providers: usize,
    pub settle_delay_ms: u64,
    pub mutation_debounce_ms: u64,
    pub init_retry_base_ms: u64,
    pub max_init_attempts: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_container_chars: constants::MIN_CONTAINER_CHARS,
            min_alpha_runs: constants::MIN_ALPHA_RUNS,
            interactive_escape_min_chars: constants::INTERACTIVE_ESCAPE_MIN_CHARS,
            max_containers_per_pass: constants::MAX_CONTAINERS_PER_PASS,
            min_token_chars: constants::MIN_TOKEN_CHARS,
            max_token_chars: constants::MAX_TOKEN_CHARS,
            cache_max_entries: constants::CACHE_MAX_ENTRIES,
            cache_ttl_secs: constants::CACHE_TTL.as_secs(),
            request_spacing_ms: constants::REQUEST_SPACING.as_millis() as u64,
            max_in_flight_requests: constants::MAX_IN_FLIGHT_REQUESTS,
            provider_timeout_ms: constants::PROVIDER_TIMEOUT.as_millis() as u64,
            max_fallback_providers: constants::MAX_FALLBACK_PROVIDERS,
            settle_delay_ms: constants::SETTLE_DELAY.as_millis() as u64,
            mutation_debounce_ms: constants::MUTATION_DEBOUNCE.as_millis() as u64,
            init_retry_base_ms: constants::INIT_RETRY_BASE.as_millis() as u64,
            max_init_attempts: constants::MAX_INIT_ATTEMPTS,
        }
    }
}

impl PipelineSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    pub fn init_retry_base(&self) -> Duration {
        Duration::from_millis(self.init_retry_base_ms)
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.min_token_chars == 0 || self.min_token_chars > self.max_token_chars {
            return Err(TranslationError::ConfigError(
                "词长范围无效".to_string(),
            ));
        }

        if self.max_in_flight_requests == 0 {
            return Err(TranslationError::ConfigError("最大并发数不能为0".to_string()));
        }

        if self.cache_max_entries == 0 {
            return Err(TranslationError::ConfigError("缓存大小不能为0".to_string()));
        }

        if self.max_containers_per_pass == 0 {
            return Err(TranslationError::ConfigError("单次容器上限不能为0".to_string()));
        }

        Ok(())
    }
}

/// 配置文件结构
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
    pub extension: ExtensionConfig,
    pub pipeline: PipelineSettings,
}

impl ConfigFile {
    pub fn from_toml_str(content: &str) -> TranslationResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file)
    }

    pub fn validate(&self) -> TranslationResult<()> {
        self.extension.validate()?;
        self.pipeline.validate()
    }
}

/// 配置管理器
///
/// 加载顺序：`.env` → 配置文件（`WORDWEAVE_CONFIG` 或搜索路径）→ 环境变量覆盖。
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器并定位配置文件
    pub fn new() -> TranslationResult<Self> {
        use crate::env::EnvVar;

        Self::load_env_file();

        let explicit = crate::env::core::ConfigPath::get()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;

        let config_path = match explicit {
            Some(path) => Some(Self::expand_path(&path)?),
            None => Self::find_config_file(),
        };

        Ok(Self { config_path })
    }

    /// 使用指定路径的配置文件
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: Some(path.as_ref().to_path_buf()),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 加载完整配置
    pub fn load(&self) -> TranslationResult<ConfigFile> {
        let mut file = match &self.config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    TranslationError::ConfigError(format!("读取 {} 失败: {}", path.display(), e))
                })?;
                tracing::info!("加载配置文件: {}", path.display());
                ConfigFile::from_toml_str(&content)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                ConfigFile::default()
            }
        };

        Self::apply_env_overrides(&mut file)?;
        file.validate()?;

        Ok(file)
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(file: &mut ConfigFile) -> TranslationResult<()> {
        use crate::env::{extension, pipeline, EnvVar};

        let to_config_error = |e: crate::env::EnvError| TranslationError::ConfigError(e.to_string());

        if let Some(enabled) = extension::Enabled::get().map_err(to_config_error)? {
            file.extension.enabled = enabled;
        }

        if let Some(target) = extension::TargetLanguage::get().map_err(to_config_error)? {
            file.extension.target_language = target;
        }

        if let Some(source) = extension::SourceLanguage::get().map_err(to_config_error)? {
            file.extension.source_language = source;
        }

        if let Some(rate) = extension::TranslationRate::get().map_err(to_config_error)? {
            if let Some(rate) = TranslationRate::parse(&rate) {
                file.extension.translation_rate = rate;
            }
        }

        if let Some(color) = extension::HighlightColor::get().map_err(to_config_error)? {
            file.extension.highlight_color = color;
        }

        if let Some(ms) = pipeline::ProviderTimeoutMs::get().map_err(to_config_error)? {
            file.pipeline.provider_timeout_ms = ms;
        }

        if let Some(ms) = pipeline::RequestSpacingMs::get().map_err(to_config_error)? {
            file.pipeline.request_spacing_ms = ms;
        }

        Ok(())
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .filter_map(|path| Self::expand_path(path).ok())
            .find(|path| path.exists())
    }

    fn expand_path(path: &str) -> TranslationResult<PathBuf> {
        shellexpand::full(path)
            .map(|expanded| PathBuf::from(expanded.as_ref()))
            .map_err(|e| TranslationError::ConfigError(format!("路径展开失败 {}: {}", path, e)))
    }

    fn load_env_file() {
        if let Ok(path) = dotenv::dotenv() {
            tracing::info!("已加载环境变量文件: {}", path.display());
        }
    }
}
