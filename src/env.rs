//! 统一的环境变量管理系统
//!
//! 类型安全、可验证的 `WORDWEAVE_*` 环境变量，用于覆盖配置文件中的值

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    /// 读取并解析变量；未设置时返回 `Ok(None)`
    fn get() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }
}

fn invalid(variable: &str, message: impl Into<String>) -> EnvError {
    EnvError {
        variable: variable.to_string(),
        message: message.into(),
    }
}

/// 布尔值解析
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(
            var_name,
            format!("Invalid boolean '{}'. Use: true/false, 1/0, yes/no, on/off", value),
        )),
    }
}

fn parse_lang(value: &str, var_name: &str, allow_auto: bool) -> EnvResult<String> {
    let lang = value.trim().to_lowercase();
    if (allow_auto && lang == "auto")
        || (lang.len() == 2 && lang.chars().all(|c| c.is_ascii_lowercase()))
    {
        Ok(lang)
    } else {
        Err(invalid(var_name, "Language code must be 2 characters (ISO 639-1)"))
    }
}

fn parse_millis(value: &str, var_name: &str, max: u64) -> EnvResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms <= max => Ok(ms),
        Ok(_) => Err(invalid(var_name, format!("Must be at most {} ms", max))),
        Err(_) => Err(invalid(var_name, format!("Invalid number '{}'", value))),
    }
}

/// 核心环境变量
pub mod core {
    use super::*;

    /// 配置文件路径
    pub struct ConfigPath;
    impl EnvVar<String> for ConfigPath {
        const NAME: &'static str = "WORDWEAVE_CONFIG";
        const DESCRIPTION: &'static str = "Path to a TOML configuration file";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(invalid(Self::NAME, "Path must not be empty"));
            }
            Ok(value.trim().to_string())
        }
    }
}

/// 扩展配置覆盖
pub mod extension {
    use super::*;

    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "WORDWEAVE_ENABLED";
        const DESCRIPTION: &'static str = "Enable in-page word replacement";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    pub struct TargetLanguage;
    impl EnvVar<String> for TargetLanguage {
        const NAME: &'static str = "WORDWEAVE_TARGET_LANGUAGE";
        const DESCRIPTION: &'static str = "Language words are translated into (ISO 639-1 code)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang(value, Self::NAME, false)
        }
    }

    pub struct SourceLanguage;
    impl EnvVar<String> for SourceLanguage {
        const NAME: &'static str = "WORDWEAVE_SOURCE_LANGUAGE";
        const DESCRIPTION: &'static str = "Language of the page ('auto' for detection)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang(value, Self::NAME, true)
        }
    }

    pub struct TranslationRate;
    impl EnvVar<String> for TranslationRate {
        const NAME: &'static str = "WORDWEAVE_TRANSLATION_RATE";
        const DESCRIPTION: &'static str =
            "Translation intensity: minimal, light, moderate, medium, heavy, intensive";

        fn parse(value: &str) -> EnvResult<String> {
            let rate = value.trim().to_lowercase();
            match rate.as_str() {
                "minimal" | "light" | "moderate" | "medium" | "heavy" | "intensive" => Ok(rate),
                _ => Err(invalid(Self::NAME, format!("Unknown rate '{}'", value))),
            }
        }
    }

    pub struct HighlightColor;
    impl EnvVar<String> for HighlightColor {
        const NAME: &'static str = "WORDWEAVE_HIGHLIGHT_COLOR";
        const DESCRIPTION: &'static str = "Marker highlight color (#RRGGBB)";

        fn parse(value: &str) -> EnvResult<String> {
            let color = value.trim();
            let valid = color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit());
            if valid {
                Ok(color.to_string())
            } else {
                Err(invalid(Self::NAME, "Color must look like #RRGGBB"))
            }
        }
    }
}

/// 管道调优参数覆盖
pub mod pipeline {
    use super::*;

    pub struct ProviderTimeoutMs;
    impl EnvVar<u64> for ProviderTimeoutMs {
        const NAME: &'static str = "WORDWEAVE_PROVIDER_TIMEOUT_MS";
        const DESCRIPTION: &'static str = "Caller-side timeout for one provider call";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 120_000)
        }
    }

    pub struct RequestSpacingMs;
    impl EnvVar<u64> for RequestSpacingMs {
        const NAME: &'static str = "WORDWEAVE_REQUEST_SPACING_MS";
        const DESCRIPTION: &'static str = "Minimum spacing between provider requests";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 10_000)
        }
    }
}

/// 所有变量的说明（用于生成帮助文本）
pub fn describe_all() -> Vec<(&'static str, &'static str)> {
    vec![
        (core::ConfigPath::NAME, core::ConfigPath::DESCRIPTION),
        (extension::Enabled::NAME, extension::Enabled::DESCRIPTION),
        (extension::TargetLanguage::NAME, extension::TargetLanguage::DESCRIPTION),
        (extension::SourceLanguage::NAME, extension::SourceLanguage::DESCRIPTION),
        (extension::TranslationRate::NAME, extension::TranslationRate::DESCRIPTION),
        (extension::HighlightColor::NAME, extension::HighlightColor::DESCRIPTION),
        (pipeline::ProviderTimeoutMs::NAME, pipeline::ProviderTimeoutMs::DESCRIPTION),
        (pipeline::RequestSpacingMs::NAME, pipeline::RequestSpacingMs::DESCRIPTION),
    ]
}
