//! 本地语言检测
//!
//! 按各语言功能词的命中频率打分，置信度不足时返回 `None`。

use std::sync::OnceLock;

use regex::Regex;

use super::lexicon::{is_stop_word, SUPPORTED_LANGUAGES};
use crate::translation::config::constants;

/// 检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageDetection {
    pub language: &'static str,
    /// 功能词命中数 / 总词数
    pub confidence: f32,
    pub hits: usize,
}

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"[\p{L}\p{M}]+").expect("static regex"))
}

/// 检测文本语言
pub fn detect_language(text: &str) -> Option<LanguageDetection> {
    let words: Vec<String> = word_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    if words.is_empty() {
        return None;
    }

    let mut best: Option<LanguageDetection> = None;
    for &language in SUPPORTED_LANGUAGES {
        let hits = words.iter().filter(|w| is_stop_word(language, w)).count();
        let better = match &best {
            Some(current) => hits > current.hits,
            None => hits > 0,
        };
        if better {
            best = Some(LanguageDetection {
                language,
                confidence: hits as f32 / words.len() as f32,
                hits,
            });
        }
    }

    best.filter(|d| {
        d.hits >= constants::DETECTION_MIN_HITS
            && d.confidence >= constants::DETECTION_MIN_CONFIDENCE
    })
}

/// 检测文本语言，置信度不足时返回给定的兜底语言
pub fn detect_or_fallback<'a>(text: &str, fallback: &'a str) -> &'a str {
    match detect_language(text) {
        Some(detection) => detection.language,
        None => fallback,
    }
}
