//! 选词器
//!
//! 按翻译强度与选词策略从候选词中挑出本次需要翻译的词语。
//! 除随机源外是纯函数，不访问 DOM 与网络。

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::lexicon::{common_rank, is_stop_word};
use crate::translation::config::{TranslationRate, TranslationStrategy};

/// 平衡策略中高频词的占比
const BALANCED_COMMON_SHARE: f64 = 0.6;

/// 按强度计算目标数量：候选池非空时至少为 1
pub fn target_count(pool_size: usize, rate: TranslationRate) -> usize {
    if pool_size == 0 {
        return 0;
    }
    ((pool_size as f64 * rate.fraction()).floor() as usize).clamp(1, pool_size)
}

/// 选词器
#[derive(Debug, Clone)]
pub struct WordSelector {
    rate: TranslationRate,
    strategy: TranslationStrategy,
    source_lang: String,
}

impl WordSelector {
    pub fn new(rate: TranslationRate, strategy: TranslationStrategy, source_lang: &str) -> Self {
        Self {
            rate,
            strategy,
            source_lang: source_lang.to_lowercase(),
        }
    }

    /// 候选池：大小写不敏感去重，剔除源语言功能词与已缓存的词
    pub fn candidate_pool<F>(&self, tokens: &[String], is_cached: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .filter(|token| seen.insert(token.clone()))
            .filter(|token| !is_stop_word(&self.source_lang, token))
            .filter(|token| !is_cached(token))
            .collect()
    }

    /// 选出需要翻译的词语；结果数量不超过目标数量
    pub fn select<F, R>(&self, tokens: &[String], is_cached: F, rng: &mut R) -> Vec<String>
    where
        F: Fn(&str) -> bool,
        R: Rng + ?Sized,
    {
        let pool = self.candidate_pool(tokens, is_cached);
        let count = target_count(pool.len(), self.rate);
        if count == 0 {
            return Vec::new();
        }

        let selected = match self.strategy {
            TranslationStrategy::Random => {
                let mut pool = pool;
                pool.shuffle(rng);
                pool.truncate(count);
                pool
            }
            TranslationStrategy::Common => {
                let (common, uncommon) = self.split_by_frequency(pool, rng);
                take_with_top_up(common, uncommon, count)
            }
            TranslationStrategy::Uncommon => {
                let (mut common, uncommon) = self.split_by_frequency(pool, rng);
                common.reverse();
                take_with_top_up(uncommon, common, count)
            }
            TranslationStrategy::Balanced => {
                let (common, uncommon) = self.split_by_frequency(pool, rng);
                let common_wanted = (count as f64 * BALANCED_COMMON_SHARE).round() as usize;
                let common_take = common_wanted.min(common.len());
                let uncommon_take = (count - common_take).min(uncommon.len());
                // 任一侧不足时由另一侧补齐
                let common_take = (count - uncommon_take).min(common.len());

                let mut selected: Vec<String> = common.into_iter().take(common_take).collect();
                selected.extend(uncommon.into_iter().take(uncommon_take));
                selected
            }
        };

        tracing::trace!(
            "选词: 候选 {} 个, 目标 {} 个, 策略 {:?}",
            tokens.len(),
            count,
            self.strategy
        );
        selected
    }

    /// 拆分为高频词（按频率排名）与非高频词（随机顺序）
    fn split_by_frequency<R>(&self, pool: Vec<String>, rng: &mut R) -> (Vec<String>, Vec<String>)
    where
        R: Rng + ?Sized,
    {
        let (mut common, mut uncommon): (Vec<String>, Vec<String>) = pool
            .into_iter()
            .partition(|token| common_rank(&self.source_lang, token).is_some());

        common.sort_by_key(|token| common_rank(&self.source_lang, token));
        uncommon.shuffle(rng);
        (common, uncommon)
    }
}

fn take_with_top_up(primary: Vec<String>, secondary: Vec<String>, count: usize) -> Vec<String> {
    primary.into_iter().chain(secondary).take(count).collect()
}
