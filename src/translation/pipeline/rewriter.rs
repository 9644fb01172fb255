//! DOM 改写
//!
//! 把容器文本节点中的命中词语替换为行内翻译标记，并能把所有标记无损还原为原文。
//! 每个文本节点的改写是一次性的节点替换，不经过 HTML 字符串的序列化与重新解析。

use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::filters::TextFilter;
use super::processed::ProcessedSet;
use super::scanner::owned_text_nodes;
use crate::parsers::html::{
    append_child, create_element, create_text_node, find_elements, get_node_attr, get_node_name,
    get_parent_node, has_class, normalize, replace_node_with, text_content,
};
use crate::translation::config::{constants, ExtensionConfig, FontSize};
use crate::translation::error::{helpers, TranslationResult};

/// 标记样式，来自配置快照
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub highlight_color: String,
    pub font_size: FontSize,
}

impl MarkerStyle {
    pub fn from_config(config: &ExtensionConfig) -> Self {
        Self {
            highlight_color: config.highlight_color.clone(),
            font_size: config.font_size,
        }
    }

    /// 标记元素的行内样式
    pub fn css(&self) -> String {
        format!(
            "--ww-highlight-color: {color}; color: {color}; border-bottom: 1px dotted {color}; font-size: {size}",
            color = self.highlight_color,
            size = self.font_size.css_value()
        )
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::from_config(&ExtensionConfig::default())
    }
}

/// DOM 改写器，持有已处理容器集合
#[derive(Debug, Default)]
pub struct DomRewriter {
    processed: ProcessedSet,
}

impl DomRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    pub fn is_processed(&self, container: &Handle) -> bool {
        self.processed.contains(container)
    }

    /// 不做改写，直接标记为已处理（例如没有任何可用翻译时）
    pub fn mark_processed(&mut self, container: &Handle) -> bool {
        self.processed.insert(container)
    }

    /// 把译文应用到容器，返回插入的标记数量
    ///
    /// 同一容器在还原之前只会改写一次；再次调用直接返回 0。
    pub fn apply(
        &mut self,
        container: &Handle,
        translations: &HashMap<String, String>,
        filter: &TextFilter,
        style: &MarkerStyle,
    ) -> usize {
        if self.processed.contains(container) {
            return 0;
        }

        let inserted = match TokenMatcher::new(translations) {
            Some(matcher) => {
                let css = style.css();
                owned_text_nodes(filter, container)
                    .iter()
                    .map(|node| rewrite_text_node(node, &matcher, &css))
                    .sum()
            }
            None => 0,
        };

        self.processed.insert(container);
        inserted
    }

    /// 还原 `root` 下的全部标记，并清空已处理集合；返回还原的标记数量
    pub fn restore(&mut self, root: &Handle) -> usize {
        let markers = find_elements(root, &|node: &Handle| is_marker(node));
        let mut parents: Vec<Handle> = Vec::new();
        let mut restored = 0;

        for marker in &markers {
            let original = get_node_attr(marker, constants::ORIGINAL_ATTR)
                .unwrap_or_else(|| text_content(marker));
            let Some(parent) = get_parent_node(marker) else {
                helpers::log_error(&helpers::dom_error("翻译标记没有父节点，跳过还原"));
                continue;
            };

            match splice(marker, vec![create_text_node(&original)]) {
                Ok(()) => {
                    restored += 1;
                    if !parents.iter().any(|p| Rc::ptr_eq(p, &parent)) {
                        parents.push(parent);
                    }
                }
                Err(e) => helpers::log_error(&e),
            }
        }

        for parent in &parents {
            normalize(parent);
        }

        self.processed.clear();
        tracing::debug!("已还原 {} 个翻译标记", restored);
        restored
    }
}

/// 是否为翻译标记元素
pub fn is_marker(node: &Handle) -> bool {
    get_node_name(node) == Some(constants::MARKER_TAG) && has_class(node, constants::MARKER_CLASS)
}

/// 由译文表构建的词语匹配器
struct TokenMatcher {
    regex: Regex,
    translations: HashMap<String, String>,
}

impl TokenMatcher {
    /// 只保留可用译文（非空且与原文不同）；没有可用译文时返回 `None`
    fn new(translations: &HashMap<String, String>) -> Option<Self> {
        let usable: HashMap<String, String> = translations
            .iter()
            .filter_map(|(original, translated)| {
                let key = original.trim().to_lowercase();
                let value = translated.trim();
                if key.is_empty() || value.is_empty() || value.to_lowercase() == key {
                    None
                } else {
                    Some((key, value.to_string()))
                }
            })
            .collect();

        if usable.is_empty() {
            return None;
        }

        let mut keys: Vec<&String> = usable.keys().collect();
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)) {
            Ok(regex) => Some(Self {
                regex,
                translations: usable,
            }),
            Err(e) => {
                tracing::warn!("构建词语匹配正则失败: {}", e);
                None
            }
        }
    }

    fn lookup(&self, matched: &str) -> Option<&str> {
        self.translations.get(&matched.to_lowercase()).map(String::as_str)
    }
}

/// 改写单个文本节点；节点已脱离文档时跳过
fn rewrite_text_node(node: &Handle, matcher: &TokenMatcher, css: &str) -> usize {
    let text = match &node.data {
        NodeData::Text { contents } => contents.borrow().to_string(),
        _ => return 0,
    };

    let mut segments: Vec<Handle> = Vec::new();
    let mut markers = 0;
    let mut cursor = 0;

    for m in matcher.regex.find_iter(&text) {
        let Some(translated) = matcher.lookup(m.as_str()) else {
            continue;
        };

        if m.start() > cursor {
            segments.push(create_text_node(&text[cursor..m.start()]));
        }
        segments.push(create_marker(m.as_str(), translated, css));
        markers += 1;
        cursor = m.end();
    }

    if markers == 0 {
        return 0;
    }

    if cursor < text.len() {
        segments.push(create_text_node(&text[cursor..]));
    }

    match splice(node, segments) {
        Ok(()) => markers,
        Err(e) => {
            helpers::log_error(&e);
            0
        }
    }
}

/// 用 `replacements` 替换节点；节点已脱离文档时返回 `DomError`
fn splice(node: &Handle, replacements: Vec<Handle>) -> TranslationResult<()> {
    if replace_node_with(node, replacements) {
        Ok(())
    } else {
        Err(helpers::dom_error("节点已脱离文档"))
    }
}

fn create_marker(original: &str, translated: &str, css: &str) -> Handle {
    let marker = create_element(
        constants::MARKER_TAG,
        vec![
            ("class", constants::MARKER_CLASS.to_string()),
            (constants::ORIGINAL_ATTR, original.to_string()),
            ("style", css.to_string()),
        ],
    );
    append_child(&marker, create_text_node(translated));
    marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_body, find_nodes, html_to_dom};
    use crate::translation::config::PipelineSettings;
    use crate::translation::error::TranslationError;
    use markup5ever_rcdom::RcDom;

    fn filter() -> TextFilter {
        TextFilter::new(&ExtensionConfig::default(), &PipelineSettings::default()).unwrap()
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// 解析文档并取出 body 与第一个 `tag` 元素；返回的 `RcDom` 须在测试期间保持存活
    fn first(dom_html: &str, tag: &str) -> (RcDom, Handle, Handle) {
        let dom = html_to_dom(dom_html.as_bytes(), "utf-8").unwrap();
        let body = find_body(&dom.document).unwrap();
        let node = find_nodes(&dom.document, &[tag]).remove(0);
        (dom, body, node)
    }

    #[test]
    fn test_apply_then_restore_is_identity() {
        let (_dom, body, p) = first(
            "<body><p>The cat sat with another Cat near <b>the cat</b> today, café.</p></body>",
            "p",
        );
        let before = text_content(&body);
        let mut rewriter = DomRewriter::new();

        let inserted = rewriter.apply(
            &p,
            &map(&[("cat", "gato"), ("café", "cafetería")]),
            &filter(),
            &MarkerStyle::default(),
        );
        assert_eq!(inserted, 4);
        assert!(text_content(&body).contains("gato"));

        assert_eq!(rewriter.restore(&body), 4);
        assert_eq!(text_content(&body), before);
        assert!(rewriter.processed().is_empty());
        assert!(find_elements(&body, &|n: &Handle| is_marker(n)).is_empty());
    }

    #[test]
    fn test_marker_keeps_original_case() {
        let (_dom, _, p) = first("<body><p>Hello World from here</p></body>", "p");
        let mut rewriter = DomRewriter::new();
        rewriter.apply(&p, &map(&[("world", "mundo")]), &filter(), &MarkerStyle::default());

        let marker = find_elements(&p, &|n: &Handle| is_marker(n)).remove(0);
        assert_eq!(get_node_attr(&marker, "data-original").as_deref(), Some("World"));
        assert_eq!(text_content(&marker), "mundo");
        let style = get_node_attr(&marker, "style").unwrap();
        assert!(style.contains("#4a90e2"));
        assert!(style.contains("font-size: 1em"));
    }

    #[test]
    fn test_word_boundary_safety() {
        let (_dom, _, p) = first("<body><p>concatenate cats</p></body>", "p");
        let mut rewriter = DomRewriter::new();

        let inserted = rewriter.apply(&p, &map(&[("cat", "gato")]), &filter(), &MarkerStyle::default());
        assert_eq!(inserted, 0);
        assert_eq!(text_content(&p), "concatenate cats");
    }

    #[test]
    fn test_longest_key_wins() {
        let (_dom, _, p) = first("<body><p>cats and a cat walked</p></body>", "p");
        let mut rewriter = DomRewriter::new();

        let inserted = rewriter.apply(
            &p,
            &map(&[("cat", "gato"), ("cats", "gatos")]),
            &filter(),
            &MarkerStyle::default(),
        );
        assert_eq!(inserted, 2);
        assert_eq!(text_content(&p), "gatos and a gato walked");
    }

    #[test]
    fn test_apply_twice_does_not_double_wrap() {
        let (_dom, _, p) = first("<body><p>The dog chased the dog</p></body>", "p");
        let translations = map(&[("dog", "perro")]);
        let mut rewriter = DomRewriter::new();

        assert_eq!(rewriter.apply(&p, &translations, &filter(), &MarkerStyle::default()), 2);
        assert_eq!(rewriter.apply(&p, &translations, &filter(), &MarkerStyle::default()), 0);
        assert_eq!(find_elements(&p, &|n: &Handle| is_marker(n)).len(), 2);
    }

    #[test]
    fn test_unusable_translations_are_ignored() {
        let (_dom, _, p) = first("<body><p>Hello world again</p></body>", "p");
        let mut rewriter = DomRewriter::new();

        let inserted = rewriter.apply(
            &p,
            &map(&[("hello", "Hello"), ("world", "  ")]),
            &filter(),
            &MarkerStyle::default(),
        );
        assert_eq!(inserted, 0);
        assert!(rewriter.is_processed(&p));
    }

    #[test]
    fn test_skips_excluded_descendants() {
        let (_dom, _, p) = first(
            "<body><p>One dog here <code>dog</code> and <button>dog</button> there</p></body>",
            "p",
        );
        let mut rewriter = DomRewriter::new();

        let inserted = rewriter.apply(&p, &map(&[("dog", "perro")]), &filter(), &MarkerStyle::default());
        assert_eq!(inserted, 1);
        assert_eq!(text_content(&p), "One perro here dog and dog there");
    }

    #[test]
    fn test_detached_text_node_is_skipped() {
        let node = create_text_node("the cat sleeps");
        let matcher = TokenMatcher::new(&map(&[("cat", "gato")])).unwrap();

        assert_eq!(rewrite_text_node(&node, &matcher, ""), 0);
        assert_eq!(text_content(&node), "the cat sleeps");
        assert!(matches!(
            splice(&node, vec![create_text_node("x")]),
            Err(TranslationError::DomError(_))
        ));
    }
}
