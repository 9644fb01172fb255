//! 文本过滤器模块
//!
//! 判断元素是否应被排除在翻译之外，并从容器文本中提取候选词语

use std::collections::HashSet;
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use crate::parsers::html::{get_node_attr, get_node_name, get_parent_node, has_class, text_content};
use crate::translation::config::{constants, ExtensionConfig, PipelineSettings};
use crate::translation::error::{TranslationError, TranslationResult};

/// 文本过滤器
///
/// 由一份配置快照构建，单次处理过程内保持不变。
#[derive(Debug, Clone)]
pub struct TextFilter {
    translate_headers: bool,
    translate_nav: bool,
    min_container_chars: usize,
    min_alpha_runs: usize,
    interactive_escape_min_chars: usize,
    token_regex: Regex,
}

fn alpha_run_regex() -> &'static Regex {
    static ALPHA_RUN_RE: OnceLock<Regex> = OnceLock::new();
    ALPHA_RUN_RE.get_or_init(|| Regex::new(r"\p{L}+").expect("static regex"))
}

impl TextFilter {
    /// 创建新的文本过滤器
    pub fn new(config: &ExtensionConfig, settings: &PipelineSettings) -> TranslationResult<Self> {
        let pattern = format!(
            r"\b\p{{L}}{{{},{}}}\b",
            settings.min_token_chars, settings.max_token_chars
        );
        let token_regex = Regex::new(&pattern)
            .map_err(|e| TranslationError::ConfigError(format!("词语正则无效: {}", e)))?;

        Ok(Self {
            translate_headers: config.translate_headers,
            translate_nav: config.translate_nav,
            min_container_chars: settings.min_container_chars,
            min_alpha_runs: settings.min_alpha_runs,
            interactive_escape_min_chars: settings.interactive_escape_min_chars,
            token_regex,
        })
    }

    /// 元素本身是否带有排除标记；命中时整棵子树都不处理
    pub fn is_hard_excluded(&self, node: &Handle) -> bool {
        let Some(tag) = get_node_name(node) else {
            return false;
        };

        if constants::SKIP_ELEMENTS.contains(&tag) {
            return true;
        }

        if !self.translate_headers && constants::HEADING_ELEMENTS.contains(&tag) {
            return true;
        }

        if !self.translate_nav
            && (constants::NAVIGATION_ELEMENTS.contains(&tag)
                || get_node_attr(node, "role").as_deref() == Some("navigation"))
        {
            return true;
        }

        if let Some(editable) = get_node_attr(node, "contenteditable") {
            if !editable.trim().eq_ignore_ascii_case("false") {
                return true;
            }
        }

        if get_node_attr(node, "translate")
            .map(|v| v.trim().eq_ignore_ascii_case("no"))
            .unwrap_or(false)
        {
            return true;
        }

        constants::NO_TRANSLATE_CLASSES
            .iter()
            .any(|class| has_class(node, class))
    }

    /// 是否为交互控件（链接、按钮、菜单等）
    ///
    /// 开启导航翻译后，`nav` 与 `role="navigation"` 不再视为交互控件。
    pub fn is_interactive(&self, node: &Handle) -> bool {
        let Some(tag) = get_node_name(node) else {
            return false;
        };

        if constants::INTERACTIVE_ELEMENTS.contains(&tag) {
            return !(self.translate_nav && tag == "nav");
        }

        match get_node_attr(node, "role") {
            Some(role) => {
                let role = role.trim().to_ascii_lowercase();
                constants::INTERACTIVE_ROLES.contains(&role.as_str())
                    && !(self.translate_nav && role == "navigation")
            }
            None => false,
        }
    }

    /// 交互控件内部的块级元素在文本足够长时仍可独立翻译
    pub fn escapes_interactive(&self, node: &Handle) -> bool {
        match get_node_name(node) {
            Some(tag) if constants::BLOCK_ELEMENTS.contains(&tag) => {
                text_content(node).trim().chars().count() > self.interactive_escape_min_chars
            }
            _ => false,
        }
    }

    /// 直接文本是否满足容器的最低要求
    pub fn has_enough_direct_text(&self, direct_text: &str) -> bool {
        let trimmed = direct_text.trim();
        trimmed.chars().count() >= self.min_container_chars
            && count_alpha_runs(trimmed) >= self.min_alpha_runs
    }

    /// 元素是否处于被排除的位置
    ///
    /// 自身或任一祖先带排除标记时返回 `true`；位于交互控件内部时
    /// 只有满足块级例外的元素才不被排除。
    pub fn is_excluded(&self, node: &Handle) -> bool {
        let context = self.ancestor_context(node);
        if context.hard_excluded || self.is_hard_excluded(node) {
            return true;
        }

        (context.inside_interactive || self.is_interactive(node)) && !self.escapes_interactive(node)
    }

    /// 计算 `node` 所有祖先（不含自身）的排除状态
    pub fn ancestor_context(&self, node: &Handle) -> ExclusionContext {
        let mut context = ExclusionContext::default();
        let mut current = get_parent_node(node);

        while let Some(ancestor) = current {
            if let NodeData::Element { .. } = ancestor.data {
                if self.is_hard_excluded(&ancestor) {
                    context.hard_excluded = true;
                    break;
                }
                if self.is_interactive(&ancestor) {
                    context.inside_interactive = true;
                }
            }
            current = get_parent_node(&ancestor);
        }

        context
    }

    /// 提取候选词语：按首次出现顺序去重，统一为小写
    pub fn extract_tokens(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.token_regex
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }
}

/// 祖先链上的排除状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionContext {
    pub hard_excluded: bool,
    pub inside_interactive: bool,
}

/// 连续字母片段的数量
pub fn count_alpha_runs(text: &str) -> usize {
    alpha_run_regex().find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_nodes, html_to_dom};
    use markup5ever_rcdom::RcDom;

    fn filter(config: &ExtensionConfig) -> TextFilter {
        TextFilter::new(config, &PipelineSettings::default()).unwrap()
    }

    fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    fn first(dom: &RcDom, tag: &str) -> Handle {
        find_nodes(&dom.document, &[tag]).remove(0)
    }

    /// 解析片段并判断第一个 `tag` 元素是否被硬排除
    fn hard_excluded(f: &TextFilter, html: &str, tag: &str) -> bool {
        let dom = parse(html);
        f.is_hard_excluded(&first(&dom, tag))
    }

    #[test]
    fn test_hard_exclusions() {
        let f = filter(&ExtensionConfig::default());

        assert!(hard_excluded(&f, "<pre>let x = 1;</pre>", "pre"));
        assert!(hard_excluded(&f, r#"<p translate="no">Brand</p>"#, "p"));
        assert!(hard_excluded(&f, r#"<p class="a notranslate">x</p>"#, "p"));
        assert!(hard_excluded(&f, r#"<div contenteditable="true">x</div>"#, "div"));
        assert!(hard_excluded(&f, r#"<div contenteditable="">x</div>"#, "div"));
        assert!(!hard_excluded(&f, r#"<div contenteditable="false">x</div>"#, "div"));
        assert!(!hard_excluded(&f, "<p>plain</p>", "p"));
    }

    #[test]
    fn test_header_and_nav_toggles() {
        let defaults = filter(&ExtensionConfig::default());
        assert!(!hard_excluded(&defaults, "<h2>Title</h2>", "h2"));
        assert!(hard_excluded(&defaults, "<nav>Menu</nav>", "nav"));
        assert!(hard_excluded(&defaults, r#"<div role="navigation">Menu</div>"#, "div"));

        let toggled = filter(&ExtensionConfig {
            translate_headers: false,
            translate_nav: true,
            ..Default::default()
        });
        assert!(hard_excluded(&toggled, "<h2>Title</h2>", "h2"));
        let dom = parse("<nav>Menu</nav>");
        let nav = first(&dom, "nav");
        assert!(!toggled.is_hard_excluded(&nav));
        assert!(!toggled.is_interactive(&nav));
    }

    #[test]
    fn test_inherited_exclusion() {
        let f = filter(&ExtensionConfig::default());

        let dom = parse(r#"<div translate="no"><p><span>Hidden text here</span></p></div>"#);
        assert!(f.is_excluded(&first(&dom, "span")));

        let dom = parse("<button><span>Click me now please</span></button>");
        assert!(f.is_excluded(&first(&dom, "span")));

        let long = "This paragraph lives inside a link but carries plenty of readable prose.";
        let dom = parse(&format!(r#"<a href="/x"><p>{}</p></a>"#, long));
        assert!(!f.is_excluded(&first(&dom, "p")));
    }

    #[test]
    fn test_direct_text_threshold() {
        let f = filter(&ExtensionConfig::default());
        assert!(f.has_enough_direct_text("The quick brown fox"));
        assert!(!f.has_enough_direct_text("Short"));
        assert!(!f.has_enough_direct_text("12345 67890 1234567"));
        assert!(!f.has_enough_direct_text("Supercalifragilistic"));
    }

    #[test]
    fn test_extract_tokens() {
        let f = filter(&ExtensionConfig::default());
        let tokens = f.extract_tokens("The quick brown fox, the QUICK dog! A an extraordinarilylong");

        assert_eq!(tokens, vec!["the", "quick", "brown", "fox", "dog"]);
        assert_eq!(count_alpha_runs("hello, world 42"), 2);
    }

    #[test]
    fn test_extract_tokens_unicode() {
        let f = filter(&ExtensionConfig::default());
        let tokens = f.extract_tokens("Über café señor");
        assert_eq!(tokens, vec!["über", "café", "señor"]);
    }
}
