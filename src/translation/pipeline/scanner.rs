//! 文本容器扫描
//!
//! 在文档（或新增节点的子树）中寻找值得翻译的文本容器：
//! 元素直接拥有足够的可读文本，且不处于排除区域或交互控件中。
//! 每个文本节点最多归属一个容器，容器之间互不重叠。

use std::cmp::Reverse;
use std::collections::HashSet;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use super::filters::TextFilter;
use super::processed::ProcessedSet;
use crate::parsers::html::{direct_text, get_parent_node};
use crate::translation::config::PipelineSettings;

/// 待翻译的文本容器
#[derive(Debug, Clone)]
pub struct Container {
    pub element: Handle,
    /// 扫描时容器所拥有文本的快照
    pub text: String,
}

impl Container {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 容器扫描器
pub struct TextScanner<'a> {
    filter: &'a TextFilter,
    max_containers: usize,
}

impl<'a> TextScanner<'a> {
    pub fn new(filter: &'a TextFilter, settings: &PipelineSettings) -> Self {
        Self {
            filter,
            max_containers: settings.max_containers_per_pass,
        }
    }

    /// 全量扫描 `root` 下的容器
    ///
    /// 结果按所拥有文本长度降序排列（长度相同保持文档顺序），并截断到单次上限。
    /// 已处理的容器不会出现在结果中。
    pub fn find_containers(&self, root: &Handle, processed: &ProcessedSet) -> Vec<Container> {
        self.find_containers_in(std::slice::from_ref(root), processed)
    }

    /// 增量扫描：只检查新增节点及其子树
    pub fn find_containers_in(&self, roots: &[Handle], processed: &ProcessedSet) -> Vec<Container> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for root in roots {
            let root = match root.data {
                NodeData::Text { .. } => match get_parent_node(root) {
                    Some(parent) => parent,
                    None => continue,
                },
                _ => root.clone(),
            };

            if !is_attached(&root) {
                continue;
            }

            let context = self.filter.ancestor_context(&root);
            if context.hard_excluded {
                continue;
            }

            self.visit(&root, context.inside_interactive, processed, &mut seen, &mut found);
        }

        let mut containers: Vec<Container> = found
            .into_iter()
            .map(|element| {
                let text = owned_text(self.filter, &element);
                Container { element, text }
            })
            .collect();

        containers.sort_by_key(|c| Reverse(c.char_count()));
        containers.truncate(self.max_containers);

        tracing::debug!("扫描到 {} 个文本容器", containers.len());
        containers
    }

    fn visit(
        &self,
        node: &Handle,
        inside_interactive: bool,
        processed: &ProcessedSet,
        seen: &mut HashSet<usize>,
        found: &mut Vec<Handle>,
    ) {
        let interactive = match node.data {
            NodeData::Element { .. } => {
                if self.filter.is_hard_excluded(node) {
                    return;
                }

                let interactive = inside_interactive || self.filter.is_interactive(node);
                if qualifies_as_container(self.filter, node, interactive)
                    && !processed.contains(node)
                    && seen.insert(Rc::as_ptr(node) as usize)
                {
                    found.push(node.clone());
                }
                interactive
            }
            NodeData::Document => false,
            _ => return,
        };

        for child in node.children.borrow().iter() {
            self.visit(child, interactive, processed, seen, found);
        }
    }
}

/// 元素自身是否构成容器
pub fn qualifies_as_container(filter: &TextFilter, node: &Handle, inside_interactive: bool) -> bool {
    filter.has_enough_direct_text(&direct_text(node))
        && (!inside_interactive || filter.escapes_interactive(node))
}

/// 容器拥有的文本节点
///
/// 遍历子树，不进入排除区域、交互控件，也不进入本身构成容器的后代元素。
/// 扫描与改写使用同一套规则，因此同一文本节点不会被两个容器改写。
pub fn owned_text_nodes(filter: &TextFilter, container: &Handle) -> Vec<Handle> {
    let inside_interactive =
        filter.ancestor_context(container).inside_interactive || filter.is_interactive(container);

    let mut nodes = Vec::new();
    collect_owned(filter, container, inside_interactive, &mut nodes);
    nodes
}

fn collect_owned(filter: &TextFilter, node: &Handle, inside_interactive: bool, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Text { .. } => out.push(child.clone()),
            NodeData::Element { .. } => {
                if filter.is_hard_excluded(child) {
                    continue;
                }

                let interactive = inside_interactive || filter.is_interactive(child);
                if interactive && !filter.escapes_interactive(child) {
                    continue;
                }
                if qualifies_as_container(filter, child, interactive) {
                    continue;
                }

                collect_owned(filter, child, interactive, out);
            }
            _ => {}
        }
    }
}

/// 容器拥有的全部文本，文本节点之间以空格分隔
pub fn owned_text(filter: &TextFilter, container: &Handle) -> String {
    owned_text_nodes(filter, container)
        .iter()
        .filter_map(|node| match &node.data {
            NodeData::Text { contents } => Some(contents.borrow().trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 节点是否仍挂在文档上
pub fn is_attached(node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if let NodeData::Document = current.data {
            return true;
        }
        match get_parent_node(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{
        append_child, create_element, create_text_node, find_body, get_node_name, html_to_dom,
    };
    use crate::translation::config::ExtensionConfig;
    use markup5ever_rcdom::RcDom;

    fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    fn filter() -> TextFilter {
        TextFilter::new(&ExtensionConfig::default(), &PipelineSettings::default()).unwrap()
    }

    fn tags(containers: &[Container]) -> Vec<String> {
        containers
            .iter()
            .map(|c| get_node_name(&c.element).unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_finds_paragraphs_and_skips_exclusions() {
        let dom = parse(
            r#"<html><body>
                <p>The quick brown fox jumps over the lazy dog.</p>
                <button>Click here to continue reading</button>
                <p translate="no">Brand names should stay exactly as written.</p>
                <pre>fn main() { println!("hello world text"); }</pre>
                <div>Tiny</div>
            </body></html>"#,
        );
        let f = filter();
        let scanner = TextScanner::new(&f, &PipelineSettings::default());

        let containers = scanner.find_containers(&dom.document, &ProcessedSet::new());
        assert_eq!(tags(&containers), vec!["p"]);
        assert!(containers[0].text.starts_with("The quick brown fox"));
    }

    #[test]
    fn test_inline_children_belong_to_parent() {
        let dom = parse(
            "<body><p>Some <b>bold</b> words and <a href='#'>a link label</a> in a sentence.</p></body>",
        );
        let f = filter();
        let scanner = TextScanner::new(&f, &PipelineSettings::default());

        let containers = scanner.find_containers(&dom.document, &ProcessedSet::new());
        assert_eq!(containers.len(), 1);
        assert!(containers[0].text.contains("bold"));
        assert!(!containers[0].text.contains("link label"));
    }

    #[test]
    fn test_nested_containers_do_not_overlap() {
        let dom = parse(
            "<body><div>Outer text that is long enough<p>Inner paragraph with its own words</p></div></body>",
        );
        let f = filter();
        let scanner = TextScanner::new(&f, &PipelineSettings::default());

        let containers = scanner.find_containers(&dom.document, &ProcessedSet::new());
        assert_eq!(containers.len(), 2);
        let outer = containers.iter().find(|c| get_node_name(&c.element) == Some("div")).unwrap();
        assert!(!outer.text.contains("Inner"));
    }

    #[test]
    fn test_ordering_cap_and_processed() {
        let dom = parse(
            "<body><p>Short but valid text</p><p>A much longer paragraph with many more words inside it</p><p>Medium length text here</p></body>",
        );
        let f = filter();
        let settings = PipelineSettings {
            max_containers_per_pass: 2,
            ..Default::default()
        };
        let scanner = TextScanner::new(&f, &settings);

        let containers = scanner.find_containers(&dom.document, &ProcessedSet::new());
        assert_eq!(containers.len(), 2);
        assert!(containers[0].text.starts_with("A much longer"));
        assert!(containers[1].text.starts_with("Medium length"));

        let mut processed = ProcessedSet::new();
        processed.insert(&containers[0].element);
        let again = scanner.find_containers(&dom.document, &processed);
        assert!(again.iter().all(|c| !c.text.starts_with("A much longer")));
    }

    #[test]
    fn test_incremental_scan_respects_ancestors() {
        let dom = parse(r#"<body><div translate="no"></div><section></section></body>"#);
        let body = find_body(&dom.document).unwrap();
        let excluded = body.children.borrow()[0].clone();
        let section = body.children.borrow()[1].clone();

        let hidden = create_element("p", vec![]);
        append_child(&hidden, create_text_node("Injected text in excluded area"));
        append_child(&excluded, hidden.clone());

        let visible = create_element("p", vec![]);
        append_child(&visible, create_text_node("Injected text that should be found"));
        append_child(&section, visible.clone());

        let detached = create_element("p", vec![]);
        append_child(&detached, create_text_node("Detached text that never got attached"));

        let f = filter();
        let scanner = TextScanner::new(&f, &PipelineSettings::default());
        let containers =
            scanner.find_containers_in(&[hidden, visible.clone(), detached], &ProcessedSet::new());

        assert_eq!(containers.len(), 1);
        assert!(Rc::ptr_eq(&containers[0].element, &visible));
    }
}
