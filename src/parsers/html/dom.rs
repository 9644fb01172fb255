use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> std::io::Result<RcDom> {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.to_string()
        }
        None => String::from_utf8_lossy(data).to_string(),
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    let matches = get_node_name(node) == Some(*node_name);

    if matches && rest.is_empty() {
        found_nodes.push(node.clone());
    }

    if matches && !rest.is_empty() {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, rest));
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names));
        }
    }

    found_nodes
}

/// 定位文档的 body 元素
pub fn find_body(document: &Handle) -> Option<Handle> {
    find_nodes(document, &["html", "body"]).into_iter().next()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点（不会破坏节点上的父引用）
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 元素的 class 列表中是否含有指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: StrTendril::from(attr_value),
                });
            }
        }
    };
}

/// 创建一个游离的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// 创建一个游离的 HTML 元素
pub fn create_element(tag: &str, attributes: Vec<(&str, String)>) -> Handle {
    let attrs = attributes
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: StrTendril::from(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 追加子节点
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 用一组节点替换 `node`，一次性完成对父节点子列表的修改。
///
/// 节点已脱离文档（或父节点不再持有它）时返回 `false`，DOM 保持不变。
pub fn replace_node_with(node: &Handle, replacements: Vec<Handle>) -> bool {
    let Some(parent) = get_parent_node(node) else {
        return false;
    };

    let mut children = parent.children.borrow_mut();
    let Some(index) = children.iter().position(|child| Rc::ptr_eq(child, node)) else {
        return false;
    };

    for replacement in &replacements {
        replacement.parent.set(Some(Rc::downgrade(&parent)));
    }
    children.splice(index..=index, replacements);
    node.parent.set(None);

    true
}

/// 合并相邻文本节点并移除空文本节点（只作用于直接子节点）
pub fn normalize(parent: &Handle) {
    let old_children: Vec<Handle> = parent.children.borrow_mut().drain(..).collect();
    let mut merged: Vec<Handle> = Vec::with_capacity(old_children.len());

    for child in old_children {
        if let NodeData::Text { contents } = &child.data {
            if contents.borrow().is_empty() {
                child.parent.set(None);
                continue;
            }

            if let Some(NodeData::Text { contents: previous }) = merged.last().map(|n| &n.data) {
                previous.borrow_mut().push_tendril(&contents.borrow());
                child.parent.set(None);
                continue;
            }
        }
        merged.push(child);
    }

    *parent.children.borrow_mut() = merged;
}

/// 节点及其后代的全部文本
pub fn text_content(node: &Handle) -> String {
    let mut buf = String::new();
    push_text_content(node, &mut buf);
    buf
}

fn push_text_content(node: &Handle, buf: &mut String) {
    match &node.data {
        NodeData::Text { contents } => buf.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                push_text_content(child, buf);
            }
        }
    }
}

/// 节点自身直接拥有的文本（仅直接文本子节点）
pub fn direct_text(node: &Handle) -> String {
    node.children
        .borrow()
        .iter()
        .filter_map(|child| match &child.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 深度优先查找所有满足条件的元素
pub fn find_elements<F>(node: &Handle, predicate: &F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();
    collect_elements(node, predicate, &mut found);
    found
}

fn collect_elements<F>(node: &Handle, predicate: &F, found: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    if matches!(node.data, NodeData::Element { .. }) && predicate(node) {
        found.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements(child, predicate, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").expect("parse")
    }

    #[test]
    fn test_parent_lookup_keeps_link() {
        let dom = dom("<html><body><p>hello</p></body></html>");
        let p = find_nodes(&dom.document, &["html", "body", "p"]).remove(0);
        let text = p.children.borrow()[0].clone();

        assert!(get_parent_node(&text).is_some());
        // Second lookup must still succeed
        let parent = get_parent_node(&text).expect("parent");
        assert!(Rc::ptr_eq(&parent, &p));
    }

    #[test]
    fn test_replace_and_normalize() {
        let dom = dom("<html><body><p>one two</p></body></html>");
        let p = find_nodes(&dom.document, &["p"]).remove(0);
        let text = p.children.borrow()[0].clone();

        let replaced = replace_node_with(
            &text,
            vec![create_text_node("one"), create_text_node(" "), create_text_node("two")],
        );
        assert!(replaced);
        assert_eq!(p.children.borrow().len(), 3);

        normalize(&p);
        assert_eq!(p.children.borrow().len(), 1);
        assert_eq!(text_content(&p), "one two");

        // Detached node can no longer be replaced
        assert!(!replace_node_with(&text, vec![create_text_node("x")]));
    }

    #[test]
    fn test_class_and_attrs() {
        let dom = dom(r#"<html><body><div class="a notranslate b">x</div></body></html>"#);
        let div = find_nodes(&dom.document, &["div"]).remove(0);

        assert!(has_class(&div, "notranslate"));
        assert!(!has_class(&div, "note"));

        set_node_attr(&div, "translate", Some("no".to_string()));
        assert_eq!(get_node_attr(&div, "translate").as_deref(), Some("no"));
        set_node_attr(&div, "translate", None);
        assert_eq!(get_node_attr(&div, "translate"), None);
    }

    #[test]
    fn test_direct_text_ignores_descendants() {
        let dom = dom("<html><body><div>outer <span>inner</span> tail</div></body></html>");
        let div = find_nodes(&dom.document, &["div"]).remove(0);

        assert_eq!(direct_text(&div), "outer   tail");
        assert_eq!(text_content(&div), "outer inner tail");
    }
}
