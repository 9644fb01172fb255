//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、属性、节点替换、文本合并）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    append_child, create_element, create_text_node, direct_text, find_body, find_elements,
    find_nodes, get_node_attr, get_node_name, get_parent_node, has_class, html_to_dom, normalize,
    replace_node_with, set_node_attr, text_content,
};
pub use serializer::{serialize_document, serialize_node};
