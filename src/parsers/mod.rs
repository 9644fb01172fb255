//! # 解析器模块
//!
//! 页面 DOM 的解析、遍历、修改与序列化。

pub mod html;

pub use html::{html_to_dom, serialize_document, serialize_node};
