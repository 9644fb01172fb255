//! 已处理容器集合
//!
//! 以节点指针为键，同时持有节点句柄，保证指针在集合清空前不会被复用。

use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

#[derive(Debug, Default)]
pub struct ProcessedSet {
    nodes: HashMap<usize, Handle>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(node: &Handle) -> usize {
        Rc::as_ptr(node) as usize
    }

    pub fn contains(&self, node: &Handle) -> bool {
        self.nodes.contains_key(&Self::key(node))
    }

    /// 标记为已处理；之前未标记过时返回 `true`
    pub fn insert(&mut self, node: &Handle) -> bool {
        self.nodes.insert(Self::key(node), node.clone()).is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 整体清空（恢复原文时调用）
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::create_element;

    #[test]
    fn test_identity_semantics() {
        let a = create_element("p", vec![]);
        let b = create_element("p", vec![]);
        let mut set = ProcessedSet::new();

        assert!(set.insert(&a));
        assert!(!set.insert(&a.clone()));
        assert!(set.contains(&a));
        assert!(!set.contains(&b));

        set.clear();
        assert!(set.is_empty());
    }
}
