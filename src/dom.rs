//! Arena document model. Detached nodes keep their slot so old ids stay valid;
//! only `discard` hands a slot back for reuse.

use std::collections::{BTreeMap, VecDeque};

const SCROLL_LOG_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    value: String,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_any_class<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        classes.iter().any(|c| self.has_class(c.as_ref()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

// smooth, aligned to the top of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: NodeId,
}

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Element>,
    free: Vec<usize>,
    root: NodeId,
    scroll_log: VecDeque<ScrollRequest>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            free: Vec::new(),
            root: NodeId(0),
            scroll_log: VecDeque::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Element::new(tag);
            return NodeId(slot);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let child = self.create_element(tag);
        self.append_child(parent, child);
        child
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        if self.ancestors(parent).contains(&child) {
            return;
        }
        self.remove(child);
        if let Some(element) = self.get_mut(child) {
            element.parent = Some(parent);
        }
        if let Some(element) = self.get_mut(parent) {
            element.children.push(child);
        }
    }

    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(Element::parent) else {
            return;
        };
        if let Some(element) = self.get_mut(parent) {
            element.children.retain(|child| *child != node);
        }
        if let Some(element) = self.get_mut(node) {
            element.parent = None;
        }
    }

    // freed ids may be handed out again by create_element
    pub fn discard(&mut self, node: NodeId) -> Vec<NodeId> {
        if node == self.root || self.get(node).is_none() || self.free.contains(&node.0) {
            return Vec::new();
        }
        self.remove(node);
        let mut freed = vec![node];
        freed.extend(self.descendants(node));
        for id in &freed {
            self.nodes[id.0] = Element::new("");
            self.free.push(id.0);
        }
        freed
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).last() == Some(&self.root)
    }

    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(node).and_then(Element::parent);
        while let Some(id) = current {
            out.push(id);
            current = self.get(id).and_then(Element::parent);
        }
        out
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::tag)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|element| element.attr(name))
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if name == "class" {
            if let Some(element) = self.get_mut(node) {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            return;
        }
        if let Some(element) = self.get_mut(node) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|element| element.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            self.get(node).is_some()
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::text)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.get_mut(node) {
            element.text = text.to_string();
        }
    }

    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::value)
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.get_mut(node) {
            element.value = value.to_string();
        }
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(Element::is_disabled)
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(element) = self.get_mut(node) {
            element.disabled = disabled;
        }
    }

    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(scope)
            .map(|element| element.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(element) = self.get(id) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_all(&self, scope: NodeId, matches: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&matches))
            .collect()
    }

    pub fn query_first(
        &self,
        scope: NodeId,
        matches: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(&matches))
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        if self.get(self.root).and_then(Element::id) == Some(id) {
            return Some(self.root);
        }
        self.query_first(self.root, |element| element.id() == Some(id))
    }

    pub fn closest(&self, node: NodeId, matches: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|id| self.get(*id).is_some_and(&matches))
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.get(node)?.parent?;
        let siblings = &self.get(parent)?.children;
        let position = siblings.iter().position(|child| *child == node)?;
        siblings.get(position + 1).copied()
    }

    pub fn scroll_into_view(&mut self, node: NodeId) {
        if self.scroll_log.len() == SCROLL_LOG_LIMIT {
            self.scroll_log.pop_front();
        }
        self.scroll_log.push_back(ScrollRequest { target: node });
    }

    pub fn scroll_log(&self) -> Vec<ScrollRequest> {
        self.scroll_log.iter().copied().collect()
    }

    pub fn take_scroll_log(&mut self) -> Vec<ScrollRequest> {
        self.scroll_log.drain(..).collect()
    }
}
