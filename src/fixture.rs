use crate::dom::{Dom, NodeId};
use crate::errors::SiteError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub disabled: bool,
    pub children: Vec<NodeSpec>,
}

pub const DEMO_PAGE: &str = include_str!("../demos/page.json");

impl NodeSpec {
    pub fn from_json(bytes: &[u8]) -> Result<Self, SiteError> {
        let spec: Self = serde_json::from_slice(bytes)?;
        spec.check()?;
        Ok(spec)
    }

    fn check(&self) -> Result<(), SiteError> {
        if self.tag.trim().is_empty() {
            return Err(SiteError::invalid_input("every node needs a tag"));
        }
        self.children.iter().try_for_each(NodeSpec::check)
    }

    // the top-level tag is taken to be the root's
    pub fn into_dom(&self) -> Dom {
        let mut dom = Dom::new();
        let root = dom.root();
        self.apply(&mut dom, root);
        for child in &self.children {
            child.build(&mut dom, root);
        }
        dom
    }

    pub fn build(&self, dom: &mut Dom, parent: NodeId) -> NodeId {
        let node = dom.append_element(parent, &self.tag);
        self.apply(dom, node);
        for child in &self.children {
            child.build(dom, node);
        }
        node
    }

    fn apply(&self, dom: &mut Dom, node: NodeId) {
        for (name, value) in &self.attrs {
            dom.set_attr(node, name, value);
        }
        if let Some(id) = &self.id {
            dom.set_attr(node, "id", id);
        }
        if let Some(class) = &self.class {
            dom.set_attr(node, "class", class);
        }
        if let Some(text) = &self.text {
            dom.set_text(node, text);
        }
        let value = self
            .value
            .as_deref()
            .or_else(|| self.attrs.get("value").map(String::as_str));
        if let Some(value) = value {
            dom.set_value(node, value);
        }
        dom.set_disabled(node, self.disabled);
    }
}

pub fn resolve_page_path() -> Option<PathBuf> {
    env::var("SITE_PAGE_PATH").ok().map(PathBuf::from)
}

pub fn demo_page() -> Result<NodeSpec, SiteError> {
    NodeSpec::from_json(DEMO_PAGE.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_page_parses_and_has_menu_trigger() {
        let dom = demo_page().expect("demo page").into_dom();
        assert!(dom.find_by_id("mobileMenuBtn").is_some());
        assert!(!dom.query_all(dom.root(), |e| e.tag() == "form").is_empty());
    }

    #[test]
    fn missing_tag_is_rejected() {
        let err = NodeSpec::from_json(br#"{"tag": "body", "children": [{"class": "x"}]}"#)
            .expect_err("should reject");
        assert_eq!(err.kind, crate::errors::ErrorKind::InvalidInput);
    }

    #[test]
    fn value_attribute_seeds_field_value() {
        let spec = NodeSpec::from_json(
            br#"{"tag": "body", "children": [{"tag": "input", "id": "q", "attrs": {"value": "hi"}}]}"#,
        )
        .expect("spec");
        let dom = spec.into_dom();
        let input = dom.find_by_id("q").expect("input");
        assert_eq!(dom.value(input), Some("hi"));
    }
}
