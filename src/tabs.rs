use crate::config::TabConfig;
use crate::dom::{Dom, NodeId};
use crate::page::{EventKind, Page};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSwitch {
    pub trigger: NodeId,
    pub target_id: Option<String>,
    pub panel: Option<NodeId>,
}

pub fn install(page: &Page, config: &TabConfig, active_class: &str) -> usize {
    let triggers = page.with_dom(|dom| {
        dom.query_all(dom.root(), |element| {
            element.has_any_class(&config.trigger_classes)
        })
    });

    for trigger in &triggers {
        let trigger = *trigger;
        let handle = page.clone();
        let config = config.clone();
        let active_class = active_class.to_string();
        page.add_listener(trigger, EventKind::Click, move |_| {
            let switch = handle.with_dom_mut(|dom| activate(dom, trigger, &config, &active_class));
            debug!(
                trigger = trigger.index(),
                target = switch.target_id.as_deref().unwrap_or("<none>"),
                switched = switch.panel.is_some(),
                "tab activated"
            );
        });
    }
    triggers.len()
}

/// The trigger is marked even when no panel matches.
pub fn activate(
    dom: &mut Dom,
    trigger: NodeId,
    config: &TabConfig,
    active_class: &str,
) -> TabSwitch {
    let bar = dom.closest(trigger, |element| element.has_any_class(&config.bar_classes));

    if let Some(bar) = bar {
        let siblings = dom.query_all(bar, |element| {
            element.has_any_class(&config.trigger_classes)
        });
        for sibling in siblings {
            dom.remove_class(sibling, active_class);
        }
    }
    dom.add_class(trigger, active_class);

    let target_id = target_id(dom, trigger, config);
    let container = bar.and_then(|bar| dom.next_element_sibling(bar));
    let panel = match (container, target_id.as_deref()) {
        (Some(container), Some(id)) if !id.is_empty() => {
            dom.query_first(container, |element| element.id() == Some(id))
                .map(|panel| (container, panel))
        }
        _ => None,
    };

    if let Some((container, panel)) = panel {
        let panels = dom.query_all(container, |element| {
            element.has_any_class(&config.panel_classes)
        });
        for other in panels {
            dom.remove_class(other, active_class);
        }
        dom.add_class(panel, active_class);
    }

    TabSwitch {
        trigger,
        target_id,
        panel: panel.map(|(_, panel)| panel),
    }
}

fn target_id(dom: &Dom, trigger: NodeId, config: &TabConfig) -> Option<String> {
    config
        .target_attrs
        .iter()
        .find_map(|attr| dom.attr(trigger, attr))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dom: Dom,
        triggers: Vec<NodeId>,
        panels: Vec<NodeId>,
    }

    fn tab_group(ids: &[&str]) -> Fixture {
        let mut dom = Dom::new();
        let root = dom.root();
        let bar = dom.append_element(root, "div");
        dom.set_attr(bar, "class", "nav-tabs");
        let container = dom.append_element(root, "div");
        let mut triggers = Vec::new();
        let mut panels = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            let trigger = dom.append_element(bar, "button");
            dom.set_attr(trigger, "class", "nav-tab");
            dom.set_attr(trigger, "data-tab", id);
            let panel = dom.append_element(container, "div");
            dom.set_attr(panel, "class", "tab-content");
            dom.set_attr(panel, "id", id);
            if i == 0 {
                dom.add_class(trigger, "active");
                dom.add_class(panel, "active");
            }
            triggers.push(trigger);
            panels.push(panel);
        }
        Fixture {
            dom,
            triggers,
            panels,
        }
    }

    fn active(dom: &Dom, nodes: &[NodeId]) -> Vec<usize> {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| dom.has_class(**node, "active"))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn activating_a_trigger_leaves_exactly_one_active_pair() {
        let Fixture {
            mut dom,
            triggers,
            panels,
        } = tab_group(&["one", "two", "three"]);
        let config = TabConfig::default();

        for i in [2, 1, 0, 2] {
            let switch = activate(&mut dom, triggers[i], &config, "active");
            assert_eq!(switch.panel, Some(panels[i]));
            assert_eq!(active(&dom, &triggers), vec![i]);
            assert_eq!(active(&dom, &panels), vec![i]);
        }
    }

    #[test]
    fn missing_panel_still_marks_trigger() {
        let Fixture {
            mut dom,
            triggers,
            panels,
        } = tab_group(&["one", "two"]);
        dom.set_attr(triggers[1], "data-tab", "ghost");
        let config = TabConfig::default();

        let switch = activate(&mut dom, triggers[1], &config, "active");
        assert_eq!(switch.panel, None);
        assert_eq!(switch.target_id.as_deref(), Some("ghost"));
        assert_eq!(active(&dom, &triggers), vec![1]);
        assert_eq!(active(&dom, &panels), vec![0]);
    }

    #[test]
    fn bar_without_following_container_only_moves_trigger() {
        let Fixture {
            mut dom,
            triggers,
            panels,
        } = tab_group(&["one", "two"]);
        let container = dom.get(panels[0]).and_then(|panel| panel.parent());
        if let Some(container) = container {
            dom.remove(container);
        }

        let switch = activate(&mut dom, triggers[1], &TabConfig::default(), "active");
        assert_eq!(switch.panel, None);
        assert_eq!(switch.target_id.as_deref(), Some("two"));
        assert_eq!(active(&dom, &triggers), vec![1]);
        assert_eq!(active(&dom, &panels), vec![0]);
    }

    #[test]
    fn trigger_without_target_only_moves_trigger() {
        let Fixture {
            mut dom,
            triggers,
            panels,
        } = tab_group(&["one", "two", "three"]);
        dom.set_attr(triggers[1], "data-tab", "");
        let config = TabConfig::default();

        let switch = activate(&mut dom, triggers[1], &config, "active");
        assert_eq!(switch.panel, None);
        assert_eq!(switch.target_id.as_deref(), Some(""));
        assert_eq!(active(&dom, &triggers), vec![1]);
        assert_eq!(active(&dom, &panels), vec![0]);

        let bare = dom.create_element("button");
        dom.set_attr(bare, "class", "nav-tab");
        let bar = dom.get(triggers[0]).and_then(|trigger| trigger.parent());
        if let Some(bar) = bar {
            dom.append_child(bar, bare);
        }
        let switch = activate(&mut dom, bare, &config, "active");
        assert_eq!(switch.panel, None);
        assert_eq!(switch.target_id, None);
        assert_eq!(active(&dom, &triggers), Vec::<usize>::new());
        assert!(dom.has_class(bare, "active"));
        assert_eq!(active(&dom, &panels), vec![0]);
    }

    #[test]
    fn data_attribute_priority_is_tab_then_option_then_category() {
        let mut dom = Dom::new();
        let root = dom.root();
        let trigger = dom.append_element(root, "button");
        dom.set_attr(trigger, "data-category", "c");
        dom.set_attr(trigger, "data-option", "o");
        let config = TabConfig::default();
        assert_eq!(target_id(&dom, trigger, &config).as_deref(), Some("o"));
        dom.set_attr(trigger, "data-tab", "t");
        assert_eq!(target_id(&dom, trigger, &config).as_deref(), Some("t"));
    }

    #[test]
    fn trigger_without_bar_is_only_marked() {
        let mut dom = Dom::new();
        let root = dom.root();
        let trigger = dom.append_element(root, "button");
        dom.set_attr(trigger, "class", "category-tab");
        dom.set_attr(trigger, "data-category", "x");
        let switch = activate(&mut dom, trigger, &TabConfig::default(), "active");
        assert!(dom.has_class(trigger, "active"));
        assert_eq!(switch.panel, None);
    }

    #[test]
    fn install_wires_triggers_through_page_clicks() {
        let Fixture {
            dom,
            triggers,
            panels,
        } = tab_group(&["one", "two"]);
        let page = Page::new(dom);
        assert_eq!(install(&page, &TabConfig::default(), "active"), 2);

        page.click(triggers[1]);
        page.with_dom(|dom| {
            assert_eq!(active(dom, &triggers), vec![1]);
            assert_eq!(active(dom, &panels), vec![1]);
        });
    }
}
