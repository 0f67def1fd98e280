use crate::dom::NodeId;
use crate::site::Site;
use crate::toast::{Severity, visible_toasts};
use serde::Serialize;
use tokio::time;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub menu_open: bool,
    pub scrolled: usize,
    pub counters: Vec<String>,
    pub active_panels: Vec<String>,
    pub forms_submitted: usize,
    pub toasts: Vec<(Severity, String)>,
}

pub async fn run(site: &Site) -> Summary {
    let page = site.page();
    let config = site.config();

    let (trigger, anchors, counters, bars, forms) = page.with_dom(|dom| {
        let root = dom.root();
        let trigger = dom.find_by_id(&config.menu.trigger_id);
        let anchors = dom.query_all(root, |element| {
            element.tag() == "a" && element.attr("href").is_some_and(|href| href.starts_with('#'))
        });
        let counters = dom.query_all(root, |element| element.has_class(&config.counters.class));
        let bars: Vec<Vec<NodeId>> = dom
            .query_all(root, |element| element.has_any_class(&config.tabs.bar_classes))
            .into_iter()
            .map(|bar| {
                dom.query_all(bar, |element| element.has_any_class(&config.tabs.trigger_classes))
            })
            .collect();
        let forms = dom.query_all(root, |element| element.tag() == "form");
        (trigger, anchors, counters, bars, forms)
    });

    if let Some(trigger) = trigger {
        page.click(trigger);
    }
    for anchor in &anchors {
        page.click(*anchor);
    }
    for counter in &counters {
        page.set_visibility(*counter, 1.0);
    }
    for triggers in &bars {
        if let Some(last) = triggers.last() {
            page.click(*last);
        }
    }
    for form in &forms {
        page.with_dom_mut(|dom| {
            for field in dom.query_all(*form, |element| element.is_field()) {
                let sample = match dom.attr(field, "type") {
                    Some("email") => "visitor@example.com",
                    _ => "Sample visitor",
                };
                dom.set_value(field, sample);
            }
        });
        page.submit(*form);
    }

    time::sleep(config.settle_time()).await;

    let scrolled = page.with_dom_mut(|dom| dom.take_scroll_log().len());
    let summary = page.with_dom(|dom| {
        let active = config.active_class();
        Summary {
            menu_open: trigger.is_some_and(|trigger| dom.has_class(trigger, active)),
            scrolled,
            counters: counters
                .iter()
                .filter_map(|counter| dom.text(*counter).map(str::to_string))
                .collect(),
            active_panels: dom
                .query_all(dom.root(), |element| {
                    element.has_any_class(&config.tabs.panel_classes) && element.has_class(active)
                })
                .into_iter()
                .filter_map(|panel| dom.attr(panel, "id").map(str::to_string))
                .collect(),
            forms_submitted: forms.len(),
            toasts: Vec::new(),
        }
    });
    let summary = Summary {
        toasts: visible_toasts(page, &config.toasts),
        ..summary
    };

    info!(
        summary = %serde_json::to_string(&summary).unwrap_or_default(),
        "walkthrough finished"
    );
    summary
}
