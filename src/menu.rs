use crate::dom::NodeId;
use crate::page::{EventKind, Page};
use tracing::debug;

pub fn install(
    page: &Page,
    trigger: Option<NodeId>,
    nav: Option<NodeId>,
    active_class: &str,
) -> bool {
    let (Some(trigger), Some(nav)) = (trigger, nav) else {
        debug!("mobile menu not installed: trigger or nav missing");
        return false;
    };

    let handle = page.clone();
    let active_class = active_class.to_string();
    page.add_listener(trigger, EventKind::Click, move |_| {
        let open = handle.with_dom_mut(|dom| {
            let open = dom.toggle_class(nav, &active_class);
            dom.toggle_class(trigger, &active_class);
            open
        });
        debug!(open, "mobile menu toggled");
    });
    true
}
