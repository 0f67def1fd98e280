use crate::page::{EventKind, Page};
use tracing::debug;

pub fn install(page: &Page) -> usize {
    let anchors = page.with_dom(|dom| {
        dom.query_all(dom.root(), |element| {
            element.tag() == "a" && element.attr("href").is_some_and(|href| href.starts_with('#'))
        })
    });

    for anchor in &anchors {
        let anchor = *anchor;
        let handle = page.clone();
        page.add_listener(anchor, EventKind::Click, move |event| {
            event.prevent_default();
            handle.with_dom_mut(|dom| {
                let fragment = dom
                    .attr(anchor, "href")
                    .and_then(|href| href.strip_prefix('#'))
                    .unwrap_or_default()
                    .to_string();
                match dom.find_by_id(&fragment) {
                    Some(target) => {
                        dom.scroll_into_view(target);
                        debug!(%fragment, "scrolled to anchor target");
                    }
                    None => debug!(%fragment, "anchor target missing"),
                }
            });
        });
    }
    anchors.len()
}
