use crate::config::ToastConfig;
use crate::dom::NodeId;
use crate::page::Page;
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn as_class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toaster {
    page: Page,
    scheduler: Scheduler,
    config: ToastConfig,
}

impl Toaster {
    pub fn new(page: Page, scheduler: Scheduler, config: ToastConfig) -> Self {
        Self {
            page,
            scheduler,
            config,
        }
    }

    pub fn success(&self, message: &str) -> NodeId {
        self.show(message, Severity::default())
    }

    pub fn show(&self, message: &str, severity: Severity) -> NodeId {
        let toast = self.page.with_dom_mut(|dom| {
            let root = dom.root();
            let toast = dom.append_element(root, "div");
            dom.add_class(toast, &self.config.class);
            dom.add_class(toast, severity.as_class());
            dom.set_text(toast, message);
            toast
        });
        debug!(node = toast.index(), ?severity, "toast shown");

        let page = self.page.clone();
        self.scheduler.set_timeout(self.config.lifetime(), move || {
            page.discard(toast);
            debug!(node = toast.index(), "toast removed");
        });
        toast
    }
}

pub fn visible_toasts(page: &Page, config: &ToastConfig) -> Vec<(Severity, String)> {
    page.with_dom(|dom| {
        dom.query_all(dom.root(), |element| element.has_class(&config.class))
            .into_iter()
            .filter_map(|node| {
                let element = dom.get(node)?;
                let severity = [Severity::Success, Severity::Error, Severity::Info]
                    .into_iter()
                    .find(|severity| element.has_class(severity.as_class()))?;
                Some((severity, element.text().to_string()))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use std::time::Duration;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn toasts_coexist_and_expire_independently() {
        let page = Page::new(Dom::new());
        let config = ToastConfig::default();
        let toaster = Toaster::new(
            page.clone(),
            Scheduler::current().expect("runtime"),
            config.clone(),
        );

        toaster.success("saved");
        time::sleep(Duration::from_millis(1000)).await;
        toaster.show("failed", Severity::Error);
        assert_eq!(
            visible_toasts(&page, &config),
            vec![
                (Severity::Success, "saved".to_string()),
                (Severity::Error, "failed".to_string())
            ]
        );

        time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(
            visible_toasts(&page, &config),
            vec![(Severity::Error, "failed".to_string())]
        );

        time::sleep(Duration::from_millis(1000)).await;
        assert!(visible_toasts(&page, &config).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_toasts_free_their_nodes() {
        let page = Page::new(Dom::new());
        let toaster = Toaster::new(
            page.clone(),
            Scheduler::current().expect("runtime"),
            ToastConfig::default(),
        );

        for _ in 0..20 {
            toaster.show("ping", Severity::Info);
            time::sleep(Duration::from_millis(5001)).await;
        }
        assert_eq!(page.with_dom(Dom::len), 1);
        assert_eq!(page.with_dom(|dom| dom.descendants(dom.root()).len()), 0);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
