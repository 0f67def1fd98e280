use crate::config::SiteConfig;
use crate::counter;
use crate::dom::{Dom, NodeId};
use crate::errors::SiteError;
use crate::forms::{FormHandler, MockSubmitter, Submitter};
use crate::menu;
use crate::observer::VisibilityObserver;
use crate::page::Page;
use crate::scheduler::Scheduler;
use crate::scroll;
use crate::tabs;
use crate::toast::{Severity, Toaster};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteRoots {
    pub menu_trigger: Option<NodeId>,
    pub main_nav: Option<NodeId>,
    pub root: NodeId,
}

impl SiteRoots {
    pub fn discover(dom: &Dom, config: &SiteConfig) -> Self {
        Self {
            menu_trigger: dom.find_by_id(&config.menu.trigger_id),
            main_nav: dom.query_first(dom.root(), |element| {
                element.has_class(&config.menu.nav_class)
            }),
            root: dom.root(),
        }
    }
}

#[derive(Clone)]
pub struct SiteDeps {
    pub config: SiteConfig,
    pub scheduler: Scheduler,
    pub submitter: Arc<dyn Submitter>,
}

impl SiteDeps {
    pub fn current() -> Result<Self, SiteError> {
        Self::with_config(SiteConfig::default())
    }

    pub fn with_config(config: SiteConfig) -> Result<Self, SiteError> {
        let submitter = Arc::new(MockSubmitter::new(config.forms.submit_delay()));
        Ok(Self {
            config,
            scheduler: Scheduler::current()?,
            submitter,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Installed {
    pub menu: bool,
    pub anchors: usize,
    pub counters: usize,
    pub tab_triggers: usize,
}

#[derive(Clone)]
pub struct Site {
    page: Page,
    config: SiteConfig,
    toaster: Toaster,
    counters: VisibilityObserver,
    installed: Installed,
}

impl Site {
    pub fn attach(page: &Page, roots: SiteRoots, deps: SiteDeps) -> Self {
        let SiteDeps {
            config,
            scheduler,
            submitter,
        } = deps;
        let active = config.active_class();

        let menu = menu::install(page, roots.menu_trigger, roots.main_nav, active);
        let anchors = scroll::install(page);
        let (counters, counted) = counter::install(page, &scheduler, &config.counters);
        let tab_triggers = tabs::install(page, &config.tabs, active);

        let toaster = Toaster::new(page.clone(), scheduler.clone(), config.toasts.clone());
        let forms = FormHandler::new(
            page.clone(),
            scheduler,
            toaster.clone(),
            submitter,
            config.forms.clone(),
        );
        forms.install(roots.root);

        let installed = Installed {
            menu,
            anchors,
            counters: counted,
            tab_triggers,
        };
        info!(
            menu = installed.menu,
            anchors = installed.anchors,
            counters = installed.counters,
            tab_triggers = installed.tab_triggers,
            "site behaviors attached"
        );

        Self {
            page: page.clone(),
            config,
            toaster,
            counters,
            installed,
        }
    }

    pub fn attach_discovered(page: &Page, deps: SiteDeps) -> Self {
        let roots = page.with_dom(|dom| SiteRoots::discover(dom, &deps.config));
        Self::attach(page, roots, deps)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn installed(&self) -> Installed {
        self.installed
    }

    pub fn counters(&self) -> &VisibilityObserver {
        &self.counters
    }

    pub fn show_message(&self, message: &str, severity: Severity) -> NodeId {
        self.toaster.show(message, severity)
    }
}
