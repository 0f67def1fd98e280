pub mod config;
pub mod counter;
pub mod dom;
pub mod errors;
pub mod fixture;
pub mod forms;
pub mod menu;
pub mod observer;
pub mod page;
pub mod render;
pub mod scheduler;
pub mod scroll;
pub mod site;
pub mod tabs;
pub mod toast;
pub mod utils;
pub mod walkthrough;

pub use config::{SiteConfig, load_config, resolve_config_path};
pub use dom::{Dom, NodeId};
pub use errors::SiteError;
pub use fixture::{NodeSpec, demo_page, resolve_page_path};
pub use forms::{FormSubmission, MockSubmitter, Submitter};
pub use page::{Event, EventKind, Page};
pub use render::render_html;
pub use scheduler::Scheduler;
pub use site::{Site, SiteDeps, SiteRoots};
pub use toast::Severity;
pub use utils::{debounce, format_date, validate_email};
