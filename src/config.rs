use crate::errors::SiteError;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf, time::Duration};
use tokio::fs;
use tracing::error;

const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub menu: MenuConfig,
    pub counters: CounterConfig,
    pub tabs: TabConfig,
    pub forms: FormConfig,
    pub toasts: ToastConfig,
    pub active_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub trigger_id: String,
    pub nav_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub class: String,
    pub target_attr: String,
    pub duration_ms: u64,
    pub frame_interval_ms: u64,
    pub visibility_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    pub trigger_classes: Vec<String>,
    pub bar_classes: Vec<String>,
    pub target_attrs: Vec<String>,
    pub panel_classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub busy_label: String,
    pub loading_class: String,
    pub success_message: String,
    pub failure_message: String,
    pub invalid_email_message: String,
    pub submit_delay_ms: u64,
    pub validate_email_fields: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub class: String,
    pub lifetime_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            menu: MenuConfig::default(),
            counters: CounterConfig::default(),
            tabs: TabConfig::default(),
            forms: FormConfig::default(),
            toasts: ToastConfig::default(),
            active_class: "active".into(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            trigger_id: "mobileMenuBtn".into(),
            nav_class: "main-nav".into(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            class: "number".into(),
            target_attr: "data-count".into(),
            duration_ms: 2000,
            frame_interval_ms: 16,
            visibility_threshold: 0.5,
        }
    }
}

impl CounterConfig {
    pub fn frames(&self) -> f64 {
        self.duration_ms as f64 / self.frame_interval_ms.max(1) as f64
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            trigger_classes: strings(&["nav-tab", "option-tab", "category-tab"]),
            bar_classes: strings(&["nav-tabs", "options-nav", "category-tabs"]),
            target_attrs: strings(&["data-tab", "data-option", "data-category"]),
            panel_classes: strings(&["tab-content", "option-content"]),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            busy_label: "Submitting...".into(),
            loading_class: "loading".into(),
            success_message: "Thank you for your submission! We will get back to you soon."
                .into(),
            failure_message: "Sorry, your submission could not be sent.".into(),
            invalid_email_message: "Please enter a valid email address.".into(),
            submit_delay_ms: 2000,
            validate_email_fields: false,
        }
    }
}

impl FormConfig {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            class: "toast".into(),
            lifetime_ms: 5000,
        }
    }
}

impl ToastConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

impl SiteConfig {
    pub fn active_class(&self) -> &str {
        &self.active_class
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, SiteError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SiteError> {
        if self.counters.frame_interval_ms == 0 {
            return Err(SiteError::invalid_config(
                "counters.frame_interval_ms must be positive",
            ));
        }
        let timings = [
            ("counters.duration_ms", self.counters.duration_ms),
            ("counters.frame_interval_ms", self.counters.frame_interval_ms),
            ("forms.submit_delay_ms", self.forms.submit_delay_ms),
            ("toasts.lifetime_ms", self.toasts.lifetime_ms),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, ms)| *ms > MAX_DELAY_MS) {
            return Err(SiteError::invalid_config(format!(
                "{name} must not exceed {MAX_DELAY_MS} ms"
            )));
        }
        if !(0.0..=1.0).contains(&self.counters.visibility_threshold) {
            return Err(SiteError::invalid_config(
                "counters.visibility_threshold must be within 0.0..=1.0",
            ));
        }
        if self.active_class.trim().is_empty() {
            return Err(SiteError::invalid_config("active_class must not be empty"));
        }
        if self.tabs.trigger_classes.is_empty() || self.tabs.bar_classes.is_empty() {
            return Err(SiteError::invalid_config(
                "tabs need at least one trigger class and one bar class",
            ));
        }
        Ok(())
    }

    // longest fixed delay any behavior waits on
    pub fn settle_time(&self) -> Duration {
        let longest = self
            .counters
            .duration_ms
            .max(self.forms.submit_delay_ms)
            .saturating_add(self.counters.frame_interval_ms.saturating_mul(2));
        Duration::from_millis(longest)
    }
}

pub fn resolve_config_path() -> Option<PathBuf> {
    env::var("SITE_CONFIG_PATH").ok().map(PathBuf::from)
}

pub async fn load_config(path: &Path) -> SiteConfig {
    match fs::read(path).await {
        Ok(bytes) => match SiteConfig::from_json(&bytes) {
            Ok(config) => config,
            Err(err) => {
                error!("failed to parse config file: {err}");
                SiteConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SiteConfig::default(),
        Err(err) => {
            error!("failed to read config file: {err}");
            SiteConfig::default()
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
