use crate::config::FormConfig;
use crate::dom::{Dom, NodeId};
use crate::errors::SiteError;
use crate::page::{EventKind, Page};
use crate::scheduler::Scheduler;
use crate::toast::{Severity, Toaster};
use crate::utils::validate_email;
use async_trait::async_trait;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio::time;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub form_id: Option<String>,
    pub fields: BTreeMap<String, String>,
}

#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, submission: FormSubmission) -> Result<(), SiteError>;
}

#[derive(Debug, Clone)]
pub struct MockSubmitter {
    delay: Duration,
}

impl MockSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    async fn submit(&self, submission: FormSubmission) -> Result<(), SiteError> {
        let payload = serde_json::to_string(&submission).map_err(SiteError::internal)?;
        debug!(%payload, delay_ms = self.delay.as_millis() as u64, "mock submission");
        time::sleep(self.delay).await;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FormHandler {
    page: Page,
    scheduler: Scheduler,
    toaster: Toaster,
    submitter: Arc<dyn Submitter>,
    config: FormConfig,
}

struct Pending {
    button: Option<NodeId>,
    label: String,
}

enum Start {
    Started(Pending, FormSubmission),
    Busy,
    Rejected(Vec<String>),
}

impl FormHandler {
    pub fn new(
        page: Page,
        scheduler: Scheduler,
        toaster: Toaster,
        submitter: Arc<dyn Submitter>,
        config: FormConfig,
    ) -> Self {
        Self {
            page,
            scheduler,
            toaster,
            submitter,
            config,
        }
    }

    pub fn install(&self, root: NodeId) {
        let handler = self.clone();
        self.page.add_listener(root, EventKind::Submit, move |event| {
            let is_form = handler
                .page
                .with_dom(|dom| dom.tag(event.target()) == Some("form"));
            if !is_form {
                return;
            }
            event.prevent_default();
            handler.handle(event.target());
        });
    }

    // false when already submitting or an email field is invalid
    pub fn handle(&self, form: NodeId) -> bool {
        let started = self.page.with_dom_mut(|dom| {
            if dom.has_class(form, &self.config.loading_class) {
                return Start::Busy;
            }
            if self.config.validate_email_fields {
                let invalid = invalid_emails(dom, form);
                if !invalid.is_empty() {
                    return Start::Rejected(invalid);
                }
            }

            let button = dom.query_first(form, |element| {
                element.tag() == "button" && element.attr("type") == Some("submit")
            });
            let label = button
                .and_then(|button| dom.text(button))
                .unwrap_or_default()
                .to_string();
            if let Some(button) = button {
                dom.set_text(button, &self.config.busy_label);
                dom.set_disabled(button, true);
            }
            dom.add_class(form, &self.config.loading_class);
            Start::Started(Pending { button, label }, collect(dom, form))
        });

        let (pending, submission) = match started {
            Start::Started(pending, submission) => (pending, submission),
            Start::Busy => {
                debug!(form = form.index(), "submission already pending, ignoring");
                return false;
            }
            Start::Rejected(invalid) => {
                warn!(form = form.index(), fields = ?invalid, "rejected invalid email");
                self.toaster
                    .show(&self.config.invalid_email_message, Severity::Error);
                return false;
            }
        };
        info!(
            form = submission.form_id.as_deref().unwrap_or("<anonymous>"),
            fields = submission.fields.len(),
            "form submitted"
        );

        let handler = self.clone();
        self.scheduler.spawn(async move {
            let result = handler.submitter.submit(submission).await;
            handler.settle(form, pending, result);
        });
        true
    }

    fn settle(&self, form: NodeId, pending: Pending, result: Result<(), SiteError>) {
        let succeeded = result.is_ok();
        match result {
            Ok(()) => {
                info!(form = form.index(), "submission accepted");
                self.toaster.success(&self.config.success_message);
            }
            Err(err) => {
                warn!(form = form.index(), error = %err, "submission failed");
                let message = format!("{} {}", self.config.failure_message, err);
                self.toaster.show(message.trim(), Severity::Error);
            }
        }

        self.page.with_dom_mut(|dom| {
            if succeeded {
                reset(dom, form);
            }
            if let Some(button) = pending.button {
                dom.set_text(button, &pending.label);
                dom.set_disabled(button, false);
            }
            dom.remove_class(form, &self.config.loading_class);
        });
    }
}

pub fn collect(dom: &Dom, form: NodeId) -> FormSubmission {
    let fields = dom
        .query_all(form, |element| element.is_field() && element.attr("name").is_some())
        .into_iter()
        .filter_map(|node| {
            let element = dom.get(node)?;
            Some((element.attr("name")?.to_string(), element.value().to_string()))
        })
        .collect();
    FormSubmission {
        form_id: dom.attr(form, "id").map(str::to_string),
        fields,
    }
}

pub fn reset(dom: &mut Dom, form: NodeId) {
    for field in dom.query_all(form, |element| element.is_field()) {
        dom.set_value(field, "");
    }
}

fn invalid_emails(dom: &Dom, form: NodeId) -> Vec<String> {
    dom.query_all(form, |element| {
        element.tag() == "input"
            && element.attr("type") == Some("email")
            && !validate_email(element.value())
    })
    .into_iter()
    .map(|node| dom.attr(node, "name").unwrap_or_default().to_string())
    .collect()
}
