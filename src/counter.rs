use crate::config::CounterConfig;
use crate::dom::NodeId;
use crate::observer::VisibilityObserver;
use crate::page::Page;
use crate::scheduler::Scheduler;
use crate::utils::{format_grouped, parse_int_prefix};
use std::ops::ControlFlow;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Running(String),
    Done(String),
}

// The last frame always shows `target` exactly, even when the final step overshoots.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: i64,
    step: f64,
    current: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, frames: f64) -> Self {
        Self {
            target,
            step: target as f64 / frames.max(1.0),
            current: 0.0,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn tick(&mut self) -> Frame {
        self.current += self.step;
        if self.current >= self.target as f64 {
            Frame::Done(format_grouped(self.target))
        } else {
            Frame::Running(format_grouped(self.current.floor() as i64))
        }
    }
}

pub fn parse_target(raw: Option<&str>) -> i64 {
    match raw.and_then(parse_int_prefix) {
        Some(target) => target,
        None => {
            warn!(raw = raw.unwrap_or("<missing>"), "counter target is not a number, using 0");
            0
        }
    }
}

pub fn install(
    page: &Page,
    scheduler: &Scheduler,
    config: &CounterConfig,
) -> (VisibilityObserver, usize) {
    let counters: Vec<NodeId> = page.with_dom(|dom| {
        dom.query_all(dom.root(), |element| {
            element.has_class(&config.class) && element.attr(&config.target_attr).is_some()
        })
    });

    let handle = page.clone();
    let scheduler = scheduler.clone();
    let settings = config.clone();
    let observer = page.observe_visibility(config.visibility_threshold, move |entry, observer| {
        if !entry.is_intersecting {
            return;
        }
        observer.unobserve(entry.target);
        if observer.is_empty() {
            observer.disconnect();
        }
        animate(&handle, &scheduler, &settings, entry.target);
    });

    let count = counters.len();
    debug!(count, "observing counters");
    observer.observe_all(counters);
    (observer, count)
}

fn animate(page: &Page, scheduler: &Scheduler, config: &CounterConfig, node: NodeId) {
    let raw = page.with_dom(|dom| dom.attr(node, &config.target_attr).map(str::to_string));
    let target = parse_target(raw.as_deref());
    let mut animation = CounterAnimation::new(target, config.frames());
    debug!(node = node.index(), target, "counter animation started");

    let page = page.clone();
    scheduler.set_interval(config.frame_interval(), move || match animation.tick() {
        Frame::Running(text) => {
            page.with_dom_mut(|dom| dom.set_text(node, &text));
            ControlFlow::Continue(())
        }
        Frame::Done(text) => {
            page.with_dom_mut(|dom| dom.set_text(node, &text));
            debug!(node = node.index(), "counter animation finished");
            ControlFlow::Break(())
        }
    });
}
