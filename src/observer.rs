//! Observing a node delivers one entry for its current state straight away;
//! after that only threshold crossings are delivered.

use crate::dom::NodeId;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

type Callback = Box<dyn Fn(&VisibilityEntry, &VisibilityObserver) + Send + Sync>;

#[derive(Clone)]
pub struct VisibilityObserver {
    inner: Arc<ObserverInner>,
}

struct ObserverInner {
    threshold: f64,
    connected: AtomicBool,
    // last delivered intersecting state
    targets: Mutex<HashMap<NodeId, Option<bool>>>,
    ratios: Arc<Mutex<HashMap<NodeId, f64>>>,
    callback: Callback,
}

impl fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("threshold", &self.inner.threshold)
            .field("watching", &self.inner.targets.lock().len())
            .finish()
    }
}

impl VisibilityObserver {
    pub(crate) fn new(
        threshold: f64,
        ratios: Arc<Mutex<HashMap<NodeId, f64>>>,
        callback: Callback,
    ) -> Self {
        Self {
            inner: Arc::new(ObserverInner {
                threshold,
                connected: AtomicBool::new(true),
                targets: Mutex::new(HashMap::new()),
                ratios,
                callback,
            }),
        }
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.inner.targets.lock().contains_key(&node)
    }

    pub fn observe(&self, node: NodeId) {
        self.observe_all([node]);
    }

    pub fn observe_all(&self, nodes: impl IntoIterator<Item = NodeId>) {
        if !self.is_connected() {
            return;
        }
        let added: Vec<NodeId> = {
            let mut targets = self.inner.targets.lock();
            nodes
                .into_iter()
                .filter(|node| match targets.entry(*node) {
                    Entry::Occupied(_) => false,
                    Entry::Vacant(slot) => {
                        slot.insert(None);
                        true
                    }
                })
                .collect()
        };
        for node in added {
            let ratio = self.inner.ratios.lock().get(&node).copied().unwrap_or(0.0);
            self.notify(node, ratio);
        }
    }

    pub fn unobserve(&self, node: NodeId) {
        self.inner.targets.lock().remove(&node);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.targets.lock().is_empty()
    }

    /// Stops all notifications for good. The page drops disconnected observers.
    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
        self.inner.targets.lock().clear();
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn notify(&self, node: NodeId, ratio: f64) {
        let is_intersecting = self.crosses(ratio);
        {
            let mut targets = self.inner.targets.lock();
            let Some(last) = targets.get_mut(&node) else {
                return;
            };
            if *last == Some(is_intersecting) {
                return;
            }
            *last = Some(is_intersecting);
        }
        let entry = VisibilityEntry {
            target: node,
            ratio,
            is_intersecting,
        };
        (self.inner.callback)(&entry, self);
    }

    fn crosses(&self, ratio: f64) -> bool {
        if self.inner.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.inner.threshold
        }
    }
}
