use crate::dom::{Dom, NodeId};
use crate::observer::{VisibilityEntry, VisibilityObserver};
use parking_lot::Mutex;
use std::{collections::HashMap, fmt, mem, sync::Arc};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
}

#[derive(Debug, Clone)]
pub struct Event {
    target: NodeId,
    current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    fn new(target: NodeId) -> Self {
        Self {
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

pub type Listener = Arc<dyn Fn(&mut Event) + Send + Sync>;
type ReadyCallback = Box<dyn FnOnce(&Page) + Send>;

#[derive(Default)]
struct ListenerStore {
    map: HashMap<NodeId, HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerStore {
    fn add(&mut self, node: NodeId, kind: EventKind, listener: Listener) {
        self.map
            .entry(node)
            .or_default()
            .entry(kind)
            .or_default()
            .push(listener);
    }

    fn get(&self, node: NodeId, kind: EventKind) -> Vec<Listener> {
        self.map
            .get(&node)
            .and_then(|events| events.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    fn forget(&mut self, node: NodeId) {
        self.map.remove(&node);
    }

    fn count(&self, node: NodeId, kind: EventKind) -> usize {
        self.map
            .get(&node)
            .and_then(|events| events.get(&kind))
            .map_or(0, Vec::len)
    }
}

enum ReadyState {
    Loading(Vec<ReadyCallback>),
    Complete,
}

#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

struct PageInner {
    dom: Mutex<Dom>,
    listeners: Mutex<ListenerStore>,
    observers: Mutex<Vec<VisibilityObserver>>,
    visibility: Arc<Mutex<HashMap<NodeId, f64>>>,
    ready: Mutex<ReadyState>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = {
            let dom = self.inner.dom.lock();
            dom.descendants(dom.root()).len()
        };
        f.debug_struct("Page")
            .field("nodes", &nodes)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl Page {
    pub fn new(dom: Dom) -> Self {
        Self {
            inner: Arc::new(PageInner {
                dom: Mutex::new(dom),
                listeners: Mutex::new(ListenerStore::default()),
                observers: Mutex::new(Vec::new()),
                visibility: Arc::new(Mutex::new(HashMap::new())),
                ready: Mutex::new(ReadyState::Loading(Vec::new())),
            }),
        }
    }

    pub fn root(&self) -> NodeId {
        self.inner.dom.lock().root()
    }

    pub fn with_dom<R>(&self, read: impl FnOnce(&Dom) -> R) -> R {
        read(&self.inner.dom.lock())
    }

    pub fn with_dom_mut<R>(&self, write: impl FnOnce(&mut Dom) -> R) -> R {
        write(&mut self.inner.dom.lock())
    }

    pub fn snapshot(&self) -> Dom {
        self.inner.dom.lock().clone()
    }

    pub fn add_listener<F>(&self, node: NodeId, kind: EventKind, listener: F)
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .lock()
            .add(node, kind, Arc::new(listener));
    }

    pub fn listener_count(&self, node: NodeId, kind: EventKind) -> usize {
        self.inner.listeners.lock().count(node, kind)
    }

    // no lock is held while a listener runs
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> Event {
        let path: Vec<NodeId> = {
            let dom = self.inner.dom.lock();
            if dom.get(target).is_none() {
                debug!(?kind, node = target.index(), "dispatch to unknown node dropped");
                return Event::new(target);
            }
            std::iter::once(target).chain(dom.ancestors(target)).collect()
        };

        let mut event = Event::new(target);
        for node in path {
            let listeners = self.inner.listeners.lock().get(node, kind);
            event.current_target = node;
            for listener in listeners {
                listener(&mut event);
            }
            if event.propagation_stopped {
                break;
            }
        }
        debug!(
            ?kind,
            node = target.index(),
            default_prevented = event.default_prevented,
            "event dispatched"
        );
        event
    }

    pub fn click(&self, target: NodeId) -> Event {
        self.dispatch(target, EventKind::Click)
    }

    pub fn submit(&self, form: NodeId) -> Event {
        self.dispatch(form, EventKind::Submit)
    }

    pub fn observe_visibility<F>(&self, threshold: f64, callback: F) -> VisibilityObserver
    where
        F: Fn(&VisibilityEntry, &VisibilityObserver) + Send + Sync + 'static,
    {
        let observer = VisibilityObserver::new(
            threshold,
            Arc::clone(&self.inner.visibility),
            Box::new(callback),
        );
        let mut observers = self.inner.observers.lock();
        observers.retain(VisibilityObserver::is_connected);
        observers.push(observer.clone());
        observer
    }

    pub fn observer_count(&self) -> usize {
        let mut observers = self.inner.observers.lock();
        observers.retain(VisibilityObserver::is_connected);
        observers.len()
    }

    pub fn set_visibility(&self, node: NodeId, ratio: f64) {
        let ratio = ratio.clamp(0.0, 1.0);
        self.inner.visibility.lock().insert(node, ratio);
        let observers = self.live_observers();
        for observer in observers {
            observer.notify(node, ratio);
        }
    }

    pub fn discard(&self, node: NodeId) -> usize {
        let freed = self.inner.dom.lock().discard(node);
        if freed.is_empty() {
            return 0;
        }
        {
            let mut listeners = self.inner.listeners.lock();
            for id in &freed {
                listeners.forget(*id);
            }
        }
        {
            let mut ratios = self.inner.visibility.lock();
            for id in &freed {
                ratios.remove(id);
            }
        }
        for observer in self.live_observers() {
            for id in &freed {
                observer.unobserve(*id);
            }
        }
        freed.len()
    }

    fn live_observers(&self) -> Vec<VisibilityObserver> {
        let mut observers = self.inner.observers.lock();
        observers.retain(VisibilityObserver::is_connected);
        observers.clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.inner.ready.lock(), ReadyState::Complete)
    }

    /// A page that is already loaded runs `callback` immediately.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&Page) + Send + 'static,
    {
        {
            let mut ready = self.inner.ready.lock();
            if let ReadyState::Loading(pending) = &mut *ready {
                pending.push(Box::new(callback));
                return;
            }
        }
        callback(self);
    }

    pub fn finish_loading(&self) {
        let pending = {
            let mut ready = self.inner.ready.lock();
            match mem::replace(&mut *ready, ReadyState::Complete) {
                ReadyState::Loading(pending) => pending,
                ReadyState::Complete => return,
            }
        };
        debug!(callbacks = pending.len(), "page ready");
        for callback in pending {
            callback(self);
        }
    }
}
