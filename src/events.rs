//! Per-node event listeners.
//!
//! Dispatch along the parent chain lives in [`Scene::trigger`](crate::Scene::trigger);
//! this module only stores listeners and calls them in registration order.

use std::collections::HashMap;
use std::fmt;

use glam::DVec2;

use crate::scene::NodeId;

/// An event travelling up the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: String,
    /// Whether the event continues to the parent after this node
    pub bubbles: bool,
    /// Pointer position in world space, for pointer events
    pub point: Option<DVec2>,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    propagation_stopped: bool,
}

impl Event {
    /// A bubbling event of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Event {
            kind: kind.into(),
            bubbles: true,
            point: None,
            target: None,
            current_target: None,
            propagation_stopped: false,
        }
    }

    pub fn at(mut self, point: DVec2) -> Self {
        self.point = Some(point);
        self
    }

    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event was triggered on.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Node whose listeners are running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Finish the current node, then stop bubbling.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = Some(node);
    }
}

/// Handle returned by [`EventDispatcher::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&mut Event)>;

#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventDispatcher").field("listeners", &counts).finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &mut self,
        kind: impl Into<String>,
        listener: impl FnMut(&mut Event) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind.into())
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn off(&mut self, kind: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        list.len() != before
    }

    pub fn off_kind(&mut self, kind: &str) {
        self.listeners.remove(kind);
    }

    pub fn off_all(&mut self) {
        self.listeners.clear();
    }

    pub fn has_any(&self) -> bool {
        self.listeners.values().any(|l| !l.is_empty())
    }

    pub fn has(&self, kind: &str) -> bool {
        self.listeners.get(kind).is_some_and(|l| !l.is_empty())
    }

    pub fn has_listener(&self, kind: &str, id: ListenerId) -> bool {
        self.listeners
            .get(kind)
            .is_some_and(|l| l.iter().any(|(lid, _)| *lid == id))
    }

    /// Call every listener for the event's kind, in registration order.
    pub fn dispatch(&mut self, event: &mut Event) {
        if let Some(list) = self.listeners.get_mut(event.kind()) {
            for (_, listener) in list.iter_mut() {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn listeners_run_in_order() {
        let seen = log();
        let mut d = EventDispatcher::new();
        for name in ["a", "b", "c"] {
            let seen = seen.clone();
            d.on("click", move |_| seen.borrow_mut().push(name.to_string()));
        }
        d.dispatch(&mut Event::new("click"));
        d.dispatch(&mut Event::new("hover"));
        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn off_removes_only_that_listener() {
        let mut d = EventDispatcher::new();
        let a = d.on("click", |_| {});
        let b = d.on("click", |_| {});
        assert!(d.off("click", a));
        assert!(!d.off("click", a));
        assert!(!d.has_listener("click", a));
        assert!(d.has_listener("click", b));
        assert!(d.has("click"));
    }

    #[test]
    fn off_kind_and_off_all() {
        let mut d = EventDispatcher::new();
        d.on("click", |_| {});
        d.on("hover", |_| {});
        d.off_kind("click");
        assert!(!d.has("click"));
        assert!(d.has_any());
        d.off_all();
        assert!(!d.has_any());
    }

    #[test]
    fn emptied_kind_is_not_counted() {
        let mut d = EventDispatcher::new();
        let id = d.on("click", |_| {});
        d.off("click", id);
        assert!(!d.has_any());
    }

    #[test]
    fn stop_propagation_still_runs_siblings() {
        let seen = log();
        let mut d = EventDispatcher::new();
        d.on("click", |e| e.stop_propagation());
        let s = seen.clone();
        d.on("click", move |_| s.borrow_mut().push("second".into()));
        let mut event = Event::new("click");
        d.dispatch(&mut event);
        assert!(event.propagation_stopped());
        assert_eq!(seen.borrow().len(), 1);
    }
}
