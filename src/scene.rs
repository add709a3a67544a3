//! Scene graph: groups and shapes in an arena.
//!
//! Nodes refer to their parent by index. A group's matrix applies to all
//! of its descendants; when it changes, the composed transform is pushed
//! down to every shape below so their caches are invalidated eagerly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::{DAffine2, dvec2};

use crate::errors::SceneError;
use crate::events::{Event, EventDispatcher, ListenerId};
use crate::log::debug;
use crate::render::RenderContext;
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
enum NodeContent {
    Group {
        matrix: DAffine2,
        children: Vec<NodeId>,
    },
    Shape(Shape),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    content: NodeContent,
    events: EventDispatcher,
}

pub struct Scene {
    /// Removed nodes leave a hole so ids stay stable
    nodes: Vec<Option<Node>>,
    context: Option<Rc<RefCell<dyn RenderContext>>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.iter().filter(|n| n.is_some()).count())
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            nodes: vec![Some(Node {
                parent: None,
                content: NodeContent::Group {
                    matrix: DAffine2::IDENTITY,
                    children: Vec::new(),
                },
                events: EventDispatcher::new(),
            })],
            context: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SceneError::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownNode(id.0))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Children in drawing order; empty for shapes.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        match &self.node(id)?.content {
            NodeContent::Group { children, .. } => Ok(children),
            NodeContent::Shape(_) => Ok(&[]),
        }
    }

    pub fn shape(&self, id: NodeId) -> Result<&Shape, SceneError> {
        match &self.node(id)?.content {
            NodeContent::Shape(s) => Ok(s),
            NodeContent::Group { .. } => Err(SceneError::NotAShape(id.0)),
        }
    }

    pub fn shape_mut(&mut self, id: NodeId) -> Result<&mut Shape, SceneError> {
        match &mut self.node_mut(id)?.content {
            NodeContent::Shape(s) => Ok(s),
            NodeContent::Group { .. } => Err(SceneError::NotAShape(id.0)),
        }
    }

    /// Context attached to every shape for fill hit-testing.
    pub fn set_context(&mut self, ctx: Rc<RefCell<dyn RenderContext>>) {
        for node in self.nodes.iter_mut().flatten() {
            if let NodeContent::Shape(shape) = &mut node.content {
                shape.set_context(ctx.clone());
            }
        }
        self.context = Some(ctx);
    }

    fn push(&mut self, parent: NodeId, content: NodeContent) -> Result<NodeId, SceneError> {
        let id = NodeId(self.nodes.len());
        match &mut self.node_mut(parent)?.content {
            NodeContent::Group { children, .. } => children.push(id),
            NodeContent::Shape(_) => return Err(SceneError::NotAGroup(parent.0)),
        }
        self.nodes.push(Some(Node {
            parent: Some(parent),
            content,
            events: EventDispatcher::new(),
        }));
        Ok(id)
    }

    pub fn add_group(&mut self, parent: NodeId) -> Result<NodeId, SceneError> {
        self.push(
            parent,
            NodeContent::Group {
                matrix: DAffine2::IDENTITY,
                children: Vec::new(),
            },
        )
    }

    pub fn add_shape(&mut self, parent: NodeId, mut shape: Shape) -> Result<NodeId, SceneError> {
        let inherited = self.total_matrix(parent)?;
        shape.set_inherited_transform(inherited);
        if let Some(ctx) = &self.context {
            shape.set_context(ctx.clone());
        }
        let id = self.push(parent, NodeContent::Shape(shape))?;
        debug!(%id, %parent, "added shape");
        Ok(id)
    }

    /// Detach a node and drop its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self.node(id)?.parent.ok_or(SceneError::RootNode)?;
        if let NodeContent::Group { children, .. } = &mut self.node_mut(parent)?.content {
            children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                if let NodeContent::Group { children, .. } = node.content {
                    stack.extend(children);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// The node's own matrix.
    pub fn matrix(&self, id: NodeId) -> Result<DAffine2, SceneError> {
        Ok(match &self.node(id)?.content {
            NodeContent::Group { matrix, .. } => *matrix,
            NodeContent::Shape(s) => s.matrix(),
        })
    }

    /// Replace a node's matrix and refresh every shape below it.
    pub fn set_matrix(&mut self, id: NodeId, m: DAffine2) -> Result<(), SceneError> {
        let inherited = match self.node(id)?.parent {
            Some(parent) => self.total_matrix(parent)?,
            None => DAffine2::IDENTITY,
        };
        match &mut self.node_mut(id)?.content {
            NodeContent::Shape(s) => {
                s.set_matrix(m);
                return Ok(());
            }
            NodeContent::Group { matrix, .. } => *matrix = m,
        }
        self.propagate(id, inherited);
        Ok(())
    }

    pub fn translate(&mut self, id: NodeId, dx: f64, dy: f64) -> Result<(), SceneError> {
        let m = DAffine2::from_translation(dvec2(dx, dy)) * self.matrix(id)?;
        self.set_matrix(id, m)
    }

    /// Push `inherited * own` down to the descendants of `id`.
    fn propagate(&mut self, id: NodeId, inherited: DAffine2) {
        let mut stack = vec![(id, inherited)];
        while let Some((next, inherited)) = stack.pop() {
            let Ok(node) = self.node_mut(next) else {
                continue;
            };
            match &mut node.content {
                NodeContent::Shape(s) => s.set_inherited_transform(inherited),
                NodeContent::Group { matrix, children } => {
                    let total = inherited * *matrix;
                    stack.extend(children.iter().map(|c| (*c, total)));
                }
            }
        }
    }

    /// Local to world transform of a node.
    pub fn total_matrix(&self, id: NodeId) -> Result<DAffine2, SceneError> {
        let mut total = DAffine2::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            let own = match &node.content {
                NodeContent::Group { matrix, .. } => *matrix,
                NodeContent::Shape(s) => s.matrix(),
            };
            total = own * total;
            cursor = node.parent;
        }
        Ok(total)
    }

    // ------------------------------------------------------------------
    // Hit-testing and drawing
    // ------------------------------------------------------------------

    pub fn is_hit(&self, id: NodeId, x: f64, y: f64) -> Result<bool, SceneError> {
        Ok(self.shape(id)?.is_hit(x, y))
    }

    /// Top-most shape under the world point, in reverse drawing order.
    pub fn pick(&self, x: f64, y: f64) -> Option<NodeId> {
        self.pick_in(self.root(), x, y)
    }

    fn pick_in(&self, id: NodeId, x: f64, y: f64) -> Option<NodeId> {
        match &self.node(id).ok()?.content {
            NodeContent::Shape(s) => s.is_hit(x, y).then_some(id),
            NodeContent::Group { children, .. } => children
                .iter()
                .rev()
                .find_map(|c| self.pick_in(*c, x, y)),
        }
    }

    /// Draw every shape in depth-first order.
    pub fn render(&self, ctx: &mut dyn RenderContext) {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Ok(node) = self.node(id) else {
                continue;
            };
            match &node.content {
                NodeContent::Shape(s) => s.render(ctx),
                NodeContent::Group { children, .. } => stack.extend(children.iter().rev()),
            }
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn on(
        &mut self,
        id: NodeId,
        kind: impl Into<String>,
        listener: impl FnMut(&mut Event) + 'static,
    ) -> Result<ListenerId, SceneError> {
        Ok(self.node_mut(id)?.events.on(kind, listener))
    }

    pub fn off(
        &mut self,
        id: NodeId,
        kind: &str,
        listener: ListenerId,
    ) -> Result<bool, SceneError> {
        Ok(self.node_mut(id)?.events.off(kind, listener))
    }

    pub fn events(&self, id: NodeId) -> Result<&EventDispatcher, SceneError> {
        Ok(&self.node(id)?.events)
    }

    pub fn events_mut(&mut self, id: NodeId) -> Result<&mut EventDispatcher, SceneError> {
        Ok(&mut self.node_mut(id)?.events)
    }

    /// Deliver `event` to `id`, then to its ancestors while it bubbles.
    ///
    /// Returns the event as the last listener left it.
    pub fn trigger(&mut self, id: NodeId, mut event: Event) -> Result<Event, SceneError> {
        self.node(id)?;
        event.set_target(id);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node_mut(current)?;
            event.set_current_target(current);
            node.events.dispatch(&mut event);
            if !event.bubbles || event.propagation_stopped() {
                break;
            }
            cursor = node.parent;
        }
        Ok(event)
    }

    /// Trigger a fresh bubbling event of `kind`.
    pub fn fire(&mut self, id: NodeId, kind: &str) -> Result<Event, SceneError> {
        self.trigger(id, Event::new(kind))
    }

    /// Pick the shape under a pointer and fire `kind` on it.
    pub fn fire_at(&mut self, kind: &str, x: f64, y: f64) -> Option<Event> {
        let id = self.pick(x, y)?;
        self.trigger(id, Event::new(kind).at(dvec2(x, y))).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingContext;
    use crate::shape::AttrUpdate;

    fn line(d: &str) -> Shape {
        let mut s = Shape::path(d);
        s.apply(AttrUpdate::new().stroke("black").line_width(2.0)).unwrap();
        s
    }

    #[test]
    fn group_translation_moves_hits() {
        let mut scene = Scene::new();
        let g = scene.add_group(scene.root()).unwrap();
        let s = scene.add_shape(g, line("M0 0 L10 0")).unwrap();
        assert!(scene.is_hit(s, 5.0, 0.0).unwrap());

        scene.translate(g, 0.0, 100.0).unwrap();
        assert!(!scene.is_hit(s, 5.0, 0.0).unwrap());
        assert!(scene.is_hit(s, 5.0, 100.0).unwrap());
    }

    #[test]
    fn shapes_added_later_inherit_group_transform() {
        let mut scene = Scene::new();
        let g = scene.add_group(scene.root()).unwrap();
        scene.translate(g, 50.0, 0.0).unwrap();
        let s = scene.add_shape(g, line("M0 0 L10 0")).unwrap();
        assert!(scene.is_hit(s, 55.0, 0.0).unwrap());
        assert_eq!(
            scene.total_matrix(s).unwrap(),
            DAffine2::from_translation(dvec2(50.0, 0.0))
        );
    }

    #[test]
    fn nested_groups_compose() {
        let mut scene = Scene::new();
        let outer = scene.add_group(scene.root()).unwrap();
        let inner = scene.add_group(outer).unwrap();
        let s = scene.add_shape(inner, line("M0 0 L10 0")).unwrap();
        scene.translate(inner, 10.0, 0.0).unwrap();
        scene.set_matrix(outer, DAffine2::from_scale(dvec2(2.0, 2.0))).unwrap();
        // local (5, 0) -> inner (15, 0) -> outer (30, 0)
        assert!(scene.is_hit(s, 30.0, 0.0).unwrap());
        assert_eq!(scene.shape(s).unwrap().total_matrix(), scene.total_matrix(s).unwrap());
    }

    #[test]
    fn pick_prefers_topmost() {
        let mut scene = Scene::new();
        let root = scene.root();
        let below = scene.add_shape(root, line("M0 0 L10 0")).unwrap();
        let above = scene.add_shape(root, line("M5 -5 L5 5")).unwrap();
        assert_eq!(scene.pick(5.0, 0.0), Some(above));
        assert_eq!(scene.pick(1.0, 0.0), Some(below));
        assert_eq!(scene.pick(50.0, 50.0), None);
    }

    #[test]
    fn shapes_cannot_have_children() {
        let mut scene = Scene::new();
        let s = scene.add_shape(scene.root(), line("M0 0 L1 1")).unwrap();
        assert_eq!(scene.add_group(s), Err(SceneError::NotAGroup(s.index())));
        assert_eq!(scene.is_hit(scene.root(), 0.0, 0.0), Err(SceneError::NotAShape(0)));
    }

    #[test]
    fn remove_drops_subtree() {
        let mut scene = Scene::new();
        let g = scene.add_group(scene.root()).unwrap();
        let s = scene.add_shape(g, line("M0 0 L10 0")).unwrap();
        scene.remove(g).unwrap();
        assert!(!scene.contains(g));
        assert!(!scene.contains(s));
        assert!(scene.children(scene.root()).unwrap().is_empty());
        assert_eq!(scene.pick(5.0, 0.0), None);
        assert_eq!(scene.remove(scene.root()), Err(SceneError::RootNode));
    }

    #[test]
    fn render_in_drawing_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.add_group(root).unwrap();
        scene.add_shape(g, line("M0 0 L1 0")).unwrap();
        scene.add_shape(root, line("M2 0 L3 0")).unwrap();
        let mut ctx = RecordingContext::new();
        scene.render(&mut ctx);
        let moves: Vec<String> = ctx
            .ops()
            .iter()
            .filter(|op| matches!(op, crate::render::DrawOp::MoveTo(_)))
            .map(ToString::to_string)
            .collect();
        assert_eq!(moves, vec!["M 0,0", "M 2,0"]);
    }

    #[test]
    fn events_bubble_until_stopped() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.add_group(root).unwrap();
        let s = scene.add_shape(g, line("M0 0 L10 0")).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        for id in [s, g, root] {
            let seen = seen.clone();
            scene
                .on(id, "click", move |e| {
                    seen.borrow_mut().push((e.target(), e.current_target()));
                })
                .unwrap();
        }

        scene.fire(s, "click").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![(Some(s), Some(s)), (Some(s), Some(g)), (Some(s), Some(root))]
        );

        seen.borrow_mut().clear();
        scene.on(g, "click", |e| e.stop_propagation()).unwrap();
        scene.fire(s, "click").unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn non_bubbling_event_stays_on_target() {
        let mut scene = Scene::new();
        let s = scene.add_shape(scene.root(), line("M0 0 L10 0")).unwrap();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene.on(scene.root(), "focus", move |_| *c.borrow_mut() += 1).unwrap();
        let event = scene.trigger(s, Event::new("focus").non_bubbling()).unwrap();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(event.current_target(), Some(s));
    }

    #[test]
    fn fire_at_picks_target() {
        let mut scene = Scene::new();
        let s = scene.add_shape(scene.root(), line("M0 0 L10 0")).unwrap();
        let event = scene.fire_at("click", 5.0, 0.0).unwrap();
        assert_eq!(event.target(), Some(s));
        assert_eq!(event.point, Some(dvec2(5.0, 0.0)));
        assert!(scene.fire_at("click", 5.0, 40.0).is_none());
    }
}
