use bitflags::bitflags;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::container::Container;
use crate::scheduler::Scheduler;
use crate::{Rect, TreeError, Vec2};

new_key_type! {
    /// Generation-checked node handle. A handle to a destroyed node never
    /// aliases a node created later, so it doubles as a weak reference.
    pub struct NodeId;
}

/// Host-assigned tag used to address nodes from props (focus destinations).
pub type ViewTag = u64;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const FOCUSABLE = 1 << 0;
        /// Set by the host while a transform/layout animation runs.
        const ANIMATING = 1 << 1;
        /// The node must never end up hidden by an enclosing clipping container.
        const CLIPPING_PROHIBITED = 1 << 2;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) tag: Option<ViewTag>,
    /// Physical parent; `None` while detached.
    pub(crate) parent: Option<NodeId>,
    /// Logical parent; stays set while a clipping container keeps the node detached.
    pub(crate) owner: Option<NodeId>,
    /// Physical (attached) children in draw order.
    pub(crate) children: Vec<NodeId>,
    pub(crate) bounds: Rect,
    pub(crate) scroll: Vec2,
    pub(crate) flags: NodeFlags,
    #[cfg(feature = "inspector")]
    pub(crate) debug_name: Option<String>,
}

impl Node {
    pub fn tag(&self) -> Option<ViewTag> {
        self.tag
    }
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
    pub fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }
    pub fn is_focusable(&self) -> bool {
        self.flags.contains(NodeFlags::FOCUSABLE)
    }
    pub fn is_animating(&self) -> bool {
        self.flags.contains(NodeFlags::ANIMATING)
    }
    #[cfg(feature = "inspector")]
    pub fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

/// Structural and focus changes, drained by the rendering pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Attached {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    Detached {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    FocusChanged {
        from: Option<NodeId>,
        to: Option<NodeId>,
    },
}

/// Node arena plus the per-node container state. Single-threaded; every
/// method must run on the thread that owns the tree.
pub struct ViewTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) containers: SecondaryMap<NodeId, Container>,
    pub(crate) root: NodeId,
    pub(crate) focused: Option<NodeId>,
    /// Guides whose `request_focus` is on the stack; breaks destination cycles.
    pub(crate) focus_requests: Vec<NodeId>,
    pub(crate) events: Vec<TreeEvent>,
    pub(crate) scheduler: Scheduler,
}

impl ViewTree {
    /// Creates a tree whose root (the window content) has `window` bounds.
    pub fn new(window: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            bounds: window,
            ..Node::default()
        });
        let mut containers = SecondaryMap::new();
        containers.insert(root, Container::default());
        Self {
            nodes,
            containers,
            root,
            focused: None,
            focus_requests: Vec::new(),
            events: Vec::new(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached node; insert it with [`ViewTree::insert_child`].
    pub fn create_node(&mut self, bounds: Rect) -> NodeId {
        let id = self.nodes.insert(Node {
            bounds,
            ..Node::default()
        });
        self.containers.insert(id, Container::default());
        id
    }

    /// Removes `id` from its container and frees its whole logical subtree.
    /// Deferred work that targets a freed node turns into a no-op.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootNode);
        }
        let owner = self.node(id)?.owner;
        if let Some(owner) = owner {
            self.remove_child(owner, id)?;
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            stack.extend(self.logical_children(next));
            if self.focused == Some(next) {
                self.set_focused(None);
            }
            self.nodes.remove(next);
            self.containers.remove(next);
        }
        log::debug!("destroyed {id:?}");
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id).ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id).ok_or(TreeError::UnknownNode(id))
    }

    pub fn container(&self, id: NodeId) -> Result<&Container, TreeError> {
        self.containers.get(id).ok_or(TreeError::UnknownNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Physically attached children.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.node(id)?.children)
    }

    /// Logical children: the clipping container's full list, or the physical
    /// list when clipping is off.
    pub fn logical_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.containers.get(id).and_then(|c| c.clipped.as_ref()) {
            Some(clipped) => clipped.children.clone(),
            None => self
                .nodes
                .get(id)
                .map(|n| n.children.clone())
                .unwrap_or_default(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- properties ------------------------------------------------------

    pub fn set_tag(&mut self, id: NodeId, tag: Option<ViewTag>) -> Result<(), TreeError> {
        self.node_mut(id)?.tag = tag;
        Ok(())
    }

    #[cfg(feature = "inspector")]
    pub fn set_debug_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        self.node_mut(id)?.debug_name = Some(name.into());
        Ok(())
    }

    /// Making the focused node unfocusable drops focus, as platform views do.
    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.flags.set(NodeFlags::FOCUSABLE, focusable);
        if !focusable && self.focused == Some(id) {
            self.set_focused(None);
        }
        Ok(())
    }

    pub fn set_clipping_prohibited(&mut self, id: NodeId, prohibited: bool) -> Result<(), TreeError> {
        self.node_mut(id)?
            .flags
            .set(NodeFlags::CLIPPING_PROHIBITED, prohibited);
        Ok(())
    }

    /// Animating children are never clipped away. When the animation ends the
    /// child is re-evaluated against its container's clipping rect.
    pub fn set_animating(&mut self, id: NodeId, animating: bool) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.flags.set(NodeFlags::ANIMATING, animating);
        let owner = node.owner;
        if !animating {
            if let Some(owner) = owner {
                self.update_subview_clip_status(owner, id);
            }
        }
        Ok(())
    }

    // ---- layout notifications -------------------------------------------

    /// Layout-change notification for one node. The owning clipping container
    /// re-checks the child; a clipping node whose size changed re-clips.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        let old = node.bounds;
        if old == bounds {
            return Ok(());
        }
        node.bounds = bounds;
        let owner = node.owner;

        let owner_clips = owner.is_some_and(|o| self.is_clipping(o));
        if let (Some(owner), true) = (owner, owner_clips) {
            self.update_subview_clip_status(owner, id);
        } else if old.size() != bounds.size() || id == self.root {
            self.update_clipping_rect(id);
        }
        Ok(())
    }

    /// Scrolling shifts the visible region, so the node re-clips its children.
    pub fn set_scroll_offset(&mut self, id: NodeId, offset: Vec2) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.scroll == offset {
            return Ok(());
        }
        node.scroll = offset;
        self.update_clipping_rect(id);
        Ok(())
    }

    pub fn notify_attached_to_window(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node(id)?;
        self.update_clipping_rect(id);
        Ok(())
    }

    // ---- queries ----------------------------------------------------------

    pub fn is_attached_to_window(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root {
                return true;
            }
            cur = self.nodes.get(n).and_then(|node| node.parent);
        }
        false
    }

    /// Attached and every ancestor attached; the tree has no visibility flag.
    pub fn is_shown(&self, id: NodeId) -> bool {
        self.is_attached_to_window(id)
    }

    /// True if `ancestor` is a strict physical ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes.get(n).and_then(|node| node.parent);
        }
        false
    }

    /// Topmost physical ancestor (the root when attached).
    pub fn top_of(&self, id: NodeId) -> NodeId {
        let mut top = id;
        while let Some(parent) = self.nodes.get(top).and_then(|n| n.parent) {
            top = parent;
        }
        top
    }

    /// Depth-first search of the physical subtree at `from` (inclusive).
    pub fn find_by_tag(&self, from: NodeId, tag: ViewTag) -> Option<NodeId> {
        let node = self.nodes.get(from)?;
        if node.tag == Some(tag) {
            return Some(from);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_by_tag(child, tag))
    }

    /// Bounds in window coordinates, accounting for ancestor scroll offsets.
    pub fn absolute_bounds(&self, id: NodeId) -> Option<Rect> {
        let mut rect = self.nodes.get(id)?.bounds;
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            let parent = &self.nodes[p];
            rect = rect.offset(
                parent.bounds.x - parent.scroll.x,
                parent.bounds.y - parent.scroll.y,
            );
            cur = parent.parent;
        }
        Some(rect)
    }

    // ---- physical primitives ---------------------------------------------

    pub(crate) fn attach_physical(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        log::debug!("attach {child:?} to {parent:?} at {index}");
        self.events.push(TreeEvent::Attached {
            parent,
            child,
            index,
        });
    }

    /// Detaches the child at physical `index`. Focus inside the detached
    /// subtree is dropped; callers run focus recovery first.
    pub(crate) fn detach_physical(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.nodes[parent].children.remove(index);
        let lost_focus = self
            .focused
            .is_some_and(|f| f == child || self.is_ancestor(child, f));
        self.nodes[child].parent = None;
        if lost_focus {
            self.set_focused(None);
        }
        log::debug!("detach {child:?} from {parent:?} at {index}");
        self.events.push(TreeEvent::Detached {
            parent,
            child,
            index,
        });
        child
    }

    pub(crate) fn detach_all_physical(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent].children);
        for (index, &child) in children.iter().enumerate().rev() {
            if self
                .focused
                .is_some_and(|f| f == child || self.is_ancestor(child, f))
            {
                self.set_focused(None);
            }
            self.nodes[child].parent = None;
            self.events.push(TreeEvent::Detached {
                parent,
                child,
                index,
            });
        }
        log::debug!("detached all {} children of {parent:?}", children.len());
    }
}

impl std::fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewTree")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("focused", &self.focused)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
