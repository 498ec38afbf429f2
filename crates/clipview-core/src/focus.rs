//! # Focus guides
//!
//! A focus guide is a container that intercepts directional (remote/keyboard)
//! focus traversal instead of exposing its descendants directly. A node is a
//! guide when it has at least one destination or auto-focus enabled.
//!
//! - While nothing inside it is focused, a guide reports *itself* as its only
//!   focusable, so traversal lands on the guide and [`ViewTree::request_focus`]
//!   decides where focus actually goes.
//! - Once a descendant holds focus the guide is transparent and traversal
//!   moves between the real descendants.
//!
//! `request_focus` on a guide tries, in order:
//!
//! 1. the last focused descendant (auto-focus), re-validated on every read,
//! 2. the first focusable descendant (auto-focus),
//! 3. the configured destinations, resolved in the guide's subtree first and
//!    then in the whole tree, walking up to the nearest ancestor that accepts
//!    focus,
//! 4. each physical child in order.
//!
//! ## Recovery
//!
//! When a focused node is about to be detached, its nearest guide catches
//! focus: it is made focusable for a moment and focused directly, so focus
//! never jumps to an unrelated default target. After the structural change and
//! the layout pass settle, a deferred task moves focus to the guide's first
//! focusable descendant and restores the guide's focusable flag. If the guide
//! is destroyed first the task does nothing.

use smallvec::SmallVec;

use crate::{NodeFlags, NodeId, TreeError, TreeEvent, ViewTag, ViewTree};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusGuideConfig {
    pub destinations: SmallVec<[ViewTag; 4]>,
    pub auto_focus: bool,
}

impl FocusGuideConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn destination(mut self, tag: ViewTag) -> Self {
        self.destinations.push(tag);
        self
    }
    pub fn destinations(mut self, tags: impl IntoIterator<Item = ViewTag>) -> Self {
        self.destinations = tags.into_iter().collect();
        self
    }
    pub fn auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusDirection {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Recovery {
    was_focusable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FocusGuide {
    config: FocusGuideConfig,
    /// Weak: validated (exists and attached) before every use.
    last_focused: Option<NodeId>,
    recovery: Option<Recovery>,
}

impl FocusGuide {
    pub fn is_focus_guide(&self) -> bool {
        !self.config.destinations.is_empty() || self.config.auto_focus
    }

    pub fn is_recovering(&self) -> bool {
        self.recovery.is_some()
    }

    pub fn config(&self) -> &FocusGuideConfig {
        &self.config
    }

    /// Raw reference; may point at a destroyed or detached node.
    pub fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    /// The remembered descendant survives reconfiguration unless the
    /// auto-focus flag itself flips, so updating destinations alone keeps it.
    fn configure(&mut self, config: FocusGuideConfig) {
        if config.auto_focus != self.config.auto_focus {
            self.last_focused = None;
        }
        self.config = config;
    }
}

impl ViewTree {
    pub fn configure_focus_guide(
        &mut self,
        id: NodeId,
        config: FocusGuideConfig,
    ) -> Result<(), TreeError> {
        self.node(id)?;
        log::debug!(
            "{id:?} focus guide: destinations={:?} auto_focus={}",
            config.destinations,
            config.auto_focus
        );
        self.containers[id].guide.configure(config);
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, id: NodeId) -> bool {
        self.focused == Some(id)
    }

    /// The node itself or one of its descendants holds focus.
    pub fn has_focus(&self, id: NodeId) -> bool {
        self.focused
            .is_some_and(|f| f == id || self.is_ancestor(id, f))
    }

    fn has_focused_descendant(&self, id: NodeId) -> bool {
        self.focused
            .is_some_and(|f| f != id && self.is_ancestor(id, f))
    }

    pub fn is_focus_guide(&self, id: NodeId) -> bool {
        self.containers
            .get(id)
            .is_some_and(|c| c.guide.is_focus_guide())
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_attached_to_window(id)
    }

    pub(crate) fn set_focused(&mut self, next: Option<NodeId>) {
        if self.focused == next {
            return;
        }
        let from = std::mem::replace(&mut self.focused, next);
        log::debug!("focus {from:?} -> {next:?}");
        self.events.push(TreeEvent::FocusChanged { from, to: next });
        if let Some(focused) = next {
            self.track_focus(focused);
        }
    }

    /// Every auto-focus ancestor remembers the newly focused descendant.
    fn track_focus(&mut self, focused: NodeId) {
        let mut cur = self.nodes[focused].parent;
        while let Some(p) = cur {
            let guide = &mut self.containers[p].guide;
            if guide.config.auto_focus {
                guide.last_focused = Some(focused);
            }
            cur = self.nodes[p].parent;
        }
    }

    /// Focus candidates under `id` in traversal order.
    pub fn add_focusables(&self, id: NodeId, direction: FocusDirection, out: &mut Vec<NodeId>) {
        let Some(container) = self.containers.get(id) else {
            return;
        };
        let guide = &container.guide;
        if guide.is_focus_guide() && !guide.is_recovering() && !self.has_focused_descendant(id) {
            out.push(id);
            return;
        }
        if self.nodes[id].flags.contains(NodeFlags::FOCUSABLE) {
            out.push(id);
        }
        self.add_descendant_focusables(id, direction, out);
    }

    fn add_descendant_focusables(
        &self,
        id: NodeId,
        direction: FocusDirection,
        out: &mut Vec<NodeId>,
    ) {
        for &child in &self.nodes[id].children {
            self.add_focusables(child, direction, out);
        }
    }

    /// Asks `id` to take focus. Unknown nodes are an error; "nothing could
    /// take focus" is `Ok(false)`.
    pub fn request_focus(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id)?;
        Ok(self.request_focus_node(id))
    }

    pub(crate) fn request_focus_node(&mut self, id: NodeId) -> bool {
        if !self.contains(id) || self.focus_requests.contains(&id) {
            return false;
        }
        self.focus_requests.push(id);
        let accepted = self.request_focus_policy(id);
        self.focus_requests.pop();
        accepted
    }

    fn request_focus_policy(&mut self, id: NodeId) -> bool {
        let guide = &self.containers[id].guide;
        if !guide.is_focus_guide() || guide.is_recovering() {
            return self.request_focus_default(id);
        }
        let config = guide.config.clone();

        if config.auto_focus {
            if let Some(last) = self.containers[id].guide.last_focused {
                if self.is_live(last) && self.is_ancestor(id, last) {
                    if self.request_focus_node(last) {
                        return true;
                    }
                } else {
                    log::debug!("{id:?} dropping stale last-focused {last:?}");
                    self.containers[id].guide.last_focused = None;
                }
            }
            if self.move_focus_to_first_focusable(id) {
                return true;
            }
        }

        if let Some(destination) = self.find_destination(id, &config.destinations) {
            if self.request_focus_view_or_ancestor(destination) {
                return true;
            }
        }

        let children = self.nodes[id].children.clone();
        children
            .into_iter()
            .any(|child| self.request_focus_node(child))
    }

    /// Platform default: a focusable attached node takes focus itself,
    /// otherwise its children are asked in order.
    fn request_focus_default(&mut self, id: NodeId) -> bool {
        if !self.is_attached_to_window(id) {
            return false;
        }
        if self.nodes[id].flags.contains(NodeFlags::FOCUSABLE) {
            self.set_focused(Some(id));
            return true;
        }
        let children = self.nodes[id].children.clone();
        children
            .into_iter()
            .any(|child| self.request_focus_node(child))
    }

    fn find_destination(&self, id: NodeId, destinations: &[ViewTag]) -> Option<NodeId> {
        let top = self.top_of(id);
        let found = destinations.iter().find_map(|&tag| {
            self.find_by_tag(id, tag)
                .or_else(|| self.find_by_tag(top, tag))
        });
        if found.is_none() && !destinations.is_empty() {
            log::debug!("{id:?} none of the focus destinations {destinations:?} is attached");
        }
        found
    }

    fn request_focus_view_or_ancestor(&mut self, destination: NodeId) -> bool {
        let mut cur = Some(destination);
        while let Some(v) = cur {
            if self.request_focus_node(v) {
                return true;
            }
            cur = self.nodes.get(v).and_then(|n| n.parent);
        }
        false
    }

    /// Focuses the first candidate below `guide` in traversal order. Nested
    /// guides count as candidates; they redirect on their own.
    pub(crate) fn move_focus_to_first_focusable(&mut self, guide: NodeId) -> bool {
        let mut focusables = Vec::new();
        self.add_descendant_focusables(guide, FocusDirection::Down, &mut focusables);
        let first = focusables.into_iter().find(|&n| {
            n != guide && (self.nodes[n].flags.contains(NodeFlags::FOCUSABLE) || self.is_focus_guide(n))
        });
        match first {
            Some(node) => self.request_focus_node(node),
            None => false,
        }
    }

    fn find_parent_focus_guide(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if self.is_focus_guide(p) {
                return Some(p);
            }
            cur = self.nodes[p].parent;
        }
        None
    }

    /// Catches focus on the nearest guide above `removed` before it is
    /// detached, and schedules the redirect into the guide's remaining
    /// descendants.
    pub(crate) fn recover_focus(&mut self, removed: NodeId) {
        if !self.has_focus(removed) {
            return;
        }
        let Some(guide) = self.find_parent_focus_guide(removed) else {
            return;
        };
        log::debug!("{guide:?} recovering focus from {removed:?}");

        if !self.containers[guide].guide.is_recovering() {
            let was_focusable = self.nodes[guide].flags.contains(NodeFlags::FOCUSABLE);
            self.containers[guide].guide.recovery = Some(Recovery { was_focusable });
            self.nodes[guide].flags.insert(NodeFlags::FOCUSABLE);
            self.post(move |tree| tree.finish_focus_recovery(guide));
        }
        self.request_focus_node(guide);
    }

    fn finish_focus_recovery(&mut self, guide: NodeId) {
        if !self.contains(guide) {
            log::debug!("focus recovery target {guide:?} is gone");
            return;
        }
        let redirected = self.move_focus_to_first_focusable(guide);
        if let Some(recovery) = self.containers[guide].guide.recovery.take() {
            self.nodes[guide]
                .flags
                .set(NodeFlags::FOCUSABLE, recovery.was_focusable);
            if !recovery.was_focusable && self.focused == Some(guide) {
                self.set_focused(None);
            }
        }
        log::debug!("{guide:?} focus recovery done, redirected={redirected}");
    }
}
