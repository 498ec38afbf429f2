//! Clipped-subview virtualization.
//!
//! A clipping container keeps two index-correlated lists: the logical list
//! ([`ClippedChildren::children`], every child in intended order) and the
//! node's physical `children` (only those intersecting the clipping rect).
//! The physical list is always a subsequence of the logical one, so
//!
//! ```text
//! physical index = logical index - detached children before it
//! ```
//!
//! Bulk re-evaluation walks the logical list once and carries the number of
//! detached children seen so far, which keeps every attach/detach index
//! correct without rescanning.

use crate::{NodeFlags, NodeId, Rect, TreeError, ViewTree};

#[derive(Clone, Debug, Default)]
pub struct ClippedChildren {
    pub(crate) children: Vec<NodeId>,
    pub(crate) clip: Rect,
}

impl ClippedChildren {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    pub fn len(&self) -> usize {
        self.children.len()
    }
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
    pub fn clipping_rect(&self) -> Rect {
        self.clip
    }
}

impl ViewTree {
    pub fn is_clipping(&self, id: NodeId) -> bool {
        self.containers
            .get(id)
            .is_some_and(|c| c.clipped.is_some())
    }

    fn clipped(&self, id: NodeId) -> Result<&ClippedChildren, TreeError> {
        self.container(id)?
            .clipped
            .as_ref()
            .ok_or(TreeError::ClippingDisabled(id))
    }

    fn is_attached_to(&self, container: NodeId, child: NodeId) -> bool {
        self.nodes[child].parent == Some(container)
    }

    /// Detached children at logical indices `< index`.
    fn clipped_before(&self, container: NodeId, index: usize) -> usize {
        self.containers[container]
            .clipped
            .as_ref()
            .map(|c| {
                c.children[..index]
                    .iter()
                    .filter(|&&child| !self.is_attached_to(container, child))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Snapshots the physical children into the logical list and clips them.
    /// Enabling twice is a no-op.
    pub fn enable_virtualization(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node(id)?;
        if self.is_clipping(id) {
            return Ok(());
        }
        let children = self.nodes[id].children.clone();
        log::debug!("enable clipping on {id:?} ({} children)", children.len());
        self.containers[id].clipped = Some(ClippedChildren {
            children,
            clip: Rect::default(),
        });
        self.update_clipping_rect(id);
        Ok(())
    }

    /// Re-attaches every clipped child at its logical position and drops the
    /// logical list. The physical list ends up equal to the logical one, and
    /// nested clipping children re-clip against their now unclipped bounds.
    pub fn disable_virtualization(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node(id)?;
        let Some(clipped) = self.containers[id].clipped.take() else {
            return Ok(());
        };
        log::debug!("disable clipping on {id:?}");

        for (index, child) in clipped.children.into_iter().enumerate() {
            if !self.is_attached_to(id, child) {
                self.attach_physical(id, child, index);
            }
            self.update_clipping_rect(child);
        }
        Ok(())
    }

    /// Recomputes the clipping rect and re-evaluates every logical child.
    pub(crate) fn update_clipping_rect(&mut self, id: NodeId) {
        if !self.is_clipping(id) {
            return;
        }
        let clip = self.calculate_clipping_rect(id);
        if let Some(clipped) = self.containers[id].clipped.as_mut() {
            clipped.clip = clip;
        }
        log::trace!("{id:?} clipping rect {clip:?}");
        self.update_clipping_to_rect(id, clip);
    }

    fn update_clipping_to_rect(&mut self, id: NodeId, clip: Rect) {
        let count = self.clipped(id).map(|c| c.len()).unwrap_or(0);
        let mut clipped_so_far = 0;
        for index in 0..count {
            let child = self.containers[id]
                .clipped
                .as_ref()
                .and_then(|c| c.children.get(index).copied());
            let Some(child) = child else { return };
            self.update_subview_clip_status_at(id, clip, index, clipped_so_far);
            if !self.is_attached_to(id, child) {
                clipped_so_far += 1;
            }
        }
    }

    /// Attaches or detaches the logical child at `index`, given the number of
    /// detached children before it. Nested clipping containers re-clip when
    /// their attachment changes or they stay visible.
    fn update_subview_clip_status_at(
        &mut self,
        id: NodeId,
        clip: Rect,
        index: usize,
        clipped_so_far: usize,
    ) {
        let Some(child) = self.containers[id]
            .clipped
            .as_ref()
            .and_then(|c| c.children.get(index).copied())
        else {
            return;
        };
        let node = &self.nodes[child];
        let intersects = clip.intersects(&node.bounds);
        let attached = node.parent == Some(id);
        let animating = node.flags.contains(NodeFlags::ANIMATING);

        let mut recurse = false;
        if !intersects && attached && !animating {
            self.detach_clipped(id, child, index - clipped_so_far);
            recurse = true;
        } else if intersects && !attached {
            self.attach_physical(id, child, index - clipped_so_far);
            recurse = true;
        } else if intersects {
            recurse = true;
        }

        if recurse && self.is_clipping(child) {
            self.update_clipping_rect(child);
        }
    }

    fn detach_clipped(&mut self, id: NodeId, child: NodeId, physical_index: usize) {
        if self.has_focus(child) {
            self.recover_focus(child);
        }
        self.detach_physical(id, physical_index);
    }

    /// Single-child re-evaluation after `child`'s layout changed.
    pub(crate) fn update_subview_clip_status(&mut self, id: NodeId, child: NodeId) {
        if !self.is_clipping(id) || !self.is_attached_to_window(id) {
            return;
        }
        let Some(clip) = self.containers[id].clipped.as_ref().map(|c| c.clip) else {
            return;
        };
        let intersects = clip.intersects(&self.nodes[child].bounds);
        let attached = self.is_attached_to(id, child);

        if intersects != attached {
            let Some(index) = self.logical_index_of(id, child) else {
                return;
            };
            let clipped_so_far = self.clipped_before(id, index);
            self.update_subview_clip_status_at(id, clip, index, clipped_so_far);
        } else if intersects && self.is_clipping(child) {
            // still visible but moved or resized: its own clip shifted
            self.update_clipping_rect(child);
        }
    }

    fn logical_index_of(&self, id: NodeId, child: NodeId) -> Option<usize> {
        self.containers[id]
            .clipped
            .as_ref()?
            .children
            .iter()
            .position(|&c| c == child)
    }

    pub(crate) fn insert_clipped(
        &mut self,
        id: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        let clipped = self.containers[id]
            .clipped
            .as_mut()
            .ok_or(TreeError::ClippingDisabled(id))?;
        let count = clipped.children.len();
        if index > count {
            return Err(TreeError::IndexOutOfRange { index, count });
        }
        clipped.children.insert(index, child);
        let clip = clipped.clip;
        self.nodes[child].owner = Some(id);

        // inserted as clipped, then attached only if it is visible
        let clipped_so_far = self.clipped_before(id, index);
        self.update_subview_clip_status_at(id, clip, index, clipped_so_far);

        if self.nodes[child].flags.contains(NodeFlags::CLIPPING_PROHIBITED) {
            self.post(move |tree| tree.check_clipping_prohibited(id, child));
        }
        Ok(())
    }

    fn check_clipping_prohibited(&self, parent: NodeId, child: NodeId) {
        if self.contains(child) && !self.is_shown(child) {
            log::warn!(
                "child {child:?} was added to {parent:?} where it is clipped and not visible; \
                 this is not allowed for clipping-prohibited views"
            );
        }
    }

    pub(crate) fn remove_clipped(&mut self, id: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self
            .logical_index_of(id, child)
            .ok_or(TreeError::NotAChild { parent: id, child })?;
        if self.is_attached_to(id, child) {
            let clipped_so_far = self.clipped_before(id, index);
            self.detach_clipped(id, child, index - clipped_so_far);
        }
        if let Some(clipped) = self.containers[id].clipped.as_mut() {
            clipped.children.remove(index);
        }
        self.nodes[child].owner = None;
        Ok(())
    }

    pub(crate) fn remove_all_clipped(&mut self, id: NodeId) -> Result<(), TreeError> {
        let children = std::mem::take(
            &mut self.containers[id]
                .clipped
                .as_mut()
                .ok_or(TreeError::ClippingDisabled(id))?
                .children,
        );
        if let Some(&focused_child) = children.iter().find(|&&c| self.has_focus(c)) {
            self.recover_focus(focused_child);
        }
        self.detach_all_physical(id);
        for child in children {
            self.nodes[child].owner = None;
        }
        Ok(())
    }

    // ---- clipping accessors ------------------------------------------------

    pub fn logical_child_count(&self, id: NodeId) -> Result<usize, TreeError> {
        Ok(self.clipped(id)?.len())
    }

    pub fn logical_child_at(&self, id: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let clipped = self.clipped(id)?;
        clipped
            .children
            .get(index)
            .copied()
            .ok_or(TreeError::IndexOutOfRange {
                index,
                count: clipped.len(),
            })
    }

    pub fn clipping_rect(&self, id: NodeId) -> Result<Rect, TreeError> {
        Ok(self.clipped(id)?.clip)
    }
}
