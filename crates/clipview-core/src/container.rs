use crate::{ClippedChildren, FocusGuide, NodeId, TreeError, ViewTree};

/// Per-node state: optional subview clipping plus focus-guide state.
#[derive(Clone, Debug, Default)]
pub struct Container {
    pub(crate) clipped: Option<ClippedChildren>,
    pub(crate) guide: FocusGuide,
}

impl Container {
    pub fn clipped(&self) -> Option<&ClippedChildren> {
        self.clipped.as_ref()
    }
    pub fn guide(&self) -> &FocusGuide {
        &self.guide
    }
}

impl ViewTree {
    /// Turns clipped-subview virtualization on or off.
    pub fn set_clipping_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), TreeError> {
        if enabled {
            self.enable_virtualization(id)
        } else {
            self.disable_virtualization(id)
        }
    }

    /// Inserts `child` at logical `index` of `parent`. Under clipping the
    /// child is attached only if it intersects the clipping rect.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.node(parent)?;
        let node = self.node(child)?;
        if child == self.root {
            return Err(TreeError::RootNode);
        }
        if node.parent.is_some() || node.owner.is_some() {
            return Err(TreeError::AlreadyParented(child));
        }
        if self.is_logical_ancestor(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }

        if self.is_clipping(parent) {
            return self.insert_clipped(parent, child, index);
        }

        let count = self.nodes[parent].children.len();
        if index > count {
            return Err(TreeError::IndexOutOfRange { index, count });
        }
        self.attach_physical(parent, child, index);
        self.nodes[child].owner = Some(parent);
        if self.is_attached_to_window(child) {
            self.update_clipping_rect(child);
        }
        Ok(())
    }

    /// `ancestor` is `id` or owns it through the logical parent chain, which
    /// also covers children a clipping container keeps detached.
    fn is_logical_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes.get(n).and_then(|node| node.owner);
        }
        false
    }

    /// Appends `child` after the last logical child.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.logical_children(parent).len();
        self.insert_child(parent, child, index)
    }

    /// Removes `child` from `parent`. A focused child hands focus to the
    /// nearest focus guide before it goes.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        self.node(child)?;

        if self.is_clipping(parent) {
            return self.remove_clipped(parent, child);
        }

        let index = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild { parent, child })?;
        self.recover_focus(child);
        self.detach_physical(parent, index);
        self.nodes[child].owner = None;
        Ok(())
    }

    /// Removes every child in one pass.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        if self.is_clipping(parent) {
            return self.remove_all_clipped(parent);
        }

        let children = self.nodes[parent].children.clone();
        if let Some(&focused_child) = children.iter().find(|&&c| self.has_focus(c)) {
            self.recover_focus(focused_child);
        }
        self.detach_all_physical(parent);
        for child in children {
            self.nodes[child].owner = None;
        }
        Ok(())
    }
}
