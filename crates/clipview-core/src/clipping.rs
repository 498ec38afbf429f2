//! Clipping rectangle derivation.
//!
//! A node's clipping rect lives in its own coordinate space (scroll offset
//! included). Under a clipping parent it is the part of the parent's clip the
//! node covers; otherwise it is the node's own drawing rect. A detached node
//! clips everything.

use crate::{NodeId, Rect, ViewTree};

impl ViewTree {
    pub(crate) fn calculate_clipping_rect(&self, id: NodeId) -> Rect {
        let node = &self.nodes[id];
        let drawing = Rect::new(node.scroll.x, node.scroll.y, node.bounds.w, node.bounds.h);
        if id == self.root {
            return drawing;
        }
        let Some(parent) = node.parent else {
            return Rect::default();
        };

        match self.containers[parent].clipped.as_ref() {
            Some(parent_clip) => match parent_clip.clip.intersection(&node.bounds) {
                // parent space -> own space
                Some(visible) => visible.offset(
                    node.scroll.x - node.bounds.x,
                    node.scroll.y - node.bounds.y,
                ),
                None => Rect::default(),
            },
            None => drawing,
        }
    }
}
