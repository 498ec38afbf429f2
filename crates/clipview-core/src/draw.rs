use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::panic_message;
use crate::{ErrorHandler, ErrorInfo, NodeId, Rect, Vec2, ViewTree};

/// Rendering-pipeline callback; receives each attached node with its bounds
/// in window coordinates, parents before children.
pub trait Painter {
    fn paint(&mut self, node: NodeId, rect: Rect);
}

impl ViewTree {
    /// Draws the attached tree. A panic while drawing one child subtree is
    /// reported to `errors` and its siblings still draw.
    pub fn draw(&self, painter: &mut dyn Painter, errors: &mut dyn ErrorHandler) {
        let root = &self.nodes[self.root];
        painter.paint(self.root, root.bounds);
        self.dispatch_draw(self.root, root.bounds, painter, errors);
    }

    fn dispatch_draw(
        &self,
        id: NodeId,
        rect: Rect,
        painter: &mut dyn Painter,
        errors: &mut dyn ErrorHandler,
    ) {
        let node = &self.nodes[id];
        let origin = Vec2 {
            x: rect.x - node.scroll.x,
            y: rect.y - node.scroll.y,
        };
        for &child in &node.children {
            let child_rect = self.nodes[child].bounds.offset(origin.x, origin.y);
            let result = catch_unwind(AssertUnwindSafe(|| {
                painter.paint(child, child_rect);
                self.dispatch_draw(child, child_rect, &mut *painter, &mut *errors);
            }));
            if let Err(err) = result {
                let info = ErrorInfo {
                    message: panic_message(&*err),
                    component: self.describe(child),
                };
                log::error!("draw of {} under {id:?} failed: {}", info.component, info.message);
                errors.handle_exception(info);
            }
        }
    }

    /// Human-readable node label for diagnostics.
    pub fn describe(&self, id: NodeId) -> String {
        if let Some(name) = self.debug_name_of(id) {
            return name;
        }
        match self.nodes.get(id).and_then(|n| n.tag) {
            Some(tag) => format!("#{tag}"),
            None => format!("{id:?}"),
        }
    }

    #[cfg(feature = "inspector")]
    fn debug_name_of(&self, id: NodeId) -> Option<String> {
        self.nodes.get(id)?.debug_name.clone()
    }

    #[cfg(not(feature = "inspector"))]
    fn debug_name_of(&self, _id: NodeId) -> Option<String> {
        None
    }
}
