//! Host-side directional focus search, the traversal that focus guides plug
//! into. Candidates come from [`ViewTree::add_focusables`] on the root, so a
//! guide without a focused descendant shows up as a single candidate and
//! redirects once it is picked.

use crate::{FocusDirection, NodeId, Rect, ViewTree};

impl ViewTree {
    /// Next focus target from the current focus in `direction`, or the first
    /// candidate when nothing is focused.
    pub fn focus_search(&self, direction: FocusDirection) -> Option<NodeId> {
        let mut candidates = Vec::new();
        self.add_focusables(self.root, direction, &mut candidates);

        let Some(current) = self.focused else {
            return candidates.first().copied();
        };

        match direction {
            FocusDirection::Forward | FocusDirection::Backward => {
                let pos = candidates.iter().position(|&c| c == current)?;
                let next = if direction == FocusDirection::Forward {
                    pos + 1
                } else {
                    pos.checked_sub(1)?
                };
                candidates.get(next).copied()
            }
            _ => {
                let from = self.absolute_bounds(current)?;
                candidates
                    .into_iter()
                    .filter(|&c| c != current)
                    .filter_map(|c| self.absolute_bounds(c).map(|r| (c, r)))
                    .filter(|(_, r)| is_candidate(direction, &from, r))
                    .min_by(|(_, a), (_, b)| {
                        score(direction, &from, a).total_cmp(&score(direction, &from, b))
                    })
                    .map(|(c, _)| c)
            }
        }
    }

    /// Moves focus like a remote/d-pad press. Returns whether focus moved.
    pub fn move_focus(&mut self, direction: FocusDirection) -> bool {
        match self.focus_search(direction) {
            Some(next) => {
                log::debug!("move focus {direction:?} -> {next:?}");
                self.request_focus_node(next)
            }
            None => false,
        }
    }
}

fn is_candidate(direction: FocusDirection, from: &Rect, to: &Rect) -> bool {
    match direction {
        FocusDirection::Left => from.right() > to.right() && from.x > to.x,
        FocusDirection::Right => from.x < to.x && from.right() < to.right(),
        FocusDirection::Up => from.bottom() > to.bottom() && from.y > to.y,
        FocusDirection::Down => from.y < to.y && from.bottom() < to.bottom(),
        FocusDirection::Forward | FocusDirection::Backward => false,
    }
}

/// Lower is better. Candidates overlapping the source on the cross axis
/// (in its "beam") always beat those that don't.
fn score(direction: FocusDirection, from: &Rect, to: &Rect) -> f32 {
    let (major, minor, in_beam) = match direction {
        FocusDirection::Left => (
            from.x - to.right(),
            (from.center().y - to.center().y).abs(),
            to.y < from.bottom() && from.y < to.bottom(),
        ),
        FocusDirection::Right => (
            to.x - from.right(),
            (from.center().y - to.center().y).abs(),
            to.y < from.bottom() && from.y < to.bottom(),
        ),
        FocusDirection::Up => (
            from.y - to.bottom(),
            (from.center().x - to.center().x).abs(),
            to.x < from.right() && from.x < to.right(),
        ),
        FocusDirection::Down => (
            to.y - from.bottom(),
            (from.center().x - to.center().x).abs(),
            to.x < from.right() && from.x < to.right(),
        ),
        FocusDirection::Forward | FocusDirection::Backward => return f32::MAX,
    };
    let major = major.max(0.0);
    let distance = 13.0 * major * major + minor * minor;
    if in_beam { distance } else { distance + 1.0e12 }
}
