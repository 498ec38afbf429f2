//! Debugging aids for clipview trees: a textual outline that shows logical
//! vs attached children and focus state, plus per-frame counters.

use std::fmt::Write as _;

use clipview_core::{NodeId, ViewTree};

/// Renders the logical tree below the root, one node per line.
///
/// Markers: `detached` (clipped away or otherwise not in the window),
/// `focusable`, `focused`, `guide`, `recovering` (focus recovery pending) and
/// `clip=[x,y wxh]` on clipping containers.
pub fn outline(tree: &ViewTree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), 0, &mut out);
    out
}

fn write_node(tree: &ViewTree, id: NodeId, depth: usize, out: &mut String) {
    let Ok(node) = tree.node(id) else {
        return;
    };
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = write!(out, "{:indent$}{}", "", tree.describe(id), indent = depth * 2);

    if !tree.is_attached_to_window(id) {
        out.push_str(" detached");
    }
    if node.is_focusable() {
        out.push_str(" focusable");
    }
    if tree.is_focused(id) {
        out.push_str(" focused");
    }
    if let Ok(container) = tree.container(id) {
        if container.guide().is_focus_guide() {
            out.push_str(" guide");
        }
        if container.guide().is_recovering() {
            out.push_str(" recovering");
        }
    }
    if let Ok(clip) = tree.clipping_rect(id) {
        let _ = write!(out, " clip=[{},{} {}x{}]", clip.x, clip.y, clip.w, clip.h);
    }

    for child in tree.logical_children(id) {
        write_node(tree, child, depth + 1, out);
    }
}

/// Counts over the nodes reachable from the root through logical children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub nodes: usize,
    pub attached: usize,
    pub detached: usize,
    pub clipping: usize,
    pub guides: usize,
}

impl Metrics {
    pub fn collect(tree: &ViewTree) -> Self {
        let mut m = Metrics::default();
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            m.nodes += 1;
            if tree.is_attached_to_window(id) {
                m.attached += 1;
            } else {
                m.detached += 1;
            }
            if tree.is_clipping(id) {
                m.clipping += 1;
            }
            if tree.is_focus_guide(id) {
                m.guides += 1;
            }
            stack.extend(tree.logical_children(id));
        }
        m
    }
}

pub struct Inspector {
    pub enabled: bool,
    frame_count: u64,
    pub metrics: Option<Metrics>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            enabled: false,
            frame_count: 0,
            metrics: None,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Call once per frame after [`ViewTree::run_scheduled`].
    pub fn frame(&mut self, tree: &ViewTree) {
        self.frame_count += 1;
        if !self.enabled {
            return;
        }
        self.metrics = Some(Metrics::collect(tree));
        log::info!("{}", self.summary());
        log::debug!("tree:\n{}", outline(tree));
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("frame: {}", self.frame_count)];
        if let Some(m) = &self.metrics {
            lines.push(format!("nodes: {}", m.nodes));
            lines.push(format!("attached: {}", m.attached));
            lines.push(format!("detached: {}", m.detached));
            lines.push(format!("clipping: {}", m.clipping));
            lines.push(format!("guides: {}", m.guides));
        }
        lines.join("  |  ")
    }
}
