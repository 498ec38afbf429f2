//! A TV home screen: a vertical list of shelves, each a horizontally
//! scrolling row of tiles. The list and every shelf clip their subviews, and
//! every shelf is an auto-focus guide, so d-pad focus re-enters a shelf on
//! the tile it left from.
//!
//! Run with `RUST_LOG=debug` to see attach/detach and focus traffic.

use clipview_core::*;
use clipview_devtools::{Inspector, outline};

const SCREEN_W: f32 = 1280.0;
const SCREEN_H: f32 = 720.0;
const ROW_H: f32 = 200.0;
const ROW_GAP: f32 = 20.0;
const TILE_W: f32 = 240.0;
const TILE_H: f32 = 180.0;
const TILE_GAP: f32 = 20.0;

struct Screen {
    tree: ViewTree,
    list: NodeId,
    rows: Vec<NodeId>,
}

fn build(rows: usize, tiles_per_row: usize) -> anyhow::Result<Screen> {
    let mut tree = ViewTree::new(Rect::new(0.0, 0.0, SCREEN_W, SCREEN_H));
    let root = tree.root();
    tree.set_debug_name(root, "screen")?;

    let list = tree.create_node(Rect::new(0.0, 0.0, SCREEN_W, SCREEN_H));
    tree.set_debug_name(list, "list")?;
    tree.push_child(root, list)?;

    let mut row_ids = Vec::with_capacity(rows);
    for r in 0..rows {
        let y = r as f32 * (ROW_H + ROW_GAP);
        let row = tree.create_node(Rect::new(0.0, y, SCREEN_W, ROW_H));
        tree.set_debug_name(row, format!("row{r}"))?;
        tree.push_child(list, row)?;

        for t in 0..tiles_per_row {
            let x = t as f32 * (TILE_W + TILE_GAP);
            let tile = tree.create_node(Rect::new(x, 10.0, TILE_W, TILE_H));
            tree.set_debug_name(tile, format!("row{r}/tile{t}"))?;
            tree.set_tag(tile, Some((r * 100 + t) as ViewTag))?;
            tree.set_focusable(tile, true)?;
            tree.push_child(row, tile)?;
        }

        tree.set_clipping_enabled(row, true)?;
        tree.configure_focus_guide(row, FocusGuideConfig::new().auto_focus(true))?;
        row_ids.push(row);
    }
    tree.set_clipping_enabled(list, true)?;

    Ok(Screen {
        tree,
        list,
        rows: row_ids,
    })
}

/// Scrolls the focused tile's shelf so the tile and its right-hand neighbour
/// are on screen, and the list so the shelf is.
fn follow_focus(screen: &mut Screen) -> anyhow::Result<()> {
    let Some(focused) = screen.tree.focused() else {
        return Ok(());
    };
    let Some(row) = screen.tree.node(focused)?.parent() else {
        return Ok(());
    };
    if !screen.rows.contains(&row) {
        return Ok(());
    }

    let tile = screen.tree.node(focused)?.bounds();
    let scroll_x = (tile.right() + TILE_GAP + TILE_W - SCREEN_W).max(0.0);
    screen
        .tree
        .set_scroll_offset(row, Vec2 { x: scroll_x, y: 0.0 })?;

    let row_rect = screen.tree.node(row)?.bounds();
    let scroll_y = (row_rect.bottom() + ROW_GAP + ROW_H - SCREEN_H).max(0.0);
    screen
        .tree
        .set_scroll_offset(screen.list, Vec2 { x: 0.0, y: scroll_y })?;
    Ok(())
}

struct CountingPainter {
    painted: usize,
}

impl Painter for CountingPainter {
    fn paint(&mut self, _node: NodeId, _rect: Rect) {
        self.painted += 1;
    }
}

fn frame(screen: &mut Screen, inspector: &mut Inspector) {
    screen.tree.run_scheduled();
    let events = screen.tree.drain_events();
    let attached = events
        .iter()
        .filter(|e| matches!(e, TreeEvent::Attached { .. }))
        .count();
    let detached = events
        .iter()
        .filter(|e| matches!(e, TreeEvent::Detached { .. }))
        .count();

    let mut painter = CountingPainter { painted: 0 };
    let mut errors = CollectErrors::default();
    screen.tree.draw(&mut painter, &mut errors);
    for err in &errors.errors {
        log::error!("{}: {}", err.component, err.message);
    }

    let focused = screen
        .tree
        .focused()
        .map(|f| screen.tree.describe(f))
        .unwrap_or_else(|| "-".into());
    log::info!(
        "focus={focused} attached={attached} detached={detached} painted={}",
        painter.painted
    );
    inspector.frame(&screen.tree);
}

fn press(
    screen: &mut Screen,
    inspector: &mut Inspector,
    direction: FocusDirection,
) -> anyhow::Result<()> {
    if !screen.tree.move_focus(direction) {
        log::info!("{direction:?}: nowhere to go");
    }
    follow_focus(screen)?;
    frame(screen, inspector);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut screen = build(8, 20)?;
    let mut inspector = Inspector::new();
    inspector.toggle();
    frame(&mut screen, &mut inspector);

    // enter the first shelf and walk right past the screen edge
    press(&mut screen, &mut inspector, FocusDirection::Down)?;
    for _ in 0..7 {
        press(&mut screen, &mut inspector, FocusDirection::Right)?;
    }

    // down into the next shelf and back: the first shelf restores its tile
    press(&mut screen, &mut inspector, FocusDirection::Down)?;
    press(&mut screen, &mut inspector, FocusDirection::Up)?;

    // the focused tile disappears from the catalogue
    if let Some(focused) = screen.tree.focused() {
        let row = screen.tree.node(focused)?.owner();
        if let Some(row) = row {
            log::info!("removing {}", screen.tree.describe(focused));
            screen.tree.remove_child(row, focused)?;
            screen.tree.destroy_node(focused)?;
        }
    }
    // let recovery land on a tile before following it
    screen.tree.run_scheduled();
    follow_focus(&mut screen)?;
    frame(&mut screen, &mut inspector);

    for _ in 0..4 {
        press(&mut screen, &mut inspector, FocusDirection::Down)?;
    }

    println!("{}", outline(&screen.tree));
    Ok(())
}
