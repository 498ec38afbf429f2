//! # Clipped subviews and focus guides
//!
//! Clipview's core is a retained view tree ([`ViewTree`]) whose containers can
//! do two things the host layout/render pipeline doesn't:
//!
//! - **Clipped-subview virtualization**: only children that intersect the
//!   container's visible region stay physically attached. The full child
//!   order is kept in a separate logical list so inserts, removals and index
//!   lookups keep working on detached children.
//! - **Focus guides**: containers that intercept remote/keyboard focus
//!   traversal and redirect it to destinations or to the last focused
//!   descendant, and that catch focus when a focused descendant is removed.
//!
//! ## Clipping
//!
//! ```rust
//! use clipview_core::*;
//!
//! let mut tree = ViewTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let root = tree.root();
//!
//! // a shelf showing 30px of its content
//! let shelf = tree.create_node(Rect::new(0.0, 0.0, 30.0, 10.0));
//! tree.push_child(root, shelf)?;
//! for i in 0..5 {
//!     let tile = tree.create_node(Rect::new(i as f32 * 10.0, 0.0, 10.0, 10.0));
//!     tree.push_child(shelf, tile)?;
//! }
//!
//! tree.set_clipping_enabled(shelf, true)?;
//! assert_eq!(tree.children(shelf)?.len(), 3);
//! assert_eq!(tree.logical_child_count(shelf)?, 5);
//!
//! // scrolling re-clips: tiles 2, 3 and 4 are attached now
//! tree.set_scroll_offset(shelf, Vec2 { x: 20.0, y: 0.0 })?;
//! assert_eq!(tree.children(shelf)?.len(), 3);
//! # Ok::<(), TreeError>(())
//! ```
//!
//! Layout changes come in through [`ViewTree::set_bounds`]; structural
//! changes go out as [`TreeEvent`]s from [`ViewTree::drain_events`].
//!
//! ## Focus
//!
//! Configure a guide with [`FocusGuideConfig`] and drive traversal with
//! [`ViewTree::move_focus`] or [`ViewTree::request_focus`]. Focus recovery is
//! two-phase: the guide catches focus immediately and redirects it from a
//! deferred task, so hosts must call [`ViewTree::run_scheduled`] after every
//! layout pass.
//!
//! Everything runs on one UI thread; the tree is neither `Send` nor `Sync`.

pub mod clipping;
pub mod container;
pub mod draw;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod navigation;
pub mod scheduler;
pub mod tree;
pub mod virtualize;

pub use container::*;
pub use draw::*;
pub use error::*;
pub use focus::*;
pub use geometry::*;
pub use scheduler::*;
pub use tree::*;
pub use virtualize::*;
