use std::any::Any;

use thiserror::Error;

use crate::NodeId;

/// Caller faults. Every public mutation on [`crate::ViewTree`] reports these
/// instead of panicking; "nothing to focus" style outcomes are plain `bool`s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} does not exist (destroyed or stale handle)")]
    UnknownNode(NodeId),
    #[error("index {index} out of range for {count} children")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("subview clipping is not enabled on {0:?}")]
    ClippingDisabled(NodeId),
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("{0:?} already has a parent")]
    AlreadyParented(NodeId),
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the root node cannot be moved or destroyed")]
    RootNode,
}

/// A fault caught while drawing a subtree.
#[derive(Clone, Debug)]
pub struct ErrorInfo {
    pub message: String,
    pub component: String,
}

/// Enclosing collaborator that receives draw faults caught at a container.
pub trait ErrorHandler {
    fn handle_exception(&mut self, info: ErrorInfo);
}

/// Collects faults; handy for hosts that inspect them after a frame.
#[derive(Clone, Debug, Default)]
pub struct CollectErrors {
    pub errors: Vec<ErrorInfo>,
}

impl ErrorHandler for CollectErrors {
    fn handle_exception(&mut self, info: ErrorInfo) {
        self.errors.push(info);
    }
}

pub(crate) fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
