//! The change-record tagged union and redo/undo pairing.
//!
//! Every public entry point in this crate returns a [`ChangePair`]. Nothing
//! is ever applied here - change records are data the host interprets,
//! mirroring the editor's own `*Command` structs (each carrying an
//! old/new value pair and nothing else) but flattened into plain data rather
//! than boxed `dyn Command` trait objects, since this crate has no apply-side
//! state to dispatch against.

use crate::attrs::{AttrGroup, AttrKind, AttrValue};
use crate::model::{ComponentId, PageId, Shape, ShapeId};
use fxhash::FxHashSet;

/// A single operation inside a `ModObj` change.
#[derive(Clone, PartialEq, Debug)]
pub enum Op {
    Set {
        attr: AttrKind,
        val: AttrValue,
        ignore_touched: bool,
    },
    SetTouched {
        touched: FxHashSet<AttrGroup>,
    },
    /// Rebinds a shape's `shape_ref`, the instance-to-master link. Not part
    /// of `COMPONENT_SYNC_ATTRS` since it's identity bookkeeping rather than
    /// a syncable attribute; emitted when a shape is promoted into a
    /// component and needs to start pointing at the master it just created.
    SetShapeRef {
        shape_ref: Option<ShapeId>,
    },
}

/// Which container a change applies to. Exactly one of `Page`/`Component`  - 
/// modeled as an enum instead of a pair of optional fields so the
/// "exactly one" invariant is enforced by the type rather than by a debug
/// assertion at every construction site.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Target {
    Page(PageId),
    Component(ComponentId),
}

#[derive(Clone, PartialEq, Debug)]
pub enum Change {
    AddObj {
        id: ShapeId,
        target: Target,
        parent_id: Option<ShapeId>,
        frame_id: Option<ShapeId>,
        index: Option<usize>,
        obj: Box<Shape>,
    },
    DelObj {
        id: ShapeId,
        target: Target,
    },
    ModObj {
        id: ShapeId,
        target: Target,
        operations: Vec<Op>,
    },
    MovObjects {
        parent_id: ShapeId,
        shapes: Vec<ShapeId>,
        index: usize,
        target: Target,
    },
    RegObjects {
        page_id: PageId,
        shapes: Vec<ShapeId>,
    },
}

/// `(redo, undo)`, positionally paired: `undo[i]` is the inverse of
/// `redo[i]`. Producers must keep both lists in the same tree-preorder
/// walk order for that pairing to hold.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ChangePair {
    pub redo: Vec<Change>,
    pub undo: Vec<Change>,
}

impl ChangePair {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.redo.is_empty() && self.undo.is_empty()
    }

    pub fn single(redo: Change, undo: Change) -> Self {
        Self {
            redo: vec![redo],
            undo: vec![undo],
        }
    }

    /// Concatenates two pairs preserving order: `self` first, `other` after.
    /// This and `prepend` are the only combinators the sync drivers need;
    /// there's no single-change `cons` because nothing prepends just one
    /// change onto an existing pair.
    pub fn concat(mut self, mut other: ChangePair) -> Self {
        self.redo.append(&mut other.redo);
        self.undo.append(&mut other.undo);
        self
    }

    pub fn extend(&mut self, other: ChangePair) {
        self.redo.extend(other.redo);
        self.undo.extend(other.undo);
    }

    /// Inserts `other` at the head of `self`. Used by `attr_update` to put
    /// positional `set x`/`set y` ops ahead of the rest of the attribute
    /// list.
    pub fn prepend(mut self, mut other: ChangePair) -> Self {
        other.redo.append(&mut self.redo);
        other.undo.append(&mut self.undo);
        other
    }

    pub fn concat_all(pairs: impl IntoIterator<Item = ChangePair>) -> Self {
        pairs
            .into_iter()
            .fold(ChangePair::empty(), |acc, p| acc.concat(p))
    }
}
