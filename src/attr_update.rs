//! The attribute updater: copies the fixed `component-sync-attrs` set
//! from `origin` onto `dest`, honoring the touched-group policy, and produces
//! a single positionally-paired `ModObj` redo/undo pair.

use crate::attrs::non_positional_attrs;
use crate::change::{Change, ChangePair, Op, Target};
use crate::geometry::relative_position;
use crate::model::Shape;

#[derive(Copy, Clone, Debug, Default)]
pub struct UpdateAttrsOptions {
    /// Skip attributes whose group is in `dest.touched`.
    pub omit_touched: bool,
    /// Append a `SetTouched(empty)` to the redo, restoring `dest.touched` in
    /// the undo.
    pub reset_touched: bool,
    /// Whether emitted `Set` ops carry `ignore_touched = false` (so they
    /// register as overrides) or `true` (so they don't).
    pub set_touched: bool,
    /// Append a `SetTouched(origin.touched)` to the redo, restoring
    /// `dest.touched` in the undo. The redo/undo asymmetry here is
    /// intentional: undoing this step should put `dest` back exactly as it
    /// was, not hand its touched set over to `origin`.
    pub copy_touched: bool,
}

/// Produces a `ModObj` pair targeting `dest`, or the empty pair if nothing
/// would change.
pub fn update_attrs(
    dest: &Shape,
    origin: &Shape,
    dest_root: &Shape,
    origin_root: &Shape,
    target: Target,
    options: UpdateAttrsOptions,
) -> ChangePair {
    let mut redo_ops = Vec::new();
    let mut undo_ops = Vec::new();

    let new_pos = relative_position(origin, origin_root, dest_root);
    if new_pos != (dest.x, dest.y) {
        redo_ops.push(Op::Set {
            attr: crate::attrs::AttrKind::X,
            val: crate::attrs::AttrValue::F64(Some(new_pos.0)),
            ignore_touched: !options.set_touched,
        });
        redo_ops.push(Op::Set {
            attr: crate::attrs::AttrKind::Y,
            val: crate::attrs::AttrValue::F64(Some(new_pos.1)),
            ignore_touched: !options.set_touched,
        });
        undo_ops.push(Op::Set {
            attr: crate::attrs::AttrKind::X,
            val: crate::attrs::AttrValue::F64(Some(dest.x)),
            ignore_touched: !options.set_touched,
        });
        undo_ops.push(Op::Set {
            attr: crate::attrs::AttrKind::Y,
            val: crate::attrs::AttrValue::F64(Some(dest.y)),
            ignore_touched: !options.set_touched,
        });
    }

    for (attr, group) in non_positional_attrs() {
        if !dest.has_attr(attr) {
            continue;
        }
        if options.omit_touched && dest.touched.contains(&group) {
            log::trace!(
                "skipping {:?} on {:?}: group {:?} is touched",
                attr,
                dest.id,
                group
            );
            continue;
        }

        let new_val = origin.get_attr(attr);
        let old_val = dest.get_attr(attr);
        if new_val == old_val {
            continue;
        }

        redo_ops.push(Op::Set {
            attr,
            val: new_val,
            ignore_touched: !options.set_touched,
        });
        undo_ops.push(Op::Set {
            attr,
            val: old_val,
            ignore_touched: !options.set_touched,
        });
    }

    if options.reset_touched {
        redo_ops.push(Op::SetTouched {
            touched: Default::default(),
        });
        undo_ops.push(Op::SetTouched {
            touched: dest.touched.clone(),
        });
    }

    if options.copy_touched {
        // Intentionally asymmetric: the redo copies `origin.touched`, but
        // the undo restores `dest.touched`, not `origin.touched`'s prior
        // value.
        redo_ops.push(Op::SetTouched {
            touched: origin.touched.clone(),
        });
        undo_ops.push(Op::SetTouched {
            touched: dest.touched.clone(),
        });
    }

    if redo_ops.is_empty() {
        return ChangePair::empty();
    }

    debug_assert_eq!(redo_ops.len(), undo_ops.len());

    ChangePair::single(
        Change::ModObj {
            id: dest.id,
            target,
            operations: redo_ops,
        },
        Change::ModObj {
            id: dest.id,
            target,
            operations: undo_ops,
        },
    )
}
