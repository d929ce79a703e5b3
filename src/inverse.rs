//! Inverse sync driver: pushes local edits on an instance back onto
//! its master, clearing touched flags on the source and, for nested
//! instances, setting them on the destination instead.

use crate::access::{get_component, get_component_root, preorder};
use crate::attr_update::{update_attrs, UpdateAttrsOptions};
use crate::change::{Change, ChangePair, Target};
use crate::model::{Container, PageId, Shape, ShapeId, State};

/// Entry point: pushes edits on `shape_id` (on page `page_id`) and its
/// descendants back onto their respective masters.
pub fn sync_shape_inverse(page_id: PageId, shape_id: ShapeId, local_file: &State) -> ChangePair {
    let Some(page) = local_file.workspace_data.pages.get(&page_id) else {
        log::warn!("sync_shape_inverse: no such page {:?}", page_id);
        return ChangePair::empty();
    };
    let container = &page.container;

    let Some(shape) = container.get(shape_id) else {
        log::warn!("sync_shape_inverse: no such shape {:?}", shape_id);
        return ChangePair::empty();
    };
    let Some(component) = get_component(shape.component_id, shape.component_file, local_file)
    else {
        log::warn!("sync_shape_inverse: dangling component reference on {:?}", shape_id);
        return ChangePair::empty();
    };
    let Some(root_component) = get_component_root(component) else {
        log::warn!("sync_shape_inverse: component has no root shape");
        return ChangePair::empty();
    };

    let mut pair = shape_to_component(shape, component, shape, root_component, page_id, container);

    for &child_id in &shape.children {
        let Some(child) = container.get(child_id) else { continue };
        let child_pair = if child.is_instance_root() {
            sync_shape_inverse_nested(container, component, child, shape, root_component, page_id)
        } else {
            sync_shape_inverse_normal(container, component, child, shape, root_component, page_id)
        };
        pair.extend(child_pair);
    }

    pair
}

fn sync_shape_inverse_normal(
    container: &Container,
    component: &crate::model::Component,
    shape: &Shape,
    root_shape: &Shape,
    root_component: &Shape,
    page_id: PageId,
) -> ChangePair {
    let mut pair = shape_to_component(shape, component, root_shape, root_component, page_id, container);

    for &child_id in &shape.children {
        let Some(child) = container.get(child_id) else { continue };
        let child_pair = if child.is_instance_root() {
            sync_shape_inverse_nested(container, component, child, root_shape, root_component, page_id)
        } else {
            sync_shape_inverse_normal(container, component, child, root_shape, root_component, page_id)
        };
        pair.extend(child_pair);
    }

    pair
}

/// Like `sync_shape_inverse_normal`, but for a descendant that is itself a
/// nested instance root: root-shape/root-component rebind to this shape and
/// its own master, and `update_attrs` is invoked with `copy_touched: true`
/// (nested instances propagate touched flags onto their own master rather
/// than clearing them outright).
fn sync_shape_inverse_nested(
    container: &Container,
    _outer_component: &crate::model::Component,
    shape: &Shape,
    _root_shape: &Shape,
    _root_component: &Shape,
    page_id: PageId,
) -> ChangePair {
    let Some(master) = shape.shape_ref.and_then(|id| _outer_component.container.get(id)) else {
        log::warn!(
            "sync_shape_inverse_nested: dangling shape_ref on nested instance root {:?}",
            shape.id
        );
        return ChangePair::empty();
    };

    let options = UpdateAttrsOptions {
        omit_touched: false,
        reset_touched: false,
        set_touched: true,
        copy_touched: true,
    };

    let mut pair = update_attrs(
        master,
        shape,
        shape,
        master,
        Target::Component(_outer_component.id),
        options,
    );

    for &child_id in &shape.children {
        let Some(child) = container.get(child_id) else { continue };
        let child_pair = if child.is_instance_root() {
            sync_shape_inverse_nested(container, _outer_component, child, shape, master, page_id)
        } else {
            sync_shape_inverse_normal(container, _outer_component, child, shape, master, page_id)
        };
        pair.extend(child_pair);
    }

    pair
}

/// Pushes one shape's local edits onto its master counterpart.
///
/// The returned pair concatenates the attribute-rollback undo with the
/// source's touched-reset undo, each exactly once - concatenating the
/// touched-reset pair with itself instead of the attribute rollback would
/// silently drop the master-side undo. See
/// `tests::inverse_undo_is_not_duplicated` for the regression test.
pub fn shape_to_component(
    shape: &Shape,
    component: &crate::model::Component,
    root_shape: &Shape,
    root_component: &Shape,
    page_id: PageId,
    container: &Container,
) -> ChangePair {
    let component_shape = shape.shape_ref.and_then(|id| component.container.get(id));

    match component_shape {
        None => add_shape_to_component(shape, component, container, page_id),
        Some(component_shape) => {
            let uchanges1 = update_attrs(
                component_shape,
                shape,
                root_component,
                root_shape,
                Target::Component(component.id),
                UpdateAttrsOptions {
                    omit_touched: false,
                    reset_touched: false,
                    set_touched: true,
                    copy_touched: false,
                },
            );

            let uchanges2 = reset_touched(shape, page_id);

            uchanges1.concat(uchanges2)
        }
    }
}

/// Emits a bare `SetTouched(empty)` pair for `shape` on the page side,
/// clearing the local override bookkeeping after an inverse sync.
fn reset_touched(shape: &Shape, page_id: PageId) -> ChangePair {
    if shape.touched.is_empty() {
        return ChangePair::empty();
    }

    ChangePair::single(
        Change::ModObj {
            id: shape.id,
            target: Target::Page(page_id),
            operations: vec![crate::change::Op::SetTouched { touched: Default::default() }],
        },
        Change::ModObj {
            id: shape.id,
            target: Target::Page(page_id),
            operations: vec![crate::change::Op::SetTouched { touched: shape.touched.clone() }],
        },
    )
}

/// Symmetric to `reconcile::add_shape_to_instance`, but cloning into the
/// component container and recording the new master id back onto the
/// original instance shape's `shape_ref`. `transform_original` rebinds
/// `shape.shape_ref` to the freshly cloned master's id; the resulting
/// `ModObj(SetShapeRef)` is appended to the redo, with the old `shape_ref`
/// restored on undo.
fn add_shape_to_component(
    shape: &Shape,
    component: &crate::model::Component,
    container: &Container,
    page_id: PageId,
) -> ChangePair {
    let parent_of_master = shape
        .parent_id
        .and_then(|id| container.get(id))
        .and_then(|parent| parent.shape_ref);

    let Some((new_root, new_shapes, updated_originals)) = crate::access::clone_object(
        shape.id,
        parent_of_master,
        &container.objects,
        |_original, clone| {
            clone.shape_ref = None;
            clone.component_id = None;
            clone.component_file = None;
            clone.frame_id = None;
        },
        |original_copy, new_id| {
            if original_copy.id == shape.id {
                original_copy.shape_ref = Some(new_id);
            }
        },
    ) else {
        return ChangePair::empty();
    };

    let target = Target::Component(component.id);
    let ordered = preorder(new_root, &new_shapes);
    let mut redo: Vec<Change> = ordered
        .iter()
        .map(|s| Change::AddObj {
            id: s.id,
            target,
            parent_id: s.parent_id,
            frame_id: s.frame_id,
            index: None,
            obj: Box::new(s.clone()),
        })
        .collect();
    let mut undo = vec![Change::DelObj { id: new_root, target }];

    for updated in &updated_originals {
        redo.push(Change::ModObj {
            id: updated.id,
            target: Target::Page(page_id),
            operations: vec![crate::change::Op::SetShapeRef {
                shape_ref: updated.shape_ref,
            }],
        });
        undo.insert(
            0,
            Change::ModObj {
                id: updated.id,
                target: Target::Page(page_id),
                operations: vec![crate::change::Op::SetShapeRef {
                    shape_ref: shape.shape_ref,
                }],
            },
        );
    }

    ChangePair { redo, undo }
}
