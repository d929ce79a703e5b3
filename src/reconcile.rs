//! The forward reconciler: walks an instance subtree against its
//! master subtree in lockstep, producing `ModObj`/`AddObj`/`DelObj`/
//! `MovObjects`/`RegObjects` pairs for every divergence found.
//!
//! The child-matching algorithm (`compare_children`) follows the classic
//! prefab-reconciliation shape: match by stable id first, fall back to a
//! positional search when ids don't line up at the head of both lists, and
//! only then conclude a child was actually added/removed on one side.

use crate::access::{breadth_first, get_parents, is_master_of, preorder};
use crate::attr_update::{update_attrs, UpdateAttrsOptions};
use crate::change::{Change, ChangePair, Target};
use crate::model::{Container, Shape, ShapeId};

/// One verdict `compare_children` reaches for a single position in the walk.
#[derive(Clone, Debug)]
enum ChildAction {
    /// Present only in the master list: clone it into the instance.
    OnlyMaster(ShapeId),
    /// Present only in the instance list: delete it.
    OnlyInstance(ShapeId),
    /// Matched at the same position in both lists: recurse, no move.
    Matched { inst: ShapeId, master: ShapeId },
    /// Matched, but not at the same position: recurse, then move.
    Moved { inst: ShapeId, master: ShapeId },
}

/// Entry point: reconciles `shape_id` (and everything under it) against its
/// master counterpart, resolved through `shape_id`'s own `component_id`.
///
/// `reset` is forwarded into the top-level node's [`UpdateAttrsOptions::reset_touched`];
/// every recursive call below derives its own options instead (nested
/// instance roots always get `copy_touched`).
pub fn sync_shape_and_children(
    page_id: Option<crate::model::PageId>,
    component_id: Option<crate::model::ComponentId>,
    shape_id: ShapeId,
    local_file: &crate::model::State,
    reset: bool,
) -> ChangePair {
    let Some(container) = crate::access::get_container(page_id, component_id, local_file) else {
        log::warn!("sync_shape_and_children: no such container");
        return ChangePair::empty();
    };
    let Some(inst) = container.get(shape_id) else {
        log::warn!("sync_shape_and_children: no such shape {:?}", shape_id);
        return ChangePair::empty();
    };
    let Some(component) =
        crate::access::get_component(inst.component_id, inst.component_file, local_file)
    else {
        log::warn!("sync_shape_and_children: dangling component reference on {:?}", shape_id);
        return ChangePair::empty();
    };
    let Some(master) = inst.shape_ref.and_then(|id| component.container.get(id)) else {
        log::warn!("sync_shape_and_children: dangling shape_ref on {:?}", shape_id);
        return ChangePair::empty();
    };
    let Some(root_component) = crate::access::get_component_root(component) else {
        log::warn!("sync_shape_and_children: component has no root shape");
        return ChangePair::empty();
    };

    let target = match (page_id, component_id) {
        (Some(p), _) => Target::Page(p),
        (None, Some(c)) => Target::Component(c),
        (None, None) => unreachable!("get_container already validated exactly one is set"),
    };

    let options = UpdateAttrsOptions {
        omit_touched: true,
        reset_touched: reset,
        set_touched: false,
        copy_touched: false,
    };

    sync_normal(
        container,
        &component.container,
        inst,
        master,
        inst,
        root_component,
        target,
        options,
    )
}

/// Recursive worker. `root_shape`/`root_component` are the pair used for
/// positional math; they get rebound whenever `inst` turns out to be itself
/// a nested instance root, while the container pair stays fixed for the
/// whole walk.
#[allow(clippy::too_many_arguments)]
fn sync_normal(
    container: &Container,
    master_container: &Container,
    inst: &Shape,
    master: &Shape,
    root_shape: &Shape,
    root_component: &Shape,
    target: Target,
    options: UpdateAttrsOptions,
) -> ChangePair {
    let (root_shape, root_component) = if inst.is_instance_root() {
        (inst, master)
    } else {
        (root_shape, root_component)
    };

    let mut pair = update_attrs(inst, master, root_shape, root_component, target, options);

    let actions = compare_children(&inst.children, &master.children, container, master_container);

    for action in actions {
        match action {
            ChildAction::OnlyMaster(master_child_id) => {
                let Some(master_child) = master_container.get(master_child_id) else {
                    continue;
                };
                pair.extend(add_shape_to_instance(
                    master_child,
                    master_container,
                    inst,
                    target,
                ));
            }
            ChildAction::OnlyInstance(inst_child_id) => {
                pair.extend(remove_shape(inst_child_id, container, target));
            }
            ChildAction::Matched { inst: ci, master: cm } => {
                if let Some(child_pair) =
                    recurse_matched(container, master_container, ci, cm, root_shape, root_component, target)
                {
                    pair.extend(child_pair);
                }
            }
            ChildAction::Moved { inst: ci, master: cm } => {
                if let Some(child_pair) =
                    recurse_matched(container, master_container, ci, cm, root_shape, root_component, target)
                {
                    pair.extend(child_pair);
                }
                let index_before = inst.children.iter().position(|&c| c == ci);
                let index_after = master.children.iter().position(|&c| c == cm);
                if let (Some(index_before), Some(index_after)) = (index_before, index_after) {
                    pair.extend(mov_objects(container, ci, index_before, index_after, target));
                }
            }
        }
    }

    pair
}

fn recurse_matched(
    container: &Container,
    master_container: &Container,
    inst_child_id: ShapeId,
    master_child_id: ShapeId,
    root_shape: &Shape,
    root_component: &Shape,
    target: Target,
) -> Option<ChangePair> {
    let inst_child = container.get(inst_child_id)?;
    let master_child = master_container.get(master_child_id)?;

    let options = if inst_child.is_instance_root() {
        UpdateAttrsOptions {
            omit_touched: false,
            reset_touched: false,
            set_touched: false,
            copy_touched: true,
        }
    } else {
        UpdateAttrsOptions {
            omit_touched: true,
            reset_touched: false,
            set_touched: false,
            copy_touched: false,
        }
    };

    Some(sync_normal(
        container,
        master_container,
        inst_child,
        master_child,
        root_shape,
        root_component,
        target,
        options,
    ))
}

/// Matches two children lists by id (via `shape_ref`), falling back
/// to a positional search when the heads don't match, in order to tell
/// "reordered" apart from "added"/"removed".
fn compare_children(
    inst_children: &[ShapeId],
    master_children: &[ShapeId],
    container: &Container,
    master_container: &Container,
) -> Vec<ChildAction> {
    let mut l_inst = inst_children.to_vec();
    let mut l_master = master_children.to_vec();
    let mut actions = Vec::new();

    loop {
        match (l_inst.first().copied(), l_master.first().copied()) {
            (None, None) => break,
            (None, Some(_)) => {
                actions.extend(l_master.drain(..).map(ChildAction::OnlyMaster));
                break;
            }
            (Some(_), None) => {
                actions.extend(l_inst.drain(..).map(ChildAction::OnlyInstance));
                break;
            }
            (Some(ci), Some(cm)) => {
                let (Some(ci_shape), Some(cm_shape)) = (container.get(ci), master_container.get(cm))
                else {
                    // Dangling reference on one side; drop it and keep walking.
                    if container.get(ci).is_none() {
                        l_inst.remove(0);
                    } else {
                        l_master.remove(0);
                    }
                    continue;
                };

                if is_master_of(cm_shape, ci_shape) {
                    actions.push(ChildAction::Matched { inst: ci, master: cm });
                    l_inst.remove(0);
                    l_master.remove(0);
                    continue;
                }

                let ci_prime_idx = l_inst
                    .iter()
                    .position(|&id| container.get(id).is_some_and(|s| is_master_of(cm_shape, s)));
                let cm_prime_found = l_master.iter().any(|&id| {
                    master_container
                        .get(id)
                        .is_some_and(|s| is_master_of(s, ci_shape))
                });

                match (ci_prime_idx, cm_prime_found) {
                    (None, _) => {
                        actions.push(ChildAction::OnlyMaster(cm));
                        l_master.remove(0);
                    }
                    (Some(_), false) => {
                        actions.push(ChildAction::OnlyInstance(ci));
                        l_inst.remove(0);
                    }
                    (Some(idx), true) => {
                        let ci_prime = l_inst.remove(idx);
                        actions.push(ChildAction::Moved { inst: ci_prime, master: cm });
                        l_master.remove(0);
                    }
                }
            }
        }
    }

    actions
}

/// Deletes `id` on the instance side. The undo reconstructs the
/// whole removed subtree (`AddObj` per descendant, breadth-first, plus the
/// ancestor chain as a single `RegObjects`), since a single `DelObj` drops
/// everything under it.
fn remove_shape(id: ShapeId, container: &Container, target: Target) -> ChangePair {
    let redo = vec![Change::DelObj { id, target }];

    let removed = breadth_first(id, &container.objects);
    let mut undo: Vec<Change> = removed
        .into_iter()
        .map(|shape| Change::AddObj {
            id: shape.id,
            target,
            parent_id: shape.parent_id,
            frame_id: shape.frame_id,
            index: crate::access::position_on_parent(shape.id, &container.objects),
            obj: Box::new(shape),
        })
        .collect();

    if let Target::Page(page_id) = target {
        let ancestors = get_parents(id, &container.objects);
        if !ancestors.is_empty() {
            undo.push(Change::RegObjects {
                page_id,
                shapes: ancestors,
            });
        }
    }

    ChangePair { redo, undo }
}

/// Clones `master_child`'s subtree (from the master container) under
/// `instance_parent` on the instance side, tagging every clone's `shape_ref`
/// back to its master counterpart.
fn add_shape_to_instance(
    master_child: &Shape,
    master_container: &Container,
    instance_parent: &Shape,
    target: Target,
) -> ChangePair {
    let Some((new_root, new_shapes, _)) = crate::access::clone_object(
        master_child.id,
        Some(instance_parent.id),
        &master_container.objects,
        |original, clone| {
            clone.shape_ref = Some(original.id);
            clone.frame_id = instance_parent.frame_id;
        },
        |_, _| {},
    ) else {
        return ChangePair::empty();
    };

    let ordered = preorder(new_root, &new_shapes);
    let redo: Vec<Change> = ordered
        .iter()
        .map(|shape| Change::AddObj {
            id: shape.id,
            target,
            parent_id: shape.parent_id,
            frame_id: shape.frame_id,
            index: None,
            obj: Box::new(shape.clone()),
        })
        .collect();
    let undo = vec![Change::DelObj { id: new_root, target }];

    ChangePair { redo, undo }
}

/// Reorders a single already-matched child to `index_after`, keeping
/// `index_before` around to undo back to its original position.
fn mov_objects(
    container: &Container,
    inst_id: ShapeId,
    index_before: usize,
    index_after: usize,
    target: Target,
) -> ChangePair {
    let Some(inst) = container.get(inst_id) else {
        return ChangePair::empty();
    };
    let Some(parent_id) = inst.parent_id else {
        return ChangePair::empty();
    };

    if index_before == index_after {
        return ChangePair::empty();
    }

    ChangePair::single(
        Change::MovObjects {
            parent_id,
            shapes: vec![inst_id],
            index: index_after,
            target,
        },
        Change::MovObjects {
            parent_id,
            shapes: vec![inst_id],
            index: index_before,
            target,
        },
    )
}
