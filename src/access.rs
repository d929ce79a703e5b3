//! Container/shape accessors and the `clone_object` deep-clone
//! primitive every reconcile/add-shape path is built on.
//!
//! `clone_object` mirrors the classic copy-a-scene-graph-node shape: a
//! recursive top-down walk that assigns fresh ids, calls a caller-supplied
//! hook on each clone and each original, and returns an old-to-new id map
//! alongside the new root.

use crate::model::{
    Component, ComponentId, Container, FileId, Page, PageId, Shape, ShapeId, State,
};
use fxhash::FxHashMap;

/// Resolves the container a `(page_id, component_id)` pair addresses.
/// Exactly one of the two must be `Some` - violating this is a caller bug,
/// hence the `debug_assert!` rather than a `Result`.
pub fn get_container<'a>(
    page_id: Option<PageId>,
    component_id: Option<ComponentId>,
    state: &'a State,
) -> Option<&'a Container> {
    debug_assert!(
        page_id.is_some() != component_id.is_some(),
        "exactly one of page_id/component_id must be set"
    );

    if let Some(page_id) = page_id {
        state.workspace_data.pages.get(&page_id).map(|p| &p.container)
    } else {
        component_id.and_then(|id| state.workspace_data.components.get(&id)).map(|c| &c.container)
    }
}

pub fn get_container_mut<'a>(
    page_id: Option<PageId>,
    component_id: Option<ComponentId>,
    state: &'a mut State,
) -> Option<&'a mut Container> {
    debug_assert!(page_id.is_some() != component_id.is_some());

    if let Some(page_id) = page_id {
        state
            .workspace_data
            .pages
            .get_mut(&page_id)
            .map(|p| &mut p.container)
    } else {
        component_id
            .and_then(|id| state.workspace_data.components.get_mut(&id))
            .map(|c| &mut c.container)
    }
}

pub fn get_shape<'a>(container: &'a Container, id: ShapeId) -> Option<&'a Shape> {
    container.get(id)
}

pub fn get_parents(id: ShapeId, objects: &FxHashMap<ShapeId, Shape>) -> Vec<ShapeId> {
    let mut parents = Vec::new();
    let mut current = objects.get(&id).and_then(|s| s.parent_id);
    while let Some(parent_id) = current {
        parents.push(parent_id);
        current = objects.get(&parent_id).and_then(|s| s.parent_id);
    }
    parents
}

pub fn get_children(id: ShapeId, objects: &FxHashMap<ShapeId, Shape>) -> Vec<ShapeId> {
    objects
        .get(&id)
        .map(|s| s.children.clone())
        .unwrap_or_default()
}

pub fn position_on_parent(id: ShapeId, objects: &FxHashMap<ShapeId, Shape>) -> Option<usize> {
    let parent_id = objects.get(&id)?.parent_id?;
    objects
        .get(&parent_id)?
        .children
        .iter()
        .position(|&c| c == id)
}

/// Resolves a component, treating `component_file = None` as "local file".
pub fn get_component<'a>(
    component_id: Option<ComponentId>,
    component_file: Option<FileId>,
    local_file: &'a State,
) -> Option<&'a Component> {
    let component_id = component_id?;
    match component_file {
        None => local_file.workspace_data.components.get(&component_id),
        Some(file) => local_file
            .workspace_libraries
            .get(&file)
            .and_then(|lib| lib.components.get(&component_id)),
    }
}

pub fn get_component_root(component: &Component) -> Option<&Shape> {
    component.container.get(component.container.root)
}

/// True iff `shape_ref(instance) == Some(id(master))` - the identity used to
/// match instance children against master children (invariant 1).
pub fn is_master_of(master: &Shape, instance: &Shape) -> bool {
    instance.shape_ref == Some(master.id)
}

/// Deep-clones the subtree rooted at `root`, assigning fresh ids throughout
/// and re-parenting the clone under `new_parent_id`. Returns the new root id,
/// every newly created shape (in top-down order, matching the order the
/// reconciler needs to emit `AddObj` records), and every *original* shape
/// that `transform_original` chose to mutate, each paired with the new id its
/// clone received (used by `add_shape_to_component` to rebind `shape_ref` on
/// the instance side, see `inverse.rs`).
pub fn clone_object(
    root: ShapeId,
    new_parent_id: Option<ShapeId>,
    objects: &FxHashMap<ShapeId, Shape>,
    mut transform_new: impl FnMut(&Shape, &mut Shape),
    mut transform_original: impl FnMut(&mut Shape, ShapeId),
) -> Option<(ShapeId, Vec<Shape>, Vec<Shape>)> {
    let mut new_shapes = Vec::new();
    let mut updated_originals = Vec::new();
    let new_root = clone_object_rec(
        root,
        new_parent_id,
        objects,
        &mut transform_new,
        &mut transform_original,
        &mut new_shapes,
        &mut updated_originals,
    )?;
    Some((new_root, new_shapes, updated_originals))
}

fn clone_object_rec(
    id: ShapeId,
    new_parent_id: Option<ShapeId>,
    objects: &FxHashMap<ShapeId, Shape>,
    transform_new: &mut impl FnMut(&Shape, &mut Shape),
    transform_original: &mut impl FnMut(&mut Shape, ShapeId),
    new_shapes: &mut Vec<Shape>,
    updated_originals: &mut Vec<Shape>,
) -> Option<ShapeId> {
    let original = objects.get(&id)?;

    let mut clone = original.clone();
    clone.id = ShapeId::new();
    clone.parent_id = new_parent_id;
    clone.children.clear();
    transform_new(original, &mut clone);

    let new_id = clone.id;

    let mut original_copy = original.clone();
    transform_original(&mut original_copy, new_id);
    if &original_copy != original {
        updated_originals.push(original_copy);
    }

    for &child_id in &original.children {
        if let Some(new_child_id) = clone_object_rec(
            child_id,
            Some(new_id),
            objects,
            transform_new,
            transform_original,
            new_shapes,
            updated_originals,
        ) {
            clone.children.push(new_child_id);
        }
    }

    new_shapes.push(clone);
    Some(new_id)
}

/// Promotes a subtree into a standalone component container by cloning it
/// with fresh ids and clearing instance-only fields on the clone. The mirror
/// image of `clone_object`; this is a component-lifecycle helper (creating a
/// new master from a selection) rather than something the sync algorithms
/// themselves call.
pub fn make_component_shape(
    root: ShapeId,
    objects: &FxHashMap<ShapeId, Shape>,
) -> Option<(ShapeId, Vec<Shape>)> {
    let (new_root, mut new_shapes, _) = clone_object(
        root,
        None,
        objects,
        |_original, clone| {
            clone.component_id = None;
            clone.component_file = None;
            clone.shape_ref = None;
            clone.touched.clear();
        },
        |_, _| {},
    )?;
    new_shapes.sort_by_key(|s| s.id != new_root);
    Some((new_root, new_shapes))
}

/// Re-orders a freshly cloned subtree (as returned by [`clone_object`]) into
/// parent-before-child (pre-order) order, suitable for emitting `AddObj`
/// records top-down.
pub fn preorder(root: ShapeId, shapes: &[Shape]) -> Vec<Shape> {
    let by_id: FxHashMap<ShapeId, &Shape> = shapes.iter().map(|s| (s.id, s)).collect();
    let mut out = Vec::with_capacity(shapes.len());
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if let Some(shape) = by_id.get(&id) {
            out.push((*shape).clone());
            // Push in reverse so children come out of the stack in original order.
            for &child in shape.children.iter().rev() {
                stack.push(child);
            }
        }
    }
    out
}

/// Every shape in the subtree rooted at `root`, in breadth-first (increasing
/// depth) order - used by `remove_shape`'s undo reconstruction.
pub fn breadth_first(root: ShapeId, objects: &FxHashMap<ShapeId, Shape>) -> Vec<Shape> {
    let mut out = Vec::new();
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(root);
    while let Some(id) = queue.pop_front() {
        if let Some(shape) = objects.get(&id) {
            out.push(shape.clone());
            queue.extend(shape.children.iter().copied());
        }
    }
    out
}

/// Used when assembling a page/component from a list of loose shapes, e.g.
/// when constructing fixtures in tests.
pub fn container_from_shapes(root: ShapeId, shapes: impl IntoIterator<Item = Shape>) -> Container {
    let objects = shapes.into_iter().map(|s| (s.id, s)).collect();
    Container { objects, root }
}

pub fn page(id: PageId, name: impl Into<String>, container: Container) -> Page {
    Page {
        id,
        name: name.into(),
        container,
    }
}

pub fn component(id: ComponentId, name: impl Into<String>, container: Container) -> Component {
    Component {
        id,
        name: name.into(),
        container,
    }
}
