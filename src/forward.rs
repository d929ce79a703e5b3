//! Forward sync drivers: component/master changes propagating
//! into instances, plus direct color/typography propagation for shapes that
//! merely *reference* a library asset without being component instances.

use crate::asset_ref::has_asset_reference;
use crate::attrs::AttrKind;
use crate::change::{Change, ChangePair, Op, Target};
use crate::model::{
    AssetId, AssetType, Container, FileId, LibraryColor, Page, PageId, Shape, State, TextNode,
    Typography,
};

/// Forward-syncs every page of the workspace file against `library_id`'s
/// assets of `asset_type`.
pub fn generate_sync_file(asset_type: AssetType, library_id: Option<FileId>, state: &State) -> ChangePair {
    if asset_map_is_empty(asset_type, library_id, state) {
        return ChangePair::empty();
    }

    ChangePair::concat_all(ordered_pages(state).into_iter().map(|page| {
        sync_container(asset_type, library_id, state, &page.container, Some(page.id), None)
    }))
}

/// Forward-syncs every component of the local file's own component library
/// against `library_id`'s assets of `asset_type` - used when a library's
/// changes must also propagate into components that themselves reference it
/// (a component using another component's colors, say).
pub fn generate_sync_library(asset_type: AssetType, library_id: Option<FileId>, state: &State) -> ChangePair {
    if asset_map_is_empty(asset_type, library_id, state) {
        return ChangePair::empty();
    }

    let mut components: Vec<_> = state.workspace_data.components.values().collect();
    components.sort_by_key(|c| c.id.0);

    ChangePair::concat_all(components.into_iter().map(|component| {
        sync_container(asset_type, library_id, state, &component.container, None, Some(component.id))
    }))
}

/// Pages in `page_order`, falling back to appending any page missing from it
/// (sorted by id, for determinism) - `page_order` omissions are a host bug,
/// never produced by this crate, so this only guards against bad input.
fn ordered_pages(state: &State) -> Vec<&Page> {
    let mut seen = fxhash::FxHashSet::default();
    let mut out: Vec<&Page> = state
        .workspace_data
        .page_order
        .iter()
        .filter_map(|id| {
            seen.insert(*id);
            state.workspace_data.pages.get(id)
        })
        .collect();

    let mut missing: Vec<_> = state
        .workspace_data
        .pages
        .values()
        .filter(|p| !seen.contains(&p.id))
        .collect();
    missing.sort_by_key(|p| p.id.0);
    out.extend(missing);
    out
}

fn asset_map_is_empty(asset_type: AssetType, library_id: Option<FileId>, state: &State) -> bool {
    match (asset_type, library_id) {
        (AssetType::Components, None) => state.workspace_data.components.is_empty(),
        (AssetType::Components, Some(f)) => state
            .workspace_libraries
            .get(&f)
            .map_or(true, |l| l.components.is_empty()),
        (AssetType::Colors, None) => state.workspace_data.colors.is_empty(),
        (AssetType::Colors, Some(f)) => {
            state.workspace_libraries.get(&f).map_or(true, |l| l.colors.is_empty())
        }
        (AssetType::Typographies, None) => state.workspace_data.typographies.is_empty(),
        (AssetType::Typographies, Some(f)) => state
            .workspace_libraries
            .get(&f)
            .map_or(true, |l| l.typographies.is_empty()),
    }
}

/// Walks `container` in tree-preorder (a deterministic walk, not hash-map
/// iteration order), selects shapes referencing `library_id`'s `asset_type`
/// assets, and dispatches each to the matching propagation path.
pub fn sync_container(
    asset_type: AssetType,
    library_id: Option<FileId>,
    state: &State,
    container: &Container,
    page_id: Option<PageId>,
    component_id: Option<crate::model::ComponentId>,
) -> ChangePair {
    let target = match (page_id, component_id) {
        (Some(p), _) => Target::Page(p),
        (None, Some(c)) => Target::Component(c),
        (None, None) => {
            debug_assert!(false, "sync_container requires exactly one of page_id/component_id");
            return ChangePair::empty();
        }
    };

    let pred = has_asset_reference(asset_type, library_id);

    ChangePair::concat_all(preorder_ids(container).into_iter().filter_map(|id| {
        let shape = container.get(id)?;
        if !pred(shape) {
            return None;
        }

        log::trace!("sync_container: dispatching {:?} on {:?}", asset_type, shape.id);

        Some(match asset_type {
            AssetType::Components => reconcile_component(page_id, component_id, shape.id, state),
            AssetType::Colors if shape.shape_type == crate::model::ShapeType::Text => {
                sync_text_colors(shape, library_id, state, target)
            }
            AssetType::Colors => sync_shape_colors(shape, library_id, state, target),
            AssetType::Typographies => sync_text_typographies(shape, library_id, state, target),
        })
    }))
}

fn reconcile_component(
    page_id: Option<PageId>,
    component_id: Option<crate::model::ComponentId>,
    shape_id: crate::model::ShapeId,
    state: &State,
) -> ChangePair {
    crate::reconcile::sync_shape_and_children(page_id, component_id, shape_id, state, false)
}

fn preorder_ids(container: &Container) -> Vec<crate::model::ShapeId> {
    let mut out = Vec::with_capacity(container.objects.len());
    let mut stack = vec![container.root];
    while let Some(id) = stack.pop() {
        if let Some(shape) = container.get(id) {
            out.push(id);
            for &child in shape.children.iter().rev() {
                stack.push(child);
            }
        }
    }
    out
}

pub(crate) fn get_library_color(
    library_id: Option<FileId>,
    asset_id: AssetId,
    state: &State,
) -> Option<&LibraryColor> {
    match library_id {
        None => state.workspace_data.colors.get(&asset_id),
        Some(file) => state
            .workspace_libraries
            .get(&file)
            .and_then(|lib| lib.colors.get(&asset_id)),
    }
}

pub(crate) fn get_library_typography(
    library_id: Option<FileId>,
    asset_id: AssetId,
    state: &State,
) -> Option<&Typography> {
    match library_id {
        None => state.workspace_data.typographies.get(&asset_id),
        Some(file) => state
            .workspace_libraries
            .get(&file)
            .and_then(|lib| lib.typographies.get(&asset_id)),
    }
}

fn push_if_changed(redo: &mut Vec<Op>, undo: &mut Vec<Op>, attr: AttrKind, new: crate::attrs::AttrValue, old: crate::attrs::AttrValue) {
    if new == old {
        return;
    }
    redo.push(Op::Set { attr, val: new, ignore_touched: true });
    undo.push(Op::Set { attr, val: old, ignore_touched: true });
}

/// The six-entry color table, applied to non-text shapes.
fn sync_shape_colors(shape: &Shape, library_id: Option<FileId>, state: &State, target: Target) -> ChangePair {
    use crate::attrs::AttrValue;

    let mut redo = Vec::new();
    let mut undo = Vec::new();

    if let Some(asset_id) = shape
        .fill_color_ref_id
        .filter(|_| shape.fill_color_ref_file == library_id)
    {
        match get_library_color(library_id, asset_id, state) {
            Some(color) => {
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::FillColor,
                    AttrValue::Color(color.color),
                    AttrValue::Color(shape.fill_color),
                );
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::FillColorGradient,
                    AttrValue::Gradient(color.gradient.clone()),
                    AttrValue::Gradient(shape.fill_color_gradient.clone()),
                );
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::FillOpacity,
                    AttrValue::F64(color.opacity),
                    AttrValue::F64(shape.fill_opacity),
                );
            }
            None => log::warn!(
                "sync_shape_colors: dangling fill_color_ref on {:?}",
                shape.id
            ),
        }
    }

    if let Some(asset_id) = shape
        .stroke_color_ref_id
        .filter(|_| shape.stroke_color_ref_file == library_id)
    {
        match get_library_color(library_id, asset_id, state) {
            Some(color) => {
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::StrokeColor,
                    AttrValue::Color(color.color),
                    AttrValue::Color(shape.stroke_color),
                );
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::StrokeColorGradient,
                    AttrValue::Gradient(color.gradient.clone()),
                    AttrValue::Gradient(shape.stroke_color_gradient.clone()),
                );
                push_if_changed(
                    &mut redo,
                    &mut undo,
                    AttrKind::StrokeOpacity,
                    AttrValue::F64(color.opacity),
                    AttrValue::F64(shape.stroke_opacity),
                );
            }
            None => log::warn!(
                "sync_shape_colors: dangling stroke_color_ref on {:?}",
                shape.id
            ),
        }
    }

    if redo.is_empty() {
        return ChangePair::empty();
    }

    ChangePair::single(
        Change::ModObj { id: shape.id, target, operations: redo },
        Change::ModObj { id: shape.id, target, operations: undo },
    )
}

fn resolved_node_fill(node: &TextNode, library_id: Option<FileId>, state: &State) -> TextNode {
    let Some(asset_id) = node.fill_color_ref_id.filter(|_| node.fill_color_ref_file == library_id) else {
        return node.clone();
    };
    let Some(color) = get_library_color(library_id, asset_id, state) else {
        log::warn!("sync_text_colors: dangling fill_color_ref on text node");
        return node.clone();
    };
    TextNode {
        fill_color: color.color,
        fill_opacity: color.opacity,
        fill_color_gradient: color.gradient.clone(),
        ..node.clone()
    }
}

fn sync_text_colors(shape: &Shape, library_id: Option<FileId>, state: &State, target: Target) -> ChangePair {
    let Some(old_content) = &shape.content else {
        return ChangePair::empty();
    };

    let new_content = crate::text::map_node(&mut |node| resolved_node_fill(node, library_id, state), old_content);

    if &new_content == old_content {
        return ChangePair::empty();
    }

    ChangePair::single(
        Change::ModObj {
            id: shape.id,
            target,
            operations: vec![Op::Set {
                attr: AttrKind::Content,
                val: crate::attrs::AttrValue::Content(Some(new_content)),
                ignore_touched: true,
            }],
        },
        Change::ModObj {
            id: shape.id,
            target,
            operations: vec![Op::Set {
                attr: AttrKind::Content,
                val: crate::attrs::AttrValue::Content(Some(old_content.clone())),
                ignore_touched: true,
            }],
        },
    )
}

fn resolved_node_typography(node: &TextNode, library_id: Option<FileId>, state: &State) -> TextNode {
    let Some(asset_id) = node.typography_ref_id.filter(|_| node.typography_ref_file == library_id) else {
        return node.clone();
    };
    let Some(typography) = get_library_typography(library_id, asset_id, state) else {
        log::warn!("sync_text_typographies: dangling typography_ref on text node");
        return node.clone();
    };
    TextNode {
        typography: Some(typography.clone()),
        ..node.clone()
    }
}

fn sync_text_typographies(shape: &Shape, library_id: Option<FileId>, state: &State, target: Target) -> ChangePair {
    let Some(old_content) = &shape.content else {
        return ChangePair::empty();
    };

    let new_content =
        crate::text::map_node(&mut |node| resolved_node_typography(node, library_id, state), old_content);

    if &new_content == old_content {
        return ChangePair::empty();
    }

    ChangePair::single(
        Change::ModObj {
            id: shape.id,
            target,
            operations: vec![Op::Set {
                attr: AttrKind::Content,
                val: crate::attrs::AttrValue::Content(Some(new_content)),
                ignore_touched: true,
            }],
        },
        Change::ModObj {
            id: shape.id,
            target,
            operations: vec![Op::Set {
                attr: AttrKind::Content,
                val: crate::attrs::AttrValue::Content(Some(old_content.clone())),
                ignore_touched: true,
            }],
        },
    )
}
