//! The asset-reference detector: a pure predicate factory answering whether
//! a shape references a given `(asset_type, library_id)` pair.

use crate::model::{AssetType, FileId, Shape, ShapeType};
use crate::text::some_node;

/// Builds a shape-level predicate selecting shapes that reference `library_id`
/// through an attribute of the given `asset_type`. `library_id = None`
/// matches local-library references (`*_ref_file = None`).
pub fn has_asset_reference(
    asset_type: AssetType,
    library_id: Option<FileId>,
) -> impl Fn(&Shape) -> bool {
    move |shape: &Shape| match asset_type {
        AssetType::Components => {
            shape.component_id.is_some() && shape.component_file == library_id
        }
        AssetType::Colors => {
            let shape_level = (shape.fill_color_ref_id.is_some()
                && shape.fill_color_ref_file == library_id)
                || (shape.stroke_color_ref_id.is_some()
                    && shape.stroke_color_ref_file == library_id);

            if shape_level {
                return true;
            }

            if shape.shape_type != ShapeType::Text {
                return false;
            }

            shape.content.as_ref().is_some_and(|content| {
                some_node(
                    &mut |node| {
                        (node.fill_color_ref_id.is_some()
                            && node.fill_color_ref_file == library_id)
                            || (node.stroke_color_ref_id.is_some()
                                && node.stroke_color_ref_file == library_id)
                    },
                    content,
                )
            })
        }
        AssetType::Typographies => {
            if shape.shape_type != ShapeType::Text {
                return false;
            }

            shape.content.as_ref().is_some_and(|content| {
                some_node(
                    &mut |node| {
                        node.typography_ref_id.is_some() && node.typography_ref_file == library_id
                    },
                    content,
                )
            })
        }
    }
}
