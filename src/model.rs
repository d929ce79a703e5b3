//! Data model for shapes, pages, components and libraries.
//!
//! This module only describes data - no sync logic lives here. See
//! [`crate::reconcile`], [`crate::forward`] and [`crate::inverse`] for the
//! algorithms that operate on these types.

use fxhash::{FxHashMap, FxHashSet};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

uuid_id!(ShapeId);
uuid_id!(PageId);
uuid_id!(ComponentId);
uuid_id!(AssetId);
uuid_id!(FileId);

/// Kind of a shape. The sync engine treats most variants uniformly; `Text`
/// is special-cased wherever the content tree needs walking.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ShapeType {
    Rect,
    Circle,
    Line,
    Text,
    Image,
    Group,
    Frame,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Gradient {
    pub stops: Vec<(f32, Color)>,
    pub angle: f32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Shadow {
    pub color: Color,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub spread: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Blur {
    pub value: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GrowType {
    Fixed,
    AutoWidth,
    AutoHeight,
}

/// A node in a text shape's content tree. Leaves may carry their own asset
/// references, independent of the shape-level references.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TextNode {
    pub text: Option<String>,
    pub fill_color_ref_id: Option<AssetId>,
    pub fill_color_ref_file: Option<FileId>,
    pub stroke_color_ref_id: Option<AssetId>,
    pub stroke_color_ref_file: Option<FileId>,
    pub typography_ref_id: Option<AssetId>,
    pub typography_ref_file: Option<FileId>,
    pub fill_color: Option<Color>,
    pub fill_opacity: Option<f64>,
    pub fill_color_gradient: Option<Gradient>,
    pub typography: Option<Typography>,
    pub children: Vec<TextNode>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Typography {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub font_style: String,
    pub line_height: f64,
    pub letter_spacing: f64,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LibraryColor {
    pub color: Option<Color>,
    pub gradient: Option<Gradient>,
    pub opacity: Option<f64>,
}

/// A shape. Field names mirror the attribute families named in the
/// specification so that [`crate::attrs::COMPONENT_SYNC_ATTRS`] can be read
/// side by side with this struct.
#[derive(Clone, PartialEq, Debug)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub shape_type: ShapeType,

    pub parent_id: Option<ShapeId>,
    pub frame_id: Option<ShapeId>,
    pub children: Vec<ShapeId>,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub opacity: f64,

    pub fill_color: Option<Color>,
    pub fill_color_gradient: Option<Gradient>,
    pub fill_opacity: Option<f64>,
    pub fill_color_ref_id: Option<AssetId>,
    pub fill_color_ref_file: Option<FileId>,

    pub stroke_color: Option<Color>,
    pub stroke_color_gradient: Option<Gradient>,
    pub stroke_opacity: Option<f64>,
    pub stroke_color_ref_id: Option<AssetId>,
    pub stroke_color_ref_file: Option<FileId>,
    pub stroke_width: Option<f64>,

    pub corner_radius: Option<f64>,
    pub shadow: Option<Shadow>,
    pub blur: Option<Blur>,
    pub grow_type: Option<GrowType>,

    pub content: Option<TextNode>,
    pub typography_ref_id: Option<AssetId>,
    pub typography_ref_file: Option<FileId>,

    pub image_ref_id: Option<AssetId>,
    pub image_ref_file: Option<FileId>,
    pub proportion_lock: Option<bool>,

    pub component_id: Option<ComponentId>,
    pub component_file: Option<FileId>,
    pub shape_ref: Option<ShapeId>,

    pub touched: FxHashSet<crate::attrs::AttrGroup>,
}

impl Shape {
    pub fn new(id: ShapeId, name: impl Into<String>, shape_type: ShapeType) -> Self {
        Self {
            id,
            name: name.into(),
            shape_type,
            parent_id: None,
            frame_id: None,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            fill_color: None,
            fill_color_gradient: None,
            fill_opacity: None,
            fill_color_ref_id: None,
            fill_color_ref_file: None,
            stroke_color: None,
            stroke_color_gradient: None,
            stroke_opacity: None,
            stroke_color_ref_id: None,
            stroke_color_ref_file: None,
            stroke_width: None,
            corner_radius: None,
            shadow: None,
            blur: None,
            grow_type: None,
            content: None,
            typography_ref_id: None,
            typography_ref_file: None,
            image_ref_id: None,
            image_ref_file: None,
            proportion_lock: None,
            component_id: None,
            component_file: None,
            shape_ref: None,
        }
    }

    /// True iff `shape_ref(instance) == Some(id(master))` (invariant 1).
    pub fn is_instance_root(&self) -> bool {
        self.component_id.is_some()
    }
}

/// A page or component viewed as a `{objects, root}` pair (see `Container` glossary entry).
#[derive(Clone, Debug)]
pub struct Container {
    pub objects: FxHashMap<ShapeId, Shape>,
    pub root: ShapeId,
}

impl Container {
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.get_mut(&id)
    }
}

#[derive(Clone, Debug)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub container: Container,
}

#[derive(Clone, Debug)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub container: Container,
}

#[derive(Clone, Debug, Default)]
pub struct LibraryData {
    pub colors: FxHashMap<AssetId, LibraryColor>,
    pub typographies: FxHashMap<AssetId, Typography>,
    pub components: FxHashMap<ComponentId, Component>,
    pub media: FxHashMap<AssetId, ()>,
}

#[derive(Clone, Debug, Default)]
pub struct WorkspaceData {
    pub pages: FxHashMap<PageId, Page>,
    /// Authoritative page iteration order (tab order in the host UI) - not
    /// derivable from `pages` alone, since `PageId`s carry no ordering.
    pub page_order: Vec<PageId>,
    pub components: FxHashMap<ComponentId, Component>,
    pub colors: FxHashMap<AssetId, LibraryColor>,
    pub typographies: FxHashMap<AssetId, Typography>,
}

/// The immutable snapshot every entry point in this crate consumes.
/// This crate never mutates it: every sync driver reads a `State` and
/// returns a `ChangePair` for the host to apply.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub workspace_data: WorkspaceData,
    pub workspace_libraries: FxHashMap<FileId, LibraryData>,
}

/// The asset type a forward-sync pass targets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AssetType {
    Components,
    Colors,
    Typographies,
}
