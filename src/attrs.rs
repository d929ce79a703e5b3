//! The `component-sync-attrs` attribute/group table.
//!
//! `touched` tracks *groups*, not individual attributes: overriding any
//! attribute in a group marks the whole group. [`COMPONENT_SYNC_ATTRS`] is
//! the single source of truth both the reconciler and the attribute updater
//! walk, driving property inheritance off one reflected attribute table
//! rather than ad hoc per-field code.

use crate::model::{Blur, Color, GrowType, Gradient, Shadow, Shape, TextNode};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AttrGroup {
    Position,
    Size,
    Rotation,
    Opacity,
    Fill,
    Stroke,
    Shadow,
    Blur,
    Layout,
    Content,
    Typography,
    Image,
}

/// Every syncable attribute.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AttrKind {
    X,
    Y,
    Width,
    Height,
    Rotation,
    Opacity,
    FillColor,
    FillColorGradient,
    FillOpacity,
    StrokeColor,
    StrokeColorGradient,
    StrokeOpacity,
    StrokeWidth,
    CornerRadius,
    Shadow,
    Blur,
    GrowType,
    Content,
    TypographyRefId,
    TypographyRefFile,
    ImageRefId,
    ImageRefFile,
    ProportionLock,
}

impl AttrKind {
    pub fn name(self) -> &'static str {
        use AttrKind::*;
        match self {
            X => "x",
            Y => "y",
            Width => "width",
            Height => "height",
            Rotation => "rotation",
            Opacity => "opacity",
            FillColor => "fill-color",
            FillColorGradient => "fill-color-gradient",
            FillOpacity => "fill-opacity",
            StrokeColor => "stroke-color",
            StrokeColorGradient => "stroke-color-gradient",
            StrokeOpacity => "stroke-opacity",
            StrokeWidth => "stroke-width",
            CornerRadius => "corner-radius",
            Shadow => "shadow",
            Blur => "blur",
            GrowType => "grow-type",
            Content => "content",
            TypographyRefId => "typography-ref-id",
            TypographyRefFile => "typography-ref-file",
            ImageRefId => "image-ref-id",
            ImageRefFile => "image-ref-file",
            ProportionLock => "proportion-lock",
        }
    }
}

/// `component-sync-attrs`: attribute -> group, minus `x, y` (those are
/// handled by [`crate::geometry`] instead, even though they still carry
/// a group tag here for `touched` bookkeeping purposes).
pub const COMPONENT_SYNC_ATTRS: &[(AttrKind, AttrGroup)] = &[
    (AttrKind::X, AttrGroup::Position),
    (AttrKind::Y, AttrGroup::Position),
    (AttrKind::Width, AttrGroup::Size),
    (AttrKind::Height, AttrGroup::Size),
    (AttrKind::Rotation, AttrGroup::Rotation),
    (AttrKind::Opacity, AttrGroup::Opacity),
    (AttrKind::FillColor, AttrGroup::Fill),
    (AttrKind::FillColorGradient, AttrGroup::Fill),
    (AttrKind::FillOpacity, AttrGroup::Fill),
    (AttrKind::StrokeColor, AttrGroup::Stroke),
    (AttrKind::StrokeColorGradient, AttrGroup::Stroke),
    (AttrKind::StrokeOpacity, AttrGroup::Stroke),
    (AttrKind::StrokeWidth, AttrGroup::Stroke),
    (AttrKind::CornerRadius, AttrGroup::Size),
    (AttrKind::Shadow, AttrGroup::Shadow),
    (AttrKind::Blur, AttrGroup::Blur),
    (AttrKind::GrowType, AttrGroup::Layout),
    (AttrKind::Content, AttrGroup::Content),
    (AttrKind::TypographyRefId, AttrGroup::Typography),
    (AttrKind::TypographyRefFile, AttrGroup::Typography),
    (AttrKind::ImageRefId, AttrGroup::Image),
    (AttrKind::ImageRefFile, AttrGroup::Image),
    (AttrKind::ProportionLock, AttrGroup::Image),
];

/// Attribute table entries with `x, y` excluded, as walked by `update_attrs`.
pub fn non_positional_attrs() -> impl Iterator<Item = (AttrKind, AttrGroup)> {
    COMPONENT_SYNC_ATTRS
        .iter()
        .copied()
        .filter(|(attr, _)| !matches!(attr, AttrKind::X | AttrKind::Y))
}

pub fn group_of(attr: AttrKind) -> AttrGroup {
    COMPONENT_SYNC_ATTRS
        .iter()
        .find(|(a, _)| *a == attr)
        .map(|(_, g)| *g)
        .expect("every AttrKind has an entry in COMPONENT_SYNC_ATTRS")
}

/// A syncable attribute's value, read or written generically by `update_attrs`
/// without needing a reflection layer - this crate has exactly one node type,
/// so a closed value enum is simpler and just as sound as a `dyn Reflect`.
#[derive(Clone, PartialEq, Debug)]
pub enum AttrValue {
    F64(Option<f64>),
    Color(Option<Color>),
    Gradient(Option<Gradient>),
    Shadow(Option<Shadow>),
    Blur(Option<Blur>),
    GrowType(Option<GrowType>),
    Content(Option<TextNode>),
    AssetRef(Option<crate::model::AssetId>),
    FileRef(Option<crate::model::FileId>),
    Bool(Option<bool>),
}

impl Shape {
    /// Whether this attribute is meaningful on this shape (e.g. typography
    /// and content only apply to text shapes). Attributes that are always
    /// meaningful (position, opacity, ...) are always present.
    pub fn has_attr(&self, attr: AttrKind) -> bool {
        use crate::model::ShapeType::*;
        match attr {
            AttrKind::Content
            | AttrKind::TypographyRefId
            | AttrKind::TypographyRefFile => self.shape_type == Text,
            AttrKind::ImageRefId | AttrKind::ImageRefFile | AttrKind::ProportionLock => {
                self.shape_type == Image
            }
            _ => true,
        }
    }

    pub fn get_attr(&self, attr: AttrKind) -> AttrValue {
        use AttrKind::*;
        match attr {
            X => AttrValue::F64(Some(self.x)),
            Y => AttrValue::F64(Some(self.y)),
            Width => AttrValue::F64(Some(self.width)),
            Height => AttrValue::F64(Some(self.height)),
            Rotation => AttrValue::F64(Some(self.rotation)),
            Opacity => AttrValue::F64(Some(self.opacity)),
            FillColor => AttrValue::Color(self.fill_color),
            FillColorGradient => AttrValue::Gradient(self.fill_color_gradient.clone()),
            FillOpacity => AttrValue::F64(self.fill_opacity),
            StrokeColor => AttrValue::Color(self.stroke_color),
            StrokeColorGradient => AttrValue::Gradient(self.stroke_color_gradient.clone()),
            StrokeOpacity => AttrValue::F64(self.stroke_opacity),
            StrokeWidth => AttrValue::F64(self.stroke_width),
            CornerRadius => AttrValue::F64(self.corner_radius),
            Shadow => AttrValue::Shadow(self.shadow.clone()),
            Blur => AttrValue::Blur(self.blur),
            GrowType => AttrValue::GrowType(self.grow_type),
            Content => AttrValue::Content(self.content.clone()),
            TypographyRefId => AttrValue::AssetRef(self.typography_ref_id),
            TypographyRefFile => AttrValue::FileRef(self.typography_ref_file),
            ImageRefId => AttrValue::AssetRef(self.image_ref_id),
            ImageRefFile => AttrValue::FileRef(self.image_ref_file),
            ProportionLock => AttrValue::Bool(self.proportion_lock),
        }
    }

    /// Sets the attribute, returning the previous value (used to build undo
    /// operations without a second read).
    pub fn set_attr(&mut self, attr: AttrKind, value: AttrValue) -> AttrValue {
        let previous = self.get_attr(attr);
        match (attr, value) {
            (AttrKind::X, AttrValue::F64(Some(v))) => self.x = v,
            (AttrKind::Y, AttrValue::F64(Some(v))) => self.y = v,
            (AttrKind::Width, AttrValue::F64(v)) => self.width = v.unwrap_or(self.width),
            (AttrKind::Height, AttrValue::F64(v)) => self.height = v.unwrap_or(self.height),
            (AttrKind::Rotation, AttrValue::F64(v)) => self.rotation = v.unwrap_or(self.rotation),
            (AttrKind::Opacity, AttrValue::F64(v)) => self.opacity = v.unwrap_or(self.opacity),
            (AttrKind::FillColor, AttrValue::Color(v)) => self.fill_color = v,
            (AttrKind::FillColorGradient, AttrValue::Gradient(v)) => self.fill_color_gradient = v,
            (AttrKind::FillOpacity, AttrValue::F64(v)) => self.fill_opacity = v,
            (AttrKind::StrokeColor, AttrValue::Color(v)) => self.stroke_color = v,
            (AttrKind::StrokeColorGradient, AttrValue::Gradient(v)) => {
                self.stroke_color_gradient = v
            }
            (AttrKind::StrokeOpacity, AttrValue::F64(v)) => self.stroke_opacity = v,
            (AttrKind::StrokeWidth, AttrValue::F64(v)) => self.stroke_width = v,
            (AttrKind::CornerRadius, AttrValue::F64(v)) => self.corner_radius = v,
            (AttrKind::Shadow, AttrValue::Shadow(v)) => self.shadow = v,
            (AttrKind::Blur, AttrValue::Blur(v)) => self.blur = v,
            (AttrKind::GrowType, AttrValue::GrowType(v)) => self.grow_type = v,
            (AttrKind::Content, AttrValue::Content(v)) => self.content = v,
            (AttrKind::TypographyRefId, AttrValue::AssetRef(v)) => self.typography_ref_id = v,
            (AttrKind::TypographyRefFile, AttrValue::FileRef(v)) => self.typography_ref_file = v,
            (AttrKind::ImageRefId, AttrValue::AssetRef(v)) => self.image_ref_id = v,
            (AttrKind::ImageRefFile, AttrValue::FileRef(v)) => self.image_ref_file = v,
            (AttrKind::ProportionLock, AttrValue::Bool(v)) => self.proportion_lock = v,
            (attr, value) => {
                log::warn!(
                    "attempted to set {:?} with a mismatched value variant {:?}; ignored",
                    attr,
                    value
                );
            }
        }
        previous
    }
}
