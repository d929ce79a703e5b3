//! Bidirectional component/instance tree reconciliation for a collaborative
//! design tool's library-component system.
//!
//! This crate is a pure, synchronous library: every entry point takes a
//! snapshot of the workspace (a [`model::State`], which also carries the
//! external libraries it depends on) and returns a [`change::ChangePair`]
//! describing what would change and how to undo it. Nothing here is applied
//! for you - persistence, transport, and conflict resolution belong to the
//! host application.
//!
//! - [`forward`] propagates a library's components/colors/typographies into
//!   every page and component that references them.
//! - [`inverse`] pushes local edits on an instance back onto its master,
//!   clearing (or, for nested instances, re-homing) the touched bookkeeping.
//! - [`reconcile`] is the tree-diff at the heart of forward sync.
//! - [`attr_update`], [`geometry`], [`attrs`], [`asset_ref`], [`text`] and
//!   [`access`] are the building blocks those drivers share.

pub mod access;
pub mod asset_ref;
pub mod attr_update;
pub mod attrs;
pub mod change;
pub mod forward;
pub mod geometry;
pub mod inverse;
pub mod model;
pub mod reconcile;
pub mod text;

pub use change::{Change, ChangePair, Op, Target};
pub use forward::{generate_sync_file, generate_sync_library, sync_container};
pub use inverse::sync_shape_inverse;
pub use model::{AssetType, State};
pub use reconcile::sync_shape_and_children;
