//! Popover editor
//!
//! The floating panel used to assign a new action to a clicked key:
//! tab selection and availability, the in-progress edit, placement
//! relative to the key, and the remap/cancel events it emits.

mod editor;
mod event;
pub mod geometry;
pub mod tab;

pub use editor::{
    AnimationPhase, Popover, PopoverChanges, PopoverConfig, PopoverInputs, PopoverSession,
    ANIMATION_DURATION_MS,
};
pub use event::PopoverEvent;
pub use geometry::{compute_placement, FixedLayout, GeometryConfig, LayoutProvider, Placement, Rect};
pub use tab::{
    compute_tab_availability, ConversionError, TabContext, TabEdit, TabEditors, TabHeader, TabKind,
};
