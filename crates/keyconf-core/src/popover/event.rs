use crate::remap::KeyActionRemap;

/// Notifications the popover hands to its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverEvent {
    /// The user dismissed the popover; nothing is to be applied
    Cancel,
    /// The user confirmed a valid edit
    Remap(KeyActionRemap),
    /// Validity or remap scope changed and the host should redraw
    RenderRequested,
}
