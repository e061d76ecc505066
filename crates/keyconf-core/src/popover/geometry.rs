// Keyconf Popover Geometry
// Places the popover under the clicked key without leaving the container

/// Width of the docked side menu including its margin
pub const DEFAULT_SIDE_PANEL_OFFSET: f64 = 265.0;

/// Space between the bottom edge of a key and the popover
pub const DEFAULT_KEY_GAP: f64 = 7.0;

/// Screen rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Live measurements the popover cannot compute itself.
///
/// Hosts implement this over their display surface; tests use
/// [`FixedLayout`].
pub trait LayoutProvider {
    /// Rendered width of the popover panel
    fn popover_width(&self) -> f64;

    /// Current vertical scroll offset of the page
    fn scroll_y(&self) -> f64;
}

/// Layout provider with constant measurements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedLayout {
    pub popover_width: f64,
    pub scroll_y: f64,
}

impl FixedLayout {
    pub fn new(popover_width: f64, scroll_y: f64) -> Self {
        Self {
            popover_width,
            scroll_y,
        }
    }
}

impl LayoutProvider for FixedLayout {
    fn popover_width(&self) -> f64 {
        self.popover_width
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    pub side_panel_offset: f64,
    pub key_gap: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            side_panel_offset: DEFAULT_SIDE_PANEL_OFFSET,
            key_gap: DEFAULT_KEY_GAP,
        }
    }
}

/// Computed popover position and pointer hints
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub left_arrow: bool,
    pub right_arrow: bool,
}

/// Place the popover below `key` inside `container`.
///
/// The popover is centred on the key unless that would start left of the
/// side panel (anchor at the key's left edge) or run past the container's
/// right edge (anchor at the key's right edge). The left check wins.
pub fn compute_placement(
    key: &Rect,
    container: &Rect,
    layout: &dyn LayoutProvider,
    config: &GeometryConfig,
) -> Placement {
    let offset_left = container.left + config.side_panel_offset;
    let width = layout.popover_width();
    let center = key.left + key.width / 2.0;

    let left_arrow = center < offset_left;
    let right_arrow = center + width > offset_left + container.width;

    let left = if left_arrow {
        key.left
    } else if right_arrow {
        key.left - width + key.width
    } else {
        center - width / 2.0
    };

    Placement {
        left,
        top: key.bottom() + config.key_gap + layout.scroll_y(),
        left_arrow,
        right_arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_centered_placement() {
        let key = Rect::new(300.0, 100.0, 40.0, 40.0);
        let placement = compute_placement(
            &key,
            &container(),
            &FixedLayout::new(300.0, 0.0),
            &GeometryConfig::default(),
        );
        assert_eq!(placement.top, 147.0);
        assert!(!placement.left_arrow);
        assert!(!placement.right_arrow);
        assert_eq!(placement.left, 170.0);
    }

    #[test]
    fn test_left_edge_anchors_at_key() {
        let key = Rect::new(100.0, 50.0, 40.0, 40.0);
        let placement = compute_placement(
            &key,
            &container(),
            &FixedLayout::new(300.0, 0.0),
            &GeometryConfig::default(),
        );
        assert!(placement.left_arrow);
        assert_eq!(placement.left, 100.0);
    }

    #[test]
    fn test_right_edge_anchors_at_key_end() {
        let key = Rect::new(900.0, 50.0, 40.0, 40.0);
        let placement = compute_placement(
            &key,
            &container(),
            &FixedLayout::new(300.0, 0.0),
            &GeometryConfig::default(),
        );
        assert!(!placement.left_arrow);
        assert!(placement.right_arrow);
        assert_eq!(placement.left, 900.0 - 300.0 + 40.0);
    }

    #[test]
    fn test_left_check_wins_when_both_fire() {
        // A popover wider than the container overflows even from the far left
        let key = Rect::new(10.0, 0.0, 20.0, 20.0);
        let placement = compute_placement(
            &key,
            &container(),
            &FixedLayout::new(5000.0, 0.0),
            &GeometryConfig::default(),
        );
        assert!(placement.left_arrow);
        assert!(placement.right_arrow);
        assert_eq!(placement.left, 10.0);
    }

    #[test]
    fn test_scroll_offset_moves_popover_down() {
        let key = Rect::new(300.0, 100.0, 40.0, 40.0);
        let placement = compute_placement(
            &key,
            &container(),
            &FixedLayout::new(300.0, 25.0),
            &GeometryConfig::default(),
        );
        assert_eq!(placement.top, 172.0);
    }
}
