use crate::primitives::{Point, Rect};
use serde::Serialize;

pub const TOOLTIP_OFFSET: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipSize {
    pub width: f64,
    pub height: f64,
}

impl Default for TooltipSize {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 72.0,
        }
    }
}

/// Place the tooltip below-right of the pointer, flipped to the other side
/// when it would overflow and clamped to the viewport.
pub fn place_tooltip(pointer: Point, size: TooltipSize, viewport: Viewport) -> Rect {
    let mut x = pointer.x + TOOLTIP_OFFSET;
    if x + size.width > viewport.width {
        x = pointer.x - TOOLTIP_OFFSET - size.width;
    }
    let mut y = pointer.y + TOOLTIP_OFFSET;
    if y + size.height > viewport.height {
        y = pointer.y - TOOLTIP_OFFSET - size.height;
    }
    let max_x = (viewport.width - size.width).max(0.0);
    let max_y = (viewport.height - size.height).max(0.0);
    Rect::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y), size.width, size.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_flips_and_clamps() {
        let vp = Viewport {
            width: 300.0,
            height: 200.0,
        };
        let size = TooltipSize {
            width: 100.0,
            height: 50.0,
        };
        let at = |x, y, vp| place_tooltip(Point::new(x, y), size, vp);
        assert_eq!(at(10.0, 10.0, vp), Rect::new(22.0, 22.0, 100.0, 50.0));
        assert_eq!(at(290.0, 190.0, vp), Rect::new(178.0, 128.0, 100.0, 50.0));
        let tiny = Viewport {
            width: 50.0,
            height: 20.0,
        };
        assert_eq!(at(25.0, 10.0, tiny), Rect::new(0.0, 0.0, 100.0, 50.0));
    }
}
