use serde::{Deserialize, Serialize};

/// Width and height of the overlay window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in virtual desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Same size, shifted vertically by `dy` pixels
    pub fn offset_y(&self, dy: i32) -> Self {
        Self {
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    /// Rectangle of the given size sharing this rectangle's center
    pub fn resized_around_center(&self, width: u32, height: u32) -> Self {
        let cx = self.x as i64 + self.width as i64 / 2;
        let cy = self.y as i64 + self.height as i64 / 2;
        Self {
            x: (cx - width as i64 / 2) as i32,
            y: (cy - height as i64 / 2) as i32,
            width,
            height,
        }
    }

    /// Component-wise linear interpolation, rounded to whole pixels.
    /// `t` may leave [0, 1] for overshooting easing curves.
    pub fn lerp(&self, to: &Rect, t: f64) -> Self {
        let mix = |a: f64, b: f64| (a + (b - a) * t).round();
        Self {
            x: mix(self.x as f64, to.x as f64) as i32,
            y: mix(self.y as f64, to.y as f64) as i32,
            width: mix(self.width as f64, to.width as f64).max(0.0) as u32,
            height: mix(self.height as f64, to.height as f64).max(0.0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resized_around_center_keeps_center() {
        let rect = Rect::new(100, 100, 200, 100);
        let shrunk = rect.resized_around_center(180, 90);
        assert_eq!(shrunk, Rect::new(110, 105, 180, 90));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rect::new(0, 60, 100, 100);
        let b = Rect::new(0, 0, 100, 100);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Rect::new(0, 30, 100, 100));
    }

    #[test]
    fn test_lerp_never_negative_size() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(0, 0, 0, 0);
        let overshoot = a.lerp(&b, 1.5);
        assert_eq!(overshoot.width, 0);
        assert_eq!(overshoot.height, 0);
    }
}
