/// Mapping between window pixels and the overlay's logical space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LogicalViewport {
    pub width: f32,
    pub height: f32,
    window: (u32, u32),
}

impl LogicalViewport {
    /// Height is held at `logical_height`; width is `floor(height * w / h)`.
    pub fn from_window(window: (u32, u32), logical_height: f32) -> Self {
        let (w, h) = window;
        let width = if h == 0 {
            0.0
        } else {
            (logical_height * w as f32 / h as f32).floor()
        };
        Self {
            width,
            height: logical_height,
            window,
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window
    }

    /// Window pixel position to logical position.
    pub fn map_pointer(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = self.window;
        if w == 0 || h == 0 {
            return (0.0, 0.0);
        }
        (self.width * x / w as f32, self.height * y / h as f32)
    }

    /// Scale that maps a window-sized texture onto the logical space.
    pub fn texture_scale(&self) -> [f32; 2] {
        let (w, h) = self.window;
        if w == 0 || h == 0 {
            return [0.0, 0.0];
        }
        [self.width / w as f32, self.height / h as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn height_is_fixed_width_follows_aspect() {
        let vp = LogicalViewport::from_window((1920, 1080), 720.0);
        assert_eq!(vp.height, 720.0);
        assert_eq!(vp.width, 1280.0);

        let vp = LogicalViewport::from_window((1000, 700), 720.0);
        assert_eq!(vp.width, 1028.0);
    }

    #[test]
    fn pointer_maps_corners_to_corners() {
        let vp = LogicalViewport::from_window((800, 600), 720.0);
        let (x, y) = vp.map_pointer(800.0, 600.0);
        assert_relative_eq!(x, vp.width);
        assert_relative_eq!(y, 720.0);
        assert_eq!(vp.map_pointer(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn window_centre_maps_exactly_to_logical_centre() {
        let vp = LogicalViewport::from_window((800, 600), 720.0);
        assert_eq!(vp.width, 960.0);
        assert_eq!(vp.map_pointer(400.0, 300.0), (480.0, 360.0));
    }

    #[test]
    fn zero_window_does_not_divide_by_zero() {
        let vp = LogicalViewport::from_window((0, 0), 720.0);
        assert_eq!(vp.width, 0.0);
        assert_eq!(vp.texture_scale(), [0.0, 0.0]);
        assert_eq!(vp.map_pointer(10.0, 10.0), (0.0, 0.0));
    }
}
