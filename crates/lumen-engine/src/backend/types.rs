use glam::Mat4;

/// What `WindowBackend::present` did with the current frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Presented {
    /// The frame reached the screen.
    Shown,
    /// No frame was acquired this tick; nothing was submitted.
    Skipped,
    /// The device is gone.
    Failed,
}

/// Uniform parameters of the full-screen background primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BackgroundParams {
    pub transform: Mat4,
    pub color: [f32; 4],
    pub time: f32,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            color: [1.0; 4],
            time: 0.0,
        }
    }
}

impl BackgroundParams {
    /// Rotation speed of the background, degrees per second.
    pub const SPIN_DEG_PER_SEC: f32 = 16.0;

    /// Advances the time-driven part; the color is left to the application.
    pub fn animate(&mut self, time: f32) {
        self.time = time;
        self.transform = Mat4::from_rotation_z((time * Self::SPIN_DEG_PER_SEC).to_radians());
    }
}
