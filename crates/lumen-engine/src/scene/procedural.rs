use std::f32::consts::PI;

use image::{Rgba, RgbaImage};

/// Produces a texture for a given refresh index.
pub trait TextureGenerator: Send {
    fn generate(&self, frame: u32) -> RgbaImage;
}

/// Animated XOR pattern pushed through three phase-shifted cosines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PatternTexture {
    pub size: u32,
}

impl PatternTexture {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn texel(x: u32, y: u32, frame: u32) -> Rgba<u8> {
        let pattern = x.wrapping_sub(frame ^ y) ^ y.wrapping_add(frame ^ x);
        let v = (pattern & 255) as f32 / 63.0;
        let channel = |phase: f32| ((phase + v).cos() * 127.5 + 127.5) as u8;
        Rgba([channel(PI), channel(PI * 0.5), channel(0.0), 255])
    }
}

impl TextureGenerator for PatternTexture {
    fn generate(&self, frame: u32) -> RgbaImage {
        RgbaImage::from_fn(self.size, self.size, |x, y| Self::texel(x, y, frame))
    }
}
