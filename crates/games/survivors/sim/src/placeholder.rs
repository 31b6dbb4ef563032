//! Generated stand-in art for sprites that failed to load.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |hash, &b| (hash ^ b as u32).wrapping_mul(FNV_PRIME))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub shape: Shape,
    pub color: [u8; 4],
}

impl Placeholder {
    /// Same key, same placeholder.
    pub fn for_key(key: &str) -> Self {
        let hash = fnv1a(key.as_bytes());
        let shape = match hash & 0b11 {
            0 => Shape::Circle,
            1 => Shape::Square,
            2 => Shape::Triangle,
            _ => Shape::Diamond,
        };
        // Keep channels away from black so shapes read on dark backgrounds.
        let channel = |shift: u32| 64 + ((hash >> shift) & 0xff) as u8 / 2 + 32;
        Self {
            shape,
            color: [channel(8), channel(16), channel(24), 255],
        }
    }

    fn covers(&self, x: f32, y: f32) -> bool {
        // x, y in [-1, 1]
        match self.shape {
            Shape::Circle => x * x + y * y <= 0.8 * 0.8,
            Shape::Square => x.abs() <= 0.7 && y.abs() <= 0.7,
            Shape::Diamond => x.abs() + y.abs() <= 0.85,
            Shape::Triangle => {
                // Apex at the top, base at y = 0.75.
                y >= -0.8 && y <= 0.75 && x.abs() <= (y + 0.8) / 1.55 * 0.8
            }
        }
    }

    /// Row-major RGBA pixels of a `size` x `size` image with a transparent
    /// background.
    pub fn rasterize(&self, size: u32) -> Vec<u8> {
        let mut pixels = vec![0u8; (size * size * 4) as usize];
        if size == 0 {
            return pixels;
        }
        let scale = 2.0 / size as f32;
        for py in 0..size {
            for px in 0..size {
                let x = (px as f32 + 0.5) * scale - 1.0;
                let y = (py as f32 + 0.5) * scale - 1.0;
                if self.covers(x, y) {
                    let i = ((py * size + px) * 4) as usize;
                    pixels[i..i + 4].copy_from_slice(&self.color);
                }
            }
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn placeholders_are_deterministic() {
        let a = Placeholder::for_key("sprite/0004/Walk");
        assert_eq!(a, Placeholder::for_key("sprite/0004/Walk"));
        assert_eq!(a.color[3], 255);
        assert!(a.color[..3].iter().all(|&c| c >= 96));
    }

    #[test]
    fn rasterized_shapes_fill_the_center_only() {
        for shape in [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Diamond] {
            let p = Placeholder {
                shape,
                color: [200, 100, 50, 255],
            };
            let pixels = p.rasterize(16);
            assert_eq!(pixels.len(), 16 * 16 * 4);
            let center = ((8 * 16 + 8) * 4) as usize;
            assert_eq!(&pixels[center..center + 4], &[200, 100, 50, 255], "{:?}", shape);
            assert_eq!(&pixels[0..4], &[0, 0, 0, 0], "{:?}", shape);
        }
    }
}
