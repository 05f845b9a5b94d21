//! Procedural point sprite: a soft white disk painted as a radial gradient.

use crate::core::{Color, Texture};
use image::{Rgba, RgbaImage};

/// Edge length of the star sprite in pixels.
pub const STAR_SPRITE_SIZE: u32 = 50;

/// A color stop of a radial gradient. `offset` is relative to the outer radius.
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
    pub alpha: f32,
}

impl GradientStop {
    pub const fn opaque(offset: f32, color: Color) -> Self {
        Self {
            offset,
            color,
            alpha: 1.0,
        }
    }
}

/// Bright core out to 30% of the radius, faded to black by 60%, black to the edge.
pub const STAR_GRADIENT: [GradientStop; 4] = [
    GradientStop::opaque(0.0, Color::WHITE),
    GradientStop::opaque(0.3, Color::WHITE),
    GradientStop::opaque(0.6, Color::BLACK),
    GradientStop::opaque(1.0, Color::BLACK),
];

/// Color and alpha of a gradient at `t`, clamped to the first and last stop.
/// `stops` must be sorted by offset.
pub fn eval_gradient(stops: &[GradientStop], t: f32) -> (Color, f32) {
    let Some(first) = stops.first() else {
        return (Color::BLACK, 0.0);
    };
    if t <= first.offset {
        return (first.color, first.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return (a.color.lerp(&b.color, k), a.alpha + (b.alpha - a.alpha) * k);
        }
    }
    // stops is non-empty here
    let last = stops[stops.len() - 1];
    (last.color, last.alpha)
}

/// Paint a `size`x`size` radial gradient centered in the image, inner radius 0 and
/// outer radius `size / 2`. Pixels are evaluated at their centers.
pub fn paint_radial_gradient(size: u32, stops: &[GradientStop]) -> RgbaImage {
    let center = size as f32 / 2.0;
    let radius = size as f32 / 2.0;

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let t = ((dx * dx + dy * dy).sqrt() / radius).clamp(0.0, 1.0);
        let (color, alpha) = eval_gradient(stops, t);
        let c = color.clamped();
        Rgba([
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ])
    })
}

/// The soft round star texture: opaque white core fading to black at the rim.
pub fn generate_star_sprite(size: u32) -> RgbaImage {
    paint_radial_gradient(size, &STAR_GRADIENT)
}

/// The shared star sprite. Generated once at startup and handed to every star point.
pub struct StarSprite {
    pub image: RgbaImage,
}

impl StarSprite {
    pub fn generate() -> Self {
        Self {
            image: generate_star_sprite(STAR_SPRITE_SIZE),
        }
    }

    pub fn texture(&self) -> Texture {
        Texture::from_rgba(&self.image, "star_sprite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(img: &RgbaImage, x: u32, y: u32) -> u8 {
        let p = img.get_pixel(x, y);
        p[0].max(p[1]).max(p[2])
    }

    #[test]
    fn sprite_is_fifty_square_and_opaque() {
        let sprite = StarSprite::generate();
        assert_eq!(sprite.image.dimensions(), (50, 50));
        assert!(sprite.image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn center_is_white_and_edge_is_black() {
        let img = StarSprite::generate().image;
        assert_eq!(img.get_pixel(25, 25).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(24, 24).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 25).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(49, 25).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn brightness_never_increases_outward() {
        let img = StarSprite::generate().image;
        // along +x, -x, +y and the diagonal from the center pixel
        let rays: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (1, 1)];
        for (sx, sy) in rays {
            let mut prev = u8::MAX;
            let (mut x, mut y) = (25i32, 25i32);
            while (0..50).contains(&x) && (0..50).contains(&y) {
                let b = brightness(&img, x as u32, y as u32);
                assert!(b <= prev, "brightness rose at ({x}, {y})");
                prev = b;
                x += sx;
                y += sy;
            }
        }
    }

    #[test]
    fn gradient_clamps_outside_stops() {
        let (c, a) = eval_gradient(&STAR_GRADIENT, -1.0);
        assert_eq!((c, a), (Color::WHITE, 1.0));
        let (c, _) = eval_gradient(&STAR_GRADIENT, 2.0);
        assert_eq!(c, Color::BLACK);
        let (c, _) = eval_gradient(&STAR_GRADIENT, 0.45);
        assert!((c.r - 0.5).abs() < 1e-5);
    }

    #[test]
    fn sprite_texture_keeps_gradient() {
        let tex = StarSprite::generate().texture();
        assert_eq!((tex.width, tex.height), (50, 50));
        assert_eq!(tex.texel(25, 25), Color::WHITE);
        assert_eq!(tex.texel(0, 0), Color::BLACK);
    }
}
