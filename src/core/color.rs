#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32, // Red component (0.0 - 1.0)
    pub g: f32, // Green component (0.0 - 1.0)
    pub b: f32, // Blue component (0.0 - 1.0)
}

impl Color {
    /// Create a new color with RGB components normalized.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from RGBA components by blending the alpha channel into RGB.
    /// Alpha value should be in the range 0.0 - 1.0.
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r * a, g * a, b * a)
    }

    /// Create a color from a packed `0xRRGGBB` value, the way colors are written in the
    /// scene configuration (`0xffffff` for the light, `0x000000` for the background).
    pub const fn from_hex_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Create a color from a hexadecimal string.
    /// Accepts formats like "#RRGGBB" or "RRGGBB".
    pub fn from_hex(hex: &str) -> Result<Self, &'static str> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return Err("Hex string should be 6 characters long (RRGGBB).");
        }
        let packed = u32::from_str_radix(hex, 16).map_err(|_| "Invalid hex digits")?;
        Ok(Self::from_hex_u32(packed))
    }

    /// Perceived brightness, used by the sprite tests and the terminal dimmer.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn scale(&self, k: f32) -> Color {
        Color::new(self.r * k, self.g * k, self.b * k)
    }

    /// Component-wise product (light color * albedo).
    pub fn modulate(&self, other: &Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    /// Additive blend, saturating at 1.0 like a fixed-point color target.
    pub fn add_clamped(&self, other: &Color) -> Color {
        Color::new(
            (self.r + other.r).min(1.0),
            (self.g + other.g).min(1.0),
            (self.b + other.b).min(1.0),
        )
    }

    pub fn clamped(&self) -> Color {
        Color::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    pub fn to_crossterm_color(&self) -> crossterm::style::Color {
        let c = self.clamped();
        crossterm::style::Color::Rgb {
            r: (c.r * 255.0) as u8,
            g: (c.g * 255.0) as u8,
            b: (c.b * 255.0) as u8,
        }
    }

    pub fn to_u32(&self) -> u32 {
        let c = self.clamped();
        let r = (c.r * 255.0) as u32;
        let g = (c.g * 255.0) as u32;
        let b = (c.b * 255.0) as u32;
        (r << 16) | (g << 8) | b
    }

    /// Inverse of [`Color::to_u32`], needed to read back minifb pixels for blending.
    pub fn from_u32(packed: u32) -> Color {
        Color::from_hex_u32(packed & 0x00FF_FFFF)
    }

    pub fn lerp(&self, end: &Color, t: f32) -> Color {
        Color {
            r: self.r + (end.r - self.r) * t,
            g: self.g + (end.g - self.g) * t,
            b: self.b + (end.b - self.b) * t,
        }
    }
}

// Predefined colors
impl Color {
    pub const BLACK: Color = Color::from_hex_u32(0x000000);
    pub const WHITE: Color = Color::from_hex_u32(0xFFFFFF);
    pub const GRAY: Color = Color::from_hex_u32(0x808080);
    pub const RED: Color = Color::from_hex_u32(0xFF0000);
    pub const GREEN: Color = Color::from_hex_u32(0x00FF00);
    pub const BLUE: Color = Color::from_hex_u32(0x0000FF);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE // Default to white color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms_agree() {
        let a = Color::from_hex("#ff8000").unwrap();
        let b = Color::from_hex_u32(0xff8000);
        assert_eq!(a, b);
        assert_eq!(a.to_u32(), 0xff8000);
        assert!(Color::from_hex("12345").is_err());
    }

    #[test]
    fn packed_round_trip_is_lossless_for_bytes() {
        let c = Color::from_u32(0x00_12_34_56);
        assert_eq!(c.to_u32(), 0x123456);
    }

    #[test]
    fn additive_blend_saturates() {
        let c = Color::new(0.8, 0.5, 0.0).add_clamped(&Color::new(0.5, 0.2, 0.1));
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.7).abs() < 1e-6);
        assert!((c.b - 0.1).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_colors_pack_clamped() {
        assert_eq!(Color::new(2.0, -1.0, 0.5).to_u32(), 0xFF007F);
    }
}
