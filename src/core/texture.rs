use crate::core::Color;
use crate::error::{DioramaError, Result};
use glam::Vec2;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use std::sync::Arc;

/// A decoded texture with sampling capabilities
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<Color>>,
    pub name: String,
}

impl Texture {
    /// Decode a texture from a file path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|source| DioramaError::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(&img, &path.display().to_string()))
    }

    pub fn from_image(img: &DynamicImage, name: &str) -> Self {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let data = rgb_img
            .pixels()
            .map(|p| Color::new(p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0))
            .collect();

        Texture {
            width,
            height,
            data: Arc::new(data),
            name: name.to_string(),
        }
    }

    /// Alpha is folded into the color, which is what additive sprites need.
    pub fn from_rgba(img: &RgbaImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| {
                Color::from_rgba(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                )
            })
            .collect();

        Texture {
            width,
            height,
            data: Arc::new(data),
            name: name.to_string(),
        }
    }

    /// Texel at integer coordinates, row 0 being the top of the image.
    pub fn texel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.data[(y * self.width + x) as usize]
    }

    /// Sample the texture at UV coordinates using bilinear filtering
    pub fn sample(&self, uv: Vec2) -> Color {
        self.sample_filtered(uv, TextureFilter::Bilinear)
    }

    /// Sample the texture with specified filtering
    ///
    /// UV (0, 0) is the bottom-left corner of the image.
    pub fn sample_filtered(&self, uv: Vec2, filter: TextureFilter) -> Color {
        let u = wrap_uv(uv.x);
        let v = wrap_uv(1.0 - uv.y);

        match filter {
            TextureFilter::Nearest => self.sample_nearest(u, v),
            TextureFilter::Bilinear => self.sample_bilinear(u, v),
        }
    }

    fn sample_nearest(&self, u: f32, v: f32) -> Color {
        let x = (u * self.width as f32) as u32;
        let y = (v * self.height as f32) as u32;
        self.texel(x, y)
    }

    fn sample_bilinear(&self, u: f32, v: f32) -> Color {
        let x_f = u * (self.width - 1) as f32;
        let y_f = v * (self.height - 1) as f32;

        let x0 = x_f.floor() as u32;
        let y0 = y_f.floor() as u32;

        let dx = x_f - x0 as f32;
        let dy = y_f - y0 as f32;

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let c0 = c00.lerp(&c10, dx);
        let c1 = c01.lerp(&c11, dx);
        c0.lerp(&c1, dy)
    }
}

fn wrap_uv(value: f32) -> f32 {
    value.rem_euclid(1.0)
}

/// Texture filtering modes
#[derive(Debug, Clone, Copy)]
pub enum TextureFilter {
    Nearest,
    Bilinear,
}
