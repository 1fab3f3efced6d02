//! Raster surface operations
//!
//! Straight-alpha RGBA canvas with source-over blending. All geometry is in
//! f64 and every pixel is computed the same way on every run, so identical
//! inputs give identical bytes.

use image::{Rgba, RgbaImage};

use crate::model::Point;

/// Where and how a raster is drawn onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Destination rectangle before rotation.
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Rotation pivot in canvas space.
    pub pivot: Point,
    /// Degrees, clockwise on screen.
    pub rotation: f64,
    pub opacity: f64,
}

impl Placement {
    /// Rectangle with rotation about its own center.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            pivot: Point::new(x + w / 2.0, y + h / 2.0),
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    pub fn rotated_about(mut self, pivot: Point, degrees: f64) -> Self {
        self.pivot = pivot;
        self.rotation = degrees;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Premultiplied RGBA in 0..=1.
type Premul = [f64; 4];

fn premultiply(px: &Rgba<u8>) -> Premul {
    let a = px[3] as f64 / 255.0;
    [
        px[0] as f64 / 255.0 * a,
        px[1] as f64 / 255.0 * a,
        px[2] as f64 / 255.0 * a,
        a,
    ]
}

fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Source-over `src` onto `dst`, scaling the source by `opacity`.
fn blend(dst: &mut Rgba<u8>, src: Premul, opacity: f64) {
    let sa = src[3] * opacity;
    if sa <= 0.0 {
        return;
    }
    let d = premultiply(dst);
    let inv = 1.0 - sa;
    let out_a = sa + d[3] * inv;
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = to_u8((src[c] * opacity + d[c] * inv) / out_a);
    }
    out[3] = to_u8(out_a);
    *dst = Rgba(out);
}

/// Blend a straight-alpha colour with fractional `coverage` onto `dst`.
pub fn blend_color(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f64) {
    blend(dst, premultiply(&color), coverage.clamp(0.0, 1.0));
}

/// Bilinear sample at continuous texel coordinates, clamped to the edges.
fn sample(src: &RgbaImage, fx: f64, fy: f64) -> Premul {
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;
    let fx = fx.clamp(0.0, max_x);
    let fy = fy.clamp(0.0, max_y);
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);

    let p = |x: f64, y: f64| premultiply(src.get_pixel(x as u32, y as u32));
    let (a, b, c, d) = (p(x0, y0), p(x1, y0), p(x0, y1), p(x1, y1));

    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = a[i] + (b[i] - a[i]) * tx;
        let bottom = c[i] + (d[i] - c[i]) * tx;
        out[i] = top + (bottom - top) * ty;
    }
    out
}

/// Draw `src` stretched into the placement rectangle.
///
/// Every canvas pixel whose center falls inside the rotated rectangle is
/// mapped back into source space and sampled.
pub fn draw_image(canvas: &mut RgbaImage, src: &RgbaImage, placement: &Placement) {
    let Placement {
        x,
        y,
        w,
        h,
        pivot,
        rotation,
        opacity,
    } = *placement;
    if src.width() == 0 || src.height() == 0 || w <= 0.0 || h <= 0.0 || opacity <= 0.0 {
        return;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let forward = |px: f64, py: f64| {
        let (dx, dy) = (px - pivot.x, py - pivot.y);
        (pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
    };

    let corners = [forward(x, y), forward(x + w, y), forward(x, y + h), forward(x + w, y + h)];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let (cw, ch) = (canvas.width() as f64, canvas.height() as f64);
    let x_start = min_x.floor().clamp(0.0, cw) as u32;
    let x_end = max_x.ceil().clamp(0.0, cw) as u32;
    let y_start = min_y.floor().clamp(0.0, ch) as u32;
    let y_end = max_y.ceil().clamp(0.0, ch) as u32;

    let (sw, sh) = (src.width() as f64, src.height() as f64);

    for py in y_start..y_end {
        for px in x_start..x_end {
            let dx = px as f64 + 0.5 - pivot.x;
            let dy = py as f64 + 0.5 - pivot.y;
            let lx = pivot.x + dx * cos + dy * sin;
            let ly = pivot.y - dx * sin + dy * cos;

            let u = (lx - x) / w;
            let v = (ly - y) / h;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }

            let texel = sample(src, u * sw - 0.5, v * sh - 0.5);
            blend(canvas.get_pixel_mut(px, py), texel, opacity);
        }
    }
}

/// Composite the canvas over an opaque background colour.
pub fn flatten(canvas: &RgbaImage, background: Rgba<u8>) -> image::RgbImage {
    let mut out = image::RgbImage::new(canvas.width(), canvas.height());
    for (x, y, px) in canvas.enumerate_pixels() {
        let mut base = background;
        base[3] = 255;
        blend(&mut base, premultiply(px), 1.0);
        out.put_pixel(x, y, image::Rgb([base[0], base[1], base[2]]));
    }
    out
}
