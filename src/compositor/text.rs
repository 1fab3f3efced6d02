//! Text layout
//!
//! Greedy word wrap against a [`Typesetter`]'s measurements. Lines are laid
//! out top-down at `font_size * 1.3` spacing, anchored horizontally by the
//! style's alignment.

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::model::{Point, TextAlign, TextStyle};

/// Measures and rasterizes single lines of text.
pub trait Typesetter: Send + Sync {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, style: &TextStyle) -> Result<f64>;

    /// Draw `text` with the top of its em box at `origin.y` and its left edge
    /// at `origin.x`.
    fn draw_line(
        &self,
        target: &mut RgbaImage,
        text: &str,
        style: &TextStyle,
        origin: Point,
        color: Rgba<u8>,
    ) -> Result<()>;
}

/// One positioned line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub text: String,
    /// Left edge after alignment.
    pub x: f64,
    /// Top of the line.
    pub y: f64,
    pub width: f64,
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words split on single spaces. A word is appended while the trial line
/// still fits; otherwise the line breaks before it. A single word wider than
/// the box stays on its own line.
pub fn wrap_lines<F>(text: &str, max_width: f64, mut measure: F) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<f64>,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let trial = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure(&trial)? > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = trial;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// Wrap and position `text` inside a box at `position` of width `box_width`.
pub fn layout_lines(
    typesetter: &dyn Typesetter,
    text: &str,
    style: &TextStyle,
    position: Point,
    box_width: f64,
) -> Result<Vec<LineLayout>> {
    let lines = wrap_lines(text, box_width, |s| typesetter.measure(s, style))?;
    let anchor = match style.align {
        TextAlign::Left => position.x,
        TextAlign::Center => position.x + box_width / 2.0,
        TextAlign::Right => position.x + box_width,
    };

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let width = typesetter.measure(&line, style)?;
            let x = match style.align {
                TextAlign::Left => anchor,
                TextAlign::Center => anchor - width / 2.0,
                TextAlign::Right => anchor - width,
            };
            Ok(LineLayout {
                text: line,
                x,
                y: position.y + i as f64 * style.line_height(),
                width,
            })
        })
        .collect()
}
