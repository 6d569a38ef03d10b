//! Bounding-box rendering for stored images

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::Result;
use crate::models::{BoxColor, Face, FaceRectangle};

fn color_pixel(color: BoxColor) -> Rgba<u8> {
    match color {
        BoxColor::Red => Rgba([255, 0, 0, 255]),
        BoxColor::Green => Rgba([0, 255, 0, 255]),
        BoxColor::Blue => Rgba([0, 0, 255, 255]),
    }
}

/// Decode `image_bytes`, draw a one-pixel unfilled rectangle per face in
/// input order, and re-encode as PNG.
///
/// Pixel dimensions are preserved regardless of input format. Rectangles
/// extending past the canvas are clipped.
pub fn render(image_bytes: &[u8], faces: &[Face], color: BoxColor) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(image_bytes)?;
    let mut canvas = decoded.to_rgba8();

    let pixel = color_pixel(color);
    for face in faces {
        draw_outline(&mut canvas, &face.face_rectangle, pixel);
    }

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn draw_outline(canvas: &mut RgbaImage, rect: &FaceRectangle, pixel: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let right = rect.left.saturating_add(rect.width);
    let bottom = rect.top.saturating_add(rect.height);

    for x in rect.left..=right {
        if x >= width {
            break;
        }
        if rect.top < height {
            canvas.put_pixel(x, rect.top, pixel);
        }
        if bottom < height {
            canvas.put_pixel(x, bottom, pixel);
        }
    }

    for y in rect.top..=bottom {
        if y >= height {
            break;
        }
        if rect.left < width {
            canvas.put_pixel(rect.left, y, pixel);
        }
        if right < width {
            canvas.put_pixel(right, y, pixel);
        }
    }
}
