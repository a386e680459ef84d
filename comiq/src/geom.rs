//! Geometry-related types, and conversion between pixel coordinates and the
//! normalized coordinates we show to the model.

use std::cmp::{max, min};

use serde::{Deserialize, Serialize};

/// The size of the virtual canvas used for normalized coordinates. Every
/// image is treated as `NORMALIZED_EXTENT` units wide and tall, regardless of
/// its resolution.
pub const NORMALIZED_EXTENT: i64 = 1000;

/// An axis-aligned rectangle, stored in `(ymin, xmin, ymax, xmax)` order.
///
/// Depending on where it came from, a `TextBox` may be in pixel coordinates
/// or in normalized coordinates. We don't clamp anything, so coordinates may
/// be negative or larger than the image if an OCR engine reports such a box.
///
/// In JSON, this is written as `[ymin, xmin, ymax, xmax]`, which is the form
/// the model sees.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct TextBox {
    /// The top edge.
    pub ymin: i32,
    /// The left edge.
    pub xmin: i32,
    /// The bottom edge.
    pub ymax: i32,
    /// The right edge.
    pub xmax: i32,
}

impl TextBox {
    /// Create a box from its edges, in `(ymin, xmin, ymax, xmax)` order.
    pub fn new(ymin: i32, xmin: i32, ymax: i32, xmax: i32) -> TextBox {
        TextBox {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    /// Create a box from a left and top edge plus a width and height.
    /// Edges which would overflow are clamped to the `i32` range.
    pub fn ltwh(left: i32, top: i32, width: i32, height: i32) -> TextBox {
        TextBox::new(
            top,
            left,
            top.saturating_add(height),
            left.saturating_add(width),
        )
    }

    /// Return the smallest box containing both this box and `other`.
    pub fn union(&self, other: &TextBox) -> TextBox {
        TextBox::new(
            min(self.ymin, other.ymin),
            min(self.xmin, other.xmin),
            max(self.ymax, other.ymax),
            max(self.xmax, other.xmax),
        )
    }

    /// Return the smallest box containing every box in `boxes`, or `None` if
    /// there are no boxes.
    pub fn envelope<'a, I>(boxes: I) -> Option<TextBox>
    where
        I: IntoIterator<Item = &'a TextBox>,
    {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(acc) => Some(acc.union(b)),
        })
    }

    /// Convert this box from pixel coordinates to normalized coordinates.
    pub fn to_normalized(&self, size: ImageSize) -> TextBox {
        TextBox::new(
            pixel_to_unit(self.ymin, size.height),
            pixel_to_unit(self.xmin, size.width),
            pixel_to_unit(self.ymax, size.height),
            pixel_to_unit(self.xmax, size.width),
        )
    }

    /// Convert this box from normalized coordinates back to pixel
    /// coordinates.
    pub fn to_pixel(&self, size: ImageSize) -> TextBox {
        TextBox::new(
            unit_to_pixel(self.ymin, size.height),
            unit_to_pixel(self.xmin, size.width),
            unit_to_pixel(self.ymax, size.height),
            unit_to_pixel(self.xmax, size.width),
        )
    }
}

impl From<[i32; 4]> for TextBox {
    fn from(b: [i32; 4]) -> Self {
        TextBox::new(b[0], b[1], b[2], b[3])
    }
}

impl From<TextBox> for [i32; 4] {
    fn from(b: TextBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

/// The dimensions of an image, in pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    /// Create a new `ImageSize`, or return `None` if either dimension is
    /// zero. We can't normalize coordinates against an empty image.
    pub fn new(width: u32, height: u32) -> Option<ImageSize> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(ImageSize { width, height })
        }
    }

    /// Width in pixels. Always positive.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels. Always positive.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Scale a pixel coordinate on an axis of length `extent` to normalized
/// units. Integer division truncates toward zero, and so does `unit_to_pixel`,
/// which keeps the round-trip error within one normalized unit.
fn pixel_to_unit(value: i32, extent: u32) -> i32 {
    saturate(i64::from(value) * NORMALIZED_EXTENT / i64::from(extent))
}

/// Scale a normalized coordinate back to pixels on an axis of length
/// `extent`.
fn unit_to_pixel(value: i32, extent: u32) -> i32 {
    saturate(i64::from(value) * i64::from(extent) / NORMALIZED_EXTENT)
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Convert a list of boxes from pixel coordinates to normalized coordinates.
pub fn to_normalized<T: HasTextBox + Clone>(items: &[T], size: ImageSize) -> Vec<T> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            let b = item.text_box().to_normalized(size);
            *item.text_box_mut() = b;
            item
        })
        .collect()
}

/// Convert a list of boxes from normalized coordinates to pixel coordinates.
pub fn to_pixel<T: HasTextBox + Clone>(items: &[T], size: ImageSize) -> Vec<T> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            let b = item.text_box().to_pixel(size);
            *item.text_box_mut() = b;
            item
        })
        .collect()
}

/// Anything which carries a [`TextBox`] that can be rescaled.
pub trait HasTextBox {
    /// The box.
    fn text_box(&self) -> &TextBox;

    /// A mutable reference to the box.
    fn text_box_mut(&mut self) -> &mut TextBox;
}

impl HasTextBox for TextBox {
    fn text_box(&self) -> &TextBox {
        self
    }

    fn text_box_mut(&mut self) -> &mut TextBox {
        self
    }
}
