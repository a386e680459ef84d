//! Word boxes reported by OCR engines, and the ids we attach to them so that
//! the model can refer to them.

use serde::{Deserialize, Serialize};

use crate::geom::{HasTextBox, TextBox};

/// A piece of text found by an OCR engine.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct DetectedBox {
    /// Where the text was found.
    pub text_box: TextBox,
    /// The text, exactly as the engine read it.
    pub text: String,
}

impl DetectedBox {
    /// Create a new `DetectedBox`.
    pub fn new<S: Into<String>>(text_box: TextBox, text: S) -> DetectedBox {
        DetectedBox {
            text_box,
            text: text.into(),
        }
    }
}

impl HasTextBox for DetectedBox {
    fn text_box(&self) -> &TextBox {
        &self.text_box
    }

    fn text_box_mut(&mut self) -> &mut TextBox {
        &mut self.text_box
    }
}

/// A [`DetectedBox`] with an id which is unique within one extraction run.
///
/// This is also what we show the model, so field order matters a little: it
/// appears in the prompt.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct IdentifiedBox {
    /// Where the text was found.
    pub text_box: TextBox,
    /// The text, exactly as the engine read it.
    pub text: String,
    /// Our id for this box.
    pub id: String,
}

impl HasTextBox for IdentifiedBox {
    fn text_box(&self) -> &TextBox {
        &self.text_box
    }

    fn text_box_mut(&mut self) -> &mut TextBox {
        &mut self.text_box
    }
}

/// Attach sequential ids (`"0"`, `"1"`, ...) to `boxes`, in order.
pub fn assign_ids(boxes: Vec<DetectedBox>) -> Vec<IdentifiedBox> {
    boxes
        .into_iter()
        .enumerate()
        .map(|(i, b)| IdentifiedBox {
            text_box: b.text_box,
            text: b.text,
            id: i.to_string(),
        })
        .collect()
}
