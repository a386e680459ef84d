//! The model's analysis of a comic page: which word boxes belong together,
//! and what the text really says.

use std::fmt;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What kind of text a group contains.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum TextKind {
    Dialogue,
    Thought,
    Narration,
    SoundEffect,
    Background,
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextKind::Dialogue => write!(f, "dialogue"),
            TextKind::Thought => write!(f, "thought"),
            TextKind::Narration => write!(f, "narration"),
            TextKind::SoundEffect => write!(f, "sound_effect"),
            TextKind::Background => write!(f, "background"),
        }
    }
}

/// How the text in a group is drawn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum TextStyle {
    Normal,
    Emphasized,
    Angled,
    Split,
}

/// A single text bubble or caption, as described by the model.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Group {
    /// The panel containing this group.
    pub panel_id: String,
    /// The id of this bubble within its panel, e.g. `"1-2"`.
    pub text_bubble_id: String,
    /// The ids of the OCR word boxes making up this bubble.
    pub box_ids: Vec<String>,
    /// The OCR text before correction.
    pub original_text: String,
    /// The corrected text.
    pub cleaned_text: String,
    /// What kind of text this is.
    #[serde(rename = "type")]
    pub kind: TextKind,
    /// How the text is drawn.
    pub style: TextStyle,
    /// Corrections, doubts and reasons for including background text.
    pub notes: String,
}

/// The model's full reply for one page.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct ComicAnalysis {
    /// Every text group found on the page.
    pub groups: Vec<Group>,
}

/// Decode a model reply into a [`ComicAnalysis`].
///
/// We first try the standard `{"groups": [...]}` shape. Some models answer
/// with a bare `[...]` list of groups instead, which we accept, but we log a
/// warning because it means the model is drifting away from our schema. If
/// neither works, we report the error from the standard shape along with the
/// raw reply.
pub fn parse_analysis(raw: &str) -> Result<ComicAnalysis> {
    let json = strip_code_fence(raw);
    let err = match serde_json::from_str::<ComicAnalysis>(json) {
        Ok(analysis) => return Ok(analysis),
        Err(err) => err,
    };
    debug!("model reply is not a groups object: {}", err);
    match serde_json::from_str::<Vec<Group>>(json) {
        Ok(groups) => {
            warn!(
                "model returned a bare list of {} groups instead of an object; accepting it",
                groups.len()
            );
            Ok(ComicAnalysis { groups })
        }
        Err(_) => Err(Error::Validation {
            raw: raw.to_owned(),
            source: err,
        }),
    }
}

/// Models like to wrap JSON in Markdown code fences, even in JSON mode.
/// Replies are sometimes cut off, so we strip the opening and closing fences
/// independently.
fn strip_code_fence(raw: &str) -> &str {
    lazy_static! {
        static ref OPENING_FENCE: Regex = Regex::new(r"\A\s*```(?i:json)?").unwrap();
        static ref CLOSING_FENCE: Regex = Regex::new(r"```\s*\z").unwrap();
    }
    let mut json = raw;
    if let Some(m) = OPENING_FENCE.find(json) {
        json = &json[m.end()..];
    }
    if let Some(m) = CLOSING_FENCE.find(json) {
        json = &json[..m.start()];
    }
    json.trim()
}
