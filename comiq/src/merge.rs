//! Merge the word boxes in each model-declared group into a single text
//! bubble.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{ComicAnalysis, TextKind, TextStyle},
    boxes::IdentifiedBox,
    geom::{HasTextBox, TextBox},
};

/// A finished text bubble.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct MergedBubble {
    /// The smallest box containing every word in the bubble.
    pub text_box: TextBox,
    /// The corrected text of the bubble.
    pub text: String,
    /// The panel containing this bubble.
    pub panel_id: String,
    /// The id of this bubble within its panel.
    pub text_bubble_id: String,
    /// What kind of text this is.
    #[serde(rename = "type")]
    pub kind: TextKind,
    /// How the text is drawn.
    pub style: TextStyle,
}

impl HasTextBox for MergedBubble {
    fn text_box(&self) -> &TextBox {
        &self.text_box
    }

    fn text_box_mut(&mut self) -> &mut TextBox {
        &mut self.text_box
    }
}

/// Build one [`MergedBubble`] per group in `analysis`, in the same order.
///
/// Box ids which don't exist in `boxes` are skipped, because models sometimes
/// invent them. A group which doesn't match any box at all is dropped. The
/// output is in whatever coordinate space `boxes` uses.
pub fn merge_groups(analysis: &ComicAnalysis, boxes: &[IdentifiedBox]) -> Vec<MergedBubble> {
    let by_id = boxes
        .iter()
        .map(|b| (b.id.as_str(), &b.text_box))
        .collect::<HashMap<_, _>>();

    let mut merged = vec![];
    for group in &analysis.groups {
        let resolved = group.box_ids.iter().filter_map(|id| {
            let found = by_id.get(id.as_str()).copied();
            if found.is_none() {
                debug!(
                    "group {} refers to unknown box id {:?}, skipping it",
                    group.text_bubble_id, id
                );
            }
            found
        });
        match TextBox::envelope(resolved) {
            Some(text_box) => merged.push(MergedBubble {
                text_box,
                text: group.cleaned_text.clone(),
                panel_id: group.panel_id.clone(),
                text_bubble_id: group.text_bubble_id.clone(),
                kind: group.kind,
                style: group.style,
            }),
            None => debug!(
                "dropping group {} because none of its boxes exist: {:?}",
                group.text_bubble_id, group.box_ids
            ),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Group;

    fn boxes(entries: &[(&str, [i32; 4])]) -> Vec<IdentifiedBox> {
        entries.iter()
            .map(|(id, b)| IdentifiedBox {
                text_box: TextBox::from(*b),
                text: format!("text{}", id),
                id: (*id).to_owned(),
            })
            .collect()
    }

    fn group(bubble: &str, ids: &[&str]) -> Group {
        Group {
            panel_id: "1".to_owned(),
            text_bubble_id: bubble.to_owned(),
            box_ids: ids.iter().map(|&id| id.to_owned()).collect(),
            original_text: "raw".to_owned(),
            cleaned_text: format!("cleaned {}", bubble),
            kind: TextKind::Narration,
            style: TextStyle::Emphasized,
            notes: "none".to_owned(),
        }
    }

    fn analysis(groups: Vec<Group>) -> ComicAnalysis {
        ComicAnalysis { groups }
    }

    #[test]
    fn merges_into_envelope() {
        let boxes = boxes(&[("0", [0, 0, 10, 10]), ("1", [5, 5, 15, 15])]);
        let merged = merge_groups(&analysis(vec![group("1-1", &["0", "1"])]), &boxes);
        assert_eq!(
            merged,
            vec![MergedBubble {
                text_box: TextBox::new(0, 0, 15, 15),
                text: "cleaned 1-1".to_owned(),
                panel_id: "1".to_owned(),
                text_bubble_id: "1-1".to_owned(),
                kind: TextKind::Narration,
                style: TextStyle::Emphasized,
            }]
        );
    }

    #[test]
    fn skips_dangling_ids() {
        let boxes = boxes(&[("0", [0, 0, 10, 10])]);
        let merged =
            merge_groups(&analysis(vec![group("1-1", &["0", "missing"])]), &boxes);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text_box, TextBox::new(0, 0, 10, 10));
    }

    #[test]
    fn drops_groups_without_any_boxes() {
        let boxes = boxes(&[("0", [0, 0, 10, 10]), ("1", [20, 20, 30, 30])]);
        let groups = vec![
            group("1-1", &["0"]),
            group("1-2", &["nope", "never"]),
            group("1-3", &[]),
            group("1-4", &["1"]),
        ];
        let merged = merge_groups(&analysis(groups), &boxes);
        let ids = merged
            .iter()
            .map(|m| m.text_bubble_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["1-1", "1-4"]);
    }

    #[test]
    fn keeps_group_order_and_allows_shared_boxes() {
        let boxes = boxes(&[("0", [0, 0, 10, 10]), ("1", [5, 5, 15, 15])]);
        let groups = vec![group("2-1", &["1"]), group("1-1", &["1", "0"])];
        let merged = merge_groups(&analysis(groups), &boxes);
        assert_eq!(merged[0].text_bubble_id, "2-1");
        assert_eq!(merged[0].text_box, TextBox::new(5, 5, 15, 15));
        assert_eq!(merged[1].text_box, TextBox::new(0, 0, 15, 15));
    }

    #[test]
    fn serializes_kind_as_type() {
        let boxes = boxes(&[("0", [0, 0, 10, 10])]);
        let merged = merge_groups(&analysis(vec![group("1-1", &["0"])]), &boxes);
        let json = serde_json::to_value(&merged[0]).unwrap();
        assert_eq!(json["type"], "narration");
        assert_eq!(json["style"], "emphasized");
        assert_eq!(json["text_box"], serde_json::json!([0, 0, 10, 10]));
    }
}
