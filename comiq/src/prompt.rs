//! The instructions we give the model.

use crate::boxes::IdentifiedBox;

/// Build the full instruction for grouping `boxes`, which must already be in
/// normalized coordinates.
pub fn instruction(boxes: &[IdentifiedBox]) -> String {
    let locations =
        serde_json::to_string_pretty(boxes).expect("failed to format JSON");
    format!(
        "{preamble}
OCR word boxes. Each `text_box` is [ymin, xmin, ymax, xmax] on a 1000x1000 grid covering the whole image:

```json
{locations}
```

{output_format}",
        preamble = PREAMBLE,
        locations = locations,
        output_format = OUTPUT_FORMAT,
    )
}

const PREAMBLE: &str = "\
You are reading a comic page. You are given the page image and the word boxes an OCR engine found on it. Group the word boxes into the text elements of the comic, and correct the OCR mistakes in each one.

Instructions:

1. Grouping. Put every word box that belongs to the same speech bubble, thought bubble, caption or sound effect into one group, referring to boxes by their `id`. Use the positions of the boxes and the artwork itself (panel borders, bubble outlines) to decide. Never put text from two different panels in the same group.

2. Numbering. Number the panels in reading order, starting at \"1\". Number the groups within each panel as \"<panel>-<n>\", e.g. \"2-3\".

3. Cleaning. Give the text of each group as it is actually printed: fix misread characters, wrongly split or joined words, punctuation and capitalization. Keep the original OCR text alongside it.

4. Types. Classify each group:
   - dialogue: speech bubbles, usually with a tail pointing at the speaker.
   - thought: cloud-shaped bubbles or similar.
   - narration: caption boxes, often at the top or bottom of a panel.
   - sound_effect: stylized lettering for sounds.
   - background: signs, posters and other text inside the scene.

5. Styles. Describe the lettering as normal, emphasized (bold, large or shouted), angled (rotated or curved) or split (one element broken across several places).

6. Selectivity. Only include sound effects and background text if they matter to the story. Leave out purely decorative lettering. When in doubt, leave it out.

7. Notes. Use `notes` to explain significant corrections, doubts, and why any sound effect or background text was included. Write \"none\" if there is nothing to say.
";

const OUTPUT_FORMAT: &str = r#"Reply with a single JSON object in exactly this format:

{
  "groups": [
    {
      "panel_id": "1",
      "text_bubble_id": "1-1",
      "box_ids": ["0", "1", "2"],
      "original_text": "the OCR text before cleaning",
      "cleaned_text": "The corrected text.",
      "type": "dialogue|thought|narration|sound_effect|background",
      "style": "normal|emphasized|angled|split",
      "notes": "none"
    }
  ]
}"#;
