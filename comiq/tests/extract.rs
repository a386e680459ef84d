//! Run the whole pipeline, with stand-ins for the OCR engine and the model.

use std::sync::Mutex;

use async_trait::async_trait;
use comiq::{
    AiParams, DetectedBox, EngineOptions, Error, Extractor, MergedBubble, MultimodalModel,
    OcrEngine, OcrRegistry, Result, TextBox, TextKind, TextStyle,
};
use image::DynamicImage;

/// Pretends to find three words, all of which land exactly on the normalized
/// grid for a 200x100 image.
struct FakeOcr;

impl OcrEngine for FakeOcr {
    fn detect(
        &self,
        image: &DynamicImage,
        options: &EngineOptions,
    ) -> anyhow::Result<Vec<DetectedBox>> {
        assert_eq!((image.width(), image.height()), (200, 100));
        assert_eq!(options["lang"], "eng");
        Ok(vec![
            DetectedBox::new(TextBox::new(10, 20, 30, 60), "HOLY"),
            DetectedBox::new(TextBox::new(12, 70, 28, 120), "GUACAM0LE"),
            DetectedBox::new(TextBox::new(50, 100, 90, 180), "KRAK"),
        ])
    }
}

const REPLY: &str = r#"```json
{
  "groups": [
    {
      "panel_id": "1",
      "text_bubble_id": "1-1",
      "box_ids": ["0", "1"],
      "original_text": "HOLY GUACAM0LE",
      "cleaned_text": "Holy guacamole!",
      "type": "dialogue",
      "style": "emphasized",
      "notes": "fixed 0 -> O"
    },
    {
      "panel_id": "1",
      "text_bubble_id": "1-2",
      "box_ids": ["2", "7"],
      "original_text": "KRAK",
      "cleaned_text": "KRAK!",
      "type": "sound_effect",
      "style": "angled",
      "notes": "thunder"
    },
    {
      "panel_id": "2",
      "text_bubble_id": "2-1",
      "box_ids": ["9"],
      "original_text": "???",
      "cleaned_text": "???",
      "type": "background",
      "style": "normal",
      "notes": "none"
    }
  ]
}
```"#;

/// Checks that it was shown normalized boxes, and gives a canned reply.
struct FakeModel {
    instructions: Mutex<Vec<String>>,
}

#[async_trait]
impl MultimodalModel for FakeModel {
    async fn generate(
        &self,
        image: &DynamicImage,
        instruction: &str,
        params: &AiParams,
    ) -> Result<String> {
        assert_eq!((image.width(), image.height()), (200, 100));
        assert_eq!(params.temperature, 0.25);
        self.instructions.lock().unwrap().push(instruction.to_owned());
        Ok(REPLY.to_owned())
    }
}

fn extractor() -> Extractor {
    let mut registry = OcrRegistry::new();
    registry.register("fake", FakeOcr);
    let mut options = EngineOptions::new();
    options.insert("lang".to_owned(), "eng".into());
    Extractor::new(
        registry,
        FakeModel {
            instructions: Mutex::new(vec![]),
        },
    )
    .engine_options("fake", options)
    .ai_params(AiParams {
        temperature: 0.25,
        ..AiParams::default()
    })
}

#[tokio::test]
async fn extracts_bubbles_in_pixel_coordinates() {
    let _ = env_logger::builder().is_test(true).try_init();
    let page = DynamicImage::new_rgb8(200, 100);
    let bubbles = extractor().extract(&page, &["fake"]).await.unwrap();
    assert_eq!(
        bubbles,
        vec![
            MergedBubble {
                text_box: TextBox::new(10, 20, 30, 120),
                text: "Holy guacamole!".to_owned(),
                panel_id: "1".to_owned(),
                text_bubble_id: "1-1".to_owned(),
                kind: TextKind::Dialogue,
                style: TextStyle::Emphasized,
            },
            MergedBubble {
                text_box: TextBox::new(50, 100, 90, 180),
                text: "KRAK!".to_owned(),
                panel_id: "1".to_owned(),
                text_bubble_id: "1-2".to_owned(),
                kind: TextKind::SoundEffect,
                style: TextStyle::Angled,
            },
        ]
    );
}

#[tokio::test]
async fn running_an_engine_twice_duplicates_its_boxes() {
    let page = DynamicImage::new_rgb8(200, 100);
    let bubbles = extractor()
        .extract(&page, &["fake", "fake"])
        .await
        .unwrap();
    // Ids 3-5 are the second copy, which the model never mentions.
    assert_eq!(bubbles.len(), 2);
}

#[tokio::test]
async fn unknown_engine_lists_registered_engines() {
    let page = DynamicImage::new_rgb8(200, 100);
    let err = extractor()
        .extract(&page, &["fake", "tesseract"])
        .await
        .unwrap_err();
    match err {
        Error::UnknownEngine { name, available } => {
            assert_eq!(name, "tesseract");
            assert_eq!(available, vec!["fake".to_owned()]);
        }
        other => panic!("unexpected error: {}", other),
    }
}
