//! Find the text bubbles on comic pages, and read them.
//!
//! OCR engines are good at finding words, but bad at telling which words
//! belong together, and they misread stylized lettering. Multimodal language
//! models are the opposite: they can read a page, but can't tell you exactly
//! where anything is. So we do both:
//!
//! 1. Clean up the image, and run one or more OCR engines to find words.
//! 2. Rescale the word boxes to a 1000x1000 grid, and give each one an id.
//! 3. Show the model the image and the boxes, and ask it to group the boxes
//!    into speech bubbles, captions and so on, and to correct the text.
//! 4. Merge each group's boxes into one box, and scale back to pixels.
//!
//! ```no_run
//! use comiq::{config::Config, Extractor};
//!
//! # async fn example() -> comiq::Result<()> {
//! let config = Config::default();
//! let extractor = Extractor::new(config.registry(), config.model()?);
//! let bubbles = extractor
//!     .extract_path("page.png".as_ref(), &["tesseract"])
//!     .await?;
//! for bubble in bubbles {
//!     println!("{} {:?}: {}", bubble.text_bubble_id, bubble.text_box, bubble.text);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub use self::{
    ai::{group_boxes, AiParams, MultimodalModel},
    analysis::{parse_analysis, ComicAnalysis, Group, TextKind, TextStyle},
    boxes::{assign_ids, DetectedBox, IdentifiedBox},
    errors::{Error, Result},
    geom::{to_normalized, to_pixel, ImageSize, TextBox},
    merge::{merge_groups, MergedBubble},
    ocr::{EngineOptions, OcrEngine, OcrRegistry},
    pipeline::Extractor,
    preprocess::preprocess_image,
};

pub mod ai;
pub mod analysis;
pub mod boxes;
pub mod config;
pub mod errors;
pub mod geom;
pub mod merge;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
mod prompt;
pub mod services;
