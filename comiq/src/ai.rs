//! Interface to multimodal language models, which can look at a page and
//! tell us how its words fit together.

use async_trait::async_trait;
use image::DynamicImage;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{parse_analysis, ComicAnalysis},
    boxes::IdentifiedBox,
    prompt::instruction,
    Result,
};

/// Sampling parameters for model requests. These are passed through to the
/// model provider without any validation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AiParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling probability mass.
    pub top_p: f32,
}

impl Default for AiParams {
    fn default() -> Self {
        AiParams {
            temperature: 0.0,
            top_p: 1.0,
        }
    }
}

/// A model which can answer a text instruction about an image.
///
/// This is intended to support multiple AI services, not just OpenAI.
#[async_trait]
pub trait MultimodalModel: Send + Sync {
    /// Send `image` and `instruction` to the model, and return its raw reply,
    /// which should be JSON.
    async fn generate(
        &self,
        image: &DynamicImage,
        instruction: &str,
        params: &AiParams,
    ) -> Result<String>;
}

/// Ask `model` to group `boxes`, which must be in normalized coordinates.
///
/// This makes exactly one request. If it fails, we don't retry.
pub async fn group_boxes(
    model: &dyn MultimodalModel,
    image: &DynamicImage,
    boxes: &[IdentifiedBox],
    params: &AiParams,
) -> Result<ComicAnalysis> {
    let prompt = instruction(boxes);
    trace!("model instruction: {}", prompt);
    let reply = model.generate(image, &prompt, params).await?;
    debug!("model reply: {}", reply);
    parse_analysis(&reply)
}
