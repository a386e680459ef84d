//! OpenAI-compatible chat client.
//!
//! Many providers (including Google's Gemini) offer an OpenAI-compatible
//! endpoint, so this is the only model backend we ship.

use std::io::Cursor;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPart,
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        ChatCompletionResponseFormat, ChatCompletionResponseFormatType,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageUrlArgs,
        ImageUrlDetail, Role,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageOutputFormat};
use log::debug;

use crate::{
    ai::{AiParams, MultimodalModel},
    Error, Result,
};

/// A multimodal model reached over an OpenAI-compatible API.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModel {
    /// Create a new model client. If `base_url` is `None`, we talk to OpenAI
    /// itself.
    pub fn new(api_key: &str, base_url: Option<&str>, model: &str) -> OpenAiModel {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            // `async-openai` appends paths like "/chat/completions" itself.
            config = config.with_api_base(base_url.trim_end_matches('/'));
        }
        OpenAiModel {
            client: Client::with_config(config),
            model: model.to_owned(),
        }
    }
}

#[async_trait]
impl MultimodalModel for OpenAiModel {
    async fn generate(
        &self,
        image: &DynamicImage,
        instruction: &str,
        params: &AiParams,
    ) -> Result<String> {
        let image_url = png_data_url(image)?;
        let message = image_message(instruction, image_url).map_err(model_error)?;
        let req = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message])
            .response_format(ChatCompletionResponseFormat {
                r#type: ChatCompletionResponseFormatType::JsonObject,
            })
            .temperature(params.temperature)
            .top_p(params.top_p)
            .build()
            .map_err(model_error)?;
        debug!(
            "sending {} bytes of instruction to {}",
            instruction.len(),
            self.model
        );
        let resp = self.client.chat().create(req).await.map_err(model_error)?;
        response_content(resp)
    }
}

fn model_error<E>(err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::Model {
        source: Box::new(err),
    }
}

/// Encode `image` as a `data:` URL containing a PNG.
fn png_data_url(image: &DynamicImage) -> Result<String> {
    let mut png = vec![];
    image.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

/// Generate a user message containing an instruction and an image.
fn image_message(
    instruction: &str,
    image_url: String,
) -> Result<ChatCompletionRequestMessage, async_openai::error::OpenAIError> {
    let text = ChatCompletionRequestMessageContentPartTextArgs::default()
        .r#type("text")
        .text(instruction)
        .build()?;
    let image = ChatCompletionRequestMessageContentPartImageArgs::default()
        .r#type("image_url")
        .image_url(
            ImageUrlArgs::default()
                .url(image_url)
                .detail(ImageUrlDetail::High)
                .build()?,
        )
        .build()?;
    Ok(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessage {
            role: Role::User,
            content: ChatCompletionRequestUserMessageContent::Array(vec![
                ChatCompletionRequestMessageContentPart::Text(text),
                ChatCompletionRequestMessageContentPart::Image(image),
            ]),
            name: None,
        },
    ))
}

/// Extract the text of the first choice in a chat response.
fn response_content(resp: CreateChatCompletionResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(Error::EmptyResponse)
}
