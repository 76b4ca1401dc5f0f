//! services/api/src/adapters/image_gen.rs
//!
//! This module contains the adapter for the image model. It implements both
//! `ImageGenerationService` and `ImageEditingService` from the `core` crate.

use async_trait::async_trait;
use studymate_core::{
    domain::{AspectRatio, ImageData},
    ports::{ImageEditingService, ImageGenerationService, PortResult},
};
use tracing::warn;

use super::gemini::{GeminiClient, GenerateContentRequest, Part};

#[derive(Clone)]
pub struct GeminiImageAdapter {
    client: GeminiClient,
    model: String,
}

impl GeminiImageAdapter {
    pub fn new(client: GeminiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageAdapter {
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> PortResult<Option<ImageData>> {
        let request =
            GenerateContentRequest::new(vec![Part::text(prompt)]).with_aspect_ratio(aspect_ratio);
        let response = self.client.generate_content(&self.model, &request).await?;

        let image = response.last_image();
        if image.is_none() {
            warn!("Image model answered without an image ({})", aspect_ratio.as_str());
        }
        Ok(image)
    }
}

#[async_trait]
impl ImageEditingService for GeminiImageAdapter {
    async fn edit_image(
        &self,
        image: &ImageData,
        instruction: &str,
    ) -> PortResult<Option<ImageData>> {
        let request =
            GenerateContentRequest::new(vec![Part::image(image), Part::text(instruction)]);
        let response = self.client.generate_content(&self.model, &request).await?;
        Ok(response.last_image())
    }
}
