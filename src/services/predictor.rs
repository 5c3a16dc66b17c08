use reqwest::multipart::{Form, Part};

use crate::error::AnalyzeError;
use crate::models::{NutritionResult, SelectedImage};

pub const DEFAULT_PREDICT_URL: &str = "http://localhost:8000/api/predict/";

/// Multipart field the predictor reads the upload from.
pub const IMAGE_FIELD: &str = "image";

/// Anything that can turn a food image into a macronutrient estimate.
#[async_trait::async_trait]
pub trait NutritionPredictor: Send + Sync {
    async fn predict(&self, image: &SelectedImage) -> Result<NutritionResult, AnalyzeError>;
}

/// Remote prediction endpoint reached with a single multipart POST.
pub struct HttpPredictor {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(image: &SelectedImage) -> Result<Form, AnalyzeError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

impl Default for HttpPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_PREDICT_URL.to_string())
    }
}

#[async_trait::async_trait]
impl NutritionPredictor for HttpPredictor {
    async fn predict(&self, image: &SelectedImage) -> Result<NutritionResult, AnalyzeError> {
        log::info!(
            "🤖 Sending {} ({} bytes, {}) to {}",
            image.name,
            image.size(),
            image.mime_type,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(image)?)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Predictor response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Predictor error ({}): {}", status, error_text);
            return Err(AnalyzeError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        log::debug!("📄 Raw predictor response size: {} bytes", body.len());

        let nutrition = NutritionResult::from_json(&body)?;
        log::info!(
            "✅ Prediction received: {} kcal, fat {} g, carbs {} g, protein {} g",
            nutrition.calories,
            nutrition.fat,
            nutrition.carbs,
            nutrition.protein
        );

        Ok(nutrition)
    }
}
