use serde::Deserialize;

use crate::error::AnalyzeError;

/// A single user-picked image file, owned for the duration of one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Inline-displayable rendition of a [`SelectedImage`] (a `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub data_url: String,
}

/// An image together with its preview; the two never exist apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub image: SelectedImage,
    pub preview: ImagePreview,
}

/// Macronutrient estimate returned by the predictor.
/// Calories are kcal, the rest grams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionResult {
    pub calories: f64,
    pub fat: f64,
    pub carbs: f64,
    pub protein: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PredictionBody {
    calories: f64,
    fat: f64,
    carbs: f64,
    protein: f64,
}

impl NutritionResult {
    /// Decode and validate a predictor response body.
    pub fn from_json(body: &[u8]) -> Result<Self, AnalyzeError> {
        let raw: PredictionBody = serde_json::from_slice(body)
            .map_err(|e| AnalyzeError::Request(format!("Invalid prediction response: {}", e)))?;

        let fields = [
            ("calories", raw.calories),
            ("fat", raw.fat),
            ("carbs", raw.carbs),
            ("protein", raw.protein),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyzeError::Request(format!(
                    "Invalid prediction response: {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            calories: raw.calories,
            fat: raw.fat,
            carbs: raw.carbs,
            protein: raw.protein,
        })
    }
}

/// Where the uploader currently is. Each variant carries exactly the data
/// that is meaningful in it, so e.g. a result and an error can never coexist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Empty,
    Previewing(Selection),
    Analyzing {
        selection: Selection,
        generation: u64,
    },
    Result {
        selection: Selection,
        nutrition: NutritionResult,
    },
    /// `selection` is `None` when analyze was attempted with nothing selected.
    Failed {
        selection: Option<Selection>,
        error: String,
    },
}

impl InteractionState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            InteractionState::Empty => None,
            InteractionState::Previewing(selection) => Some(selection),
            InteractionState::Analyzing { selection, .. } => Some(selection),
            InteractionState::Result { selection, .. } => Some(selection),
            InteractionState::Failed { selection, .. } => selection.as_ref(),
        }
    }

    pub fn nutrition(&self) -> Option<&NutritionResult> {
        match self {
            InteractionState::Result { nutrition, .. } => Some(nutrition),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InteractionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, InteractionState::Analyzing { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Empty => "empty",
            InteractionState::Previewing(_) => "previewing",
            InteractionState::Analyzing { .. } => "analyzing",
            InteractionState::Result { .. } => "result",
            InteractionState::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
