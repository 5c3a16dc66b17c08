use crate::models::{InteractionState, NutritionResult};

pub const EMPTY_PLACEHOLDER: &str = "Upload an image to see nutrition analysis";

/// One labelled value of the results grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NutrientRow {
    pub label: &'static str,
    pub value: String,
}

/// Fixed-point text with ties rounded away from zero, so 250.5 reads "251".
fn fixed(value: f64, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    format!("{:.*}", decimals, (value * scale).round() / scale)
}

pub fn nutrient_rows(nutrition: &NutritionResult) -> [NutrientRow; 4] {
    let row = |label: &'static str, value: f64| NutrientRow {
        label,
        value: fixed(value, 2),
    };

    [
        row("Calories (cal)", nutrition.calories),
        row("Fat (g)", nutrition.fat),
        row("Carbs (g)", nutrition.carbs),
        row("Protein (g)", nutrition.protein),
    ]
}

pub fn summary(nutrition: &NutritionResult) -> String {
    format!(
        "This food contains {} calories with {}g protein, {}g carbohydrates, and {}g fat.",
        fixed(nutrition.calories, 0),
        fixed(nutrition.protein, 1),
        fixed(nutrition.carbs, 1),
        fixed(nutrition.fat, 1)
    )
}

/// Left card: selected file, actions and the error alert.
pub fn render_uploader(state: &InteractionState) -> String {
    let mut out = String::from("📷 *Upload Food Image*\n");

    match state.selection() {
        Some(selection) => {
            let action = if state.is_loading() {
                "[Analyzing...]"
            } else {
                "[Analyze Nutrition]"
            };
            out.push_str(&format!(
                "Selected: {} ({}, {} bytes)\n\
                 Preview: {} char data URL\n\
                 {} [Reset]\n",
                selection.image.name,
                selection.image.mime_type,
                selection.image.size(),
                selection.preview.data_url.len(),
                action
            ));
        }
        None => out.push_str("Use `select <path>` to pick a photo (PNG, JPG, GIF up to 10MB)\n"),
    }

    if let Some(error) = state.error() {
        out.push_str(&format!("⚠️ {}\n", error));
    }

    out
}

/// Right card: the nutrition grid and summary, or the placeholder.
pub fn render_results(state: &InteractionState) -> String {
    let Some(nutrition) = state.nutrition() else {
        return format!("📊 *Nutrition Analysis*\n{}\n", EMPTY_PLACEHOLDER);
    };

    let mut out = String::from("📊 *Nutrition Analysis*\n");
    for row in nutrient_rows(nutrition) {
        out.push_str(&format!("{:>10}  {}\n", row.value, row.label));
    }
    out.push_str(&format!("\nSummary\n{}\n", summary(nutrition)));
    out
}

pub fn render(state: &InteractionState) -> String {
    format!("{}\n{}", render_uploader(state), render_results(state))
}
