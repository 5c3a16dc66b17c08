pub mod predictor; // Remote nutrition prediction endpoint
pub mod preview; // File picker filter + data URL previews

pub use predictor::{HttpPredictor, NutritionPredictor};
pub use preview::load_selection;
