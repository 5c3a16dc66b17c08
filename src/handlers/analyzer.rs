use std::path::Path;

use crate::error::{AnalyzeError, SelectError};
use crate::models::{InteractionState, NutritionResult, SelectedImage, Selection};
use crate::services::{load_selection, NutritionPredictor};

/// Ticket for one in-flight request. Handed back to
/// [`Analyzer::finish_analysis`] together with the predictor's outcome.
#[derive(Debug)]
pub struct PendingAnalysis {
    generation: u64,
    image: SelectedImage,
}

impl PendingAnalysis {
    pub fn image(&self) -> &SelectedImage {
        &self.image
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The user reset or picked another image while the request was out.
    Stale,
}

/// Owns the uploader state: select -> analyze -> result/error, and reset.
///
/// Every select, reset and analyze bumps `generation`; a response is only
/// written back if it belongs to the current generation.
#[derive(Debug, Default)]
pub struct Analyzer {
    state: InteractionState,
    generation: u64,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Replace whatever is shown with a fresh selection. Any previous result
    /// or error is dropped, and an in-flight request becomes stale.
    pub fn select(&mut self, selection: Selection) {
        self.generation += 1;
        log::info!(
            "📸 Selected {} ({} bytes, {})",
            selection.image.name,
            selection.image.size(),
            selection.image.mime_type
        );
        self.state = InteractionState::Previewing(selection);
    }

    /// Pick a file from disk. On failure the current state is kept.
    pub async fn select_file(&mut self, path: &Path) -> Result<(), SelectError> {
        let selection = load_selection(path).await?;
        self.select(selection);
        Ok(())
    }

    pub fn begin_analysis(&mut self) -> Result<PendingAnalysis, AnalyzeError> {
        match std::mem::take(&mut self.state) {
            state @ InteractionState::Analyzing { .. } => {
                self.state = state;
                Err(AnalyzeError::Busy)
            }
            InteractionState::Empty | InteractionState::Failed { selection: None, .. } => {
                let err = AnalyzeError::Validation;
                log::warn!("⚠️ Analyze requested with no image selected");
                self.state = InteractionState::Failed {
                    selection: None,
                    error: err.to_string(),
                };
                Err(err)
            }
            InteractionState::Previewing(selection)
            | InteractionState::Result { selection, .. }
            | InteractionState::Failed {
                selection: Some(selection),
                ..
            } => {
                self.generation += 1;
                let pending = PendingAnalysis {
                    generation: self.generation,
                    image: selection.image.clone(),
                };
                self.state = InteractionState::Analyzing {
                    selection,
                    generation: self.generation,
                };
                Ok(pending)
            }
        }
    }

    pub fn finish_analysis(
        &mut self,
        pending: PendingAnalysis,
        outcome: Result<NutritionResult, AnalyzeError>,
    ) -> Completion {
        match std::mem::take(&mut self.state) {
            InteractionState::Analyzing {
                selection,
                generation,
            } if generation == pending.generation => {
                self.state = match outcome {
                    Ok(nutrition) => InteractionState::Result {
                        selection,
                        nutrition,
                    },
                    Err(err) => {
                        log::error!("❌ Analysis of {} failed: {}", selection.image.name, err);
                        InteractionState::Failed {
                            selection: Some(selection),
                            error: err.to_string(),
                        }
                    }
                };
                Completion::Applied
            }
            state => {
                log::info!(
                    "🗑️ Discarding stale response for {} (generation {}, now {})",
                    pending.image.name,
                    pending.generation,
                    self.generation
                );
                self.state = state;
                Completion::Stale
            }
        }
    }

    /// Run one analysis to completion against `predictor`.
    pub async fn analyze(
        &mut self,
        predictor: &dyn NutritionPredictor,
    ) -> Result<NutritionResult, AnalyzeError> {
        let pending = self.begin_analysis()?;
        let outcome = predictor.predict(pending.image()).await;
        self.finish_analysis(pending, outcome.clone());
        outcome
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = InteractionState::Empty;
        log::debug!("🔄 Uploader reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::presenter;
    use crate::models::ImagePreview;
    use crate::services::preview::data_url;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockPredictor {
        outcome: Result<NutritionResult, AnalyzeError>,
        calls: AtomicUsize,
    }

    impl MockPredictor {
        fn new(outcome: Result<NutritionResult, AnalyzeError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl NutritionPredictor for MockPredictor {
        async fn predict(&self, _image: &SelectedImage) -> Result<NutritionResult, AnalyzeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn sample() -> NutritionResult {
        NutritionResult {
            calories: 250.0,
            fat: 10.0,
            carbs: 30.0,
            protein: 15.0,
        }
    }

    fn selection(name: &str) -> Selection {
        let image = SelectedImage::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff]);
        let preview = data_url(&image);
        Selection { image, preview }
    }

    fn assert_empty(analyzer: &Analyzer) {
        let state = analyzer.state();
        assert_eq!(*state, InteractionState::Empty);
        assert!(state.selection().is_none());
        assert!(state.nutrition().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_select_previews() {
        let mut analyzer = Analyzer::new();
        assert_empty(&analyzer);

        analyzer.select(selection("kebab.jpg"));

        let state = analyzer.state();
        assert!(matches!(state, InteractionState::Previewing(_)));
        let ImagePreview { data_url } = &state.selection().unwrap().preview;
        assert!(!data_url.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_without_image_skips_network() {
        let predictor = MockPredictor::new(Ok(sample()));
        let mut analyzer = Analyzer::new();

        let err = analyzer.analyze(&predictor).await.unwrap_err();

        assert_eq!(err, AnalyzeError::Validation);
        assert_eq!(analyzer.state().error(), Some("Please select an image first"));
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let predictor = MockPredictor::new(Ok(sample()));
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("pilav.jpg"));

        let result = analyzer.analyze(&predictor).await.unwrap();

        assert_eq!(result, sample());
        assert_eq!(analyzer.state().nutrition(), Some(&sample()));
        assert!(analyzer.state().error().is_none());
        assert!(!analyzer.state().is_loading());
        assert_eq!(predictor.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_result_reaches_summary() {
        let predictor = MockPredictor::new(NutritionResult::from_json(
            br#"{"calories":250,"fat":10,"carbs":30,"protein":15}"#,
        ));
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("doner.jpg"));

        analyzer.analyze(&predictor).await.unwrap();

        let nutrition = analyzer.state().nutrition().unwrap();
        assert_eq!(nutrition.calories, 250.0);
        assert_eq!(nutrition.fat, 10.0);
        assert_eq!(nutrition.carbs, 30.0);
        assert_eq!(nutrition.protein, 15.0);
        assert_eq!(
            presenter::summary(nutrition),
            "This food contains 250 calories with 15.0g protein, 30.0g carbohydrates, and 10.0g fat."
        );
    }

    #[tokio::test]
    async fn test_analyze_failure_keeps_image_for_retry() {
        let failing = MockPredictor::new(Err(AnalyzeError::Request("connection refused".to_string())));
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("soup.jpg"));

        analyzer.analyze(&failing).await.unwrap_err();

        assert_eq!(analyzer.state().error(), Some("connection refused"));
        assert!(!analyzer.state().is_loading());
        assert!(analyzer.state().selection().is_some());

        let working = MockPredictor::new(Ok(sample()));
        analyzer.analyze(&working).await.unwrap();
        assert_eq!(analyzer.state().nutrition(), Some(&sample()));
    }

    #[test]
    fn test_duplicate_submission_is_refused() {
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("burger.jpg"));

        let _pending = analyzer.begin_analysis().unwrap();
        assert!(analyzer.state().is_loading());

        assert_eq!(analyzer.begin_analysis().unwrap_err(), AnalyzeError::Busy);
        assert!(analyzer.state().is_loading());
    }

    #[test]
    fn test_reset_from_every_state() {
        let mut analyzer = Analyzer::new();

        analyzer.select(selection("a.jpg"));
        analyzer.reset();
        assert_empty(&analyzer);

        analyzer.select(selection("b.jpg"));
        let _pending = analyzer.begin_analysis().unwrap();
        analyzer.reset();
        assert_empty(&analyzer);

        analyzer.select(selection("c.jpg"));
        let pending = analyzer.begin_analysis().unwrap();
        analyzer.finish_analysis(pending, Ok(sample()));
        analyzer.reset();
        assert_empty(&analyzer);

        analyzer.select(selection("d.jpg"));
        let pending = analyzer.begin_analysis().unwrap();
        analyzer.finish_analysis(pending, Err(AnalyzeError::Http { status: 502 }));
        analyzer.reset();
        assert_empty(&analyzer);
    }

    #[test]
    fn test_response_after_reset_is_discarded() {
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("pasta.jpg"));
        let pending = analyzer.begin_analysis().unwrap();

        analyzer.reset();
        let completion = analyzer.finish_analysis(pending, Ok(sample()));

        assert_eq!(completion, Completion::Stale);
        assert_empty(&analyzer);
    }

    #[test]
    fn test_response_after_new_selection_is_discarded() {
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("old.jpg"));
        let pending = analyzer.begin_analysis().unwrap();

        analyzer.select(selection("new.jpg"));
        let completion = analyzer.finish_analysis(pending, Err(AnalyzeError::Http { status: 500 }));

        assert_eq!(completion, Completion::Stale);
        match analyzer.state() {
            InteractionState::Previewing(selection) => assert_eq!(selection.image.name, "new.jpg"),
            other => panic!("expected previewing, got {}", other),
        }
    }

    #[test]
    fn test_new_selection_clears_result_and_error() {
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("first.jpg"));
        let pending = analyzer.begin_analysis().unwrap();
        analyzer.finish_analysis(pending, Ok(sample()));
        assert!(analyzer.state().nutrition().is_some());

        analyzer.select(selection("second.jpg"));
        assert!(analyzer.state().nutrition().is_none());
        assert!(analyzer.state().error().is_none());
        assert_eq!(analyzer.state().selection().unwrap().image.name, "second.jpg");

        analyzer.reset();
        analyzer.begin_analysis().unwrap_err();
        assert!(analyzer.state().error().is_some());

        analyzer.select(selection("third.jpg"));
        assert!(analyzer.state().error().is_none());
        assert!(matches!(analyzer.state(), InteractionState::Previewing(_)));
    }

    #[tokio::test]
    async fn test_select_file_failure_keeps_state() {
        let mut analyzer = Analyzer::new();
        analyzer.select(selection("keep.jpg"));

        let dir = tempfile::tempdir().unwrap();
        let err = analyzer.select_file(&dir.path().join("missing.png")).await;

        assert!(err.is_err());
        assert_eq!(analyzer.state().selection().unwrap().image.name, "keep.jpg");
    }
}
