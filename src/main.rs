mod config;
mod error;
mod handlers;
mod models;
mod services;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use config::Config;
use handlers::{console, Console};
use services::{HttpPredictor, NutritionPredictor};

#[derive(Parser, Debug)]
#[command(name = "food-nutrition-predictor")]
#[command(version, about = "Estimate calories and macronutrients from a food photo", long_about = None)]
struct Cli {
    /// Analyze this image once and exit (interactive mode when omitted)
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Prediction endpoint (falls back to PREDICT_URL, then the local default)
    #[arg(long, value_name = "URL")]
    predict_url: Option<String>,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        match &self.predict_url {
            Some(url) => Config::new(url.clone()),
            None => Config::from_env(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting Food Nutrition Predictor...");

    let config = cli.config()?;
    let http = HttpPredictor::new(config.predict_url);
    log::info!("✅ Predictor endpoint: {}", http.endpoint());
    let predictor: Arc<dyn NutritionPredictor> = Arc::new(http);

    if let Some(path) = &cli.image {
        console::run_once(predictor.as_ref(), path).await?;
        return Ok(());
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Console::new(predictor).run(stdin).await?;

    log::info!("🛑 Shutting down...");
    Ok(())
}
