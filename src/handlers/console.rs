use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::error::AnalyzeError;
use crate::handlers::analyzer::{Analyzer, Completion, PendingAnalysis};
use crate::handlers::presenter;
use crate::models::NutritionResult;
use crate::services::NutritionPredictor;

const HELP: &str = "Commands:\n  \
    select <path>  pick a food photo\n  \
    analyze        send it for nutrition analysis\n  \
    reset          clear everything\n  \
    show           print the current view\n  \
    help           this text\n  \
    quit           exit";

type Outcome = (PendingAnalysis, Result<NutritionResult, AnalyzeError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(PathBuf),
    Analyze,
    Reset,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "select" | "open" if !rest.is_empty() => Ok(Command::Select(PathBuf::from(rest))),
            "select" | "open" => Err("Usage: select <path>".to_string()),
            "analyze" => Ok(Command::Analyze),
            "reset" => Ok(Command::Reset),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

/// Interactive front end. Requests run on spawned tasks so the user can keep
/// typing (reset, select) while one is in flight.
pub struct Console {
    analyzer: Analyzer,
    predictor: Arc<dyn NutritionPredictor>,
}

impl Console {
    pub fn new(predictor: Arc<dyn NutritionPredictor>) -> Self {
        Self {
            analyzer: Analyzer::new(),
            predictor,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
        let mut lines = input.lines();

        println!("🍽️ Food Nutrition Predictor\n{}\n", HELP);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        // Input closed: let the live request land before leaving.
                        // Superseded ones may arrive first and are dropped.
                        while self.analyzer.state().is_loading() {
                            match rx.recv().await {
                                Some((pending, outcome)) => self.complete(pending, outcome),
                                None => break,
                            }
                        }
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command, &tx).await,
                        Err(message) => println!("{}\n{}", message, HELP),
                    }
                }
                Some((pending, outcome)) = rx.recv() => {
                    self.complete(pending, outcome);
                }
            }
        }

        log::info!("🛑 Console closed in state: {}", self.analyzer.state());
        Ok(())
    }

    async fn execute(&mut self, command: Command, tx: &mpsc::UnboundedSender<Outcome>) {
        match command {
            Command::Select(path) => match self.analyzer.select_file(&path).await {
                Ok(()) => println!("{}", presenter::render_uploader(self.analyzer.state())),
                Err(e) => println!("⚠️ {}", e),
            },
            Command::Analyze => match self.analyzer.begin_analysis() {
                Ok(pending) => {
                    println!("⏳ Analyzing...");
                    log::debug!("Spawning request #{}", pending.generation());
                    let predictor = self.predictor.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = predictor.predict(pending.image()).await;
                        if let Err(e) = tx.send((pending, outcome)) {
                            let (pending, _) = e.0;
                            log::debug!(
                                "Console closed before request #{} for {} finished",
                                pending.generation(),
                                pending.image().name
                            );
                        }
                    });
                }
                Err(AnalyzeError::Busy) => println!("⏳ Analysis already in progress"),
                Err(_) => println!("{}", presenter::render_uploader(self.analyzer.state())),
            },
            Command::Reset => {
                self.analyzer.reset();
                println!("{}", presenter::render(self.analyzer.state()));
            }
            Command::Show => println!("{}", presenter::render(self.analyzer.state())),
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    fn complete(&mut self, pending: PendingAnalysis, outcome: Result<NutritionResult, AnalyzeError>) {
        if self.analyzer.finish_analysis(pending, outcome) == Completion::Applied {
            println!("{}", presenter::render(self.analyzer.state()));
        }
    }
}

/// Non-interactive mode: select `path`, analyze it, print the result.
pub async fn run_once(predictor: &dyn NutritionPredictor, path: &Path) -> Result<NutritionResult> {
    let mut analyzer = Analyzer::new();
    analyzer.select_file(path).await?;

    let outcome = analyzer.analyze(predictor).await;
    println!("{}", presenter::render(analyzer.state()));

    Ok(outcome?)
}
