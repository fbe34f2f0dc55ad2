//! Diagram Modeler: Szenario-Runner.
//!
//! Liest eine JSON-Datei mit einer Liste von App-Intents, spielt sie auf
//! einer frischen Session ab und gibt das resultierende Diagramm als JSON aus.
//!
//! ```text
//! diagram-modeler <szenario.json> [optionen.toml]
//! ```

use anyhow::Context;
use diagram_modeler::{AppController, AppIntent, AppState, ModelingOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Inhalt einer Szenario-Datei.
#[derive(Debug, Deserialize)]
struct Scenario {
    intents: Vec<AppIntent>,
}

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Diagram Modeler v{} startet...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .map(PathBuf::from)
        .context("Aufruf: diagram-modeler <szenario.json> [optionen.toml]")?;
    // Optionen aus TOML laden (oder Standardwerte)
    let options_path = args.next().map(PathBuf::from).unwrap_or_else(ModelingOptions::config_path);

    let scenario = load_scenario(&scenario_path)?;
    let options = ModelingOptions::load_from_file(&options_path);

    let state = ScenarioRunner::new(options).run(scenario.intents);

    let json = serde_json::to_string_pretty(&state.snapshot())
        .context("Diagramm konnte nicht serialisiert werden")?;
    println!("{json}");
    Ok(())
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Szenario '{}' nicht lesbar", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Szenario '{}' ist kein gültiges JSON", path.display()))
}

/// Spielt Intents nacheinander ab. Fehlgeschlagene Intents werden geloggt
/// und übersprungen; das Diagramm bleibt dank Rollback konsistent.
struct ScenarioRunner {
    state: AppState,
    controller: AppController,
}

impl ScenarioRunner {
    fn new(options: ModelingOptions) -> Self {
        Self {
            state: AppState::with_options(options),
            controller: AppController::new(),
        }
    }

    fn run(mut self, intents: Vec<AppIntent>) -> AppState {
        let total = intents.len();
        let mut failed = 0usize;

        for (index, intent) in intents.into_iter().enumerate() {
            log::debug!("Intent {}/{}: {:?}", index + 1, total, intent);
            if let Err(e) = self.controller.handle_intent(&mut self.state, intent) {
                failed += 1;
                log::error!("Intent {} fehlgeschlagen: {:#}", index + 1, e);
            }
        }

        log::info!(
            "{} Intent(s) abgespielt, {} fehlgeschlagen, {} Command(s) geloggt",
            total,
            failed,
            self.state.command_log.len()
        );
        self.state
    }
}
