//! Zentrale Konfiguration für den Diagramm-Modeler.
//!
//! `ModelingOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Shapes ──────────────────────────────────────────────────────────

/// Minimale Shape-Breite beim Resize ohne explizite Mindestgröße.
pub const MIN_SHAPE_WIDTH: f32 = 10.0;
/// Minimale Shape-Höhe beim Resize ohne explizite Mindestgröße.
pub const MIN_SHAPE_HEIGHT: f32 = 10.0;
/// Standard-Breite neuer Shapes aus App-Intents.
pub const DEFAULT_SHAPE_WIDTH: f32 = 100.0;
/// Standard-Höhe neuer Shapes aus App-Intents.
pub const DEFAULT_SHAPE_HEIGHT: f32 = 80.0;

// ── Labels ──────────────────────────────────────────────────────────

/// Standard-Label-Breite, wenn das Template keine Größe hat.
pub const DEFAULT_LABEL_WIDTH: f32 = 90.0;
/// Standard-Label-Höhe, wenn das Template keine Größe hat.
pub const DEFAULT_LABEL_HEIGHT: f32 = 20.0;

// ── Verlauf ─────────────────────────────────────────────────────────

/// Maximale Anzahl Undo-Operationen (0 = unbegrenzt).
pub const MAX_UNDO_DEPTH: usize = 0;

/// Alle zur Laufzeit änderbaren Modeling-Optionen.
/// Wird als `diagram_modeler.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelingOptions {
    // ── Shapes ──────────────────────────────────────────────────
    /// Mindestbreite beim Resize
    #[serde(default = "default_min_shape_width")]
    pub min_shape_width: f32,
    /// Mindesthöhe beim Resize
    #[serde(default = "default_min_shape_height")]
    pub min_shape_height: f32,
    /// Breite neuer Shapes ohne Größenangabe
    #[serde(default = "default_shape_width")]
    pub default_shape_width: f32,
    /// Höhe neuer Shapes ohne Größenangabe
    #[serde(default = "default_shape_height")]
    pub default_shape_height: f32,

    // ── Labels ──────────────────────────────────────────────────
    /// Label-Breite, wenn das Template keine Größe hat
    #[serde(default = "default_label_width")]
    pub default_label_width: f32,
    /// Label-Höhe, wenn das Template keine Größe hat
    #[serde(default = "default_label_height")]
    pub default_label_height: f32,

    // ── Copy/Paste ──────────────────────────────────────────────
    /// Eingefügte Positionen auf ganze Einheiten runden
    #[serde(default = "default_true")]
    pub round_pasted_positions: bool,

    // ── Verlauf ─────────────────────────────────────────────────
    /// Maximale Anzahl Undo-Operationen (0 = unbegrenzt)
    #[serde(default)]
    pub max_undo_depth: usize,
}

impl Default for ModelingOptions {
    fn default() -> Self {
        Self {
            min_shape_width: MIN_SHAPE_WIDTH,
            min_shape_height: MIN_SHAPE_HEIGHT,
            default_shape_width: DEFAULT_SHAPE_WIDTH,
            default_shape_height: DEFAULT_SHAPE_HEIGHT,

            default_label_width: DEFAULT_LABEL_WIDTH,
            default_label_height: DEFAULT_LABEL_HEIGHT,

            round_pasted_positions: true,

            max_undo_depth: MAX_UNDO_DEPTH,
        }
    }
}

/// Serde-Defaults (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_min_shape_width() -> f32 {
    MIN_SHAPE_WIDTH
}

fn default_min_shape_height() -> f32 {
    MIN_SHAPE_HEIGHT
}

fn default_shape_width() -> f32 {
    DEFAULT_SHAPE_WIDTH
}

fn default_shape_height() -> f32 {
    DEFAULT_SHAPE_HEIGHT
}

fn default_label_width() -> f32 {
    DEFAULT_LABEL_WIDTH
}

fn default_label_height() -> f32 {
    DEFAULT_LABEL_HEIGHT
}

fn default_true() -> bool {
    true
}

impl ModelingOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("diagram-modeler"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("diagram_modeler.toml")
    }

    /// Mindestgröße beim Resize als (Breite, Höhe).
    pub fn min_shape_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.min_shape_width, self.min_shape_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let opts: ModelingOptions =
            toml::from_str("max_undo_depth = 5\n").expect("TOML muss parsebar sein");
        assert_eq!(opts.max_undo_depth, 5);
        assert_eq!(opts.min_shape_width, MIN_SHAPE_WIDTH);
        assert!(opts.round_pasted_positions);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "diagram_modeler_options_{}.toml",
            std::process::id()
        ));
        let opts = ModelingOptions {
            min_shape_width: 25.0,
            round_pasted_positions: false,
            ..ModelingOptions::default()
        };

        opts.save_to_file(&path).expect("Speichern erwartet");
        let loaded = ModelingOptions::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, opts);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = ModelingOptions::load_from_file(std::path::Path::new(
            "/nonexistent/diagram_modeler.toml",
        ));
        assert_eq!(loaded, ModelingOptions::default());
    }
}
