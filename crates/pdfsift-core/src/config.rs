// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SiftError};
use crate::types::Tool;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding [`TableSettings::tabula_jar`].
pub const TABULA_JAR_ENV: &str = "PDFSIFT_TABULA_JAR";

/// Persistent settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Program names or absolute paths of the external tools.
    pub tools: ToolPaths,
    pub ocr: OcrSettings,
    pub images: ImageSettings,
    pub tables: TableSettings,
    pub structured: StructuredSettings,
    /// Output directory used when none is given (relative to the working dir).
    pub default_output_dir: PathBuf,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            ocr: OcrSettings::default(),
            images: ImageSettings::default(),
            tables: TableSettings::default(),
            structured: StructuredSettings::default(),
            default_output_dir: PathBuf::from("pdf_output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ghostscript: String,
    pub tesseract: String,
    pub graphicsmagick: String,
    pub java: String,
    pub unstructured: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ghostscript: "gs".into(),
            tesseract: "tesseract".into(),
            graphicsmagick: "gm".into(),
            java: "java".into(),
            unstructured: "unstructured-ingest".into(),
        }
    }
}

impl ToolPaths {
    /// Program to execute for `tool`.
    pub fn program(&self, tool: Tool) -> &str {
        match tool {
            Tool::Ghostscript => &self.ghostscript,
            Tool::Tesseract => &self.tesseract,
            Tool::GraphicsMagick => &self.graphicsmagick,
            Tool::Tabula => &self.java,
            Tool::Unstructured => &self.unstructured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language list, `+`-separated.
    pub language: String,
    /// Render resolution for pages sent to Tesseract.
    pub dpi: u32,
    /// OCR every page, even pages that already carry a text layer.
    pub force_ocr: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "chi_sim+eng".into(),
            dpi: 300,
            force_ocr: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Run GraphicsMagick over every extracted image.
    pub optimize: bool,
    /// JPEG quality passed to `gm convert -quality`.
    pub quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            optimize: true,
            quality: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Location of the tabula-java jar.
    pub tabula_jar: PathBuf,
    /// Arguments passed to `java`; `{jar}` and `{input}` are substituted.
    pub args: Vec<String>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            tabula_jar: PathBuf::from("tabula.jar"),
            args: [
                "-jar", "{jar}", "--pages", "all", "--guess", "--format", "JSON", "{input}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredSettings {
    /// Arguments passed to `unstructured-ingest`; `{input}` and `{output}` are
    /// substituted.
    pub args: Vec<String>,
}

impl Default for StructuredSettings {
    fn default() -> Self {
        Self {
            args: [
                "local",
                "--input-path",
                "{input}",
                "--output-dir",
                "{output}",
                "--strategy",
                "fast",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl SiftConfig {
    /// Read a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| {
            SiftError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let mut config: Self = serde_json::from_str(&data).map_err(|err| {
            SiftError::Config(format!("invalid config {}: {}", path.display(), err))
        })?;
        config.apply_env();
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load `path` when given, else the user config file if it exists, else
    /// the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file found, using defaults");
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(jar) = std::env::var(TABULA_JAR_ENV)
            && !jar.is_empty()
        {
            self.tables.tabula_jar = PathBuf::from(jar);
        }
    }

    /// Reject values the tools would choke on.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.language.trim().is_empty() {
            return Err(SiftError::Config("ocr.language must not be empty".into()));
        }
        if !(72..=1200).contains(&self.ocr.dpi) {
            return Err(SiftError::Config(format!(
                "ocr.dpi must be between 72 and 1200, got {}",
                self.ocr.dpi
            )));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(SiftError::Config(format!(
                "images.quality must be between 1 and 100, got {}",
                self.images.quality
            )));
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/pdfsift/config.json`, falling back to
/// `~/.config/pdfsift/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        return None;
    };
    Some(base.join("pdfsift").join(CONFIG_FILE))
}
