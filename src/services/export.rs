//! Poster document export
//!
//! Writes the data a template renders (base form, theme and typed rows) as
//! a JSON document so a renderer can pick it up later.

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::templates::{
    morning_session_review, theme_class, BaseForm, TemplateData, TemplateName, Theme,
};
use crate::types::{PosterError, Result};

/// Everything a renderer needs for one poster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterDocument {
    pub template: TemplateName,
    pub theme: Option<Theme>,
    pub theme_class: Option<String>,
    pub base_form: BaseForm,
    pub data: TemplateData,
    pub generated_at: NaiveDateTime,
}

/// On-disk shape; `data` is decoded once the template is known
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPosterDocument {
    template: TemplateName,
    theme: Option<Theme>,
    theme_class: Option<String>,
    #[serde(default)]
    base_form: BaseForm,
    #[serde(default)]
    data: serde_json::Value,
    generated_at: NaiveDateTime,
}

impl PosterDocument {
    /// Assemble a document from the template defaults at `now`.
    ///
    /// `theme` falls back to the template default; a theme the template
    /// does not offer is an error.
    pub fn build(
        template: TemplateName,
        theme: Option<Theme>,
        data: TemplateData,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let config = template.config_at(now);
        let theme = theme.or_else(|| config.default_theme());

        let theme_class = match theme {
            Some(t) => Some(theme_class(template, t).ok_or_else(|| {
                PosterError::Template(format!("{} does not offer theme {}", template, t))
            })?),
            None => None,
        };

        let mut base_form = config.base_form();
        if let (TemplateName::MorningSessionReview, Some(t)) = (template, theme) {
            base_form.title = Some(morning_session_review::title_by_theme(t).to_string());
        }

        Ok(Self {
            template,
            theme,
            theme_class,
            base_form,
            data,
            generated_at: now,
        })
    }
}

/// Service for writing and reading poster documents
pub struct PosterExportService {
    output_dir: PathBuf,
}

impl PosterExportService {
    /// Create an export service with the default directory (~/.posterkit/exports)
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| PosterError::Export("Cannot determine home directory".into()))?;
        let output_dir = base_dirs.home_dir().join(".posterkit").join("exports");
        Ok(Self { output_dir })
    }

    /// Create an export service writing into `output_dir`
    pub fn with_output_dir(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// `{template}_{YYYYMMDD}.json` inside the output directory
    pub fn document_path(&self, template: TemplateName, date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.json", template, date.format("%Y%m%d")))
    }

    /// Write `document`, replacing any export of the same template and day
    pub fn write(&self, document: &PosterDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| PosterError::Export(format!("Serialization failed: {}", e)))?;

        let path = self.document_path(document.template, document.generated_at.date());
        fs::write(&path, content)?;
        tracing::info!(path = %path.display(), rows = document.data.len(), "poster exported");
        Ok(path)
    }

    /// Read back the export of `template` for `date`
    pub fn load(&self, template: TemplateName, date: NaiveDate) -> Result<PosterDocument> {
        let path = self.document_path(template, date);
        if !path.exists() {
            return Err(PosterError::Export(format!(
                "no export at {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(&path)?;
        let raw: RawPosterDocument = serde_json::from_str(&content)?;
        if raw.template != template {
            return Err(PosterError::Export(format!(
                "{} holds a {} document",
                path.display(),
                raw.template
            )));
        }

        Ok(PosterDocument {
            template: raw.template,
            theme: raw.theme,
            theme_class: raw.theme_class,
            base_form: raw.base_form,
            data: TemplateData::from_value(raw.template, raw.data)?,
            generated_at: raw.generated_at,
        })
    }
}
