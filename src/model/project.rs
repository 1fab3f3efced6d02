//! Project
//!
//! The unit of work: canvas dimensions, a brand kit, and the layer stack with
//! its undo history. The live layer collection is always the history snapshot
//! under the cursor, so the two can never disagree.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::brand::BrandKit;
use super::layer::Layer;
use crate::error::{Result, StudioError};
use crate::history::History;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CanvasSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h, label: None }
    }
}

/// Named canvas presets: (key, width, height, label).
pub const CANVAS_PRESETS: &[(&str, u32, u32, &str)] = &[
    ("instagram-post", 1080, 1080, "Instagram Post"),
    ("instagram-story", 1080, 1920, "Instagram Story"),
    ("facebook-cover", 1640, 856, "Facebook Cover"),
    ("linkedin-banner", 1584, 396, "LinkedIn Banner"),
    ("twitter-header", 1500, 500, "Twitter/X Header"),
    ("youtube-thumbnail", 1280, 720, "YouTube Thumbnail"),
    ("a4-landscape", 3508, 2480, "A4 Landscape (300dpi)"),
    ("a4-portrait", 2480, 3508, "A4 Portrait (300dpi)"),
    ("business-card", 1050, 600, "Business Card"),
    ("flyer-half-letter", 1650, 2550, "Flyer (Half Letter)"),
];

/// Look up a canvas preset by key.
pub fn canvas_preset(name: &str) -> Option<CanvasSize> {
    CANVAS_PRESETS
        .iter()
        .find(|(key, ..)| *key == name)
        .map(|(_, w, h, label)| CanvasSize {
            w: *w,
            h: *h,
            label: Some(label.to_string()),
        })
}

/// A design project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub canvas: CanvasSize,

    /// Shared, read-only constraint authority.
    pub brand_kit: Arc<BrandKit>,

    history: History,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create an empty project. History starts with one empty snapshot.
    pub fn new(name: impl Into<String>, canvas: CanvasSize, brand_kit: Arc<BrandKit>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            canvas,
            brand_kit,
            history: History::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Limit how many undo steps are retained.
    pub fn with_history_limit(mut self, max_depth: Option<usize>) -> Self {
        self.history = self.history.with_max_depth(max_depth);
        self
    }

    /// Live layer collection, in insertion order.
    pub fn layers(&self) -> &[Layer] {
        self.history.current()
    }

    /// Shared handle to the live layer collection.
    pub fn layer_stack(&self) -> Arc<Vec<Layer>> {
        Arc::clone(self.history.current())
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers().iter().find(|l| l.id == id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Commit a new layer collection. The only way layer state changes.
    pub(crate) fn commit(&mut self, layers: Vec<Layer>, label: impl Into<String>) {
        self.history.commit(layers, label);
        self.updated_at = Utc::now();
    }

    /// Navigational only; does not touch `updated_at`.
    pub(crate) fn undo(&mut self) -> bool {
        self.history.undo()
    }

    /// Navigational only; does not touch `updated_at`.
    pub(crate) fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Load a project from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StudioError::InvalidProject {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let project: Project = serde_json::from_str(&content)?;
        Ok(project)
    }

    /// Save the project as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::brand::{BrandFonts, BrandRules};
    use crate::model::layer::{LayerDraft, Size};
    use tempfile::TempDir;

    fn kit() -> Arc<BrandKit> {
        Arc::new(BrandKit {
            id: "kit".to_string(),
            name: "Kit".to_string(),
            palette: vec!["#112233".to_string()],
            fonts: BrandFonts {
                heading: "A".to_string(),
                body: "B".to_string(),
                accent: "C".to_string(),
            },
            assets: vec![],
            rules: BrandRules::default(),
        })
    }

    #[test]
    fn test_canvas_presets() {
        let post = canvas_preset("instagram-post").unwrap();
        assert_eq!((post.w, post.h), (1080, 1080));
        let a4 = canvas_preset("a4-landscape").unwrap();
        assert_eq!((a4.w, a4.h), (3508, 2480));
        assert!(canvas_preset("billboard").is_none());
    }

    #[test]
    fn test_new_project_is_empty() {
        let project = Project::new("Launch", CanvasSize::new(100, 100), kit());
        assert!(project.layers().is_empty());
        assert_eq!(project.history().len(), 1);
    }

    #[test]
    fn test_commit_updates_timestamp_but_undo_does_not() {
        let mut project = Project::new("Launch", CanvasSize::new(100, 100), kit());
        let created = project.updated_at;

        let layer = LayerDraft::image("a.png", Size::new(1.0, 1.0)).into_layer("a");
        project.commit(vec![layer], "Add a");
        let committed = project.updated_at;
        assert!(committed >= created);
        assert_eq!(project.layers().len(), 1);

        assert!(project.undo());
        assert_eq!(project.updated_at, committed);
        assert!(project.layers().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("design.json");

        let mut project = Project::new("Launch", canvas_preset("youtube-thumbnail").unwrap(), kit());
        let layer = LayerDraft::image("a.png", Size::new(1.0, 1.0)).into_layer("a");
        project.commit(vec![layer], "Add a");
        project.save(&path).unwrap();

        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded.id, project.id);
        assert_eq!(loaded.layers(), project.layers());
        assert_eq!(loaded.history().index(), 1);
        assert_eq!(loaded.canvas.label.as_deref(), Some("YouTube Thumbnail"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Project::load(Path::new("/nonexistent/design.json")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PROJECT");
    }
}
