//! CLI Command Implementations
//!
//! Each command loads what it needs, does its work, saves the project back
//! when layer state changed, and returns the JSON document to print.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde_json::{json, Value};
use tracing::info;

use crate::compositor::{ChainResolver, Compositor, ExportFormat, ExportQuality, FontBook};
use crate::config::StudioConfig;
use crate::constraints::enrich_prompt;
use crate::generation::{
    GenerationConfig, GenerationOrchestrator, HttpSynthesizer, ImageSynthesizer, MockSynthesizer,
};
use crate::model::{canvas_preset, BrandKit, CanvasSize, Operation, Project, CANVAS_PRESETS};
use crate::studio::ProjectSession;

use super::OperationSource;

/// What a command hands back to `main`.
#[derive(Debug)]
pub struct Outcome {
    pub output: Value,
    /// An operation was rejected by a brand rule.
    pub blocked: bool,
}

impl Outcome {
    fn done(output: Value) -> Self {
        Self {
            output,
            blocked: false,
        }
    }
}

fn load_session(path: &Path, config: &StudioConfig) -> anyhow::Result<ProjectSession> {
    let project = Project::load(path)?;
    let project = match config.history.max_depth {
        Some(depth) => project.with_history_limit(Some(depth)),
        None => project,
    };
    Ok(ProjectSession::new(project))
}

fn read_operation(source: &OperationSource) -> anyhow::Result<Operation> {
    let raw = match (&source.op, &source.op_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(file)) => std::fs::read_to_string(file)
            .with_context(|| format!("cannot read operation file {}", file.display()))?,
        (None, None) => bail!("an operation is required (--op or --op-file)"),
    };
    serde_json::from_str(&raw).context("invalid operation JSON")
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(value: &str) -> anyhow::Result<CanvasSize> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("size must look like 1080x1080, got '{}'", value))?;
    let w: u32 = w.trim().parse().with_context(|| format!("bad width in '{}'", value))?;
    let h: u32 = h.trim().parse().with_context(|| format!("bad height in '{}'", value))?;
    if w == 0 || h == 0 {
        bail!("canvas dimensions must be positive, got '{}'", value);
    }
    Ok(CanvasSize::new(w, h))
}

/// Parse `FAMILY=PATH` or `FAMILY@WEIGHT=PATH`.
fn parse_font_spec(spec: &str) -> anyhow::Result<(String, u16, PathBuf)> {
    let (face, path) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("font must look like FAMILY=PATH, got '{}'", spec))?;
    let (family, weight) = match face.rsplit_once('@') {
        Some((family, weight)) => (
            family,
            weight
                .parse::<u16>()
                .with_context(|| format!("bad font weight in '{}'", spec))?,
        ),
        None => (face, 400),
    };
    if family.trim().is_empty() {
        bail!("font family is empty in '{}'", spec);
    }
    Ok((family.trim().to_string(), weight, PathBuf::from(path)))
}

fn synthesizer(config: &StudioConfig) -> Arc<dyn ImageSynthesizer> {
    match &config.generation.endpoint {
        Some(endpoint) => Arc::new(
            HttpSynthesizer::new(endpoint.clone()).with_timeout(config.generation.timeout()),
        ),
        None => Arc::new(MockSynthesizer::new()),
    }
}

/// Create a new project file
pub fn new_project(
    path: &Path,
    name: &str,
    brand_kit: &Path,
    preset: Option<&str>,
    size: Option<&str>,
    config: &StudioConfig,
) -> anyhow::Result<Outcome> {
    info!("Creating project at {:?}", path);

    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let canvas = match (preset, size) {
        (Some(name), _) => {
            canvas_preset(name).ok_or_else(|| anyhow!("unknown canvas preset '{}'", name))?
        }
        (None, Some(size)) => parse_size(size)?,
        (None, None) => bail!("either --preset or --size is required"),
    };

    let content = std::fs::read_to_string(brand_kit)
        .with_context(|| format!("cannot read brand kit {}", brand_kit.display()))?;
    let kit: BrandKit = serde_json::from_str(&content).context("invalid brand kit JSON")?;

    let project = Project::new(name, canvas, Arc::new(kit))
        .with_history_limit(config.history.max_depth);
    project.save(path)?;

    Ok(Outcome::done(json!({
        "id": project.id,
        "name": project.name,
        "canvas": project.canvas,
        "brandKit": project.brand_kit.id,
        "path": path,
    })))
}

/// List canvas presets
pub fn list_presets() -> anyhow::Result<Outcome> {
    let presets: Vec<Value> = CANVAS_PRESETS
        .iter()
        .map(|(name, w, h, label)| json!({ "name": name, "w": w, "h": h, "label": label }))
        .collect();
    Ok(Outcome::done(Value::Array(presets)))
}

/// Validate an operation without applying it
pub fn validate(path: &Path, source: &OperationSource, config: &StudioConfig) -> anyhow::Result<Outcome> {
    info!("Validating operation against {:?}", path);
    let session = load_session(path, config)?;
    let op = read_operation(source)?;
    let result = session.validate(&op);
    Ok(Outcome {
        blocked: !result.valid,
        output: serde_json::to_value(&result)?,
    })
}

/// Validate and apply an operation
pub fn apply(path: &Path, source: &OperationSource, config: &StudioConfig) -> anyhow::Result<Outcome> {
    info!("Applying operation to {:?}", path);
    let mut session = load_session(path, config)?;
    let op = read_operation(source)?;
    let applied = session.apply(op)?;

    if applied.committed {
        session.project().save(path)?;
    }

    Ok(Outcome {
        blocked: !applied.committed,
        output: serde_json::to_value(&applied)?,
    })
}

fn step(path: &Path, config: &StudioConfig, forward: bool) -> anyhow::Result<Outcome> {
    let mut session = load_session(path, config)?;
    let moved = if forward { session.redo() } else { session.undo() };

    if moved {
        session.project().save(path)?;
    }

    let history = session.project().history();
    Ok(Outcome::done(json!({
        "moved": moved,
        "index": history.index(),
        "label": history.current_entry().label,
        "canUndo": history.can_undo(),
        "canRedo": history.can_redo(),
    })))
}

/// Undo the last change
pub fn undo(path: &Path, config: &StudioConfig) -> anyhow::Result<Outcome> {
    info!("Undo in {:?}", path);
    step(path, config, false)
}

/// Redo the last undone change
pub fn redo(path: &Path, config: &StudioConfig) -> anyhow::Result<Outcome> {
    info!("Redo in {:?}", path);
    step(path, config, true)
}

/// Show history entries
pub fn show_history(path: &Path, config: &StudioConfig) -> anyhow::Result<Outcome> {
    let session = load_session(path, config)?;
    let history = session.project().history();

    let entries: Vec<Value> = history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            json!({
                "index": i,
                "label": entry.label,
                "committedAt": entry.committed_at,
                "layers": entry.layers.len(),
                "current": i == history.index(),
            })
        })
        .collect();

    Ok(Outcome::done(json!({
        "index": history.index(),
        "maxDepth": history.max_depth(),
        "entries": entries,
    })))
}

/// Options for [`export`].
#[derive(Debug)]
pub struct ExportArgs<'a> {
    pub out: &'a Path,
    pub format: Option<ExportFormat>,
    pub quality: Option<ExportQuality>,
    pub assets_root: Option<&'a Path>,
    pub fonts: &'a [String],
    pub fallback_font: Option<&'a str>,
}

/// Flatten the project to an image file
pub async fn export(path: &Path, args: ExportArgs<'_>, config: &StudioConfig) -> anyhow::Result<Outcome> {
    info!("Exporting {:?} to {:?}", path, args.out);
    let session = load_session(path, config)?;

    let mut book = FontBook::new();
    for spec in args.fonts {
        let (family, weight, file) = parse_font_spec(spec)?;
        book.register_file(family, weight, &file)?;
    }
    if let Some(family) = args.fallback_font {
        book = book.with_fallback(family);
    }

    let root = match args.assets_root {
        Some(root) => root.to_path_buf(),
        None => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let compositor = Compositor::new(Arc::new(ChainResolver::standard(root)), Arc::new(book))
        .with_resolve_timeout(config.export.resolve_timeout());

    let format = args.format.unwrap_or(config.export.format);
    let quality = args.quality.unwrap_or(config.export.quality);
    let artifact = compositor
        .export(&session.snapshot(), format, quality)
        .await?;

    std::fs::write(args.out, &artifact.bytes)
        .with_context(|| format!("cannot write {}", args.out.display()))?;

    let mut output = serde_json::to_value(&artifact)?;
    if let Value::Object(map) = &mut output {
        map.insert("path".to_string(), json!(args.out));
        map.insert("bytes".to_string(), json!(artifact.bytes.len()));
    }
    Ok(Outcome::done(output))
}

/// Print a prompt enriched with the project's brand context
pub fn enrich(path: &Path, prompt: &str, config: &StudioConfig) -> anyhow::Result<Outcome> {
    let session = load_session(path, config)?;
    let enriched = enrich_prompt(prompt, &session.project().brand_kit);
    Ok(Outcome::done(json!({
        "originalPrompt": prompt,
        "enrichedPrompt": enriched,
    })))
}

/// Generate a background and place it, or generate style variations
pub async fn generate(
    path: &Path,
    prompt: &str,
    variations: Option<usize>,
    model: Option<&str>,
    config: &StudioConfig,
) -> anyhow::Result<Outcome> {
    info!("Generating for {:?}", path);
    let mut session = load_session(path, config)?;

    let orchestrator =
        GenerationOrchestrator::new(synthesizer(config)).with_timeout(config.generation.timeout());
    let canvas = session.project().canvas.clone();
    let generation = GenerationConfig::default()
        .with_model(model.unwrap_or(&config.generation.model))
        .with_size(canvas.w, canvas.h);
    let cancel = tokio_util::sync::CancellationToken::new();

    if let Some(count) = variations {
        let kit = Arc::clone(&session.project().brand_kit);
        let set = orchestrator
            .variations(prompt, &kit, &generation, count, &cancel)
            .await?;
        return Ok(Outcome::done(serde_json::to_value(&set)?));
    }

    let placed = orchestrator
        .generate_into(&mut session, prompt, &generation, &cancel)
        .await?;
    if placed.applied.committed {
        session.project().save(path)?;
    }

    Ok(Outcome {
        blocked: !placed.applied.committed,
        output: serde_json::to_value(&placed)?,
    })
}
