//! CLI Module
//!
//! Command-line interface over project JSON files. Every command prints one
//! JSON document on stdout.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compositor::{ExportFormat, ExportQuality};

/// Brandcanvas - brand-governed layer composition
#[derive(Parser, Debug)]
#[command(name = "brandcanvas-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where an operation comes from.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct OperationSource {
    /// Operation as inline JSON
    #[arg(long)]
    pub op: Option<String>,

    /// File containing the operation JSON
    #[arg(long)]
    pub op_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project file
    #[command(name = "new")]
    New {
        /// Path for the new project file
        path: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: String,

        /// Brand kit JSON file
        #[arg(short, long)]
        brand_kit: PathBuf,

        /// Canvas preset, e.g. instagram-post
        #[arg(short, long, conflicts_with = "size")]
        preset: Option<String>,

        /// Explicit canvas size as WIDTHxHEIGHT
        #[arg(short, long)]
        size: Option<String>,
    },

    /// List canvas presets
    #[command(name = "presets")]
    Presets,

    /// Validate an operation without applying it
    #[command(name = "validate")]
    Validate {
        /// Path to the project
        project: PathBuf,

        #[command(flatten)]
        source: OperationSource,
    },

    /// Validate and apply an operation
    #[command(name = "apply")]
    Apply {
        /// Path to the project
        project: PathBuf,

        #[command(flatten)]
        source: OperationSource,
    },

    /// Undo the last change
    #[command(name = "undo")]
    Undo {
        /// Path to the project
        project: PathBuf,
    },

    /// Redo the last undone change
    #[command(name = "redo")]
    Redo {
        /// Path to the project
        project: PathBuf,
    },

    /// Show history entries
    #[command(name = "history")]
    History {
        /// Path to the project
        project: PathBuf,
    },

    /// Flatten the project to an image file
    #[command(name = "export")]
    Export {
        /// Path to the project
        project: PathBuf,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// png, jpeg or webp (default from config)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// draft, standard or high (default from config)
        #[arg(short, long)]
        quality: Option<ExportQuality>,

        /// Directory relative image sources resolve against
        /// (default: the project file's directory)
        #[arg(long)]
        assets_root: Option<PathBuf>,

        /// Font face as FAMILY=PATH or FAMILY@WEIGHT=PATH (repeatable)
        #[arg(long = "font")]
        fonts: Vec<String>,

        /// Family used when a text layer's family is not registered
        #[arg(long)]
        fallback_font: Option<String>,
    },

    /// Print a prompt enriched with the project's brand context
    #[command(name = "enrich")]
    Enrich {
        /// Path to the project
        project: PathBuf,

        /// Prompt text
        prompt: String,
    },

    /// Generate a background and place it, or generate style variations
    #[command(name = "generate")]
    Generate {
        /// Path to the project
        project: PathBuf,

        /// Prompt text
        prompt: String,

        /// Generate this many style variations instead of placing one image
        #[arg(long)]
        variations: Option<usize>,

        /// Model id (default from config)
        #[arg(short, long)]
        model: Option<String>,
    },
}
