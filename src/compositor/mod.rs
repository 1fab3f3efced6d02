//! Compositor
//!
//! Deterministic flatten/export of a layer snapshot into PNG, JPEG or WebP.

mod color;
mod export;
mod fonts;
mod resolve;
mod surface;
mod text;

pub use color::parse_color;
pub use export::{
    decode_sources, draw_order, encode, render_layers, sha256_hex, Compositor, ExportArtifact,
    ExportFormat, ExportQuality, DEFAULT_RESOLVE_TIMEOUT_MS,
};
pub use fonts::FontBook;
#[cfg(feature = "http")]
pub use resolve::HttpResolver;
pub use resolve::{
    decode_data_uri, encode_data_uri, ChainResolver, DataUriResolver, FileResolver,
    SourceResolver, StaticResolver,
};
pub use surface::{blend_color, draw_image, flatten, Placement};
pub use text::{layout_lines, wrap_lines, LineLayout, Typesetter};
