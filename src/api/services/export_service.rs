//! Diagram export: sanitized SVG in, raster PNG out.
//!
//! The client sends the rendered Mermaid SVG markup. Before rasterizing, the
//! markup is cleaned the same way the browser path cleans it ahead of canvas
//! drawing: external stylesheet imports and cross-origin href references are
//! stripped and safe inline text styling is injected. Rasterization failure
//! is not fatal - the caller gets the sanitized SVG back instead.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::io::Cursor;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

/// Inline styling injected so text stays visible in exported images.
const SAFE_TEXT_STYLES: &str = "\n  text { font-family: Arial, sans-serif !important; fill: #000 !important; }\n  .node text { fill: #000 !important; }\n  .edgeLabel text { fill: #000 !important; }\n";

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@import[^;]+;").unwrap());

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No SVG markup provided")]
    EmptySvg,
    #[error("Invalid SVG markup: {0}")]
    InvalidSvg(String),
    #[error("Rasterization failed: {0}")]
    Raster(String),
}

/// Result of an export attempt.
#[derive(Debug)]
pub enum ExportOutcome {
    Png(Vec<u8>),
    /// Rasterization failed; the sanitized SVG is delivered instead.
    SvgFallback { svg: String, reason: String },
}

/// SVG-to-PNG export service.
pub struct ExportService;

impl ExportService {
    /// Sanitize then rasterize. PNG on success, sanitized SVG on raster
    /// failure; only unusable input markup is an error.
    pub fn export(svg: &str, scale: f32) -> Result<ExportOutcome, ExportError> {
        let sanitized = Self::sanitize_svg(svg)?;
        match Self::render_png(&sanitized, scale) {
            Ok(png) => Ok(ExportOutcome::Png(png)),
            Err(e) => {
                warn!("PNG rasterization failed, falling back to SVG: {}", e);
                Ok(ExportOutcome::SvgFallback {
                    svg: sanitized,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Strip cross-origin-unsafe content and inject inline text styling.
    pub fn sanitize_svg(svg: &str) -> Result<String, ExportError> {
        if svg.trim().is_empty() {
            return Err(ExportError::EmptySvg);
        }
        let has_style = svg.contains("<style");

        let mut reader = Reader::from_str(svg);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut in_style = false;
        let mut style_patched = false;
        let mut saw_svg_root = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    let is_style = e.name().as_ref() == b"style";
                    let is_svg = e.name().as_ref() == b"svg";
                    writer
                        .write_event(Event::Start(filter_attributes(&e)))
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                    if is_style {
                        in_style = true;
                    }
                    if is_svg && !saw_svg_root {
                        saw_svg_root = true;
                        // No style element anywhere: inject one at the top of
                        // the document so text styling still applies.
                        if !has_style {
                            write_style_block(&mut writer)?;
                            style_patched = true;
                        }
                    }
                }
                Event::Empty(e) => {
                    writer
                        .write_event(Event::Empty(filter_attributes(&e)))
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                }
                Event::Text(t) if in_style => {
                    let css = t
                        .unescape()
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                    let mut css = IMPORT_RE.replace_all(&css, "").into_owned();
                    if !style_patched {
                        css.push_str(SAFE_TEXT_STYLES);
                        style_patched = true;
                    }
                    writer
                        .write_event(Event::Text(BytesText::new(&css)))
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                }
                Event::End(e) => {
                    if e.name().as_ref() == b"style" {
                        if in_style && !style_patched {
                            // Style element was empty; still gets the injected rules.
                            writer
                                .write_event(Event::Text(BytesText::new(SAFE_TEXT_STYLES)))
                                .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                            style_patched = true;
                        }
                        in_style = false;
                    }
                    writer
                        .write_event(Event::End(e))
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                }
                other => {
                    writer
                        .write_event(other)
                        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
                }
            }
        }

        if !saw_svg_root {
            return Err(ExportError::InvalidSvg(
                "no <svg> element in markup".to_string(),
            ));
        }

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| ExportError::InvalidSvg(e.to_string()))
    }

    /// Rasterize SVG markup at the given scale factor.
    pub fn render_png(svg: &str, scale: f32) -> Result<Vec<u8>, ExportError> {
        if scale <= 0.0 {
            return Err(ExportError::Raster(
                "scale must be greater than zero".to_string(),
            ));
        }

        let mut options = resvg::usvg::Options::default();
        options.font_family = "Arial".to_string();
        options.fontdb_mut().load_system_fonts();

        let tree = resvg::usvg::Tree::from_str(svg, &options)
            .map_err(|e| ExportError::Raster(e.to_string()))?;

        let size = tree.size().to_int_size();
        let scaled_width = ((size.width() as f32) * scale).ceil();
        let scaled_height = ((size.height() as f32) * scale).ceil();
        if scaled_width < 1.0
            || scaled_height < 1.0
            || scaled_width > u32::MAX as f32
            || scaled_height > u32::MAX as f32
        {
            return Err(ExportError::Raster(format!(
                "scaled dimensions {}x{} out of range",
                scaled_width, scaled_height
            )));
        }

        let mut pixmap =
            resvg::tiny_skia::Pixmap::new(scaled_width as u32, scaled_height as u32)
                .ok_or_else(|| {
                    ExportError::Raster("failed to allocate pixel buffer".to_string())
                })?;
        pixmap.fill(resvg::tiny_skia::Color::WHITE);

        let transform = resvg::tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| ExportError::Raster(e.to_string()))
    }
}

fn write_style_block(writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new("style")))
        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::new(SAFE_TEXT_STYLES)))
        .map_err(|e| ExportError::InvalidSvg(e.to_string()))?;
    writer
        .write_event(Event::End(quick_xml::events::BytesEnd::new("style")))
        .map_err(|e| ExportError::InvalidSvg(e.to_string()))
}

/// Rebuild an element, dropping href attributes that point off-origin.
fn filter_attributes<'a>(e: &BytesStart<'a>) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        if is_external_ref(&key, &value) {
            continue;
        }
        elem.push_attribute((key.as_str(), value.as_str()));
    }
    elem
}

fn is_external_ref(key: &str, value: &str) -> bool {
    matches!(key, "href" | "xlink:href")
        && (value.starts_with("http://")
            || value.starts_with("https://")
            || value.starts_with("//"))
}
