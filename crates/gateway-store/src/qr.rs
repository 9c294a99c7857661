//! QR image encoding for shareable links.

use crate::error::GatewayError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::QrCode;
use serde::Deserialize;

/// Rendering options for generated QR images.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QrOptions {
    /// Minimum image edge in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Quiet-zone width in modules on each side.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Module color.
    #[serde(default = "default_dark")]
    pub dark: String,

    /// Background color.
    #[serde(default = "default_light")]
    pub light: String,
}

fn default_width() -> u32 {
    200
}

fn default_margin() -> u32 {
    2
}

fn default_dark() -> String {
    "#f97316".into()
}

fn default_light() -> String {
    "#fff7ed".into()
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            margin: default_margin(),
            dark: default_dark(),
            light: default_light(),
        }
    }
}

/// Turns a URL into a scannable image, returned as a data URL.
#[async_trait]
pub trait QrEncoder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<String, GatewayError>;
}

/// Renders QR codes as base64 SVG data URLs.
#[derive(Debug, Clone, Default)]
pub struct SvgQrEncoder {
    options: QrOptions,
}

impl SvgQrEncoder {
    pub fn new(options: QrOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Render the raw SVG document.
    ///
    /// Modules are drawn without the renderer's own quiet zone and nested
    /// inside a background square padded by `margin` modules.
    pub fn render_svg(&self, text: &str) -> Result<String, GatewayError> {
        let code =
            QrCode::new(text.as_bytes()).map_err(|e| GatewayError::QrEncoding(e.to_string()))?;
        let layout = QrLayout::new(code.width() as u32, &self.options);

        let modules = code
            .render::<svg::Color>()
            .quiet_zone(false)
            .module_dimensions(layout.unit, layout.unit)
            .dark_color(svg::Color(&self.options.dark))
            .light_color(svg::Color(&self.options.light))
            .build();

        if layout.pad == 0 {
            return Ok(modules);
        }

        let inner = modules
            .find("<svg")
            .map(|start| &modules[start..])
            .ok_or_else(|| GatewayError::QrEncoding("renderer produced no <svg> element".into()))?;
        let inner = inner.replacen(
            "<svg",
            &format!(r#"<svg x="{pad}" y="{pad}""#, pad = layout.pad),
            1,
        );

        Ok(format!(
            concat!(
                r#"<?xml version="1.0" standalone="yes"?>"#,
                r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
                r#"<rect width="{size}" height="{size}" fill="{light}"/>{inner}</svg>"#
            ),
            size = layout.size,
            light = self.options.light,
            inner = inner,
        ))
    }
}

/// Pixel geometry of a rendered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QrLayout {
    /// Edge of one module.
    unit: u32,
    /// Quiet zone on each side.
    pad: u32,
    /// Edge of the whole image.
    size: u32,
}

impl QrLayout {
    /// Smallest module size that makes the padded image at least `width` wide.
    fn new(modules: u32, options: &QrOptions) -> Self {
        let span = modules + 2 * options.margin;
        let unit = options.width.div_ceil(span).max(1);

        Self {
            unit,
            pad: options.margin * unit,
            size: span * unit,
        }
    }
}

#[async_trait]
impl QrEncoder for SvgQrEncoder {
    async fn encode(&self, text: &str) -> Result<String, GatewayError> {
        let image = self.render_svg(text)?;
        Ok(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(image.as_bytes())
        ))
    }
}
