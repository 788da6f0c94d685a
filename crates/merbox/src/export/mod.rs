//! Export of rendered diagrams: standalone SVG text, and (feature `raster`) PNG/JPG/WebP/PDF.

#[cfg(feature = "raster")]
pub mod raster;

use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

/// Base name of downloaded files (`diagram.svg`, `diagram.png`, ...).
pub const FILE_STEM: &str = "diagram";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Svg,
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Webp,
        ExportFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn file_name(self) -> String {
        format!("{FILE_STEM}.{}", self.extension())
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, ExportFormat::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format `{0}` (expected svg, png, jpg, webp or pdf)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Standalone SVG text for download or clipboard: styles inlined, foreignObjects replaced.
pub fn export_svg(svg: &str) -> merbox_svg::Result<String> {
    merbox_svg::normalize_svg(svg)
}

/// `data:image/svg+xml;base64,...` URL of `svg`.
pub fn svg_data_url(svg: &str) -> String {
    format!(
        "data:{};base64,{}",
        ExportFormat::Svg.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

/// Normalizes `svg` and encodes it as `format`.
#[cfg(feature = "raster")]
pub fn export(
    svg: &str,
    format: ExportFormat,
    options: &raster::RasterOptions,
) -> crate::Result<Vec<u8>> {
    let normalized = export_svg(svg)?;
    let bytes = match format {
        ExportFormat::Svg => normalized.into_bytes(),
        ExportFormat::Png => raster::svg_to_png(&normalized, options)?,
        ExportFormat::Jpeg => raster::svg_to_jpeg(&normalized, options)?,
        ExportFormat::Webp => raster::svg_to_webp(&normalized, options)?,
        ExportFormat::Pdf => raster::svg_to_pdf(&normalized, options)?,
    };
    tracing::debug!(%format, bytes = bytes.len(), "exported diagram");
    Ok(bytes)
}
