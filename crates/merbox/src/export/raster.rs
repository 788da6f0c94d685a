use merbox_svg::{parse_svg, svg_dimensions, Element};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Svg(#[from] merbox_svg::Error),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("export width must be at least one pixel")]
    ZeroWidth,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("invalid background color `{0}`")]
    Background(String),
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to encode WebP")]
    WebpEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Output width in pixels; the height follows the diagram's aspect ratio.
    pub width: u32,
    /// Any CSS color; painted under the diagram for every format.
    pub background: String,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            width: merbox_core::viewport::DEFAULT_IMAGE_SIZE,
            background: "white".to_string(),
            jpeg_quality: 90,
        }
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options)?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let color = parse_background(&options.background)?;
    if !color.is_opaque() {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options)?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // The background is opaque, so every pixel is too and alpha can be dropped as is.
    let mut rgb = Vec::with_capacity((w as usize) * (h as usize) * 3);
    for px in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

/// Lossless WebP.
pub fn svg_to_webp(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options)?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // tiny-skia stores premultiplied alpha; encoders expect straight alpha.
    let mut rgba = Vec::with_capacity((w as usize) * (h as usize) * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut out = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut out)
        .encode(&rgba, w, h, image::ExtendedColorType::Rgba8)
        .map_err(|_| RasterError::WebpEncode)?;
    Ok(out)
}

/// Vector PDF at the diagram's own size; the background is drawn as a rect behind it.
pub fn svg_to_pdf(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let color = parse_background(&options.background)?;
    let mut root = parse_svg(svg)?;
    let (width, height) = svg_dimensions(&root);
    set_size(&mut root, width, height);
    if color.alpha() > 0.0 {
        insert_background(&mut root, &options.background, width, height);
    }

    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();
    let tree = svg2pdf::usvg::Tree::from_str(&root.to_xml(), &opt)
        .map_err(|_| RasterError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

/// Target pixel size: `width` wide, height from the aspect ratio.
pub fn output_size(svg_width: f64, svg_height: f64, width: u32) -> (u32, u32) {
    let aspect = if svg_width > 0.0 && svg_height > 0.0 {
        svg_width / svg_height
    } else {
        1.0
    };
    let height = (f64::from(width) / aspect).round().max(1.0);
    (width, height as u32)
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap> {
    if options.width == 0 {
        return Err(RasterError::ZeroWidth);
    }
    let background = parse_background(&options.background)?;

    let mut root = parse_svg(svg)?;
    let (svg_width, svg_height) = svg_dimensions(&root);
    // Pin the intrinsic size so usvg agrees with the aspect ratio computed here
    // (`width="100%"` has no meaning outside a page).
    set_size(&mut root, svg_width, svg_height);

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();
    let tree = usvg::Tree::from_str(&root.to_xml(), &opt).map_err(|_| RasterError::SvgParse)?;

    let (width_px, height_px) = output_size(svg_width, svg_height, options.width);
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;
    pixmap.fill(background);

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width_px as f32 / size.width(),
        height_px as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    tracing::debug!(width_px, height_px, "rasterized svg");
    Ok(pixmap)
}

fn set_size(root: &mut Element, width: f64, height: f64) {
    if root.attr("viewBox").is_none() {
        if let (Some(w), Some(h)) = (root.attr_f64("width"), root.attr_f64("height")) {
            root.set_attr("viewBox", format!("0 0 {w} {h}"));
        }
    }
    root.set_attr("width", width.to_string());
    root.set_attr("height", height.to_string());
}

fn insert_background(root: &mut Element, color: &str, width: f64, height: f64) {
    let (x, y, w, h) = root
        .attr("viewBox")
        .and_then(|vb| {
            let n: Vec<f64> = vb
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            match n.as_slice() {
                [x, y, w, h] => Some((*x, *y, *w, *h)),
                _ => None,
            }
        })
        .unwrap_or((0.0, 0.0, width, height));
    let rect = Element::new("rect")
        .with_attr("x", x.to_string())
        .with_attr("y", y.to_string())
        .with_attr("width", w.to_string())
        .with_attr("height", h.to_string())
        .with_attr("fill", color);
    root.children.insert(0, merbox_svg::Node::Element(rect));
}

/// Parses a CSS color (`white`, `#fff8`, `rgb(0 0 0 / 50%)`, `transparent`, ...).
pub fn parse_background(text: &str) -> Result<tiny_skia::Color> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("transparent") {
        return Ok(tiny_skia::Color::TRANSPARENT);
    }
    let c = svgtypes::Color::from_str(trimmed)
        .map_err(|_| RasterError::Background(text.to_string()))?;
    Ok(tiny_skia::Color::from_rgba8(c.red, c.green, c.blue, c.alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;

    #[test]
    fn svg_to_png_produces_png_signature() {
        let bytes = svg_to_png(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn svg_to_pdf_produces_pdf_signature() {
        let bytes = svg_to_pdf(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn height_follows_aspect_ratio() {
        assert_eq!(output_size(200.0, 100.0, 1024), (1024, 512));
        assert_eq!(output_size(100.0, 300.0, 90), (90, 270));
        assert_eq!(output_size(0.0, 0.0, 64), (64, 64));
        assert_eq!(output_size(10_000.0, 1.0, 10), (10, 1));
    }

    #[test]
    fn backgrounds_use_css_color_syntax() {
        let c = parse_background("white").unwrap();
        assert!(c.is_opaque());
        let c = parse_background(" #ff000080 ").unwrap();
        assert!(!c.is_opaque());
        assert!(parse_background("transparent").unwrap().alpha() == 0.0);
        assert!(matches!(
            parse_background("not-a-color"),
            Err(RasterError::Background(_))
        ));
    }

    #[test]
    fn jpeg_rejects_translucent_backgrounds() {
        let options = RasterOptions {
            background: "transparent".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            svg_to_jpeg(SQUARE, &options),
            Err(RasterError::JpegOpaqueBackgroundRequired)
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        let options = RasterOptions {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            svg_to_png(SQUARE, &options),
            Err(RasterError::ZeroWidth)
        ));
    }
}
