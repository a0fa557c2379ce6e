//! Scatter plots of minimum adversarial distance against CLEVER score.
//!
//! Layout is computed once in [`render`] and drawn onto a [`Canvas`]; the
//! SVG and PDF backends only know how to emit lines, rectangles, circles and
//! text. All coordinates are in points (1/72 inch) with the origin at the
//! top left.
//!
//! The default figure reproduces the paper layout: 4.69 x 2.17 inches,
//! 2 pt² markers at 70% opacity, image index on the x axis.

pub mod pdf;
pub mod svg;

use std::path::Path;

use crate::analysis::{Analysis, Attack, CleverComparison};
use crate::error::{Error, Result};
use crate::norm::Norm;

pub use pdf::PdfCanvas;
pub use svg::SvgCanvas;

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a color from channel values.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS hex notation, e.g. `#008000`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to 0.0-1.0.
    #[must_use]
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

/// Named colors, matching matplotlib's definitions.
pub mod colors {
    use super::Color;

    /// Minimum distance found by PGD.
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Minimum distance found by the secondary attack.
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    /// CLEVER score above the minimum distance.
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// CLEVER score at or below the minimum distance.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Background.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Legend frame.
    pub const LIGHT_GRAY: Color = Color::rgb(204, 204, 204);
}

impl Attack {
    /// Marker color for minimum distances found by this attack.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Attack::Pgd => colors::BLUE,
            Attack::Secondary => colors::GREEN,
        }
    }
}

impl CleverComparison {
    /// Marker color for CLEVER scores with this outcome.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            CleverComparison::Exceeds => colors::RED,
            CleverComparison::Bounded => colors::BLACK,
        }
    }
}

/// A single marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    /// X value in data units.
    pub x: f64,
    /// Y value in data units.
    pub y: f64,
    /// Marker fill.
    pub color: Color,
}

/// A set of markers drawn together. Later layers are drawn on top.
#[derive(Debug, Clone)]
pub struct ScatterLayer {
    /// Layer name.
    pub name: String,
    /// Markers, each with its own color.
    pub points: Vec<ScatterPoint>,
    /// Fill opacity, 0.0-1.0.
    pub alpha: f64,
    /// Marker area in pt².
    pub marker_area: f64,
}

/// A legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Text shown next to the marker.
    pub label: String,
    /// Marker color.
    pub color: Color,
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the anchor.
    Start,
    /// Text is centered on the anchor.
    Middle,
    /// Text ends at the anchor.
    End,
}

/// How a text run is drawn. The anchor point is on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f64,
    /// Alignment along the baseline.
    pub anchor: TextAnchor,
    /// Rotate 90° counter-clockwise (for the y-axis label).
    pub rotated: bool,
}

impl TextStyle {
    fn new(size: f64, anchor: TextAnchor) -> Self {
        Self {
            size,
            anchor,
            rotated: false,
        }
    }
}

/// Drawing surface for [`render`].
pub trait Canvas {
    /// Straight stroked line.
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);

    /// Axis-aligned rectangle with optional fill and stroke.
    fn rect(
        &mut self,
        origin: (f64, f64),
        size: (f64, f64),
        fill: Option<Color>,
        stroke: Option<Color>,
    );

    /// Filled circle.
    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, alpha: f64);

    /// Text run in Helvetica (or the closest available sans-serif font).
    fn text(&mut self, position: (f64, f64), text: &str, style: TextStyle);

    /// Serialize the finished drawing.
    fn finish(self) -> Vec<u8>
    where
        Self: Sized;
}

/// Figure configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Optional title above the axes.
    pub title: Option<String>,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Figure width in inches.
    pub width_in: f64,
    /// Figure height in inches.
    pub height_in: f64,
    /// Axis label and title font size in points.
    pub label_font_size: f64,
    /// Tick label font size in points.
    pub tick_font_size: f64,
    /// Legend font size in points.
    pub legend_font_size: f64,
    /// Marker area in pt².
    pub marker_area: f64,
    /// Marker opacity.
    pub alpha: f64,
    /// Whether to draw the legend.
    pub legend: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: None,
            x_label: "Image ID".to_string(),
            y_label: Norm::L2.axis_label(),
            width_in: 4.69,
            height_in: 2.17,
            label_font_size: 14.0,
            tick_font_size: 10.0,
            legend_font_size: 6.0,
            marker_area: 2.0,
            alpha: 0.7,
            legend: false,
        }
    }
}

impl PlotConfig {
    /// Default figure with the y label for `norm`.
    #[must_use]
    pub fn for_norm(norm: Norm) -> Self {
        Self {
            y_label: norm.axis_label(),
            ..Default::default()
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the X-axis label.
    #[must_use]
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Sets the Y-axis label.
    #[must_use]
    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Sets the figure size in inches.
    #[must_use]
    pub fn with_dimensions(mut self, width_in: f64, height_in: f64) -> Self {
        self.width_in = width_in;
        self.height_in = height_in;
        self
    }

    /// Enables or disables the legend.
    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Sets marker area (pt²) and opacity.
    #[must_use]
    pub fn with_markers(mut self, marker_area: f64, alpha: f64) -> Self {
        self.marker_area = marker_area;
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Figure width in points.
    #[must_use]
    pub fn width_pt(&self) -> f64 {
        self.width_in * POINTS_PER_INCH
    }

    /// Figure height in points.
    #[must_use]
    pub fn height_pt(&self) -> f64 {
        self.height_in * POINTS_PER_INCH
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single-page PDF.
    Pdf,
    /// Standalone SVG.
    Svg,
}

impl OutputFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(OutputFormat::Pdf),
            Some("svg") => Ok(OutputFormat::Svg),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// The two marker layers for an analysis.
///
/// The first layer holds minimum adversarial distances colored by attack;
/// the second holds CLEVER scores colored by comparison, drawn on top.
#[must_use]
pub fn scatter_layers(analysis: &Analysis, config: &PlotConfig) -> [ScatterLayer; 2] {
    let distances = analysis
        .points
        .iter()
        .map(|p| ScatterPoint {
            x: p.image_id as f64,
            y: p.min_distance,
            color: p.source.color(),
        })
        .collect();
    let clever = analysis
        .points
        .iter()
        .map(|p| ScatterPoint {
            x: p.image_id as f64,
            y: p.clever,
            color: p.comparison.color(),
        })
        .collect();

    [
        ScatterLayer {
            name: "Minimum adversarial distance".to_string(),
            points: distances,
            alpha: config.alpha,
            marker_area: config.marker_area,
        },
        ScatterLayer {
            name: "CLEVER score".to_string(),
            points: clever,
            alpha: config.alpha,
            marker_area: config.marker_area,
        },
    ]
}

/// Legend rows for the four marker classes.
#[must_use]
pub fn legend_entries() -> Vec<LegendEntry> {
    let attacks = [Attack::Pgd, Attack::Secondary]
        .into_iter()
        .map(|a| LegendEntry {
            label: a.label().to_string(),
            color: a.color(),
        });
    let comparisons = [CleverComparison::Exceeds, CleverComparison::Bounded]
        .into_iter()
        .map(|c| LegendEntry {
            label: c.label().to_string(),
            color: c.color(),
        });
    attacks.chain(comparisons).collect()
}

/// Render an analysis into the bytes of the given format.
#[must_use]
pub fn render_analysis(analysis: &Analysis, config: &PlotConfig, format: OutputFormat) -> Vec<u8> {
    let layers = scatter_layers(analysis, config);
    let legend = if config.legend {
        legend_entries()
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Pdf => {
            let mut canvas = PdfCanvas::new(config.width_pt(), config.height_pt());
            render(&mut canvas, &layers, &legend, config);
            canvas.finish()
        }
        OutputFormat::Svg => {
            let mut canvas = SvgCanvas::new(config.width_pt(), config.height_pt());
            render(&mut canvas, &layers, &legend, config);
            canvas.finish()
        }
    }
}

/// Render an analysis and write it to `path`. The format follows the
/// file extension.
pub fn save_plot(
    path: impl AsRef<Path>,
    analysis: &Analysis,
    config: &PlotConfig,
) -> Result<OutputFormat> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let bytes = render_analysis(analysis, config, format);
    std::fs::write(path, bytes)?;
    tracing::debug!(
        path = %path.display(),
        ?format,
        points = analysis.points.len(),
        "saved plot"
    );
    Ok(format)
}

const AXIS_WIDTH: f64 = 0.8;
const TICK_LENGTH: f64 = 3.5;
const TICK_PAD: f64 = 3.5;
const LABEL_PAD: f64 = 4.0;
const FIGURE_PAD: f64 = 4.0;
const MAX_TICKS: usize = 6;

/// Draw axes, ticks, labels, marker layers and legend onto `canvas`.
pub fn render<C: Canvas>(
    canvas: &mut C,
    layers: &[ScatterLayer],
    legend: &[LegendEntry],
    config: &PlotConfig,
) {
    let width = config.width_pt();
    let height = config.height_pt();

    let finite = |p: &&ScatterPoint| p.x.is_finite() && p.y.is_finite();
    let skipped: usize = layers
        .iter()
        .map(|l| l.points.iter().filter(|p| !finite(p)).count())
        .sum();
    if skipped > 0 {
        tracing::warn!(skipped, "points with non-finite coordinates are not drawn");
    }

    let all_x: Vec<f64> = layers
        .iter()
        .flat_map(|l| l.points.iter().filter(finite).map(|p| p.x))
        .collect();
    let all_y: Vec<f64> = layers
        .iter()
        .flat_map(|l| l.points.iter().filter(finite).map(|p| p.y))
        .collect();
    let (min_x, max_x) = bounds_with_padding(&all_x, 0.05);
    let (min_y, max_y) = bounds_with_padding(&all_y, 0.05);

    let x_ticks = nice_ticks(min_x, max_x, MAX_TICKS);
    let y_ticks = nice_ticks(min_y, max_y, MAX_TICKS);
    let x_labels: Vec<String> = format_ticks(&x_ticks);
    let y_labels: Vec<String> = format_ticks(&y_ticks);

    let tick_size = config.tick_font_size;
    let label_size = config.label_font_size;
    let widest_y_label = y_labels
        .iter()
        .map(|l| text_width(l, tick_size))
        .fold(0.0, f64::max);
    let last_x_label = x_labels.last().map_or(0.0, |l| text_width(l, tick_size));

    let title_space = config
        .title
        .as_ref()
        .map_or(0.0, |_| label_size + LABEL_PAD);
    let margin_top = FIGURE_PAD + title_space + tick_size / 2.0;
    let margin_right = FIGURE_PAD + last_x_label / 2.0;
    let margin_bottom = FIGURE_PAD + label_size + LABEL_PAD + tick_size + TICK_PAD + TICK_LENGTH;
    let margin_left = FIGURE_PAD + label_size + LABEL_PAD + widest_y_label + TICK_PAD + TICK_LENGTH;

    let left = margin_left;
    let top = margin_top;
    let right = (width - margin_right).max(left + 1.0);
    let bottom = (height - margin_bottom).max(top + 1.0);

    let scale_x = |v: f64| left + (v - min_x) / (max_x - min_x) * (right - left);
    let scale_y = |v: f64| bottom - (v - min_y) / (max_y - min_y) * (bottom - top);

    canvas.rect((0.0, 0.0), (width, height), Some(colors::WHITE), None);

    if let Some(title) = &config.title {
        canvas.text(
            ((left + right) / 2.0, FIGURE_PAD + label_size * 0.8),
            title,
            TextStyle::new(label_size, TextAnchor::Middle),
        );
    }

    // Ticks
    for (value, label) in x_ticks.iter().zip(&x_labels) {
        let x = scale_x(*value);
        canvas.line((x, bottom), (x, bottom + TICK_LENGTH), colors::BLACK, AXIS_WIDTH);
        canvas.text(
            (x, bottom + TICK_LENGTH + TICK_PAD + tick_size * 0.75),
            label,
            TextStyle::new(tick_size, TextAnchor::Middle),
        );
    }
    for (value, label) in y_ticks.iter().zip(&y_labels) {
        let y = scale_y(*value);
        canvas.line((left - TICK_LENGTH, y), (left, y), colors::BLACK, AXIS_WIDTH);
        canvas.text(
            (left - TICK_LENGTH - TICK_PAD, y + tick_size * 0.35),
            label,
            TextStyle::new(tick_size, TextAnchor::End),
        );
    }

    // Axis labels
    canvas.text(
        ((left + right) / 2.0, height - FIGURE_PAD - label_size * 0.2),
        &config.x_label,
        TextStyle::new(label_size, TextAnchor::Middle),
    );
    canvas.text(
        (FIGURE_PAD + label_size * 0.8, (top + bottom) / 2.0),
        &config.y_label,
        TextStyle {
            rotated: true,
            ..TextStyle::new(label_size, TextAnchor::Middle)
        },
    );

    for layer in layers {
        let radius = layer.marker_area.max(0.0).sqrt() / 2.0;
        for p in layer.points.iter().filter(finite) {
            canvas.circle((scale_x(p.x), scale_y(p.y)), radius, p.color, layer.alpha);
        }
    }

    // Frame on top of markers that touch the edges
    canvas.rect((left, top), (right - left, bottom - top), None, Some(colors::BLACK));

    if !legend.is_empty() {
        draw_legend(canvas, legend, config.legend_font_size, (right, top));
    }
}

fn draw_legend<C: Canvas>(canvas: &mut C, entries: &[LegendEntry], size: f64, corner: (f64, f64)) {
    let row = size * 1.5;
    let pad = size * 0.6;
    let marker = size * 0.35;
    let widest = entries
        .iter()
        .map(|e| text_width(&e.label, size))
        .fold(0.0, f64::max);
    let box_width = pad * 3.0 + marker * 2.0 + widest;
    let box_height = pad * 2.0 + row * entries.len() as f64 - (row - size);
    let x = corner.0 - pad - box_width;
    let y = corner.1 + pad;

    canvas.rect(
        (x, y),
        (box_width, box_height),
        Some(colors::WHITE),
        Some(colors::LIGHT_GRAY),
    );
    for (i, entry) in entries.iter().enumerate() {
        let baseline = y + pad + size * 0.8 + row * i as f64;
        canvas.circle((x + pad + marker, baseline - size * 0.3), marker, entry.color, 1.0);
        canvas.text(
            (x + pad * 2.0 + marker * 2.0, baseline),
            &entry.label,
            TextStyle::new(size, TextAnchor::Start),
        );
    }
}

/// Min/max of `values` widened by `padding` of the range on each side.
///
/// Degenerate ranges are widened so the scale never divides by zero.
fn bounds_with_padding(values: &[f64], padding: f64) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range > min.abs().max(max.abs()) * f64::EPSILON * 16.0 {
        (min - range * padding, max + range * padding)
    } else if min == 0.0 && max == 0.0 {
        (-0.5, 0.5)
    } else {
        let mid = min / 2.0 + max / 2.0;
        let half = mid.abs() * padding;
        (mid - half, mid + half)
    }
}

/// Tick positions at 1, 2 or 5 × 10^k inside `[min, max]`.
///
/// At most `max_ticks * 4` ticks are produced, whatever the range.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let step = nice_step(min, max, max_ticks);
    if !step.is_finite() || step <= 0.0 {
        return vec![min];
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !(first.is_finite() && last.is_finite()) || last < first {
        return Vec::new();
    }
    let count = ((last - first) as usize).min(max_ticks.max(1) * 4 - 1);
    (0..=count)
        .map(|k| {
            let v = (first + k as f64) * step;
            if v.abs() < step * 1e-9 { 0.0 } else { v }
        })
        .collect()
}

fn nice_step(min: f64, max: f64, max_ticks: usize) -> f64 {
    let raw = (max - min) / max_ticks.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Format tick values with just enough decimals for their spacing.
fn format_ticks(ticks: &[f64]) -> Vec<String> {
    let step = match ticks {
        [a, b, ..] if b > a => b - a,
        _ => 1.0,
    };
    let decimals = (-step.log10() - 1e-9).ceil().max(0.0) as usize;
    ticks.iter().map(|t| format!("{:.*}", decimals, t)).collect()
}

/// Advance widths of Helvetica for ASCII 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Approximate width of `text` set in Helvetica at `size` points.
#[must_use]
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 0x20) as usize])
            } else {
                556
            }
        })
        .sum();
    f64::from(units) * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::DistanceRecord;

    /// Records every call so layout can be checked without parsing output.
    #[derive(Default)]
    struct RecordingCanvas {
        circles: Vec<((f64, f64), Color, f64)>,
        texts: Vec<String>,
        rects: usize,
    }

    impl Canvas for RecordingCanvas {
        fn line(&mut self, _from: (f64, f64), _to: (f64, f64), _color: Color, _width: f64) {}

        fn rect(
            &mut self,
            _origin: (f64, f64),
            _size: (f64, f64),
            _fill: Option<Color>,
            _stroke: Option<Color>,
        ) {
            self.rects += 1;
        }

        fn circle(&mut self, center: (f64, f64), _radius: f64, fill: Color, alpha: f64) {
            self.circles.push((center, fill, alpha));
        }

        fn text(&mut self, _position: (f64, f64), text: &str, _style: TextStyle) {
            self.texts.push(text.to_string());
        }

        fn finish(self) -> Vec<u8> {
            Vec::new()
        }
    }

    fn sample_analysis() -> Analysis {
        let records = [
            DistanceRecord {
                image_id: 0,
                clever: 0.5,
                pgd: 0.4,
                secondary: 0.6,
            },
            DistanceRecord {
                image_id: 1,
                clever: 0.3,
                pgd: 0.7,
                secondary: 0.2,
            },
            DistanceRecord {
                image_id: 2,
                clever: 1.0,
                pgd: 1.5,
                secondary: 1.5,
            },
        ];
        Analysis::from_records(Norm::L2, &records)
    }

    #[test]
    fn test_layer_colors() {
        let analysis = sample_analysis();
        let layers = scatter_layers(&analysis, &PlotConfig::default());
        assert_eq!(layers.len(), 2);

        let distances: Vec<Color> = layers[0].points.iter().map(|p| p.color).collect();
        assert_eq!(distances, vec![colors::BLUE, colors::GREEN, colors::GREEN]);

        let clever: Vec<Color> = layers[1].points.iter().map(|p| p.color).collect();
        assert_eq!(clever, vec![colors::RED, colors::RED, colors::BLACK]);

        assert_eq!(layers[0].points[1].y, 0.2);
        assert_eq!(layers[1].points[2].x, 2.0);
    }

    #[test]
    fn test_render_draws_both_layers_in_order() {
        let analysis = sample_analysis();
        let config = PlotConfig::default();
        let layers = scatter_layers(&analysis, &config);

        let mut canvas = RecordingCanvas::default();
        render(&mut canvas, &layers, &[], &config);

        assert_eq!(canvas.circles.len(), 6);
        assert_eq!(canvas.circles[0].1, colors::BLUE);
        assert_eq!(canvas.circles[3].1, colors::RED);
        assert!(canvas.circles.iter().all(|c| (c.2 - 0.7).abs() < 1e-12));
        assert!(canvas.texts.contains(&"Image ID".to_string()));
        assert!(canvas.texts.contains(&"L2 Distance".to_string()));
        // background + frame
        assert_eq!(canvas.rects, 2);
    }

    #[test]
    fn test_render_markers_inside_figure() {
        let analysis = sample_analysis();
        let config = PlotConfig::default();
        let layers = scatter_layers(&analysis, &config);
        let mut canvas = RecordingCanvas::default();
        render(&mut canvas, &layers, &[], &config);

        for ((x, y), _, _) in &canvas.circles {
            assert!(*x > 0.0 && *x < config.width_pt());
            assert!(*y > 0.0 && *y < config.height_pt());
        }
        // Larger values are drawn higher up.
        let pgd_point = canvas.circles[0].0; // 0.4
        let tie_point = canvas.circles[2].0; // 1.5
        assert!(tie_point.1 < pgd_point.1);
    }

    #[test]
    fn test_render_skips_non_finite_and_adds_legend() {
        let layers = vec![ScatterLayer {
            name: "test".to_string(),
            points: vec![
                ScatterPoint {
                    x: 0.0,
                    y: 1.0,
                    color: colors::BLUE,
                },
                ScatterPoint {
                    x: 1.0,
                    y: f64::INFINITY,
                    color: colors::BLUE,
                },
                ScatterPoint {
                    x: 2.0,
                    y: f64::NAN,
                    color: colors::BLUE,
                },
            ],
            alpha: 1.0,
            marker_area: 2.0,
        }];
        let legend = legend_entries();
        let mut canvas = RecordingCanvas::default();
        render(&mut canvas, &layers, &legend, &PlotConfig::default().with_legend(true));

        // one data point + four legend markers
        assert_eq!(canvas.circles.len(), 5);
        assert!(canvas.texts.contains(&"Adversarial Distance (PGD)".to_string()));
        assert!(canvas.texts.contains(&"Clever Score > Adversarial Distance".to_string()));
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path("plot.pdf").unwrap(), OutputFormat::Pdf);
        assert_eq!(OutputFormat::from_path("plot.SVG").unwrap(), OutputFormat::Svg);
        assert!(matches!(
            OutputFormat::from_path("plot.png"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path("plot").is_err());
    }

    #[test]
    fn test_save_plot_writes_pdf_and_svg() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = sample_analysis();
        let config = PlotConfig::for_norm(Norm::L2);

        let pdf_path = dir.path().join("plot.pdf");
        assert_eq!(save_plot(&pdf_path, &analysis, &config).unwrap(), OutputFormat::Pdf);
        let pdf = std::fs::read(&pdf_path).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));

        let svg_path = dir.path().join("plot.svg");
        save_plot(&svg_path, &analysis, &config).unwrap();
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#ff0000"));
    }

    #[test]
    fn test_bounds_with_padding() {
        assert_eq!(bounds_with_padding(&[], 0.05), (0.0, 1.0));
        let (lo, hi) = bounds_with_padding(&[0.0, 10.0], 0.05);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
        assert_eq!(bounds_with_padding(&[0.0], 0.05), (-0.5, 0.5));
        let (lo, hi) = bounds_with_padding(&[2.0, 2.0], 0.05);
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(-0.5, 10.5, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let ticks = nice_ticks(0.01, 0.49, 6);
        assert_eq!(ticks.len(), 4);
        assert!((ticks[0] - 0.1).abs() < 1e-12);
        assert_eq!(format_ticks(&ticks), vec!["0.1", "0.2", "0.3", "0.4"]);
        assert_eq!(format_ticks(&[0.0, 500.0]), vec!["0", "500"]);
    }

    #[test]
    fn test_nice_ticks_bounded_for_tiny_range() {
        let next = f64::from_bits(0.3f64.to_bits() + 1);
        let ticks = nice_ticks(0.3, next, 6);
        assert!(ticks.len() <= 24);
        assert!(nice_ticks(1e15, 1e15 + 0.25, 6).len() <= 24);
        assert!(nice_ticks(1.0, 1.0, 6).len() <= 24);
    }

    #[test]
    fn test_bounds_with_padding_one_ulp_apart() {
        let next = f64::from_bits(0.3f64.to_bits() + 1);
        let (lo, hi) = bounds_with_padding(&[0.3, next], 0.05);
        assert!(lo < 0.3 && hi > next);
        assert!(hi - lo > 0.01);
    }

    #[test]
    fn test_render_near_equal_values() {
        let next = f64::from_bits(0.3f64.to_bits() + 1);
        let records = [DistanceRecord {
            image_id: 0,
            clever: 0.3,
            pgd: next,
            secondary: next,
        }];
        let analysis = Analysis::from_records(Norm::L2, &records);
        let config = PlotConfig::default();
        let layers = scatter_layers(&analysis, &config);

        let mut canvas = RecordingCanvas::default();
        render(&mut canvas, &layers, &[], &config);
        assert_eq!(canvas.circles.len(), 2);

        let pdf = render_analysis(&analysis, &config, OutputFormat::Pdf);
        assert!(pdf.starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn test_plot_config_builder() {
        let config = PlotConfig::for_norm(Norm::LInf)
            .with_title("CLEVER vs PGD")
            .with_x_label("Sample")
            .with_y_label("Distance")
            .with_dimensions(6.0, 3.0)
            .with_legend(true)
            .with_markers(4.0, 1.5);
        assert_eq!(config.title.as_deref(), Some("CLEVER vs PGD"));
        assert_eq!(config.x_label, "Sample");
        assert_eq!(config.y_label, "Distance");
        assert!((config.width_pt() - 432.0).abs() < 1e-9);
        assert!((config.height_pt() - 216.0).abs() < 1e-9);
        assert!(config.legend);
        assert_eq!(config.marker_area, 4.0);
        assert_eq!(config.alpha, 1.0);

        assert_eq!(PlotConfig::default().with_markers(2.0, -0.2).alpha, 0.0);

        let layers = scatter_layers(&sample_analysis(), &config);
        assert!(layers.iter().all(|l| l.alpha == 1.0 && l.marker_area == 4.0));
    }

    #[test]
    fn test_text_width() {
        assert!((text_width("0", 10.0) - 5.56).abs() < 1e-9);
        assert!(text_width("Image ID", 14.0) > text_width("ID", 14.0));
        assert_eq!(text_width("", 10.0), 0.0);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(colors::GREEN.to_hex(), "#008000");
        assert_eq!(colors::RED.to_unit(), (1.0, 0.0, 0.0));
    }
}
