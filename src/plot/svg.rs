//! SVG backend.

use std::fmt::Write as _;

use super::{Canvas, Color, TextAnchor, TextStyle};

/// Builds a standalone SVG document sized in points.
#[derive(Debug)]
pub struct SvgCanvas {
    svg: String,
}

impl SvgCanvas {
    /// Start a document of the given size in points.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let mut svg = String::with_capacity(16384);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}pt" height="{h:.2}pt" viewBox="0 0 {w:.2} {h:.2}">"#,
            w = width,
            h = height
        );
        svg.push_str(
            r#"<style>
  text { font-family: Helvetica, Arial, sans-serif; fill: #000000; }
</style>
"#,
        );
        Self { svg }
    }
}

impl Canvas for SvgCanvas {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
        let _ = writeln!(
            self.svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
            from.0,
            from.1,
            to.0,
            to.1,
            color.to_hex(),
            width
        );
    }

    fn rect(
        &mut self,
        origin: (f64, f64),
        size: (f64, f64),
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        let fill = fill.map_or_else(|| "none".to_string(), Color::to_hex);
        let stroke = stroke.map_or_else(|| "none".to_string(), Color::to_hex);
        let _ = writeln!(
            self.svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="0.8"/>"#,
            origin.0,
            origin.1,
            size.0,
            size.1,
            fill,
            stroke
        );
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, alpha: f64) {
        let _ = write!(
            self.svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.3}" fill="{}""#,
            center.0,
            center.1,
            radius,
            fill.to_hex()
        );
        if alpha < 1.0 {
            let _ = write!(self.svg, r#" fill-opacity="{:.3}""#, alpha);
        }
        self.svg.push_str("/>\n");
    }

    fn text(&mut self, position: (f64, f64), text: &str, style: TextStyle) {
        let anchor = match style.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let _ = write!(
            self.svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="{}""#,
            position.0, position.1, style.size, anchor
        );
        if style.rotated {
            let _ = write!(
                self.svg,
                r#" transform="rotate(-90 {:.2} {:.2})""#,
                position.0, position.1
            );
        }
        let _ = writeln!(self.svg, ">{}</text>", escape_xml(text));
    }

    fn finish(mut self) -> Vec<u8> {
        self.svg.push_str("</svg>\n");
        self.svg.into_bytes()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
