//! Minimal single-page PDF backend.
//!
//! Emits a PDF 1.4 file with one page, the standard Helvetica font in
//! WinAnsi encoding, and one `ExtGState` per distinct fill opacity. The
//! content stream is uncompressed.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{Canvas, Color, TextAnchor, TextStyle, text_width};

/// Bézier control distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_75;

/// First object number used for graphics states.
const FIRST_GS_OBJECT: usize = 6;

/// Builds a one-page PDF document sized in points.
#[derive(Debug)]
pub struct PdfCanvas {
    width: f64,
    height: f64,
    content: String,
    /// Opacity in thousandths -> graphics state index.
    alphas: BTreeMap<u32, usize>,
}

impl PdfCanvas {
    /// Start a page of the given size in points.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: String::with_capacity(16384),
            alphas: BTreeMap::new(),
        }
    }

    /// PDF y axis points up.
    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn graphics_state(&mut self, alpha: f64) -> usize {
        let key = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u32;
        let next = self.alphas.len();
        *self.alphas.entry(key).or_insert(next)
    }

    fn set_fill(&mut self, color: Color) {
        let (r, g, b) = color.to_unit();
        let _ = writeln!(self.content, "{r:.3} {g:.3} {b:.3} rg");
    }

    fn set_stroke(&mut self, color: Color) {
        let (r, g, b) = color.to_unit();
        let _ = writeln!(self.content, "{r:.3} {g:.3} {b:.3} RG");
    }
}

impl Canvas for PdfCanvas {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
        let (y1, y2) = (self.flip(from.1), self.flip(to.1));
        self.set_stroke(color);
        let _ = writeln!(
            self.content,
            "{:.3} w {:.3} {:.3} m {:.3} {:.3} l S",
            width, from.0, y1, to.0, y2
        );
    }

    fn rect(
        &mut self,
        origin: (f64, f64),
        size: (f64, f64),
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        let op = match (fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };
        if let Some(color) = fill {
            self.set_fill(color);
        }
        if let Some(color) = stroke {
            self.set_stroke(color);
            self.content.push_str("0.8 w\n");
        }
        let bottom = self.flip(origin.1 + size.1);
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} {:.3} re {}",
            origin.0, bottom, size.0, size.1, op
        );
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, alpha: f64) {
        let gs = self.graphics_state(alpha);
        let (cx, cy) = (center.0, self.flip(center.1));
        let r = radius;
        let k = radius * KAPPA;

        self.content.push_str("q\n");
        let _ = writeln!(self.content, "/GS{gs} gs");
        self.set_fill(fill);
        let _ = writeln!(self.content, "{:.3} {:.3} m", cx + r, cy);
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} {:.3} {:.3} {:.3} c",
            cx + r,
            cy + k,
            cx + k,
            cy + r,
            cx,
            cy + r
        );
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} {:.3} {:.3} {:.3} c",
            cx - k,
            cy + r,
            cx - r,
            cy + k,
            cx - r,
            cy
        );
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} {:.3} {:.3} {:.3} c",
            cx - r,
            cy - k,
            cx - k,
            cy - r,
            cx,
            cy - r
        );
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} {:.3} {:.3} {:.3} c",
            cx + k,
            cy - r,
            cx + r,
            cy - k,
            cx + r,
            cy
        );
        self.content.push_str("f\nQ\n");
    }

    fn text(&mut self, position: (f64, f64), text: &str, style: TextStyle) {
        let shift = match style.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => text_width(text, style.size) / 2.0,
            TextAnchor::End => text_width(text, style.size),
        };
        let (x, y) = (position.0, self.flip(position.1));
        // Text matrix: rotation about the anchor, then shift along the baseline.
        let (a, b, c, d, e, f) = if style.rotated {
            (0.0, 1.0, -1.0, 0.0, x, y - shift)
        } else {
            (1.0, 0.0, 0.0, 1.0, x - shift, y)
        };

        self.set_fill(Color::rgb(0, 0, 0));
        let _ = writeln!(
            self.content,
            "BT /F1 {:.2} Tf {} {} {} {} {:.3} {:.3} Tm ({}) Tj ET",
            style.size,
            a,
            b,
            c,
            d,
            e,
            f,
            escape_pdf_text(text)
        );
    }

    fn finish(self) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::with_capacity(FIRST_GS_OBJECT + self.alphas.len());

        let gs_refs: String = self
            .alphas
            .values()
            .map(|&i| format!("/GS{} {} 0 R ", i, FIRST_GS_OBJECT + i))
            .collect();

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push("<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string());
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 4 0 R >> /ExtGState << {}>> >> /Contents 5 0 R >>",
            self.width, self.height, gs_refs
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            self.content.len(),
            self.content
        ));

        // Graphics states ordered by index so object numbers line up.
        let mut by_index: Vec<(usize, u32)> = self.alphas.iter().map(|(&k, &i)| (i, k)).collect();
        by_index.sort_unstable();
        for (_, key) in by_index {
            let alpha = f64::from(key) / 1000.0;
            objects.push(format!("<< /Type /ExtGState /ca {alpha:.3} /CA {alpha:.3} >>"));
        }

        let mut out: Vec<u8> = Vec::with_capacity(self.content.len() + 2048);
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

/// Escape a string for a PDF literal in WinAnsi encoding.
///
/// Latin-1 characters are written as octal escapes; a few common symbols
/// outside WinAnsi get ASCII spellings, anything else becomes `?`.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            '∞' => out.push_str("inf"),
            '≤' => out.push_str("<="),
            '≥' => out.push_str(">="),
            '→' => out.push_str("->"),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(canvas: PdfCanvas) -> String {
        String::from_utf8_lossy(&canvas.finish()).into_owned()
    }

    #[test]
    fn test_document_structure() {
        let mut canvas = PdfCanvas::new(337.68, 156.24);
        canvas.line((0.0, 0.0), (10.0, 10.0), Color::rgb(0, 0, 0), 0.8);
        let pdf = document(canvas);

        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/MediaBox [0 0 337.68 156.24]"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.contains("xref\n0 6\n"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.circle((50.0, 50.0), 2.0, Color::rgb(255, 0, 0), 0.7);
        let bytes = canvas.finish();
        let text = String::from_utf8_lossy(&bytes);

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref"));

        // The binary comment in the header is not UTF-8, so slice the bytes.
        let table = String::from_utf8_lossy(&bytes[xref_at..]);
        let entries: Vec<usize> = table
            .lines()
            .skip(3) // "xref", "0 N", free entry
            .take_while(|l| !l.starts_with("trailer"))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 6);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn test_graphics_states_are_shared() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.circle((10.0, 10.0), 1.0, Color::rgb(0, 0, 255), 0.7);
        canvas.circle((20.0, 10.0), 1.0, Color::rgb(0, 128, 0), 0.7);
        canvas.circle((30.0, 10.0), 1.0, Color::rgb(0, 0, 0), 1.0);
        let pdf = document(canvas);

        assert_eq!(pdf.matches("/Type /ExtGState").count(), 2);
        assert!(pdf.contains("/GS0 6 0 R /GS1 7 0 R"));
        assert!(pdf.contains("/ca 0.700"));
        assert_eq!(pdf.matches("/GS0 gs").count(), 2);
    }

    #[test]
    fn test_circle_flips_y() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.circle((10.0, 20.0), 1.0, Color::rgb(0, 0, 0), 1.0);
        let pdf = document(canvas);
        // start point is (cx + r, height - cy)
        assert!(pdf.contains("11.000 80.000 m"));
    }

    #[test]
    fn test_text_anchor_and_rotation() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        canvas.text(
            (50.0, 90.0),
            "00",
            TextStyle {
                size: 10.0,
                anchor: TextAnchor::Middle,
                rotated: false,
            },
        );
        canvas.text(
            (10.0, 50.0),
            "00",
            TextStyle {
                size: 10.0,
                anchor: TextAnchor::Middle,
                rotated: true,
            },
        );
        let pdf = document(canvas);
        // "00" is 11.12pt wide at 10pt
        assert!(pdf.contains("1 0 0 1 44.440 10.000 Tm (00) Tj"));
        assert!(pdf.contains("0 1 -1 0 10.000 44.440 Tm (00) Tj"));
    }

    #[test]
    fn test_escape_pdf_text() {
        assert_eq!(escape_pdf_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_pdf_text("L∞"), "Linf");
        assert_eq!(escape_pdf_text("≤"), "<=");
        assert_eq!(escape_pdf_text("é"), "\\351");
        assert_eq!(escape_pdf_text("日"), "?");
    }
}
