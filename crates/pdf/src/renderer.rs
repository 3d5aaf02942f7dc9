//! PDF writer.

use deck_core::normalize::strip_bullet_marker;
use deck_core::{parse_hex_color, ContentLine, Error, LayoutConfig, Result, Slide};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Polygon, Rgb,
};
use std::io::BufWriter;

use crate::text::{self, MONOSPACE_WIDTH, PROPORTIONAL_WIDTH};

const MM_PER_INCH: f64 = 25.4;
const PT_PER_INCH: f64 = 72.0;
const LINE_SPACING: f64 = 1.2;

const FALLBACK_BACKGROUND: [u8; 3] = [0xDD, 0xE6, 0xED];
const FALLBACK_TITLE: [u8; 3] = [0xD6, 0x33, 0x84];
const FALLBACK_CONTENT: [u8; 3] = [0x33, 0x33, 0x33];

const ELLIPSIS: &str = "...";

/// Bullet marker drawn in front of body lines.
const BULLET_PREFIX: &str = "- ";

fn mm(inches: f64) -> Mm {
    Mm((inches * MM_PER_INCH) as f32)
}

fn colour(value: &str, fallback: [u8; 3]) -> Color {
    let [r, g, b] = parse_hex_color(value).unwrap_or(fallback);
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

/// One wrapped line of slide body text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BodyLine {
    pub text: String,
    pub code: bool,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

/// Renders decks to PDF bytes, one landscape page per slide plus
/// continuation pages for bodies that do not fit.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: LayoutConfig,
}

impl PdfRenderer {
    /// Create a renderer with the given layout.
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Render a deck. Images are not embedded.
    pub fn render(&self, title: &str, slides: &[Slide]) -> Result<Vec<u8>> {
        let width = mm(self.layout.slide_width);
        let height = mm(self.layout.slide_height);
        let (doc, first_page, first_layer) =
            PdfDocument::new(text::to_latin1(title), width, height, "Slide 1");

        let fonts = Fonts {
            regular: add_font(&doc, BuiltinFont::Helvetica)?,
            bold: add_font(&doc, BuiltinFont::HelveticaBold)?,
            mono: add_font(&doc, BuiltinFont::Courier)?,
        };

        let mut first = Some(doc.get_page(first_page).get_layer(first_layer));
        let mut page_count = 0;
        for (idx, slide) in slides.iter().enumerate() {
            for (part, lines) in self.paginate(slide).iter().enumerate() {
                let layer = match first.take() {
                    Some(layer) => layer,
                    None => {
                        let name = format!("Slide {}", idx + 1);
                        let (page, layer) = doc.add_page(width, height, name);
                        doc.get_page(page).get_layer(layer)
                    }
                };
                self.draw_page(&layer, slide, part > 0, lines, &fonts);
                page_count += 1;
            }
        }

        if let Some(layer) = first {
            // An empty deck still gets a cover page.
            self.draw_page(&layer, &Slide::new(title), false, &[], &fonts);
            page_count += 1;
        }

        let mut buf: Vec<u8> = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buf);
            doc.save(&mut writer)
                .map_err(|e| Error::PdfError(format!("Failed to write PDF: {:?}", e)))?;
        }
        log::debug!("Rendered {} slides onto {} PDF pages", slides.len(), page_count);
        Ok(buf)
    }

    /// Split a slide's body into pages of wrapped lines. Always returns at
    /// least one page.
    pub(crate) fn paginate(&self, slide: &Slide) -> Vec<Vec<BodyLine>> {
        let layout = &self.layout;
        let body_height_pt = layout.body.h * PT_PER_INCH;
        let body_width_pt = layout.body.w * PT_PER_INCH;

        let mut pages: Vec<Vec<BodyLine>> = vec![Vec::new()];
        let mut used = 0.0;
        let mut push = |line: BodyLine, pages: &mut Vec<Vec<BodyLine>>| {
            let size = if line.code { layout.code_font_size } else { layout.body_font_size };
            let advance = size * LINE_SPACING;
            let current_is_empty = pages.last().map_or(true, |p| p.is_empty());
            if used + advance > body_height_pt && !current_is_empty {
                pages.push(Vec::new());
                used = 0.0;
            }
            used += advance;
            if let Some(page) = pages.last_mut() {
                page.push(line);
            }
        };

        for entry in slide.lines() {
            match entry {
                ContentLine::Bullet(raw) => {
                    let body = text::to_latin1(strip_bullet_marker(raw));
                    let max = text::chars_per_line(
                        body_width_pt,
                        layout.body_font_size,
                        PROPORTIONAL_WIDTH,
                    )
                    .saturating_sub(BULLET_PREFIX.len())
                    .max(1);
                    for (n, wrapped) in text::wrap_words(&body, max).into_iter().enumerate() {
                        let lead = if n == 0 { BULLET_PREFIX } else { "  " };
                        push(
                            BodyLine {
                                text: format!("{lead}{wrapped}"),
                                code: false,
                            },
                            &mut pages,
                        );
                    }
                }
                ContentLine::Code { body, .. } => {
                    let max =
                        text::chars_per_line(body_width_pt, layout.code_font_size, MONOSPACE_WIDTH);
                    for code_line in body.lines() {
                        for wrapped in text::wrap_code(&text::to_latin1(code_line), max) {
                            push(BodyLine { text: wrapped, code: true }, &mut pages);
                        }
                    }
                }
            }
        }

        pages
    }

    /// Wrap a title into the space above the body. A title that still
    /// does not fit ends in an ellipsis.
    pub(crate) fn title_lines(&self, title: &str) -> Vec<String> {
        let layout = &self.layout;
        let max_chars = text::chars_per_line(
            layout.title.w * PT_PER_INCH,
            layout.title_font_size,
            PROPORTIONAL_WIDTH,
        );
        let room = layout.title.h.max(layout.body.y - layout.title.y) * PT_PER_INCH;
        let max_lines = ((room / (layout.title_font_size * LINE_SPACING)) as usize).max(1);

        let mut lines = text::wrap_words(title, max_chars);
        if lines.len() > max_lines {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                let keep = max_chars.saturating_sub(ELLIPSIS.len());
                *last = last.chars().take(keep).collect::<String>().trim_end().to_string();
                last.push_str(ELLIPSIS);
            }
        }
        lines
    }

    fn draw_page(
        &self,
        layer: &PdfLayerReference,
        slide: &Slide,
        continued: bool,
        lines: &[BodyLine],
        fonts: &Fonts,
    ) {
        let layout = &self.layout;
        let page_height = layout.slide_height * PT_PER_INCH;

        layer.set_fill_color(colour(&slide.theme, FALLBACK_BACKGROUND));
        layer.add_polygon(Polygon {
            rings: vec![vec![
                (Point::new(Mm(0.0), Mm(0.0)), false),
                (Point::new(mm(layout.slide_width), Mm(0.0)), false),
                (Point::new(mm(layout.slide_width), mm(layout.slide_height)), false),
                (Point::new(Mm(0.0), mm(layout.slide_height)), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });

        let mut title = text::to_latin1(&slide.title);
        if continued {
            title.push_str(" (cont.)");
        }
        let mut title_baseline =
            page_height - layout.title.y * PT_PER_INCH - layout.title_font_size;
        layer.set_fill_color(colour(&slide.title_color, FALLBACK_TITLE));
        for line in self.title_lines(&title) {
            layer.use_text(
                line,
                layout.title_font_size as f32,
                mm(layout.title.x),
                pt_to_mm(title_baseline),
                &fonts.bold,
            );
            title_baseline -= layout.title_font_size * LINE_SPACING;
        }

        layer.set_fill_color(colour(&slide.content_color, FALLBACK_CONTENT));
        let mut cursor = page_height - layout.body.y * PT_PER_INCH;
        for line in lines {
            let (size, font) = if line.code {
                (layout.code_font_size, &fonts.mono)
            } else {
                (layout.body_font_size, &fonts.regular)
            };
            cursor -= size * LINE_SPACING;
            layer.use_text(
                line.text.as_str(),
                size as f32,
                mm(layout.body.x),
                pt_to_mm(cursor),
                font,
            );
        }
    }
}

fn pt_to_mm(points: f64) -> Mm {
    mm(points / PT_PER_INCH)
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| Error::PdfError(format!("Failed to load builtin font: {:?}", e)))
}
