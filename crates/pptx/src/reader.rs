//! PPTX reader listing slides and their text.

use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Text and pictures found on one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,

    /// Text of each shape, top-to-bottom then left-to-right. Paragraphs
    /// inside a shape are joined with `\n`.
    pub texts: Vec<String>,

    /// Number of picture shapes.
    pub pictures: usize,
}

impl SlideSummary {
    /// The first text block, which for generated decks is the title.
    pub fn title(&self) -> Option<&str> {
        self.texts.first().map(|s| s.as_str())
    }
}

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read every slide of a PPTX file.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideSummary>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        self.slide_parts(&mut archive)?
            .iter()
            .enumerate()
            .map(|(idx, path)| self.read_slide(&mut archive, path, idx + 1))
            .collect()
    }

    /// Slide part paths in presentation order.
    fn slide_parts<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr_value(e, b"Type").unwrap_or_default();
                    let target = attr_value(e, b"Target").unwrap_or_default();
                    let id = attr_value(e, b"Id").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        // The target's number is the real order; rIds are
                        // only a fallback.
                        let order_num =
                            extract_slide_number(&target).or_else(|| extract_slide_number(&id));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing relationships: {}", e)));
                }
                _ => {}
            }
        }

        // Numbered parts first, in number order; the rest by path.
        slides.sort_by(|(path_a, num_a), (path_b, num_b)| {
            num_a
                .is_none()
                .cmp(&num_b.is_none())
                .then(num_a.cmp(num_b))
                .then_with(|| path_a.cmp(path_b))
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn read_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<SlideSummary> {
        let content = read_part(archive, slide_path)?;
        let (mut shapes, pictures) = extract_shapes(&content);

        shapes.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        Ok(SlideSummary {
            number,
            texts: shapes.into_iter().map(|s| s.text).collect(),
            pictures,
        })
    }
}

/// Read one XML part of the package as text.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| Error::ZipError(format!("Missing part '{}': {}", name, e)))?;
    let mut xml = String::with_capacity(part.size() as usize);
    part.read_to_string(&mut xml)
        .map_err(|e| Error::ZipError(format!("Unreadable part '{}': {}", name, e)))?;
    Ok(xml)
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    x: f64,
    y: f64,
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn apply_offset(shape: &mut ShapeInfo, e: &BytesStart<'_>) {
    if let Some(x) = attr_value(e, b"x").and_then(|v| v.parse().ok()) {
        shape.x = x;
    }
    if let Some(y) = attr_value(e, b"y").and_then(|v| v.parse().ok()) {
        shape.y = y;
    }
}

/// Text shapes (with their offsets) and the picture count of a slide.
fn extract_shapes(xml_content: &str) -> (Vec<ShapeInfo>, usize) {
    let mut shapes = Vec::new();
    let mut pictures = 0;
    // Runs keep their whitespace so code indentation survives.
    let mut reader = Reader::from_str(xml_content);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_paragraph = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => current_shape = Some(ShapeInfo::default()),
                b"off" => {
                    if let Some(ref mut shape) = current_shape {
                        apply_offset(shape, e);
                    }
                }
                b"txBody" => in_text_body = true,
                b"p" if in_text_body => {
                    in_paragraph = true;
                    if !current_text.is_empty() {
                        current_text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"off" {
                    if let Some(ref mut shape) = current_shape {
                        apply_offset(shape, e);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_paragraph {
                    let text = e.unescape().unwrap_or_default();
                    current_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                name @ (b"sp" | b"pic") => {
                    if name == b"pic" {
                        pictures += 1;
                    }
                    if let Some(mut shape) = current_shape.take() {
                        shape.text = current_text.trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    current_text.clear();
                    in_text_body = false;
                    in_paragraph = false;
                }
                b"txBody" => in_text_body = false,
                b"p" => in_paragraph = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    (shapes, pictures)
}

/// Element name without its namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

/// Trailing number of "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let stem = s.trim_end_matches(".rels").trim_end_matches(".xml");
    let digits = stem.chars().rev().take_while(char::is_ascii_digit).count();
    stem[stem.len() - digits..].parse().ok()
}
