//! PPTX writer.

use deck_core::normalize::strip_bullet_marker;
use deck_core::{
    parse_hex_color, BoxSpec, ContentLine, Error, ImageFormat, LayoutConfig, Result, Slide,
};
use quick_xml::escape::escape;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::assets::RenderAssets;
use crate::templates::{self, Relationship, NS_DRAWING, NS_MAIN, NS_REL, XML_DECL};

/// English Metric Units per inch.
const EMU_PER_INCH: f64 = 914_400.0;

/// Colours used when a slide carries something that is not a colour.
const FALLBACK_BACKGROUND: &str = "DDE6ED";
const FALLBACK_TITLE: &str = "D63384";
const FALLBACK_CONTENT: &str = "333333";

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// `RRGGBB` for a colour string, or the fallback.
fn hex(value: &str, fallback: &str) -> String {
    match parse_hex_color(value) {
        Some([r, g, b]) => format!("{r:02X}{g:02X}{b:02X}"),
        None => fallback.to_string(),
    }
}

/// Escape text for an XML text node, dropping characters XML cannot hold.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

/// A media part shared by every slide that uses the same source.
struct MediaPart {
    name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

/// Renders decks to .pptx bytes.
#[derive(Debug, Clone, Default)]
pub struct PptxRenderer {
    layout: LayoutConfig,
}

impl PptxRenderer {
    /// Create a renderer with the given layout.
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Render a deck. Every image referenced by the deck must be in `assets`.
    pub fn render(&self, title: &str, slides: &[Slide], assets: &RenderAssets) -> Result<Vec<u8>> {
        let mut media: Vec<MediaPart> = Vec::new();
        let mut media_index: HashMap<String, usize> = HashMap::new();
        for source in RenderAssets::references(slides) {
            let image = assets.get(&source)?;
            media_index.insert(source, media.len());
            media.push(MediaPart {
                name: format!("image{}.{}", media.len() + 1, image.format.extension()),
                format: image.format,
                bytes: image.bytes.clone(),
            });
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put(&mut zip, "[Content_Types].xml", self.content_types(slides.len(), &media).as_bytes())?;
        put(
            &mut zip,
            "_rels/.rels",
            templates::relationships(&[
                rel(1, templates::REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
                rel(2, templates::REL_CORE_PROPS, "docProps/core.xml"),
                rel(3, templates::REL_APP_PROPS, "docProps/app.xml"),
            ])
            .as_bytes(),
        )?;
        put(&mut zip, "docProps/core.xml", templates::core_properties(&xml_text(title)).as_bytes())?;
        put(&mut zip, "docProps/app.xml", templates::app_properties(slides.len()).as_bytes())?;

        put(&mut zip, "ppt/presentation.xml", self.presentation(slides.len()).as_bytes())?;
        let mut pres_rels = vec![
            rel(1, templates::REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
            rel(2, templates::REL_THEME, "theme/theme1.xml"),
        ];
        for n in 1..=slides.len() {
            pres_rels.push(rel(n + 2, templates::REL_SLIDE, &format!("slides/slide{n}.xml")));
        }
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            templates::relationships(&pres_rels).as_bytes(),
        )?;

        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", templates::slide_master().as_bytes())?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            templates::relationships(&[
                rel(1, templates::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                rel(2, templates::REL_THEME, "../theme/theme1.xml"),
            ])
            .as_bytes(),
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", templates::slide_layout().as_bytes())?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            templates::relationships(&[rel(
                1,
                templates::REL_SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml",
            )])
            .as_bytes(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", templates::theme().as_bytes())?;

        for (idx, slide) in slides.iter().enumerate() {
            let n = idx + 1;
            let mut rels = vec![rel(1, templates::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")];

            let picture_rel = slide.image.as_ref().map(|source| {
                let part = &media[media_index[source]];
                rels.push(rel(rels.len() + 1, templates::REL_IMAGE, &format!("../media/{}", part.name)));
                format!("rId{}", rels.len())
            });
            let background_rel = slide.has_background_image().then(|| {
                let part = &media[media_index[&slide.theme]];
                rels.push(rel(rels.len() + 1, templates::REL_IMAGE, &format!("../media/{}", part.name)));
                format!("rId{}", rels.len())
            });

            let xml = self.slide_xml(slide, picture_rel.as_deref(), background_rel.as_deref());
            put(&mut zip, &format!("ppt/slides/slide{n}.xml"), xml.as_bytes())?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{n}.xml.rels"),
                templates::relationships(&rels).as_bytes(),
            )?;
        }

        for part in &media {
            put(&mut zip, &format!("ppt/media/{}", part.name), &part.bytes)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        log::debug!("Rendered {} slides, {} media parts", slides.len(), media.len());
        Ok(cursor.into_inner())
    }

    fn content_types(&self, slide_count: usize, media: &[MediaPart]) -> String {
        let mut out = String::from(XML_DECL);
        out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
        out.push_str(&format!(
            r#"<Default Extension="rels" ContentType="{}"/><Default Extension="xml" ContentType="application/xml"/>"#,
            templates::CT_RELS
        ));

        let mut formats: Vec<ImageFormat> = Vec::new();
        for part in media {
            if !formats.contains(&part.format) {
                formats.push(part.format);
            }
        }
        for format in formats {
            out.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            ));
        }

        let overrides = [
            ("/ppt/presentation.xml", templates::CT_PRESENTATION),
            ("/ppt/slideMasters/slideMaster1.xml", templates::CT_SLIDE_MASTER),
            ("/ppt/slideLayouts/slideLayout1.xml", templates::CT_SLIDE_LAYOUT),
            ("/ppt/theme/theme1.xml", templates::CT_THEME),
            ("/docProps/core.xml", templates::CT_CORE_PROPS),
            ("/docProps/app.xml", templates::CT_APP_PROPS),
        ];
        for (part, content_type) in overrides {
            out.push_str(&format!(
                r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
            ));
        }
        for n in 1..=slide_count {
            out.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{}"/>"#,
                templates::CT_SLIDE
            ));
        }
        out.push_str("</Types>");
        out
    }

    fn presentation(&self, slide_count: usize) -> String {
        let mut out = format!(
            r#"{XML_DECL}<p:presentation xmlns:a="{NS_DRAWING}" xmlns:r="{NS_REL}" xmlns:p="{NS_MAIN}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#
        );
        if slide_count > 0 {
            out.push_str("<p:sldIdLst>");
            for n in 1..=slide_count {
                out.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 2));
            }
            out.push_str("</p:sldIdLst>");
        }
        out.push_str(&format!(
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            emu(self.layout.slide_width),
            emu(self.layout.slide_height)
        ));
        out
    }

    fn slide_xml(&self, slide: &Slide, picture_rel: Option<&str>, background_rel: Option<&str>) -> String {
        let layout = &self.layout;
        let mut out = format!(
            r#"{XML_DECL}<p:sld xmlns:a="{NS_DRAWING}" xmlns:r="{NS_REL}" xmlns:p="{NS_MAIN}"><p:cSld>"#
        );

        out.push_str("<p:bg><p:bgPr>");
        match background_rel {
            Some(rid) => out.push_str(&format!(
                r#"<a:blipFill dpi="0" rotWithShape="1"><a:blip r:embed="{rid}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></a:blipFill>"#
            )),
            None => out.push_str(&format!(
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                hex(&slide.theme, FALLBACK_BACKGROUND)
            )),
        }
        out.push_str("<a:effectLst/></p:bgPr></p:bg>");

        out.push_str(r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        let title_color = hex(&slide.title_color, FALLBACK_TITLE);
        let title_para = paragraph(&[Run {
            text: &slide.title,
            size: layout.title_font_size,
            bold: true,
            color: &title_color,
            face: &layout.font_face,
        }]);
        out.push_str(&text_box(2, "Title", &layout.title, &title_para));

        let body_box = if picture_rel.is_some() {
            &layout.body_with_image
        } else {
            &layout.body
        };
        out.push_str(&text_box(3, "Content", body_box, &self.body_paragraphs(slide)));

        if let Some(rid) = picture_rel {
            out.push_str(&picture(4, rid, &layout.image));
        }

        out.push_str(r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
        out
    }

    fn body_paragraphs(&self, slide: &Slide) -> String {
        let layout = &self.layout;
        let color = hex(&slide.content_color, FALLBACK_CONTENT);
        let mut out = String::new();

        for line in slide.lines() {
            match line {
                ContentLine::Bullet(text) => {
                    let text = format!("{}{}", layout.bullet_prefix, strip_bullet_marker(text));
                    out.push_str(&paragraph(&[Run {
                        text: &text,
                        size: layout.body_font_size,
                        bold: false,
                        color: &color,
                        face: &layout.font_face,
                    }]));
                }
                ContentLine::Code { body, .. } => {
                    for code_line in body.lines() {
                        out.push_str(&paragraph(&[Run {
                            text: code_line,
                            size: layout.code_font_size,
                            bold: false,
                            color: &color,
                            face: &layout.code_font_face,
                        }]));
                    }
                }
            }
        }

        if out.is_empty() {
            out.push_str("<a:p><a:endParaRPr lang=\"en-US\"/></a:p>");
        }
        out
    }
}

fn rel<'a>(n: usize, rel_type: &'a str, target: &str) -> Relationship<'a> {
    Relationship {
        id: format!("rId{n}"),
        rel_type,
        target: target.to_string(),
    }
}

/// One formatted text run.
struct Run<'a> {
    text: &'a str,
    size: f64,
    bold: bool,
    color: &'a str,
    face: &'a str,
}

fn paragraph(runs: &[Run<'_>]) -> String {
    let mut out = String::from(r#"<a:p><a:pPr algn="l"/>"#);
    for run in runs {
        out.push_str(&format!(
            r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r>"#,
            (run.size * 100.0).round() as i64,
            if run.bold { 1 } else { 0 },
            run.color,
            escape(run.face),
            xml_text(run.text)
        ));
    }
    out.push_str("</a:p>");
    out
}

fn xfrm(spec: &BoxSpec) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(spec.x),
        emu(spec.y),
        emu(spec.w),
        emu(spec.h)
    )
}

fn text_box(id: u32, name: &str, spec: &BoxSpec, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        xfrm(spec)
    )
}

fn picture(id: u32, rid: &str, spec: &BoxSpec) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Image"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        xfrm(spec)
    )
}
