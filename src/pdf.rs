use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Date, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::compose::{ComposedDocument, DrawOp};
use crate::error::Error;
use crate::fonts::{EmbeddedFont, FontArena, FontProgram, TrueTypeProgram};
use crate::options::{CreationDate, DocumentMetadata};

const SYSTEM_INFO: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

fn deflate(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}

fn pdf_date(d: &NaiveDateTime) -> Date {
    Date::new(d.year().clamp(0, 9999) as u16)
        .month(d.month() as u8)
        .day(d.day() as u8)
        .hour(d.hour() as u8)
        .minute(d.minute() as u8)
        .second(d.second() as u8)
}

fn write_truetype(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    type0_ref: Ref,
    tt: &TrueTypeProgram,
) -> Result<(), Error> {
    let cid_ref = alloc();
    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cmap_ref = alloc();
    let base_font = Name(tt.ps_name.as_bytes());

    pdf.type0_font(type0_ref)
        .base_font(base_font)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_ref)
        .to_unicode(cmap_ref);

    {
        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2)
            .base_font(base_font)
            .system_info(SYSTEM_INFO)
            .font_descriptor(descriptor_ref)
            .default_width(500.0)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        let mut widths = cid.widths();
        for (&gid, &c) in &tt.used {
            let advance = tt.glyph(c).map(|(_, w)| w).unwrap_or(0.0);
            widths.consecutive(gid, [advance]);
        }
    }

    pdf.font_descriptor(descriptor_ref)
        .name(base_font)
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(tt.bbox)
        .italic_angle(0.0)
        .ascent(tt.ascent)
        .descent(tt.descent)
        .cap_height(tt.cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let data_len = i32::try_from(tt.data.len())
        .map_err(|_| Error::Pdf(format!("font {} is too large to embed", tt.ps_name)))?;
    pdf.stream(data_ref, &deflate(&tt.data))
        .filter(Filter::FlateDecode)
        .pair(Name(b"Length1"), data_len);

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), SYSTEM_INFO);
    for (&gid, &c) in &tt.used {
        cmap.pair(gid, c);
    }
    pdf.cmap(cmap_ref, &cmap.finish());

    log::debug!(
        "Embedded {} ({} glyphs used, {} bytes)",
        tt.ps_name,
        tt.used.len(),
        tt.data.len()
    );
    Ok(())
}

fn write_font(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    font: &EmbeddedFont,
) -> Result<Ref, Error> {
    let font_ref = alloc();
    match &font.program {
        FontProgram::Standard { font: standard, .. } => {
            pdf.type1_font(font_ref)
                .base_font(Name(standard.base_font().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }
        FontProgram::TrueType(tt) => write_truetype(pdf, alloc, font_ref, tt)?,
    }
    Ok(font_ref)
}

fn page_content(ops: &[DrawOp], arena: &FontArena) -> Result<Content, Error> {
    let mut content = Content::new();
    for op in ops {
        match op {
            DrawOp::Fill { x, y, width, height, gray } => {
                content
                    .save_state()
                    .set_fill_gray(*gray)
                    .rect(*x, *y, *width, *height)
                    .fill_nonzero()
                    .restore_state();
            }
            DrawOp::Rule { x1, y1, x2, y2, width, gray } => {
                content
                    .save_state()
                    .set_stroke_gray(*gray)
                    .set_line_width(*width)
                    .move_to(*x1, *y1)
                    .line_to(*x2, *y2)
                    .stroke()
                    .restore_state();
            }
            DrawOp::Text(run) => {
                let font = arena.get(run.font)?;
                content
                    .begin_text()
                    .set_font(Name(font.pdf_name.as_bytes()), run.size)
                    .next_line(run.x, run.y)
                    .show(Str(&run.bytes))
                    .end_text();
            }
        }
    }
    Ok(content)
}

/// Serialise a composed document. Every text run must use a font from `arena`.
pub fn render(
    doc: &ComposedDocument,
    arena: &FontArena,
    metadata: &DocumentMetadata,
    title: &str,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Content first: a foreign handle fails here before anything else is written.
    let contents: Vec<Content> = doc
        .pages
        .iter()
        .map(|page| page_content(&page.ops, arena))
        .collect::<Result<_, _>>()?;

    let t_content = t0.elapsed();

    let mut font_pairs: Vec<(String, Ref)> = Vec::with_capacity(arena.len());
    for font in arena.fonts() {
        let font_ref = write_font(&mut pdf, &mut alloc, font)?;
        font_pairs.push((font.pdf_name.clone(), font_ref));
    }

    let t_fonts = t0.elapsed();

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        pdf.stream(content_ids[i], &deflate(&c.finish()))
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, doc.width, doc.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (name, font_ref) in &font_pairs {
            fonts.pair(Name(name.as_bytes()), *font_ref);
        }
    }

    let producer = format!("sheetside-pdf {}", env!("CARGO_PKG_VERSION"));
    let created = match &metadata.creation_date {
        CreationDate::Now => Some(Local::now().naive_local()),
        CreationDate::At(d) => Some(*d),
        CreationDate::Omit => None,
    };
    let info_id = alloc();
    {
        let mut info = pdf.document_info(info_id);
        info.title(TextStr(title)).producer(TextStr(&producer));
        if let Some(author) = &metadata.author {
            info.author(TextStr(author));
        }
        if let Some(subject) = &metadata.subject {
            info.subject(TextStr(subject));
        }
        if let Some(d) = &created {
            info.creation_date(pdf_date(d));
        }
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Render phases: content={:.1}ms, font_embed={:.1}ms, assembly={:.1}ms ({} pages)",
        t_content.as_secs_f64() * 1000.0,
        (t_fonts - t_content).as_secs_f64() * 1000.0,
        (t_assembly - t_fonts).as_secs_f64() * 1000.0,
        n
    );

    Ok(pdf.finish())
}
