//! PDF rendering of scraped articles.
//!
//! Pages are A4 portrait with 10 mm margins on the left, right and top, and an
//! automatic page break 15 mm above the bottom edge. Text is set in the
//! built-in Helvetica font at 12 pt with `WinAnsiEncoding`, so every string
//! written to a page must already be Latin-1 (see [`crate::sanitize`]).
//!
//! Each article block is a wrapped cell with 10 mm line height followed by one
//! blank line:
//!
//! ```text
//!            headline (centered)
//!
//! timestamp
//!
//! introduction (if the site has one)
//!
//! body paragraphs, justified
//! ```

use crate::error::Result;
use crate::models::Article;
use crate::sanitize::Sanitizer;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::Path;
use tracing::{debug, instrument};

/// Points per millimetre.
const K: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BREAK_MARGIN: f32 = 15.0;
/// Horizontal padding inside a cell.
const CELL_PADDING: f32 = MARGIN / 10.0;
const LINE_HEIGHT: f32 = 10.0;
const FONT_SIZE_PT: f32 = 12.0;
const FONT_RESOURCE: &str = "F1";

/// Horizontal alignment of a cell's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    /// Stretch word spacing on wrapped lines; the last line of a paragraph stays left-aligned.
    Justify,
}

/// Helvetica advance widths in 1/1000 em, indexed by WinAnsi byte.
const HELVETICA_WIDTHS: [u16; 256] = [
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, // 0x00
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, // 0x10
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350, // 'p'..0x7F
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 'À'..'Ï'
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 'Ð'..'ß'
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 'à'..'ï'
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 'ð'..'ÿ'
];

fn glyph_width(b: u8) -> u16 {
    HELVETICA_WIDTHS[b as usize]
}

/// Width of `bytes` in millimetres at the body font size.
fn text_width(bytes: &[u8]) -> f32 {
    let units: u32 = bytes.iter().map(|b| glyph_width(*b) as u32).sum();
    units as f32 * FONT_SIZE_PT / 1000.0 / K
}

/// Encode text as WinAnsi bytes, one per character.
///
/// Characters beyond Latin-1 become `?`; carriage returns are dropped.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' => b' ',
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// One output line of a wrapped cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub bytes: Vec<u8>,
    /// The line was broken at a space because it ran out of width.
    pub soft_break: bool,
}

/// Break `text` into lines no wider than `max_width` millimetres.
///
/// Lines break at the last space that fits; a word longer than a whole line
/// is split between characters. Explicit newlines always start a new line.
pub(crate) fn wrap_lines(text: &[u8], max_width: f32) -> Vec<Line> {
    let mut end = text.len();
    while end > 0 && text[end - 1] == b'\n' {
        end -= 1;
    }
    let text = &text[..end];

    let mut lines = Vec::new();
    let mut start = 0;
    let mut last_space: Option<usize> = None;
    let mut width = 0.0;
    let mut i = 0;

    while i < text.len() {
        let b = text[i];
        if b == b'\n' {
            lines.push(Line { bytes: text[start..i].to_vec(), soft_break: false });
            i += 1;
            start = i;
            last_space = None;
            width = 0.0;
            continue;
        }
        if b == b' ' {
            last_space = Some(i);
        }
        width += text_width(&[b]);
        if width > max_width {
            match last_space {
                Some(space) => {
                    lines.push(Line { bytes: text[start..space].to_vec(), soft_break: true });
                    i = space + 1;
                }
                None => {
                    if i == start {
                        i += 1;
                    }
                    lines.push(Line { bytes: text[start..i].to_vec(), soft_break: false });
                }
            }
            start = i;
            last_space = None;
            width = 0.0;
            continue;
        }
        i += 1;
    }
    lines.push(Line { bytes: text[start..].to_vec(), soft_break: false });
    lines
}

/// Page layout state: finished content per page and the cursor position.
#[derive(Debug)]
pub struct PdfLayout {
    pages: Vec<Vec<Operation>>,
    /// Distance of the cursor from the top edge, in millimetres.
    y: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfLayout {
    pub fn new() -> Self {
        Self { pages: vec![Vec::new()], y: MARGIN }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = MARGIN;
    }

    /// Write `text` as a full-width cell, wrapping and breaking pages as needed.
    pub fn multi_cell(&mut self, text: &str, align: Align) {
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;
        for line in wrap_lines(&to_win_ansi(text), max_width) {
            if self.y + LINE_HEIGHT > PAGE_HEIGHT - BREAK_MARGIN {
                self.add_page();
            }
            self.write_line(&line, align, max_width);
            self.y += LINE_HEIGHT;
        }
    }

    /// Move the cursor down by one line.
    pub fn ln(&mut self) {
        self.y += LINE_HEIGHT;
    }

    fn write_line(&mut self, line: &Line, align: Align, max_width: f32) {
        let width = text_width(&line.bytes);
        let mut x = MARGIN + CELL_PADDING;
        let mut word_spacing = 0.0;
        match align {
            Align::Center => x += (max_width - width) / 2.0,
            Align::Justify if line.soft_break => {
                let spaces = line.bytes.iter().filter(|b| **b == b' ').count();
                if spaces > 0 {
                    word_spacing = (max_width - width) / spaces as f32 * K;
                }
            }
            _ => {}
        }

        let font_height = FONT_SIZE_PT / K;
        let baseline = self.y + 0.5 * LINE_HEIGHT + 0.3 * font_height;

        let Some(ops) = self.pages.last_mut() else {
            return;
        };
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![FONT_RESOURCE.into(), FONT_SIZE_PT.into()]));
        ops.push(Operation::new("Tw", vec![word_spacing.into()]));
        ops.push(Operation::new("Td", vec![(x * K).into(), ((PAGE_HEIGHT - baseline) * K).into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(line.bytes.clone())]));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Assemble the pages into a PDF document.
    pub fn into_document(self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![0.into(), 0.into(), (PAGE_WIDTH * K).into(), (PAGE_HEIGHT * K).into()];
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => media_box,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let mut doc = self.into_document()?;
        doc.save(path)?;
        Ok(())
    }
}

/// Lay out an article and write it to `path`, creating the parent directory.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn render_article(article: &Article, sanitizer: &Sanitizer, path: &Path) -> Result<usize> {
    let mut layout = PdfLayout::new();

    layout.multi_cell(&sanitizer.sanitize(&article.headline), Align::Center);
    layout.ln();
    layout.multi_cell(&sanitizer.sanitize(&article.timestamp), Align::Left);
    layout.ln();
    if let Some(intro) = &article.intro {
        layout.multi_cell(&sanitizer.sanitize(intro), Align::Justify);
        layout.ln();
    }
    layout.multi_cell(&sanitizer.sanitize(&article.body), Align::Justify);
    layout.ln();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let pages = layout.page_count();
    layout.save(path)?;
    debug!(pages, "Rendered article");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f32 = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;

    fn page_text(path: &Path) -> String {
        let doc = Document::load(path).unwrap();
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages).unwrap()
    }

    #[test]
    fn test_to_win_ansi() {
        assert_eq!(to_win_ansi("Grüße\r\n"), vec![b'G', b'r', 0xFC, 0xDF, b'e', b'\n']);
        assert_eq!(to_win_ansi("5 €"), b"5 ?".to_vec());
    }

    #[test]
    fn test_accented_capitals_match_their_base_letters() {
        for (accented, base) in [('É', 'E'), ('Å', 'A'), ('Ø', 'O'), ('Ñ', 'N'), ('Ì', 'I'), ('é', 'e'), ('ö', 'o')] {
            let accented = to_win_ansi(&accented.to_string())[0];
            let base = to_win_ansi(&base.to_string())[0];
            assert!(glyph_width(accented) >= glyph_width(base), "{accented:#x} vs {base:#x}");
        }
        assert_eq!(glyph_width(0xC9), 667); // É
        assert_eq!(glyph_width(0xC5), 667); // Å
        assert_eq!(glyph_width(0xD8), 778); // Ø
        assert_eq!(glyph_width(0xC6), 1000); // Æ
        assert_eq!(glyph_width(0xE4), 556); // ä
    }

    #[test]
    fn test_wrap_accented_capitals_within_margin() {
        let text = "ÉTÉ ØRE ÅSE ÆRA ".repeat(20);
        let lines = wrap_lines(&to_win_ansi(&text), MAX);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(&line.bytes) <= MAX);
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Lastwagen ".repeat(60);
        let lines = wrap_lines(text.as_bytes(), MAX);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(&line.bytes) <= MAX);
        }
        assert!(lines[..lines.len() - 1].iter().all(|l| l.soft_break));
        assert!(!lines.last().unwrap().soft_break);
    }

    #[test]
    fn test_wrap_explicit_newlines() {
        let lines = wrap_lines(b"eins\nzwei\n\ndrei\n\n", MAX);
        let texts: Vec<&[u8]> = lines.iter().map(|l| l.bytes.as_slice()).collect();
        assert_eq!(texts, vec![&b"eins"[..], b"zwei", b"", b"drei"]);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let word = "W".repeat(200);
        let lines = wrap_lines(word.as_bytes(), MAX);
        assert!(lines.len() > 1);
        assert_eq!(lines.iter().map(|l| l.bytes.len()).sum::<usize>(), 200);
    }

    #[test]
    fn test_empty_text_still_takes_a_line() {
        assert_eq!(wrap_lines(b"", MAX), vec![Line { bytes: vec![], soft_break: false }]);
    }

    #[test]
    fn test_automatic_page_break() {
        let mut layout = PdfLayout::new();
        let body = vec!["Zeile"; 60].join("\n");
        layout.multi_cell(&body, Align::Left);
        // 27 lines fit between the top margin and the break trigger
        assert_eq!(layout.page_count(), 3);
    }

    #[test]
    fn test_render_article_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("2016-12-19_01_regional_b-2.pdf");
        let article = Article {
            source: "https://www.bild.de/regional/b-2".to_string(),
            headline: "Anschlag in Berlin".to_string(),
            timestamp: "19.12.2016".to_string(),
            intro: None,
            body: "Ein Lastwagen fuhr in den Weihnachtsmarkt.".to_string(),
        };

        let pages = render_article(&article, &Sanitizer::default(), &path).unwrap();
        assert_eq!(pages, 1);

        let text = page_text(&path);
        assert!(text.contains("Anschlag in Berlin"));
        assert!(text.contains("Weihnachtsmarkt"));
    }

    #[test]
    fn test_render_placeholder_headline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("placeholder.pdf");
        let article = Article {
            source: "u".to_string(),
            headline: "No Title".to_string(),
            timestamp: "No Date and Time".to_string(),
            intro: Some("No Introduction".to_string()),
            body: String::new(),
        };
        render_article(&article, &Sanitizer::default(), &path).unwrap();
        assert!(page_text(&path).contains("No Title"));
    }
}
