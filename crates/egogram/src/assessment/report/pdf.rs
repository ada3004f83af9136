use super::document::{Block, ImageBlock, ReportDocument, Table, TextStyle, REPORT_TITLE};
use image::ImageFormat;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

const POINTS_PER_CM: f32 = 72.0 / 2.54;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN_X: f32 = 2.0 * POINTS_PER_CM;
const MARGIN_Y: f32 = 1.5 * POINTS_PER_CM;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const CONTENT_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN_Y;

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const FONT_ITALIC: Name<'static> = Name(b"F3");

const TABLE_FONT_SIZE: f32 = 10.0;
const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_TOP: f32 = 3.0;
const CELL_PADDING_BOTTOM: f32 = 3.0;
const HEADER_PADDING_BOTTOM: f32 = 6.0;
const HEADER_BACKGROUND: [f32; 3] = [0.827, 0.827, 0.827];
const GRID_GRAY: f32 = 0.5;
const GRID_WIDTH: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum DocumentBuildError {
    #[error("embedded image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("{0} does not fit on a single page")]
    Layout(String),
}

#[derive(Debug, Clone, Copy)]
struct TextMetrics {
    font: Name<'static>,
    bold: bool,
    size: f32,
    leading: f32,
    space_before: f32,
    space_after: f32,
    centered: bool,
}

impl TextStyle {
    fn metrics(self) -> TextMetrics {
        match self {
            TextStyle::Title => TextMetrics {
                font: FONT_BOLD,
                bold: true,
                size: 18.0,
                leading: 22.0,
                space_before: 0.0,
                space_after: 6.0,
                centered: true,
            },
            TextStyle::Normal => TextMetrics {
                font: FONT_REGULAR,
                bold: false,
                size: 10.0,
                leading: 12.0,
                space_before: 0.0,
                space_after: 0.0,
                centered: false,
            },
            TextStyle::Heading => TextMetrics {
                font: FONT_BOLD,
                bold: true,
                size: 14.0,
                leading: 17.0,
                space_before: 10.0,
                space_after: 6.0,
                centered: false,
            },
            TextStyle::Italic => TextMetrics {
                font: FONT_ITALIC,
                bold: false,
                size: 10.0,
                leading: 12.0,
                space_before: 0.0,
                space_after: 0.0,
                centered: false,
            },
        }
    }
}

impl TextMetrics {
    fn block_height(&self) -> f32 {
        self.space_before + self.leading + self.space_after
    }
}

/// Helvetica advance widths (1/1000 em) for printable ASCII.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| match ch {
            ' '..='~' => u32::from(HELVETICA_WIDTHS[ch as usize - 32]),
            _ => 556,
        })
        .sum();
    let weight = if bold { 1.06 } else { 1.0 };
    units as f32 * size * weight / 1000.0
}

/// Encodes text for the standard fonts' WinAnsi encoding; unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            0x20..=0x7e | 0xa0..=0xff => ch as u8,
            _ => b'?',
        })
        .collect()
}

struct DecodedImage {
    name: String,
    width: u32,
    height: u32,
    compressed: Vec<u8>,
}

impl DecodedImage {
    fn decode(index: usize, block: &ImageBlock) -> Result<Self, DocumentBuildError> {
        let rgb = image::load_from_memory_with_format(&block.png, ImageFormat::Png)?.to_rgb8();
        Ok(Self {
            name: format!("Im{}", index + 1),
            width: rgb.width(),
            height: rgb.height(),
            compressed: miniz_oxide::deflate::compress_to_vec_zlib(rgb.as_raw(), 6),
        })
    }
}

struct PageContent {
    content: Content,
    images: Vec<usize>,
}

impl PageContent {
    fn new() -> Self {
        Self {
            content: Content::new(),
            images: Vec::new(),
        }
    }
}

/// Flows blocks top to bottom, opening a new page when the next block would cross the margin.
struct Composer {
    pages: Vec<PageContent>,
    cursor: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: vec![PageContent::new()],
            cursor: PAGE_HEIGHT - MARGIN_Y,
        }
    }

    fn page(&mut self) -> &mut PageContent {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn page_is_blank(&self) -> bool {
        self.cursor >= PAGE_HEIGHT - MARGIN_Y
    }

    fn reserve(&mut self, height: f32, what: &str) -> Result<(), DocumentBuildError> {
        if height > CONTENT_HEIGHT {
            return Err(DocumentBuildError::Layout(what.to_string()));
        }
        if self.cursor - height < MARGIN_Y && !self.page_is_blank() {
            self.pages.push(PageContent::new());
            self.cursor = PAGE_HEIGHT - MARGIN_Y;
        }
        Ok(())
    }

    fn text(&mut self, style: TextStyle, text: &str) {
        let metrics = style.metrics();
        let width = text_width(text, metrics.size, metrics.bold);
        let x = if metrics.centered {
            MARGIN_X + (CONTENT_WIDTH - width).max(0.0) / 2.0
        } else {
            MARGIN_X
        };
        let baseline = self.cursor - metrics.space_before - metrics.size;
        let encoded = win_ansi(text);

        let content = &mut self.page().content;
        content.set_fill_rgb(0.0, 0.0, 0.0);
        content.begin_text();
        content.set_font(metrics.font, metrics.size);
        content.next_line(x, baseline);
        content.show(Str(&encoded));
        content.end_text();

        self.cursor -= metrics.block_height();
    }

    fn table(&mut self, table: &Table) {
        let widths = column_widths(table);
        let header_height = CELL_PADDING_TOP + TABLE_FONT_SIZE * 1.2 + HEADER_PADDING_BOTTOM;
        let row_height = CELL_PADDING_TOP + TABLE_FONT_SIZE * 1.2 + CELL_PADDING_BOTTOM;

        let mut top = self.cursor;
        self.row(&table.header, &widths, top, header_height, true);
        top -= header_height;
        for cells in &table.rows {
            self.row(cells, &widths, top, row_height, false);
            top -= row_height;
        }
        self.cursor = top;
    }

    fn row(&mut self, cells: &[String], widths: &[f32], top: f32, height: f32, header: bool) {
        let bottom = top - height;
        let padding_bottom = if header {
            HEADER_PADDING_BOTTOM
        } else {
            CELL_PADDING_BOTTOM
        };
        let font = if header { FONT_BOLD } else { FONT_REGULAR };
        let content = &mut self.page().content;

        let mut x = MARGIN_X;
        for (column, width) in widths.iter().enumerate() {
            if header {
                let [r, g, b] = HEADER_BACKGROUND;
                content.set_fill_rgb(r, g, b);
                content.rect(x, bottom, *width, height);
                content.fill_nonzero();
            }
            content.set_stroke_rgb(GRID_GRAY, GRID_GRAY, GRID_GRAY);
            content.set_line_width(GRID_WIDTH);
            content.rect(x, bottom, *width, height);
            content.stroke();

            let text = cells.get(column).map(String::as_str).unwrap_or_default();
            let encoded = win_ansi(text);
            content.set_fill_rgb(0.0, 0.0, 0.0);
            content.begin_text();
            content.set_font(font, TABLE_FONT_SIZE);
            content.next_line(x + CELL_PADDING_X, bottom + padding_bottom + 2.0);
            content.show(Str(&encoded));
            content.end_text();

            x += width;
        }
    }

    fn image(&mut self, index: usize, image: &DecodedImage, block: &ImageBlock) {
        let width = block.width_cm * POINTS_PER_CM;
        let height = block.height_cm * POINTS_PER_CM;
        let x = MARGIN_X + (CONTENT_WIDTH - width).max(0.0) / 2.0;
        let y = self.cursor - height;

        let page = self.page();
        page.content.save_state();
        page.content.transform([width, 0.0, 0.0, height, x, y]);
        page.content.x_object(Name(image.name.as_bytes()));
        page.content.restore_state();
        page.images.push(index);

        self.cursor = y;
    }
}

fn column_widths(table: &Table) -> Vec<f32> {
    (0..table.columns())
        .map(|column| {
            let header = table
                .header
                .get(column)
                .map(|text| text_width(text, TABLE_FONT_SIZE, true))
                .unwrap_or_default();
            let body = table
                .rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|text| text_width(text, TABLE_FONT_SIZE, false))
                .fold(0.0_f32, f32::max);
            header.max(body) + 2.0 * CELL_PADDING_X
        })
        .collect()
}

fn table_height(table: &Table) -> f32 {
    let header_height = CELL_PADDING_TOP + TABLE_FONT_SIZE * 1.2 + HEADER_PADDING_BOTTOM;
    let row_height = CELL_PADDING_TOP + TABLE_FONT_SIZE * 1.2 + CELL_PADDING_BOTTOM;
    header_height + row_height * table.rows.len() as f32
}

fn block_height(block: &Block) -> f32 {
    match block {
        Block::Text { style, .. } => style.metrics().block_height(),
        Block::Table(table) => table_height(table),
        Block::Image(image) => image.height_cm * POINTS_PER_CM,
        Block::Spacer { height_cm } => height_cm * POINTS_PER_CM,
    }
}

/// Serializes the document to PDF bytes. Either the whole document is produced or an error.
pub fn render_pdf(document: &ReportDocument) -> Result<Vec<u8>, DocumentBuildError> {
    let blocks = document.blocks();

    let mut images = Vec::new();
    for block in blocks {
        if let Block::Image(image) = block {
            images.push(DecodedImage::decode(images.len(), image)?);
        }
    }

    let mut composer = Composer::new();
    let mut next_image = 0;
    for (position, block) in blocks.iter().enumerate() {
        match block {
            Block::Text { style, text } => {
                let mut needed = block_height(block);
                // Headings stay on the same page as the block they introduce.
                if *style == TextStyle::Heading {
                    if let Some(next) = blocks.get(position + 1) {
                        let together = needed + block_height(next);
                        if together <= CONTENT_HEIGHT {
                            needed = together;
                        }
                    }
                }
                composer.reserve(needed, text)?;
                composer.text(*style, text);
            }
            Block::Table(table) => {
                composer.reserve(table_height(table), "score table")?;
                composer.table(table);
            }
            Block::Image(image) => {
                composer.reserve(block_height(block), "chart image")?;
                composer.image(next_image, &images[next_image], image);
                next_image += 1;
            }
            Block::Spacer { .. } => {
                if !composer.page_is_blank() {
                    composer.cursor = (composer.cursor - block_height(block)).max(MARGIN_Y);
                }
            }
        }
    }

    Ok(write_pdf(composer.pages, &images))
}

fn write_pdf(pages: Vec<PageContent>, images: &[DecodedImage]) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let info_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let italic_id = alloc.bump();
    let image_ids: Vec<Ref> = images.iter().map(|_| alloc.bump()).collect();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(REPORT_TITLE))
        .producer(TextStr("egogram"));
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for (id, base_font) in [
        (regular_id, Name(b"Helvetica")),
        (bold_id, Name(b"Helvetica-Bold")),
        (italic_id, Name(b"Helvetica-Oblique")),
    ] {
        pdf.type1_font(id)
            .base_font(base_font)
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (image, id) in images.iter().zip(&image_ids) {
        let mut xobject = pdf.image_xobject(*id, &image.compressed);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width as i32);
        xobject.height(image.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }

    for (page, (page_id, content_id)) in pages.into_iter().zip(page_ids) {
        let mut writer = pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        writer.parent(page_tree_id);
        writer.contents(content_id);
        let mut resources = writer.resources();
        resources
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id)
            .pair(FONT_ITALIC, italic_id);
        if !page.images.is_empty() {
            let mut x_objects = resources.x_objects();
            for index in &page.images {
                x_objects.pair(Name(images[*index].name.as_bytes()), image_ids[*index]);
            }
        }
        resources.finish();
        writer.finish();

        pdf.stream(content_id, &page.content.finish());
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::report::assemble;
    use crate::assessment::{compute_all_scores, RatingSheet};
    use chrono::NaiveDate;

    fn tiny_png() -> Vec<u8> {
        let pixels = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let mut cursor = std::io::Cursor::new(Vec::new());
        pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("png encodes");
        cursor.into_inner()
    }

    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        let start = text.find("/Count ").expect("page tree present") + "/Count ".len();
        text[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .expect("numeric page count")
    }

    fn document(chart: &[u8]) -> ReportDocument {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let generated_at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .expect("timestamp");
        assemble(
            &scores.ego_state,
            &scores.trait_role,
            &scores.situational_role,
            chart,
            generated_at,
        )
    }

    #[test]
    fn helvetica_widths_cover_printable_ascii() {
        assert_eq!(HELVETICA_WIDTHS.len(), usize::from(b'~' - b' ') + 1);
        assert!((text_width("Score", 10.0, false) - 26.12).abs() < 0.01);
    }

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(win_ansi("Vítima"), b"V\xedtima".to_vec());
        assert_eq!(win_ansi("a\u{2192}b"), b"a?b".to_vec());
    }

    #[test]
    fn corrupt_image_fails_the_whole_build() {
        let err = render_pdf(&document(b"not a png")).expect_err("corrupt image rejected");
        assert!(matches!(err, DocumentBuildError::Image(_)));
    }

    #[test]
    fn default_report_fits_on_one_page() {
        let bytes = render_pdf(&document(&tiny_png())).expect("pdf builds");
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn oversized_image_is_a_layout_error() {
        let blocks = document(&tiny_png())
            .into_blocks()
            .into_iter()
            .map(|block| match block {
                Block::Image(mut image) => {
                    image.height_cm = 40.0;
                    Block::Image(image)
                }
                other => other,
            })
            .collect();
        let huge = ReportDocument::from_blocks(blocks);
        let err = render_pdf(&huge).expect_err("40cm image cannot fit");
        assert!(matches!(err, DocumentBuildError::Layout(_)));
    }

    #[test]
    fn long_documents_break_onto_new_pages() {
        let base = document(&tiny_png());
        let mut blocks = Vec::new();
        for _ in 0..4 {
            blocks.extend(base.blocks().iter().cloned());
        }
        let bytes = render_pdf(&ReportDocument::from_blocks(blocks)).expect("pdf builds");
        assert!(page_count(&bytes) > 1);
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/Subtype /Image").count(), 4);
    }
}
