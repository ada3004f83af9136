use super::domain::{Instrument, MAX_DIMENSION_SCORE};
use super::scoring::DimensionScore;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tracing::debug;

const GLYPH: u32 = 8;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([231, 231, 231]);
/// Share of each bar slot covered by the bar itself.
const BAR_FILL: f64 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot render a chart without dimension scores")]
    EmptyScores,
    #[error("invalid chart style: {0}")]
    InvalidStyle(String),
    #[error("failed to encode chart as PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Fixed visual identity of a chart: labels, per-bar colors, pixel size and y-axis bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub colors: Vec<[u8; 3]>,
    pub width: u32,
    pub height: u32,
    pub y_max: u8,
}

impl ChartStyle {
    /// Sizes are figure inches at 150 dpi: 8x4.5 for ego states, 6x3.5 for roles.
    pub fn for_instrument(instrument: Instrument) -> Self {
        match instrument {
            Instrument::EgoState => Self {
                title: "Egogram - Ego-state profile".to_string(),
                x_label: "Ego states".to_string(),
                y_label: "Score".to_string(),
                colors: vec![
                    [255, 0, 0],
                    [255, 165, 0],
                    [128, 128, 128],
                    [0, 128, 0],
                    [0, 0, 255],
                ],
                width: 1200,
                height: 675,
                y_max: MAX_DIMENSION_SCORE,
            },
            Instrument::TraitRole => Self {
                title: "Drama Triangle - Psychological Roles".to_string(),
                x_label: "Roles".to_string(),
                y_label: "Score".to_string(),
                colors: vec![[128, 0, 128], [0, 255, 255], [165, 42, 42]],
                width: 900,
                height: 525,
                y_max: MAX_DIMENSION_SCORE,
            },
            Instrument::SituationalRole => Self {
                title: "Drama Triangle - Real Situations".to_string(),
                x_label: "Roles".to_string(),
                y_label: "Score".to_string(),
                colors: vec![[153, 50, 204], [0, 206, 209], [165, 42, 42]],
                width: 900,
                height: 525,
                y_max: MAX_DIMENSION_SCORE,
            },
        }
    }

    fn color_for(&self, position: usize) -> Rgb<u8> {
        Rgb(self.colors[position % self.colors.len()])
    }
}

/// Pixel geometry derived from a style; computed fresh for every render.
#[derive(Debug, Clone, Copy)]
struct Layout {
    unit: u32,
    pad: u32,
    label_scale: u32,
    plot_left: u32,
    plot_right: u32,
    plot_top: u32,
    plot_bottom: u32,
}

impl Layout {
    fn new(style: &ChartStyle, bars: usize) -> Result<Self, RenderError> {
        if style.width == 0 || style.height == 0 {
            return Err(RenderError::InvalidStyle(format!(
                "image size {}x{} must be non-zero",
                style.width, style.height
            )));
        }
        if style.y_max == 0 {
            return Err(RenderError::InvalidStyle(
                "y-axis upper bound must be positive".to_string(),
            ));
        }
        if style.colors.is_empty() {
            return Err(RenderError::InvalidStyle(
                "at least one bar color is required".to_string(),
            ));
        }

        let unit = (style.height / 175).max(1);
        let label_scale = unit.saturating_sub(1).max(1);
        let pad = 6 * unit;
        let label_height = GLYPH * label_scale;
        let tick_digits = style.y_max.to_string().len() as u32;

        let plot_top = pad * 3 + GLYPH * unit;
        let plot_left = pad * 4 + label_height + tick_digits * label_height;
        let plot_right = style.width.saturating_sub(pad * 3);
        let plot_bottom = style
            .height
            .saturating_sub(pad * 4 + label_height * 2);

        let too_small = plot_right <= plot_left + bars as u32 || plot_bottom <= plot_top + 1;
        if too_small {
            return Err(RenderError::InvalidStyle(format!(
                "image size {}x{} leaves no room for the plot area",
                style.width, style.height
            )));
        }

        Ok(Self {
            unit,
            pad,
            label_scale,
            plot_left,
            plot_right,
            plot_top,
            plot_bottom,
        })
    }

    fn plot_width(&self) -> u32 {
        self.plot_right - self.plot_left
    }

    fn plot_height(&self) -> u32 {
        self.plot_bottom - self.plot_top
    }

    fn y_for(&self, value: u8, y_max: u8) -> u32 {
        let value = u32::from(value.min(y_max));
        self.plot_bottom - value * self.plot_height() / u32::from(y_max)
    }
}

/// Renders one bar per dimension, in the order given, as PNG bytes.
pub fn render_chart(
    scores: &[DimensionScore],
    style: &ChartStyle,
) -> Result<Vec<u8>, RenderError> {
    if scores.is_empty() {
        return Err(RenderError::EmptyScores);
    }
    let layout = Layout::new(style, scores.len())?;
    let mut canvas = Canvas::new(style.width, style.height);

    canvas.draw_text_fitted(
        style.width / 2,
        layout.pad,
        &style.title,
        layout.unit,
        style.width,
    );

    let step = y_tick_step(style.y_max);
    let label_height = GLYPH * layout.label_scale;
    for value in (0..=style.y_max).step_by(usize::from(step)) {
        let y = layout.y_for(value, style.y_max);
        if value > 0 {
            canvas.dashed_hline(layout.plot_left, layout.plot_right, y, layout.unit, GRID);
        }
        let text = value.to_string();
        let text_right = layout.plot_left - layout.pad;
        canvas.draw_text(
            text_right.saturating_sub(text_width(&text, layout.label_scale)),
            y.saturating_sub(label_height / 2),
            &text,
            layout.label_scale,
            INK,
        );
        canvas.fill_rect(
            layout.plot_left.saturating_sub(layout.pad / 2),
            y,
            layout.pad / 2,
            layout.unit,
            INK,
        );
    }

    let slot = f64::from(layout.plot_width()) / scores.len() as f64;
    let label_top = layout.plot_bottom + layout.pad;
    for (position, dimension) in scores.iter().enumerate() {
        let slot_left = f64::from(layout.plot_left) + slot * position as f64;
        let bar_left = (slot_left + slot * (1.0 - BAR_FILL) / 2.0).round() as u32;
        let bar_width = ((slot * BAR_FILL).round() as u32).max(1);
        let bar_top = layout.y_for(dimension.score, style.y_max);
        canvas.fill_rect(
            bar_left,
            bar_top,
            bar_width,
            layout.plot_bottom - bar_top,
            style.color_for(position),
        );

        let center = (slot_left + slot / 2.0).round() as u32;
        canvas.fill_rect(center, layout.plot_bottom, layout.unit, layout.pad / 2, INK);
        canvas.draw_text_fitted(
            center,
            label_top,
            dimension.name,
            layout.label_scale,
            slot.floor() as u32,
        );
    }

    canvas.stroke_rect(
        layout.plot_left,
        layout.plot_top,
        layout.plot_width(),
        layout.plot_height(),
        layout.unit.min(2),
        INK,
    );

    canvas.draw_text_fitted(
        layout.plot_left + layout.plot_width() / 2,
        label_top + label_height + layout.pad,
        &style.x_label,
        layout.label_scale,
        layout.plot_width(),
    );
    let y_label_width = text_width(&style.y_label, layout.label_scale);
    let y_label_bottom = layout.plot_top + layout.plot_height() / 2 + y_label_width / 2;
    canvas.draw_text_vertical(
        layout.pad,
        y_label_bottom,
        &style.y_label,
        layout.label_scale,
        INK,
    );

    let png = canvas.encode_png()?;
    debug!(
        bars = scores.len(),
        width = style.width,
        height = style.height,
        bytes = png.len(),
        "chart rendered"
    );
    Ok(png)
}

fn y_tick_step(y_max: u8) -> u8 {
    match y_max {
        0..=10 => 1,
        11..=20 => 2,
        _ => y_max.div_ceil(8),
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// Pixel surface owned by a single render call.
struct Canvas {
    pixels: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
        let x_end = x.saturating_add(width).min(self.pixels.width());
        let y_end = y.saturating_add(height).min(self.pixels.height());
        for py in y..y_end {
            for px in x..x_end {
                self.pixels.put_pixel(px, py, color);
            }
        }
    }

    fn stroke_rect(&mut self, x: u32, y: u32, width: u32, height: u32, line: u32, color: Rgb<u8>) {
        self.fill_rect(x, y, width + line, line, color);
        self.fill_rect(x, y + height, width + line, line, color);
        self.fill_rect(x, y, line, height + line, color);
        self.fill_rect(x + width, y, line, height + line, color);
    }

    fn dashed_hline(&mut self, x_start: u32, x_end: u32, y: u32, unit: u32, color: Rgb<u8>) {
        let dash = 4 * unit;
        let gap = 3 * unit;
        let mut x = x_start;
        while x < x_end {
            let length = dash.min(x_end - x);
            self.fill_rect(x, y, length, unit.min(2), color);
            x += dash + gap;
        }
    }

    fn draw_text(&mut self, x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
        for (position, ch) in text.chars().enumerate() {
            let origin = x + position as u32 * GLYPH * scale;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for column in 0..GLYPH {
                    if (*bits >> column) & 1 == 1 {
                        self.fill_rect(
                            origin + column * scale,
                            y + row as u32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Centers text on `center_x`, shrinking the scale until it fits in `max_width`.
    fn draw_text_fitted(&mut self, center_x: u32, y: u32, text: &str, scale: u32, max_width: u32) {
        let mut scale = scale.max(1);
        while scale > 1 && text_width(text, scale) > max_width {
            scale -= 1;
        }
        let width = text_width(text, scale);
        self.draw_text(center_x.saturating_sub(width / 2), y, text, scale, INK);
    }

    /// Draws text rotated a quarter turn counter-clockwise, reading bottom to top from `bottom`.
    fn draw_text_vertical(&mut self, x: u32, bottom: u32, text: &str, scale: u32, color: Rgb<u8>) {
        for (position, ch) in text.chars().enumerate() {
            let advance = position as u32 * GLYPH;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for column in 0..GLYPH {
                    if (*bits >> column) & 1 == 0 {
                        continue;
                    }
                    let offset = (advance + column + 1) * scale;
                    if offset > bottom {
                        continue;
                    }
                    self.fill_rect(x + row as u32 * scale, bottom - offset, scale, scale, color);
                }
            }
        }
    }

    fn encode_png(self) -> Result<Vec<u8>, RenderError> {
        let mut cursor = Cursor::new(Vec::new());
        self.pixels.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{compute_all_scores, Rating, RatingSheet};

    fn sample_scores() -> Vec<DimensionScore> {
        vec![
            DimensionScore::new("victim", "Victim", 15),
            DimensionScore::new("rescuer", "Rescuer", 9),
            DimensionScore::new("persecutor", "Persecutor", 3),
        ]
    }

    #[test]
    fn empty_scores_are_rejected() {
        let style = ChartStyle::for_instrument(Instrument::TraitRole);
        let err = render_chart(&[], &style).expect_err("empty mapping rejected");
        assert!(matches!(err, RenderError::EmptyScores));
    }

    #[test]
    fn renders_png_with_declared_dimensions() {
        let style = ChartStyle::for_instrument(Instrument::TraitRole);
        let png = render_chart(&sample_scores(), &style).expect("chart renders");
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!(decoded.width(), 900);
        assert_eq!(decoded.height(), 525);
    }

    #[test]
    fn bars_use_the_instrument_colors_in_order() {
        let style = ChartStyle::for_instrument(Instrument::TraitRole);
        let png = render_chart(&sample_scores(), &style).expect("chart renders");
        let decoded = image::load_from_memory(&png).expect("valid png").to_rgb8();

        let layout = Layout::new(&style, 3).expect("layout");
        let slot = layout.plot_width() / 3;
        let sample_y = layout.plot_bottom - 2;
        for position in 0..3u32 {
            let sample_x = layout.plot_left + slot * position + slot / 2;
            let pixel = decoded.get_pixel(sample_x, sample_y);
            assert_eq!(pixel.0, style.colors[position as usize], "bar {position}");
        }
    }

    #[test]
    fn bar_height_is_relative_to_fixed_axis_maximum() {
        let style = ChartStyle::for_instrument(Instrument::SituationalRole);
        let png = render_chart(&sample_scores(), &style).expect("chart renders");
        let decoded = image::load_from_memory(&png).expect("valid png").to_rgb8();

        let layout = Layout::new(&style, 3).expect("layout");
        let slot = layout.plot_width() / 3;
        let full_bar_x = layout.plot_left + slot / 2;
        let just_below_top = layout.plot_top + 4;
        assert_eq!(decoded.get_pixel(full_bar_x, just_below_top).0, style.colors[0]);

        let mid_bar_x = layout.plot_left + slot + slot / 2;
        assert_ne!(decoded.get_pixel(mid_bar_x, just_below_top).0, style.colors[1]);
    }

    #[test]
    fn ego_state_chart_renders_every_dimension() {
        let scores = compute_all_scores(&RatingSheet::uniform(Rating::new(2).expect("rating")))
            .expect("scores");
        let style = ChartStyle::for_instrument(Instrument::EgoState);
        let png = render_chart(scores.ego_state.dimensions(), &style).expect("chart renders");
        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (1200, 675));
    }

    #[test]
    fn renders_are_independent_and_deterministic() {
        let style = ChartStyle::for_instrument(Instrument::TraitRole);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let style = style.clone();
                std::thread::spawn(move || render_chart(&sample_scores(), &style))
            })
            .collect();
        let outputs: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("chart renders"))
            .collect();
        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        let mut style = ChartStyle::for_instrument(Instrument::EgoState);
        style.width = 20;
        style.height = 20;
        let err = render_chart(&sample_scores(), &style).expect_err("no room for plot");
        assert!(matches!(err, RenderError::InvalidStyle(_)));
    }

    #[test]
    fn degenerate_styles_are_rejected_before_drawing() {
        let base = ChartStyle::for_instrument(Instrument::TraitRole);
        let cases = [
            ChartStyle {
                colors: Vec::new(),
                ..base.clone()
            },
            ChartStyle {
                y_max: 0,
                ..base.clone()
            },
            ChartStyle {
                width: 0,
                ..base.clone()
            },
            ChartStyle { height: 0, ..base },
        ];

        for style in cases {
            let err = render_chart(&sample_scores(), &style).expect_err("degenerate style");
            assert!(matches!(err, RenderError::InvalidStyle(_)), "{style:?}");
        }
    }
}
