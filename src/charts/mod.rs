//! PNG chart rendering for the report and analysis views.
//!
//! Charts are a pure function of a [`ChartSpec`]: nothing here touches the
//! database, and a rendering failure never affects the figures it draws.
//! Text is set in the bundled DejaVu Sans face: the title above the plot, the
//! y label and tick values on the left, category names and the x label below,
//! then the legend.

use ab_glyph::{FontRef, InvalidFont, PxScale};
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::{
    drawing::{
        draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut,
        text_size,
    },
    rect::Rect,
};
use serde::Serialize;
use std::io::Cursor;
use thiserror::Error;

pub const GREEN: Rgb<u8> = Rgb([44, 160, 44]);
pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
pub const LIGHT_GREEN: Rgb<u8> = Rgb([144, 238, 144]);

/// Pastel cycle used when every bar gets its own color.
pub const CATEGORY_CYCLE: [Rgb<u8>; 10] = [
    Rgb([240, 128, 128]),
    Rgb([255, 215, 0]),
    Rgb([255, 160, 122]),
    Rgb([221, 160, 221]),
    Rgb([135, 206, 235]),
    Rgb([144, 238, 144]),
    Rgb([240, 230, 140]),
    Rgb([255, 182, 193]),
    Rgb([255, 218, 185]),
    Rgb([127, 255, 212]),
];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const TEXT: Rgb<u8> = Rgb([30, 30, 30]);

const MARGIN_LEFT: u32 = 72;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 44;
const MARGIN_BOTTOM: u32 = 84;
const GRID_LINES: u32 = 5;
const LEGEND_SWATCH: u32 = 12;
const LEGEND_GAP: f32 = 16.0;

const TITLE_SCALE: f32 = 18.0;
const LABEL_SCALE: f32 = 13.0;
const TICK_SCALE: f32 = 11.0;

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("series '{series}' has a non-finite value at index {index}")]
    InvalidValue { series: String, index: usize },

    #[error("series '{series}' has {actual} values for {expected} categories")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("stacked column {index} overflows")]
    Overflow { index: usize },

    #[error("failed to load chart font: {0}")]
    Font(#[from] InvalidFont),

    #[error("failed to encode chart: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    GroupedBar,
    StackedBar,
    Line,
}

/// One named run of values over the chart's categories. `None` is drawn as
/// nothing: an empty slot for bars, a gap for lines.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
    /// Colors cycled per category; a single entry colors the whole series.
    pub colors: Vec<Rgb<u8>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>, color: Rgb<u8>) -> Self {
        Self {
            name: name.into(),
            values,
            colors: vec![color],
        }
    }

    pub fn from_values(name: impl Into<String>, values: Vec<f64>, color: Rgb<u8>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect(), color)
    }

    pub fn with_colors(mut self, colors: &[Rgb<u8>]) -> Self {
        if !colors.is_empty() {
            self.colors = colors.to_vec();
        }
        self
    }

    fn color_at(&self, index: usize) -> Rgb<u8> {
        match self.colors.len() {
            0 => AXIS,
            n => self.colors[index % n],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            series: Vec::new(),
            width: 800,
            height: 450,
        }
    }

    pub fn axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn validate(&self) -> Result<(), ChartError> {
        for series in &self.series {
            if series.values.len() != self.categories.len() {
                return Err(ChartError::LengthMismatch {
                    series: series.name.clone(),
                    expected: self.categories.len(),
                    actual: series.values.len(),
                });
            }
            if let Some(index) = series
                .values
                .iter()
                .position(|v| v.map_or(false, |v| !v.is_finite()))
            {
                return Err(ChartError::InvalidValue {
                    series: series.name.clone(),
                    index,
                });
            }
        }
        if self.kind == ChartKind::StackedBar {
            let overflowing = (0..self.categories.len()).find(|&i| !self.column_total(i).is_finite());
            if let Some(index) = overflowing {
                return Err(ChartError::Overflow { index });
            }
        }
        Ok(())
    }

    fn column_total(&self, index: usize) -> f64 {
        self.series
            .iter()
            .filter_map(|s| s.values[index])
            .map(f64::abs)
            .sum()
    }

    /// Value range of the y axis. Always includes zero; stacked charts are
    /// scaled by the column sums.
    fn value_range(&self) -> (f64, f64) {
        let mut low = 0.0_f64;
        let mut high = 0.0_f64;

        if self.kind == ChartKind::StackedBar {
            for i in 0..self.categories.len() {
                high = high.max(self.column_total(i));
            }
        } else {
            for v in self.series.iter().flat_map(|s| s.values.iter().flatten()) {
                low = low.min(*v);
                high = high.max(*v);
            }
        }

        if high - low <= f64::EPSILON {
            return (low, low + 1.0);
        }
        let padded = high + (high / 2.0 - low / 2.0) * 0.2;
        (low, if padded.is_finite() { padded } else { high })
    }
}

/// Pixel geometry of the plot area inside the canvas.
#[derive(Debug, Clone, Copy)]
struct Plot {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    low: f64,
    high: f64,
}

impl Plot {
    fn new(spec: &ChartSpec) -> Self {
        let (low, high) = spec.value_range();
        Self {
            left: MARGIN_LEFT as f32,
            top: MARGIN_TOP as f32,
            width: spec.width.saturating_sub(MARGIN_LEFT + MARGIN_RIGHT).max(1) as f32,
            height: spec.height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM).max(1) as f32,
            low,
            high,
        }
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn y(&self, value: f64) -> f32 {
        // halved so the span of extreme ranges stays finite
        let ratio = ((value / 2.0 - self.low / 2.0) / (self.high / 2.0 - self.low / 2.0))
            .clamp(0.0, 1.0);
        self.bottom() - (ratio as f32) * self.height
    }

    fn slot_width(&self, slots: usize) -> f32 {
        self.width / slots.max(1) as f32
    }

    fn slot_center(&self, slots: usize, index: usize) -> f32 {
        self.left + self.slot_width(slots) * (index as f32 + 0.5)
    }
}

fn fill(canvas: &mut RgbImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb<u8>) {
    let (left, right) = (x0.min(x1).round() as i32, x0.max(x1).round() as i32);
    let (top, bottom) = (y0.min(y1).round() as i32, y0.max(y1).round() as i32);
    if right <= left || bottom <= top {
        return;
    }
    let rect = Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Start,
    Middle,
    End,
}

/// Draws `text` with its top edge at `y`, aligned on `x` per `anchor`.
fn draw_label(
    canvas: &mut RgbImage,
    font: &FontRef<'_>,
    text: &str,
    (x, y): (f32, f32),
    scale: f32,
    anchor: Anchor,
) {
    if text.is_empty() {
        return;
    }
    let (width, _) = text_size(PxScale::from(scale), font, text);
    let x = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - width as f32 / 2.0,
        Anchor::End => x - width as f32,
    };
    draw_text_mut(
        canvas,
        TEXT,
        x.round() as i32,
        y.round() as i32,
        PxScale::from(scale),
        font,
        text,
    );
}

/// Shortens `text` with a trailing ellipsis until it fits in `max_width`.
fn fit(font: &FontRef<'_>, text: &str, scale: f32, max_width: f32) -> String {
    let fits = |t: &str| text_size(PxScale::from(scale), font, t).0 as f32 <= max_width;
    if fits(text) {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(std::iter::once(&'…')).collect();
        if fits(&candidate) {
            return candidate;
        }
    }
    String::new()
}

fn format_value(value: f64) -> String {
    if value.abs() >= 1e6 {
        format!("{:.2e}", value)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn draw_frame(canvas: &mut RgbImage, plot: &Plot) {
    for step in 0..=GRID_LINES {
        let y = plot.top + plot.height * step as f32 / GRID_LINES as f32;
        draw_line_segment_mut(canvas, (plot.left, y), (plot.right(), y), GRID);
    }

    let zero = plot.y(0.0);
    draw_line_segment_mut(canvas, (plot.left, zero), (plot.right(), zero), AXIS);
    draw_line_segment_mut(
        canvas,
        (plot.left, plot.top),
        (plot.left, plot.bottom()),
        AXIS,
    );
}

fn draw_titles(canvas: &mut RgbImage, font: &FontRef<'_>, spec: &ChartSpec, plot: &Plot) {
    draw_label(
        canvas,
        font,
        &spec.title,
        (spec.width as f32 / 2.0, 8.0),
        TITLE_SCALE,
        Anchor::Middle,
    );
    draw_label(
        canvas,
        font,
        &spec.y_label,
        (4.0, plot.top - LABEL_SCALE - 8.0),
        LABEL_SCALE,
        Anchor::Start,
    );
    draw_label(
        canvas,
        font,
        &spec.x_label,
        (plot.left + plot.width / 2.0, plot.bottom() + 28.0),
        LABEL_SCALE,
        Anchor::Middle,
    );
}

fn draw_ticks(canvas: &mut RgbImage, font: &FontRef<'_>, plot: &Plot) {
    for step in 0..=GRID_LINES {
        let t = step as f64 / GRID_LINES as f64;
        let value = plot.low * (1.0 - t) + plot.high * t;
        draw_label(
            canvas,
            font,
            &format_value(value),
            (plot.left - 6.0, plot.y(value) - TICK_SCALE / 2.0),
            TICK_SCALE,
            Anchor::End,
        );
    }
}

fn draw_categories(canvas: &mut RgbImage, font: &FontRef<'_>, spec: &ChartSpec, plot: &Plot) {
    let slots = spec.categories.len();
    let room = plot.slot_width(slots) - 4.0;
    for (index, category) in spec.categories.iter().enumerate() {
        draw_label(
            canvas,
            font,
            &fit(font, category, LABEL_SCALE, room),
            (plot.slot_center(slots, index), plot.bottom() + 6.0),
            LABEL_SCALE,
            Anchor::Middle,
        );
    }
}

/// Writes a bar's value just past its end: above positive bars, below negative
/// ones.
fn draw_value(canvas: &mut RgbImage, font: &FontRef<'_>, plot: &Plot, x: f32, value: f64) {
    let y = if value < 0.0 {
        plot.y(value) + 2.0
    } else {
        plot.y(value) - TICK_SCALE - 3.0
    };
    draw_label(
        canvas,
        font,
        &format_value(value),
        (x, y),
        TICK_SCALE,
        Anchor::Middle,
    );
}

fn draw_bars(canvas: &mut RgbImage, font: &FontRef<'_>, spec: &ChartSpec, plot: &Plot) {
    let slots = spec.categories.len();
    let slot = plot.slot_width(slots);
    let lanes = match spec.kind {
        ChartKind::GroupedBar => spec.series.len().max(1),
        _ => 1,
    };
    let group = slot * 0.8;
    let bar = group / lanes as f32;

    for index in 0..slots {
        let center = plot.slot_center(slots, index);
        let mut stack_base = 0.0;
        let mut stacked = false;

        for (lane, series) in spec.series.iter().enumerate() {
            let Some(value) = series.values[index] else {
                continue;
            };
            let color = series.color_at(index);

            match spec.kind {
                ChartKind::StackedBar => {
                    let top = stack_base + value.abs();
                    fill(
                        canvas,
                        center - bar / 2.0,
                        plot.y(stack_base),
                        center + bar / 2.0,
                        plot.y(top),
                        color,
                    );
                    stack_base = top;
                    stacked = true;
                }
                ChartKind::GroupedBar => {
                    let x0 = center - group / 2.0 + bar * lane as f32;
                    fill(canvas, x0, plot.y(0.0), x0 + bar, plot.y(value), color);
                    draw_value(canvas, font, plot, x0 + bar / 2.0, value);
                }
                _ => {
                    let half = slot * 0.3;
                    fill(
                        canvas,
                        center - half,
                        plot.y(0.0),
                        center + half,
                        plot.y(value),
                        color,
                    );
                    draw_value(canvas, font, plot, center, value);
                }
            }
        }

        if stacked {
            draw_value(canvas, font, plot, center, stack_base);
        }
    }
}

fn draw_lines(canvas: &mut RgbImage, spec: &ChartSpec, plot: &Plot) {
    let slots = spec.categories.len();

    for series in &spec.series {
        let color = series.color_at(0);
        let mut previous: Option<(f32, f32)> = None;

        for (index, value) in series.values.iter().enumerate() {
            let Some(value) = value else {
                previous = None;
                continue;
            };
            let point = (plot.slot_center(slots, index), plot.y(*value));
            if let Some(from) = previous {
                draw_line_segment_mut(canvas, from, point, color);
            }
            draw_filled_circle_mut(
                canvas,
                (point.0.round() as i32, point.1.round() as i32),
                3,
                color,
            );
            previous = Some(point);
        }
    }
}

fn draw_legend(canvas: &mut RgbImage, font: &FontRef<'_>, spec: &ChartSpec, plot: &Plot) {
    if spec.series.len() < 2 {
        return;
    }
    let y = plot.bottom() + 52.0;
    let mut x = plot.left;
    for series in &spec.series {
        draw_filled_rect_mut(
            canvas,
            Rect::at(x.round() as i32, y.round() as i32).of_size(LEGEND_SWATCH, LEGEND_SWATCH),
            series.color_at(0),
        );
        x += LEGEND_SWATCH as f32 + 4.0;
        draw_label(
            canvas,
            font,
            &series.name,
            (x, y - 1.0),
            LABEL_SCALE,
            Anchor::Start,
        );
        x += text_size(PxScale::from(LABEL_SCALE), font, &series.name).0 as f32 + LEGEND_GAP;
    }
}

/// Renders the chart to PNG bytes.
pub fn render(spec: &ChartSpec) -> Result<Vec<u8>, ChartError> {
    spec.validate()?;
    let font = FontRef::try_from_slice(FONT_DATA)?;

    let mut canvas = RgbImage::from_pixel(spec.width.max(1), spec.height.max(1), BACKGROUND);
    let plot = Plot::new(spec);

    draw_frame(&mut canvas, &plot);
    draw_ticks(&mut canvas, &font, &plot);
    if !spec.categories.is_empty() {
        match spec.kind {
            ChartKind::Line => draw_lines(&mut canvas, spec, &plot),
            _ => draw_bars(&mut canvas, &font, spec, &plot),
        }
        draw_categories(&mut canvas, &font, spec, &plot);
    }
    draw_titles(&mut canvas, &font, spec, &plot);
    draw_legend(&mut canvas, &font, spec, &plot);

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn to_base64(png: &[u8]) -> String {
    general_purpose::STANDARD.encode(png)
}

pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", to_base64(png))
}
