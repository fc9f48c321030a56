//! Chart rendering (plotters)
//!
//! Every dashboard chart is drawn to an SVG string and inlined in the page.
//! An empty series never reaches plotters: it comes back as
//! [`ChartView::Placeholder`].

use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(23, 190, 207),
];

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Chart type per kind of data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Category distribution
    Pie,
    /// Time series, labels rotated
    Line,
    /// Ranked categorical magnitude
    Bar,
    /// Hour-bucketed magnitude
    HorizontalBar,
}

/// Labels and values for one chart, in display order
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub value_desc: String,
}

impl ChartSeries {
    pub fn new(title: &str, kind: ChartKind, value_desc: &str) -> Self {
        Self {
            title: title.to_string(),
            kind,
            labels: Vec::new(),
            values: Vec::new(),
            value_desc: value_desc.to_string(),
        }
    }

    /// Build a series from any row type
    pub fn from_rows<T, L, V>(
        title: &str,
        kind: ChartKind,
        value_desc: &str,
        rows: &[T],
        label: L,
        value: V,
    ) -> Self
    where
        L: Fn(&T) -> String,
        V: Fn(&T) -> f64,
    {
        let mut series = Self::new(title, kind, value_desc);
        for row in rows {
            series.labels.push(label(row));
            series.values.push(value(row));
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn max_value(&self) -> f64 {
        self.values.iter().cloned().fold(0.0, f64::max)
    }
}

/// What the page shows in a chart slot
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Svg(String),
    Placeholder,
    Failed(String),
}

/// Render a series, or a placeholder when there is nothing to draw
pub fn render(series: &ChartSeries) -> ChartView {
    if series.is_empty() {
        return ChartView::Placeholder;
    }
    // A pie of zeros has no slices to draw
    if series.kind == ChartKind::Pie && series.values.iter().sum::<f64>() <= 0.0 {
        return ChartView::Placeholder;
    }

    let result = match series.kind {
        ChartKind::Pie => draw_pie(series),
        ChartKind::Line => draw_line(series),
        ChartKind::Bar => draw_bar(series),
        ChartKind::HorizontalBar => draw_horizontal_bar(series),
    };

    match result {
        Ok(svg) => ChartView::Svg(svg),
        Err(e) => {
            tracing::warn!(chart = %series.title, error = %e, "chart rendering failed");
            ChartView::Failed(e)
        }
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            if *i >= 0 {
                labels.get(*i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        }
        SegmentValue::Last => String::new(),
    }
}

fn draw_pie(series: &ChartSeries) -> Result<String, String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;
        let area = root
            .titled(&series.title, ("sans-serif", 18))
            .map_err(|e| e.to_string())?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;
        let colors: Vec<RGBColor> = (0..series.values.len())
            .map(|i| PALETTE[i % PALETTE.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, &series.values, &colors, &series.labels);
        pie.label_style(("sans-serif", 13).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 12).into_font().color(&WHITE));
        area.draw(&pie).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }
    Ok(svg)
}

fn draw_line(series: &ChartSeries) -> Result<String, String> {
    let n = series.values.len();
    let y_max = series.max_value() * 1.15 + 1.0;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&series.title, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(80)
            .y_label_area_size(50)
            .build_cartesian_2d(0..(n as i32).max(1), 0f64..y_max)
            .map_err(|e| e.to_string())?;

        let labels = &series.labels;
        chart
            .configure_mesh()
            .x_labels(n.min(15))
            .x_label_formatter(&|x: &i32| {
                if *x >= 0 && (*x as usize) < labels.len() {
                    labels[*x as usize].clone()
                } else {
                    String::new()
                }
            })
            .x_label_style(
                ("sans-serif", 11)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(series.value_desc.as_str())
            .draw()
            .map_err(|e| e.to_string())?;

        let points: Vec<(i32, f64)> = series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as i32, *v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), LINE_COLOR.stroke_width(2)))
            .map_err(|e| e.to_string())?;
        chart
            .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, LINE_COLOR.filled())))
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }
    Ok(svg)
}

fn draw_bar(series: &ChartSeries) -> Result<String, String> {
    let last = series.values.len() as i32 - 1;
    let y_max = series.max_value() * 1.15 + 1.0;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&series.title, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((0..last).into_segmented(), 0f64..y_max)
            .map_err(|e| e.to_string())?;

        let labels = &series.labels;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(labels, v))
            .y_desc(series.value_desc.as_str())
            .draw()
            .map_err(|e| e.to_string())?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(12)
                    .data(series.values.iter().enumerate().map(|(i, v)| (i as i32, *v))),
            )
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }
    Ok(svg)
}

fn draw_horizontal_bar(series: &ChartSeries) -> Result<String, String> {
    let last = series.values.len() as i32 - 1;
    let x_max = series.max_value() * 1.15 + 1.0;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&series.title, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, (0..last).into_segmented())
            .map_err(|e| e.to_string())?;

        let labels = &series.labels;
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(labels.len())
            .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(labels, v))
            .x_desc(series.value_desc.as_str())
            .draw()
            .map_err(|e| e.to_string())?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(4)
                    .data(series.values.iter().enumerate().map(|(i, v)| (i as i32, *v))),
            )
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }
    Ok(svg)
}
