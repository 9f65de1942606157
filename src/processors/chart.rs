use std::{fmt::Display, ops::Range, path::PathBuf};

use chrono::{Days, NaiveDate};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use once_cell::sync::OnceCell;
use plotters::{
    coord::Shift,
    prelude::*,
    series::DashedLineSeries,
    style::{
        register_font,
        text_anchor::{HPos, Pos, VPos},
        FontStyle,
    },
};

use crate::{
    data_types::goals::Metric,
    database::progress_log::ProgressLog,
    errors::{ProgressError, Result},
    logvbln,
    util::{config::Settings, DateTimeUtils},
};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 2000;
const FONT_FAMILY: &str = "sans-serif";

const GOAL_COLOR: RGBColor = RED;
const DEFAULT_COLOR: RGBColor = RGBColor(31, 119, 180);
const VO2_COLOR: RGBColor = RGBColor(0, 128, 0);
const BMI_COLOR: RGBColor = RGBColor(128, 0, 128);

static FONT: OnceCell<()> = OnceCell::new();

/// Produces the progress chart as PNG bytes.
pub trait Renderer: Send + Sync {
    fn render(&self, log: &ProgressLog) -> Result<Vec<u8>>;
}

/// Six vertically stacked panels sharing one date axis, in `Metric::ALL` order.
pub struct ChartRenderer {
    font_path: PathBuf,
}

impl ChartRenderer {
    const CC: &'static str = "Chart";

    pub fn new(settings: &Settings) -> Self {
        Self {
            font_path: settings.font_path.clone(),
        }
    }

    // Glyphs are drawn with a font registered once per process.
    fn ensure_font(&self) -> Result<()> {
        FONT.get_or_try_init(|| {
            let bytes = std::fs::read(&self.font_path).map_err(|err| {
                ProgressError::Render(format!("font {}: {}", self.font_path.display(), err))
            })?;
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

            register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
                ProgressError::Render(format!("{} is not a usable font", self.font_path.display()))
            })
        })
        .map(|_| ())
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &Panel,
        log: &ProgressLog,
        dates: Range<NaiveDate>,
    ) -> Result<()> {
        let metric = panel.metric;
        let sign = axis_sign(metric);
        let points = &panel.points;
        let goal = panel.goal;
        let bottom = panel.date_labels;
        let values = value_span(points.iter().map(|point| point.1).chain(std::iter::once(goal)));

        let mut chart = ChartBuilder::on(area)
            .caption(format!("{} vs Goal", metric.column()), (FONT_FAMILY, 20))
            .margin(12)
            .x_label_area_size(if bottom { 50 } else { 25 })
            .y_label_area_size(70)
            .build_cartesian_2d(RangedDate::from(dates.clone()), values)
            .map_err(render_err)?;

        // Dates are shared, so only the bottom panel labels them.
        let dated = |date: &NaiveDate| DateTimeUtils::to_str(*date);
        let undated = |_: &NaiveDate| String::new();
        let format_x: &dyn Fn(&NaiveDate) -> String = if bottom { &dated } else { &undated };
        let format_y = |value: &f64| format!("{:.2}", sign * *value);

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(6)
            .x_label_formatter(format_x)
            .y_label_formatter(&format_y)
            .y_desc(metric.column())
            .label_style((FONT_FAMILY, 12));
        if bottom {
            mesh.x_desc("Week");
        }
        mesh.draw().map_err(render_err)?;

        let color = metric_color(metric);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)).point_size(4))
            .map_err(render_err)?
            .label(metric.column())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(DashedLineSeries::new(
                vec![(dates.start, goal), (dates.end, goal)],
                10,
                6,
                GOAL_COLOR.stroke_width(2),
            ))
            .map_err(render_err)?
            .label("Goal")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GOAL_COLOR.stroke_width(2)));

        let annotation = TextStyle::from((FONT_FAMILY, 12).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(log.records().iter().zip(points.iter()).map(|(record, point)| {
                EmptyElement::at(*point)
                    + Text::new(km_label(record.distance_km), (0, -8), annotation.clone())
            }))
            .map_err(render_err)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 12))
            .draw()
            .map_err(render_err)?;

        Ok(())
    }
}

impl Renderer for ChartRenderer {
    fn render(&self, log: &ProgressLog) -> Result<Vec<u8>> {
        let dates = date_span(log)
            .ok_or_else(|| ProgressError::DataUnavailable("progress log has no rows".to_string()))?;
        self.ensure_font()?;

        let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
        {
            // The backend borrows `buffer` and is dropped before encoding, success or not.
            let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let layout = panels(log);
            let areas = root.split_evenly((layout.len(), 1));
            for (panel, area) in layout.iter().zip(areas.iter()) {
                self.draw_panel(area, panel, log, dates.clone())?;
            }

            root.present().map_err(render_err)?;
        }

        let png = encode_png(&buffer, WIDTH, HEIGHT)?;
        logvbln!("rendered {} rows into {} bytes", log.len(), png.len());

        Ok(png)
    }
}

/// One stacked panel: a metric's series and goal, in drawing coordinates.
struct Panel {
    metric: Metric,
    points: Vec<(NaiveDate, f64)>,
    goal: f64,
    date_labels: bool,
}

// Inverted axes are drawn on negated values with negated labels.
fn axis_sign(metric: Metric) -> f64 {
    if metric.inverted_axis() {
        -1.0
    } else {
        1.0
    }
}

/// Panels top to bottom, one per metric in `Metric::ALL` order.
fn panels(log: &ProgressLog) -> Vec<Panel> {
    Metric::ALL
        .iter()
        .enumerate()
        .map(|(index, metric)| {
            let sign = axis_sign(*metric);
            Panel {
                metric: *metric,
                points: log
                    .records()
                    .iter()
                    .map(|record| (record.date, sign * metric.value(record)))
                    .collect(),
                goal: sign * metric.goal(),
                date_labels: index + 1 == Metric::ALL.len(),
            }
        })
        .collect()
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgb, width, height, ColorType::Rgb8)
        .map_err(render_err)?;
    Ok(png)
}

fn render_err<E: Display>(err: E) -> ProgressError {
    ProgressError::Render(err.to_string())
}

fn metric_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::Vo2Max => VO2_COLOR,
        Metric::Bmi => BMI_COLOR,
        _ => DEFAULT_COLOR,
    }
}

// "10.0km", keeping the fraction on whole numbers.
fn km_label(distance_km: f64) -> String {
    format!("{:?}km", distance_km)
}

/// First to last logged date, padded so a single row still has a width.
fn date_span(log: &ProgressLog) -> Option<Range<NaiveDate>> {
    let first = log.records().iter().map(|record| record.date).min()?;
    let last = log.records().iter().map(|record| record.date).max()?;

    let pad = Days::new(3);
    Some(first.checked_sub_days(pad).unwrap_or(first)..last.checked_add_days(pad).unwrap_or(last))
}

/// Value range covering every point and the goal, with headroom for labels.
fn value_span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
        (low.min(value), high.max(value))
    });

    let spread = high - low;
    let pad = if spread.abs() < f64::EPSILON {
        low.abs().max(1.0) * 0.1
    } else {
        spread * 0.15
    };

    (low - pad)..(high + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::record::ActivityRecord;

    fn record(date: &str) -> ActivityRecord {
        ActivityRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            distance_km: 10.0,
            total_time_min: 50.0,
            total_ascent_m: 100,
            max_altitude_m: 250.0,
            weight_kg: 80.0,
            bmi: 23.37,
            vo2_max: 51.0,
            pace_min_per_km: 5.0,
            cadence_spm: 170.0,
            stride_m: 1.1,
            heart_rate_bpm: 140,
        }
    }

    fn renderer() -> Option<ChartRenderer> {
        let settings = Settings::default();
        if !settings.font_path.exists() {
            eprintln!("skipping: {} not installed", settings.font_path.display());
            return None;
        }
        Some(ChartRenderer::new(&settings))
    }

    #[test]
    fn single_row_span_is_padded() {
        let log = ProgressLog::from_records(vec![record("2024-01-01")]);
        let span = date_span(&log).unwrap();

        assert_eq!(DateTimeUtils::to_str(span.start), "2023-12-29");
        assert_eq!(DateTimeUtils::to_str(span.end), "2024-01-04");
        assert!(date_span(&ProgressLog::new()).is_none());
    }

    #[test]
    fn value_span_includes_goal() {
        let span = value_span([170.0, 172.0, 178.0].into_iter());
        assert!(span.start < 170.0 && span.end > 178.0);

        let flat = value_span([5.0, 5.0].into_iter());
        assert!(flat.start < 5.0 && flat.end > 5.0);
    }

    #[test]
    fn distance_labels_keep_fraction() {
        assert_eq!(km_label(10.0), "10.0km");
        assert_eq!(km_label(12.34), "12.34km");
    }

    #[test]
    fn six_panels_in_metric_order() {
        let one = ProgressLog::from_records(vec![record("2024-01-01")]);
        let three = ProgressLog::from_records(vec![
            record("2024-01-01"),
            record("2024-01-08"),
            record("2024-01-15"),
        ]);

        for (log, rows) in [(&one, 1), (&three, 3)] {
            let layout = panels(log);
            let metrics: Vec<_> = layout.iter().map(|panel| panel.metric).collect();

            assert_eq!(metrics, Metric::ALL.to_vec());
            assert!(layout.iter().all(|panel| panel.points.len() == rows));
        }
    }

    #[test]
    fn pace_panel_is_flipped() {
        let layout = panels(&ProgressLog::from_records(vec![record("2024-01-01")]));

        let pace = &layout[1];
        assert_eq!(pace.metric, Metric::Pace);
        assert_eq!(pace.points[0].1, -5.0);
        assert_eq!(pace.goal, -5.0);

        let cadence = &layout[0];
        assert_eq!(cadence.points[0].1, 170.0);
        assert_eq!(cadence.goal, 178.0);
    }

    #[test]
    fn only_bottom_panel_labels_dates() {
        let layout = panels(&ProgressLog::from_records(vec![record("2024-01-01")]));
        let labelled: Vec<_> = layout
            .iter()
            .filter(|panel| panel.date_labels)
            .map(|panel| panel.metric)
            .collect();

        assert_eq!(labelled, vec![Metric::Bmi]);
    }

    #[test]
    fn empty_log_is_not_rendered() {
        let renderer = ChartRenderer::new(&Settings::default());
        assert!(matches!(
            renderer.render(&ProgressLog::new()),
            Err(ProgressError::DataUnavailable(_))
        ));
    }

    #[test]
    fn renders_png_for_one_row() {
        let Some(renderer) = renderer() else { return };
        let log = ProgressLog::from_records(vec![record("2024-01-01")]);

        let png = renderer.render(&log).unwrap();
        let image = image::load_from_memory(&png).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));
    }

    #[test]
    fn renders_png_for_many_rows() {
        let Some(renderer) = renderer() else { return };
        let log = ProgressLog::from_records(vec![
            record("2024-01-01"),
            record("2024-01-08"),
            record("2024-01-15"),
        ]);

        let png = renderer.render(&log).unwrap();
        assert!(image::load_from_memory(&png).is_ok());
    }
}
