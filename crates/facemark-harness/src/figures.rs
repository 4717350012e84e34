//! Benchmark figures using plotters (SVG output).
//!
//! Uses the SVG backend to avoid system font dependencies. A requested
//! `.png` path is written with an `.svg` extension instead.

use crate::report::ReportError;
use facemark_core::types::BenchmarkRun;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const FIGURE_WIDTH: u32 = 1600;
const FIGURE_HEIGHT: u32 = 1200;
/// Bar-chart panel shows the N best combinations by accuracy.
const TOP_N: usize = 10;

/// One scored combination flattened for plotting.
struct Scored {
    detector: &'static str,
    model: &'static str,
    accuracy: f64,
    mean_secs: f64,
}

/// Render the four comparison panels (accuracy heatmap, timing heatmap,
/// accuracy-vs-time scatter, top-N bar chart) into a single SVG.
///
/// Only combinations with a metrics block appear; a run without any renders
/// a placeholder panel instead of failing.
pub fn render_figures(run: &BenchmarkRun, path: &Path) -> Result<(), ReportError> {
    render_inner(run, &svg_path(path)).map_err(|e| ReportError::Figures(e.to_string()))
}

fn svg_path(path: &Path) -> PathBuf {
    if path.extension().map(|e| e == "png").unwrap_or(false) {
        path.with_extension("svg")
    } else {
        path.to_path_buf()
    }
}

fn render_inner(run: &BenchmarkRun, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let scored: Vec<Scored> = run
        .scored_results()
        .map(|(result, metrics)| Scored {
            detector: result.combination.detector.as_str(),
            model: result.combination.model.as_str(),
            accuracy: metrics.accuracy,
            mean_secs: metrics.timing.mean_secs,
        })
        .collect();

    if scored.is_empty() {
        root.draw(&Text::new(
            "No scored combinations to visualize",
            (FIGURE_WIDTH as i32 / 2 - 160, FIGURE_HEIGHT as i32 / 2),
            ("sans-serif", 24).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    // Axes: distinct detectors/models in first-appearance order.
    let detectors = distinct(scored.iter().map(|s| s.detector));
    let models = distinct(scored.iter().map(|s| s.model));

    let accuracy_cells = grid(&scored, &detectors, &models, |s| s.accuracy);
    let timing_cells = grid(&scored, &detectors, &models, |s| s.mean_secs);
    let max_time = scored
        .iter()
        .map(|s| s.mean_secs)
        .fold(0.0f64, f64::max)
        .max(1e-6);

    let panels = root.split_evenly((2, 2));

    draw_heatmap(
        &panels[0],
        "Accuracy by Detector-Model Combination",
        &detectors,
        &models,
        &accuracy_cells,
        |value| accuracy_color(value),
    )?;

    draw_heatmap(
        &panels[1],
        "Average Processing Time (s)",
        &detectors,
        &models,
        &timing_cells,
        // Low times are good: invert the normalized grade.
        |value| accuracy_color(1.0 - value / max_time),
    )?;

    draw_scatter(&panels[2], &scored, max_time)?;
    draw_top_bar(&panels[3], &scored)?;

    root.present()?;
    Ok(())
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

fn grid(
    scored: &[Scored],
    detectors: &[&str],
    models: &[&str],
    value: impl Fn(&Scored) -> f64,
) -> HashMap<(usize, usize), f64> {
    let mut cells = HashMap::new();
    for entry in scored {
        let row = detectors.iter().position(|d| *d == entry.detector);
        let col = models.iter().position(|m| *m == entry.model);
        if let (Some(row), Some(col)) = (row, col) {
            cells.insert((row, col), value(entry));
        }
    }
    cells
}

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    detectors: &[&str],
    models: &[&str],
    cells: &HashMap<(usize, usize), f64>,
    color: impl Fn(f64) -> RGBColor,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let detector_labels: Vec<String> = detectors.iter().map(|d| d.to_string()).collect();
    let model_labels: Vec<String> = models.iter().map(|m| m.to_string()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 18))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0..models.len(), 0..detectors.len())?;

    chart
        .configure_mesh()
        .x_desc("Recognition Model")
        .y_desc("Detector")
        .x_labels(models.len())
        .y_labels(detectors.len())
        .x_label_formatter(&|x| model_labels.get(*x).cloned().unwrap_or_default())
        .y_label_formatter(&|y| detector_labels.get(*y).cloned().unwrap_or_default())
        .draw()?;

    for (&(row, col), &value) in cells {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(col, row), (col + 1, row + 1)],
            color(value).filled(),
        )))?;
    }

    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    scored: &[Scored],
    max_time: f64,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption("Accuracy vs Processing Time Trade-off", ("sans-serif", 18))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_time * 1.1, 0.0..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("Average Processing Time (s)")
        .y_desc("Accuracy")
        .draw()?;

    chart.draw_series(scored.iter().enumerate().map(|(idx, entry)| {
        let color = Palette99::pick(idx);
        Circle::new((entry.mean_secs, entry.accuracy), 5, color.filled())
    }))?;

    Ok(())
}

fn draw_top_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    scored: &[Scored],
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let mut top: Vec<&Scored> = scored.iter().collect();
    top.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    top.truncate(TOP_N);

    let labels: Vec<String> = top
        .iter()
        .map(|s| format!("{}+{}", s.detector, s.model))
        .collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Top Performing Combinations", ("sans-serif", 18))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(60)
        .build_cartesian_2d((0..top.len()).into_segmented(), 0.0..1.05f64)?;

    chart
        .configure_mesh()
        .x_labels(top.len())
        .x_label_formatter(&|x| {
            if let SegmentValue::CenterOf(idx) = x {
                if *idx < labels.len() {
                    return labels[*idx].clone();
                }
            }
            String::new()
        })
        .y_desc("Accuracy")
        .draw()?;

    chart.draw_series(top.iter().enumerate().map(|(idx, entry)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(idx), 0.0),
                (SegmentValue::Exact(idx + 1), entry.accuracy),
            ],
            accuracy_color(entry.accuracy).filled(),
        )
    }))?;

    Ok(())
}

/// Red (poor) -> yellow (middling) -> green (good).
fn accuracy_color(value: f64) -> RGBColor {
    let v = value.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t) as u8;
    let (low, mid, high) = ((211, 47, 47), (251, 192, 45), (56, 142, 60));
    if v < 0.5 {
        let t = v * 2.0;
        RGBColor(
            lerp(low.0, mid.0, t),
            lerp(low.1, mid.1, t),
            lerp(low.2, mid.2, t),
        )
    } else {
        let t = (v - 0.5) * 2.0;
        RGBColor(
            lerp(mid.0, high.0, t),
            lerp(mid.1, high.1, t),
            lerp(mid.2, high.2, t),
        )
    }
}
