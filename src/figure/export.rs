use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::{SpectrumError, SpectrumResult};

use super::model::{Figure, LineKind, Panel};

/// Pixel size of a single panel; the canvas grows with the grid.
pub const PANEL_SIZE: (u32, u32) = (800, 600);

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write `figure` to `path`. The backend is chosen by extension.
///
/// Supported formats:
/// * `.svg` – vector output
/// * `.png` – raster output
pub fn save_figure(figure: &Figure, path: &Path) -> SpectrumResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (rows, cols) = figure.grid();
    let size = (PANEL_SIZE.0 * cols as u32, PANEL_SIZE.1 * rows as u32);

    match ext.as_str() {
        "svg" => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(root, figure).map_err(render_error)?;
        }
        "png" => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(root, figure).map_err(render_error)?;
        }
        other => return Err(SpectrumError::UnsupportedOutput(other.to_string())),
    }

    log::info!("Saved figure to {}", path.display());
    Ok(())
}

fn render_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> SpectrumError {
    SpectrumError::Render(err.to_string())
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw_figure<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    figure: &Figure,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let areas = root.split_evenly(figure.grid());
    for (area, panel) in areas.iter().zip(&figure.panels) {
        draw_panel(area, panel)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (x0, x1) = panel.x_range;
    let (y0, y1) = panel.y_range;

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .x_label_formatter(&|v| format!("{v}"))
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .draw()?;

    for trace in &panel.traces {
        let [r, g, b] = trace.color;
        let style = RGBColor(r, g, b).stroke_width(2);

        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(trace.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));

        for segment in trace.clipped_segments(panel.y_range) {
            match trace.kind {
                LineKind::Solid => {
                    chart.draw_series(LineSeries::new(segment, style))?;
                }
                LineKind::Dashed => {
                    chart.draw_series(DashedLineSeries::new(segment, 8, 5, style))?;
                }
                LineKind::Dotted => {
                    chart.draw_series(DashedLineSeries::new(segment, 2, 4, style))?;
                }
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::MassColors;
    use crate::data::loader::{parse_str, LoadOptions};
    use crate::figure::model::TraceFilter;
    use crate::spectrum::{Preset, SpectrumAnalyzer};

    fn figure() -> Figure {
        let text = "RUNDETAILS x 10\n10 2 1 5\n10 2 1 7\n10 1 1 0.5\n10 1 0 3\n";
        let ds = parse_str(text, LoadOptions::default()).unwrap();
        let preset = Preset::Isospin;
        let spectra = SpectrumAnalyzer::new(preset.analysis()).unwrap().analyze(&ds);
        Figure::build(
            &[spectra],
            &preset.plot(),
            &MassColors::new(ds.mass_keys()),
            &TraceFilter::default(),
        )
    }

    #[test]
    fn writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isospin.svg");
        match save_figure(&figure(), &path) {
            Ok(()) => {
                let svg = std::fs::read_to_string(&path).unwrap();
                assert!(svg.contains("<svg"));
            }
            // Hosts without a system sans-serif font cannot lay out text.
            Err(SpectrumError::Render(msg)) => eprintln!("skipping: {msg}"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_figure(&figure(), &dir.path().join("isospin.pdf")).unwrap_err();
        assert!(matches!(err, SpectrumError::UnsupportedOutput(ref e) if e == "pdf"));
    }
}
