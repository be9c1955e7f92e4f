use eframe::egui::{Color32, Ui};
use egui_plot::{GridMark, Legend, Line, LineStyle, Plot, PlotPoints};

use crate::figure::{LineKind, Panel};
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Spectrum plots (central panel)
// ---------------------------------------------------------------------------

/// Lay the figure's panels out in its grid.
pub fn figure_grid(ui: &mut Ui, state: &ViewerState) {
    let figure = &state.figure;
    if figure.panels.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an event file to view spectra  (File → Open…)");
        });
        return;
    }

    let (rows, cols) = figure.grid();
    let spacing = ui.spacing().item_spacing.y;
    let cell_height = (ui.available_height() / rows as f32 - spacing).max(120.0);

    ui.columns(cols, |columns| {
        for (idx, panel) in figure.panels.iter().enumerate() {
            let col = &mut columns[idx % cols];
            col.strong(&panel.title);
            spectrum_plot(col, panel, idx, cell_height - 20.0);
        }
    });
}

/// One log-log panel. egui_plot has linear axes only, so coordinates are
/// drawn as log10 and the tick labels put the decades back.
pub fn spectrum_plot(ui: &mut Ui, panel: &Panel, idx: usize, height: f32) {
    let (x0, x1) = panel.x_range;
    let (y0, y1) = panel.y_range;

    Plot::new(("spectrum_plot", idx))
        .legend(Legend::default())
        .height(height)
        .x_axis_label(panel.x_label.as_str())
        .y_axis_label(panel.y_label.as_str())
        .x_axis_formatter(|mark: GridMark, _range| decade_label(mark.value))
        .y_axis_formatter(|mark: GridMark, _range| decade_label(mark.value))
        .include_x(x0.log10())
        .include_x(x1.log10())
        .include_y(y0.log10())
        .include_y(y1.log10())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &panel.traces {
                let [r, g, b] = trace.color;
                let color = Color32::from_rgb(r, g, b);

                for segment in trace.clipped_segments(panel.y_range) {
                    let points: PlotPoints = segment
                        .iter()
                        .map(|&(x, y)| [x.log10(), y.log10()])
                        .collect();

                    let line = Line::new(points)
                        .name(&trace.label)
                        .color(color)
                        .style(line_style(trace.kind))
                        .width(1.5);

                    plot_ui.line(line);
                }
            }
        });
}

fn line_style(kind: LineKind) -> LineStyle {
    match kind {
        LineKind::Solid => LineStyle::Solid,
        LineKind::Dashed => LineStyle::dashed_loose(),
        LineKind::Dotted => LineStyle::dotted_dense(),
    }
}

/// `10^x` tick text: whole decades in plain form, the rest in scientific.
fn decade_label(exponent: f64) -> String {
    let value = 10f64.powf(exponent);
    if (exponent - exponent.round()).abs() > 1e-9 {
        return String::new();
    }
    if (0.0..=3.0).contains(&exponent.round()) {
        format!("{value:.0}")
    } else {
        format!("{value:.0e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_on_decades() {
        assert_eq!(decade_label(0.0), "1");
        assert_eq!(decade_label(2.0), "100");
        assert_eq!(decade_label(-3.0), "1e-3");
        assert_eq!(decade_label(0.5), "");
    }
}
