use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_plot::{
    BoxElem, BoxPlot, BoxSpread, GridInput, GridMark, Plot, PlotPoints, Points, Polygon,
};

use crate::color::with_opacity;
use crate::figure::{RaincloudFigure, BOX_WIDTH};
use crate::state::AppState;

/// Fill opacity for box and violin bodies.
const FILL_ALPHA: f32 = 0.8;
/// Scatter point radius.
const POINT_RADIUS: f32 = 0.5;

// ---------------------------------------------------------------------------
// Raincloud plot (central panel)
// ---------------------------------------------------------------------------

/// Render the raincloud figure in the central panel.
pub fn raincloud_plot(ui: &mut Ui, state: &AppState) {
    let figure = match &state.figure {
        Some(fig) => fig,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                if state.dataset.is_some() {
                    ui.heading("Select features to plot");
                } else {
                    ui.heading("Open a file to view a raincloud plot  (File → Open…)");
                }
            });
            return;
        }
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&figure.title);
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            draw_figure(ui, figure);
        });
}

/// Draw a laid-out figure into an `egui_plot::Plot`.
fn draw_figure(ui: &mut Ui, figure: &RaincloudFigure) {
    let n = figure.lanes.len();
    let ticks: Vec<(f64, String)> = figure
        .tick_labels()
        .map(|(pos, name)| (pos, name.to_owned()))
        .collect();
    let log_scale = figure.x_log_scale;

    let mut plot = Plot::new("raincloud_plot")
        .x_axis_label(figure.x_label.clone())
        .height(figure.suggested_height())
        .include_y(0.5)
        .include_y(n as f64 + 1.3)
        // Lane ticks only, at integer positions 1..=n.
        .y_grid_spacer(move |input: GridInput| lane_grid_marks(input, n))
        .y_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            ticks
                .iter()
                .find(|(pos, _)| (mark.value - pos).abs() < 1e-6)
                .map(|(_, name)| name.clone())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if log_scale {
        plot = plot.x_axis_formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            log_tick_label(mark.value)
        });
    }

    plot.show(ui, |plot_ui| {
        // Boxplot layer first, so violins and rain draw on top of it.
        let boxes: Vec<BoxElem> = figure
            .lanes
            .iter()
            .filter_map(|lane| {
                let stats = lane.box_stats.as_ref()?;
                Some(
                    BoxElem::new(
                        lane.box_center(),
                        BoxSpread::new(
                            figure.map_x(stats.lower_whisker),
                            figure.map_x(stats.q1),
                            figure.map_x(stats.median),
                            figure.map_x(stats.q3),
                            figure.map_x(stats.upper_whisker),
                        ),
                    )
                    .name(&lane.name)
                    .box_width(BOX_WIDTH)
                    .whisker_width(BOX_WIDTH)
                    .fill(with_opacity(lane.color, FILL_ALPHA))
                    .stroke(Stroke::new(1.0, Color32::BLACK)),
                )
            })
            .collect();
        if !boxes.is_empty() {
            plot_ui.box_plot(BoxPlot::new(boxes).horizontal());
        }

        for lane in &figure.lanes {
            let outline: PlotPoints = lane
                .violin
                .iter()
                .map(|p| [figure.map_x(p[0]), p[1]])
                .collect();
            plot_ui.polygon(
                Polygon::new(outline)
                    .name(&lane.name)
                    .fill_color(with_opacity(lane.color, FILL_ALPHA))
                    .stroke(Stroke::new(1.0, Color32::BLACK)),
            );

            let rain: PlotPoints = lane
                .scatter
                .iter()
                .map(|p| [figure.map_x(p[0]), p[1]])
                .collect();
            plot_ui.points(
                Points::new(rain)
                    .name(&lane.name)
                    .radius(POINT_RADIUS)
                    .color(lane.color),
            );
        }
    });
}

/// Grid marks at the integer lane positions `1..=n` that fall inside the
/// current view.
fn lane_grid_marks(input: GridInput, n: usize) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    (1..=n)
        .map(|i| i as f64)
        .filter(|&pos| pos >= min && pos <= max)
        .map(|pos| GridMark {
            value: pos,
            step_size: 1.0,
        })
        .collect()
}

/// Axis label for a log10-mapped coordinate: decades as powers of ten,
/// everything else blank.
fn log_tick_label(v: f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() > 1e-6 {
        return String::new();
    }
    let exp = rounded as i32;
    if (-3..=4).contains(&exp) {
        format!("{}", 10f64.powi(exp))
    } else {
        format!("1e{exp}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_marks_clip_to_view() {
        let input = GridInput {
            bounds: (1.5, 3.5),
            base_step_size: 1.0,
        };
        let marks = lane_grid_marks(input, 5);
        let values: Vec<f64> = marks.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn log_tick_labels() {
        assert_eq!(log_tick_label(0.0), "1");
        assert_eq!(log_tick_label(2.0), "100");
        assert_eq!(log_tick_label(-1.0), "0.1");
        assert_eq!(log_tick_label(6.0), "1e6");
        assert_eq!(log_tick_label(0.5), "");
    }
}
