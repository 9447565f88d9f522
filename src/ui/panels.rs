use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – feature selection
// ---------------------------------------------------------------------------

/// Render the left feature panel.  Numeric columns are selectable; selection
/// order is lane order (first selected = bottom lane).  Non-numeric columns
/// are listed disabled so the user can see what was dropped.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Features");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone names so we can mutate state inside the loop.
    let columns: Vec<(String, &'static str, bool)> = dataset
        .column_names()
        .map(|name| {
            let col = dataset.column(name).expect("listed column exists");
            (name.to_owned(), col.dtype(), col.is_numeric())
        })
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (name, dtype, numeric) in &columns {
                if !numeric {
                    let mut unchecked = false;
                    ui.add_enabled(
                        false,
                        egui::Checkbox::new(&mut unchecked, format!("{name}  ({dtype})")),
                    )
                    .on_disabled_hover_text("Non-numeric column, not plottable");
                    continue;
                }

                let mut checked = state.is_selected(name);
                let mut text = RichText::new(format!("{name}  ({dtype})"));
                if let Some(lane) = state.lane_of(name) {
                    text = text.color(color::edge_color(color::lane_color(lane)));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_feature(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} features plotted",
                ds.len(),
                state.features.len()
            ));
        }

        ui.separator();

        let mut changed = false;

        ui.label("Title:");
        changed |= ui
            .add(egui::TextEdit::singleline(&mut state.options.title).desired_width(120.0))
            .changed();

        ui.label("X label:");
        changed |= ui
            .add(egui::TextEdit::singleline(&mut state.options.x_label).desired_width(100.0))
            .changed();

        if ui
            .selectable_label(state.options.show_boxes, "Boxplots")
            .clicked()
        {
            state.options.show_boxes = !state.options.show_boxes;
            changed = true;
        }
        if ui
            .selectable_label(state.options.x_log_scale, "Log X")
            .clicked()
        {
            state.options.x_log_scale = !state.options.x_log_scale;
            changed = true;
        }

        if changed {
            state.rebuild_figure();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.len(),
                    table.column_names().collect::<Vec<_>>()
                );
                state.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
