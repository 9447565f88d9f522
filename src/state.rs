use crate::data::model::Table;
use crate::figure::{RaincloudFigure, RaincloudOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Table>,

    /// Selected features, in click order.  Selection order is lane order.
    pub features: Vec<String>,

    /// Display options for the figure.
    pub options: RaincloudOptions,

    /// Laid-out figure, rebuilt only when dataset/selection/options change.
    pub figure: Option<RaincloudFigure>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            features: Vec::new(),
            options: RaincloudOptions {
                x_label: "Value".to_owned(),
                title: "Raincloud".to_owned(),
                // Fixed seed so toggling options doesn't reshuffle the rain.
                jitter_seed: Some(0),
                ..RaincloudOptions::default()
            },
            figure: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: select all numeric columns by default
    /// and lay out the first figure.
    pub fn set_dataset(&mut self, dataset: Table) {
        self.features = dataset
            .column_names()
            .filter(|name| {
                dataset
                    .column(name)
                    .map(|c| c.is_numeric())
                    .unwrap_or(false)
            })
            .map(str::to_owned)
            .collect();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.rebuild_figure();
    }

    /// Toggle a feature in the selection.  Newly selected features append,
    /// so they get the bottom-most free lane.
    pub fn toggle_feature(&mut self, name: &str) {
        if let Some(pos) = self.features.iter().position(|f| f == name) {
            self.features.remove(pos);
        } else {
            self.features.push(name.to_owned());
        }
        self.rebuild_figure();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }

    /// Lane index a selected feature will occupy, if any.
    pub fn lane_of(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// Re-run the layout after any input change.
    pub fn rebuild_figure(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.figure = None;
            return;
        };
        if self.features.is_empty() {
            self.figure = None;
            self.status_message = None;
            return;
        }
        match RaincloudFigure::build(dataset, &self.features, &self.options) {
            Ok(figure) => {
                self.figure = Some(figure);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Figure layout failed: {e:#}");
                self.figure = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
