//! Raincloud figure layout.
//!
//! `RaincloudFigure::build` turns a table plus display options into plain
//! geometry: one lane per retained numeric feature, each holding boxplot
//! statistics, a half-violin outline, and jittered scatter points.  The
//! figure is an explicit caller-owned value; drawing it is `ui::plot`'s job,
//! so repeated or concurrent renders never touch shared plotting state.
//!
//! Lane convention (0-based lane index `i`):
//! * the lane occupies the vertical band `[i+1, i+2)`, tick at `i+1`
//! * the boxplot sits at `y = i + 0.9`, box width 0.1
//! * the half-violin rises from the baseline `y = i + 1` up to `i + 1.25`
//! * the scatter clusters at `y = i + 0.75` (boxes shown) or `i + 0.9`
//!   (boxes hidden), jittered by ±0.05

use anyhow::{Context, Result};
use eframe::egui::Color32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::lane_color;
use crate::data::model::Table;
use crate::stats::{BoxStats, GaussianKde};

/// Evaluation points for the violin density curve.
pub const VIOLIN_POINTS: usize = 500;
/// Peak half-height of a violin body within its lane.
pub const VIOLIN_HALF_HEIGHT: f64 = 0.25;
/// Height of the boxplot box.
pub const BOX_WIDTH: f64 = 0.1;
/// Scatter base position within the lane band.
const SCATTER_BASE: f64 = 0.75;
/// Extra scatter lift applied when the boxplot layer is hidden.
const RAIN_OFFSET: f64 = 0.15;
/// Uniform jitter half-range applied to scatter y positions.
const JITTER: f64 = 0.05;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Display options for a raincloud figure.
#[derive(Debug, Clone, PartialEq)]
pub struct RaincloudOptions {
    pub x_label: String,
    pub title: String,
    /// Draw the boxplot layer.  Also controls the scatter lift: the scatter
    /// sits 0.15 higher when boxes are hidden, filling the gap they leave.
    pub show_boxes: bool,
    /// Draw the value axis on a log10 scale.
    pub x_log_scale: bool,
    /// Seed for the scatter jitter.  `None` draws a fresh seed per build.
    pub jitter_seed: Option<u64>,
}

impl Default for RaincloudOptions {
    fn default() -> Self {
        Self {
            x_label: String::new(),
            title: String::new(),
            show_boxes: true,
            x_log_scale: false,
            jitter_seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Figure geometry
// ---------------------------------------------------------------------------

/// Geometry for one feature's lane.
#[derive(Debug, Clone)]
pub struct Lane {
    pub name: String,
    /// 0-based lane index; the lane band is `[index+1, index+2)`.
    pub index: usize,
    pub color: Color32,
    /// Boxplot statistics; `None` when the box layer is hidden.
    pub box_stats: Option<BoxStats>,
    /// Half-violin outline, closed along the lane baseline.
    pub violin: Vec<[f64; 2]>,
    /// Jittered raw data points.
    pub scatter: Vec<[f64; 2]>,
}

impl Lane {
    /// y position of the lane's axis tick.
    pub fn tick(&self) -> f64 {
        (self.index + 1) as f64
    }

    /// y center of the boxplot.
    pub fn box_center(&self) -> f64 {
        self.index as f64 + 0.9
    }
}

/// A fully laid-out raincloud figure, ready to draw.
#[derive(Debug, Clone)]
pub struct RaincloudFigure {
    pub lanes: Vec<Lane>,
    pub x_label: String,
    pub title: String,
    pub x_log_scale: bool,
}

impl RaincloudFigure {
    /// Lay out a raincloud figure for the numeric columns of `table` named
    /// in `features`, in request order.  Non-numeric requested features are
    /// dropped and produce no lane; a missing column or a column that breaks
    /// the density estimate is an error.
    pub fn build(table: &Table, features: &[String], options: &RaincloudOptions) -> Result<Self> {
        let selection = table
            .numeric_selection(features)
            .context("selecting features")?;

        let rain_offset = if options.show_boxes { 0.0 } else { RAIN_OFFSET };
        let mut rng = match options.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut lanes = Vec::with_capacity(selection.len());
        for (idx, feature) in selection.iter().enumerate() {
            let base = (idx + 1) as f64;

            let box_stats = if options.show_boxes {
                Some(
                    BoxStats::from_sample(&feature.values)
                        .with_context(|| format!("boxplot for '{}'", feature.name))?,
                )
            } else {
                None
            };

            let kde = GaussianKde::from_sample(&feature.values)
                .with_context(|| format!("density estimate for '{}'", feature.name))?;
            let violin = violin_outline(&kde, base);

            let scatter_base = idx as f64 + SCATTER_BASE + rain_offset;
            let scatter = feature
                .values
                .iter()
                .map(|&x| [x, scatter_base + rng.gen_range(-JITTER..JITTER)])
                .collect();

            lanes.push(Lane {
                name: feature.name.clone(),
                index: idx,
                color: lane_color(idx),
                box_stats,
                violin,
                scatter,
            });
        }

        Ok(RaincloudFigure {
            lanes,
            x_label: options.x_label.clone(),
            title: options.title.clone(),
            x_log_scale: options.x_log_scale,
        })
    }

    /// `(position, label)` pairs for the lane axis: feature `i` at `i+1`.
    pub fn tick_labels(&self) -> impl Iterator<Item = (f64, &str)> {
        self.lanes.iter().map(|l| (l.tick(), l.name.as_str()))
    }

    /// Map a data-space x value into plot space.  Identity on a linear
    /// axis; log10 on a log axis (non-positive values vanish as NaN, as
    /// they would on any log scale).
    pub fn map_x(&self, x: f64) -> f64 {
        if self.x_log_scale {
            if x > 0.0 {
                x.log10()
            } else {
                f64::NAN
            }
        } else {
            x
        }
    }

    /// Suggested plot height in points, linear in the lane count.
    pub fn suggested_height(&self) -> f32 {
        (self.lanes.len().max(1) as f32) * 144.0
    }
}

/// Build the half-violin outline: the density curve scaled to peak at
/// [`VIOLIN_HALF_HEIGHT`] above the lane baseline, closed along the
/// baseline.  Equivalent to clipping a symmetric violin to the upper half
/// of its lane.
fn violin_outline(kde: &GaussianKde, base: f64) -> Vec<[f64; 2]> {
    let grid = kde.evaluate(VIOLIN_POINTS);
    let peak = grid
        .iter()
        .map(|&(_, d)| d)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut outline = Vec::with_capacity(grid.len() + 2);
    outline.push([grid[0].0, base]);
    for &(x, d) in &grid {
        outline.push([x, base + VIOLIN_HALF_HEIGHT * d / peak]);
    }
    outline.push([grid[grid.len() - 1].0, base]);
    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::data::model::Column;

    fn table_abc() -> Table {
        let spread = |offset: f64| (0..40).map(|i| offset + i as f64 * 0.25).collect();
        Table::from_columns(vec![
            ("a".into(), Column::Numeric(spread(1.0))),
            ("b".into(), Column::Numeric(spread(5.0))),
            ("c".into(), Column::Numeric(spread(9.0))),
            (
                "name".into(),
                Column::Text((0..40).map(|i| format!("row{i}")).collect()),
            ),
        ])
        .unwrap()
    }

    fn opts(seed: u64) -> RaincloudOptions {
        RaincloudOptions {
            jitter_seed: Some(seed),
            ..RaincloudOptions::default()
        }
    }

    #[test]
    fn three_lanes_at_expected_positions() {
        let table = table_abc();
        let features: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let fig = RaincloudFigure::build(&table, &features, &opts(7)).unwrap();

        assert_eq!(fig.lanes.len(), 3);
        let ticks: Vec<(f64, &str)> = fig.tick_labels().collect();
        assert_eq!(ticks, vec![(1.0, "a"), (2.0, "b"), (3.0, "c")]);

        for (i, lane) in fig.lanes.iter().enumerate() {
            assert_eq!(lane.box_center(), i as f64 + 0.9);
            assert!(lane.box_stats.is_some());

            // Violin clipped to the upper half of the lane band [i+1, i+2).
            let base = (i + 1) as f64;
            for p in &lane.violin {
                assert!(p[1] >= base - 1e-12);
                assert!(p[1] <= base + VIOLIN_HALF_HEIGHT + 1e-12);
            }
            // The peak actually reaches the half-height.
            let top = lane.violin.iter().map(|p| p[1]).fold(f64::MIN, f64::max);
            assert!((top - (base + VIOLIN_HALF_HEIGHT)).abs() < 1e-9);
        }
    }

    #[test]
    fn non_numeric_features_produce_no_lane() {
        let table = table_abc();
        let features: Vec<String> = ["a", "name", "b"].iter().map(|s| s.to_string()).collect();
        let fig = RaincloudFigure::build(&table, &features, &opts(7)).unwrap();
        let names: Vec<&str> = fig.lanes.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fig.lanes[1].tick(), 2.0);
    }

    #[test]
    fn scatter_offset_follows_show_boxes() {
        let table = table_abc();
        let features = vec!["a".to_string()];

        let with_boxes = RaincloudFigure::build(&table, &features, &opts(7)).unwrap();
        let without_boxes = RaincloudFigure::build(
            &table,
            &features,
            &RaincloudOptions {
                show_boxes: false,
                ..opts(7)
            },
        )
        .unwrap();

        for p in &with_boxes.lanes[0].scatter {
            assert!(p[1] >= 0.70 && p[1] < 0.80, "y = {}", p[1]);
        }
        for p in &without_boxes.lanes[0].scatter {
            assert!(p[1] >= 0.85 && p[1] < 0.95, "y = {}", p[1]);
        }
        assert!(without_boxes.lanes[0].box_stats.is_none());

        // Same seed, so the jitter sequence matches and the shift is
        // exactly the 0.15 lift.
        for (a, b) in with_boxes.lanes[0]
            .scatter
            .iter()
            .zip(&without_boxes.lanes[0].scatter)
        {
            assert_eq!(a[0], b[0]);
            assert!((b[1] - a[1] - 0.15).abs() < 1e-12);
        }
    }

    #[test]
    fn seeded_builds_are_identical() {
        let table = table_abc();
        let features = vec!["a".to_string(), "b".to_string()];
        let fig1 = RaincloudFigure::build(&table, &features, &opts(42)).unwrap();
        let fig2 = RaincloudFigure::build(&table, &features, &opts(42)).unwrap();

        for (l1, l2) in fig1.lanes.iter().zip(&fig2.lanes) {
            assert_eq!(l1.scatter, l2.scatter);
            assert_eq!(l1.violin, l2.violin);
            assert_eq!(l1.box_stats, l2.box_stats);
        }
    }

    #[test]
    fn box_and_violin_ignore_the_seed() {
        let table = table_abc();
        let features = vec!["a".to_string()];
        let fig1 = RaincloudFigure::build(&table, &features, &opts(1)).unwrap();
        let fig2 = RaincloudFigure::build(&table, &features, &opts(2)).unwrap();
        assert_eq!(fig1.lanes[0].violin, fig2.lanes[0].violin);
        assert_eq!(fig1.lanes[0].box_stats, fig2.lanes[0].box_stats);
        assert_ne!(fig1.lanes[0].scatter, fig2.lanes[0].scatter);
    }

    #[test]
    fn colors_cycle_past_the_palette() {
        let spread = |offset: f64| (0..20).map(|i| offset + i as f64 * 0.5).collect();
        let columns: Vec<(String, Column)> = (0..15)
            .map(|i| (format!("f{i}"), Column::Numeric(spread(i as f64))))
            .collect();
        let table = Table::from_columns(columns).unwrap();
        let features: Vec<String> = (0..15).map(|i| format!("f{i}")).collect();

        let fig = RaincloudFigure::build(&table, &features, &opts(7)).unwrap();
        assert_eq!(fig.lanes.len(), 15);
        assert_eq!(fig.lanes[10].color, PALETTE[0]);
        assert_eq!(fig.lanes[14].color, PALETTE[4]);
    }

    #[test]
    fn log_scale_only_affects_axis_mapping() {
        let table = table_abc();
        let features = vec!["a".to_string()];
        let linear = RaincloudFigure::build(&table, &features, &opts(7)).unwrap();
        let log = RaincloudFigure::build(
            &table,
            &features,
            &RaincloudOptions {
                x_log_scale: true,
                ..opts(7)
            },
        )
        .unwrap();

        // Geometry is laid out in data space either way.
        assert_eq!(linear.lanes[0].violin, log.lanes[0].violin);
        assert_eq!(linear.lanes[0].scatter, log.lanes[0].scatter);

        assert_eq!(linear.map_x(100.0), 100.0);
        assert_eq!(log.map_x(100.0), 2.0);
        assert!(log.map_x(-1.0).is_nan());
    }

    #[test]
    fn missing_column_is_an_error() {
        let table = table_abc();
        let err = RaincloudFigure::build(&table, &["zzz".to_string()], &opts(7)).unwrap_err();
        assert!(format!("{err:#}").contains("zzz"));
    }

    #[test]
    fn constant_column_is_an_error() {
        let table = Table::from_columns(vec![(
            "flat".into(),
            Column::Numeric(vec![2.0; 10]),
        )])
        .unwrap();
        let err = RaincloudFigure::build(&table, &["flat".to_string()], &opts(7)).unwrap_err();
        assert!(format!("{err:#}").contains("density estimate"));
    }
}
