mod app;
mod color;
mod data;
mod figure;
mod state;
mod stats;
mod ui;

use app::RaincloudApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Raincloud – Distribution Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RaincloudApp::default()))),
    )
}
