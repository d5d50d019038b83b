// main.rs
/// Pico Timer: countdown control panel for a remote WebSocket timer device
use eframe::egui;

mod app;
mod config;
mod controller;
mod network;
mod timer;
mod types;

use app::TimerApp;
use config::Config;

fn main() -> Result<(), eframe::Error> {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level()))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 560.0])
            .with_title("Pico Timer")
            .with_resizable(false)
            .with_min_inner_size([420.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pico Timer",
        options,
        Box::new(move |cc| Ok(Box::new(TimerApp::new(cc, &config)))),
    )
}
