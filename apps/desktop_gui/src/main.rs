mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{StartupConfig, UserListApp};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let startup = StartupConfig::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, startup.provider_config());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Users")
            .with_inner_size([420.0, 560.0])
            .with_min_inner_size([280.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        "User List",
        options,
        Box::new(|_cc| Ok(Box::new(UserListApp::new(cmd_tx, ui_rx)))),
    )
}
