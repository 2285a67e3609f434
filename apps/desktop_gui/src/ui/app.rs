use std::time::Duration;

use clap::Parser;
use client_core::{ProviderConfig, UserListView};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
};

#[derive(Parser, Debug, Clone)]
#[command(about = "Desktop user list")]
pub struct StartupConfig {
    #[arg(long, env = "USERLIST_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    pub server_url: String,
    #[arg(long, env = "USERLIST_USERS_PATH", default_value = "/users")]
    pub users_path: String,
    #[arg(long, env = "USERLIST_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl StartupConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            server_url: self.server_url.clone(),
            users_path: self.users_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

pub struct UserListApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: UserListView,
    status: String,
    last_error: Option<UiError>,
}

impl UserListApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: UserListView::new(),
            status: "Starting".to_string(),
            last_error: None,
        }
    }

    /// Queues the one fetch this window ever makes, on its first frame.
    fn ensure_appeared(&mut self) {
        if self.view.begin_appear() {
            self.status = "Loading users".to_string();
            dispatch_backend_command(&self.cmd_tx, BackendCommand::FetchUsers, &mut self.status);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    if self.last_error.is_none() && !self.view.has_appeared() {
                        self.status = message;
                    }
                }
                UiEvent::Error(err) => {
                    tracing::warn!(message = err.message(), "backend reported error");
                    self.status = err.status_line();
                    self.last_error = Some(err);
                }
                UiEvent::UsersFetched(result) => match self.view.apply_fetch(result) {
                    Ok(count) => {
                        self.status = match count {
                            0 => "No users".to_string(),
                            1 => "1 user".to_string(),
                            n => format!("{n} users"),
                        };
                        self.last_error = None;
                    }
                    Err(err) => {
                        let err = UiError::from_message(UiErrorContext::FetchUsers, err.message());
                        self.status = err.status_line();
                        self.last_error = Some(err);
                    }
                },
            }
        }
    }
}

impl eframe::App for UserListApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_appeared();
        self.process_ui_events();

        egui::TopBottomPanel::top("user_list_header")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Users");
                    ui.separator();
                    if self.last_error.is_some() {
                        ui.colored_label(egui::Color32::LIGHT_RED, self.status.as_str());
                    } else {
                        ui.label(self.status.as_str());
                    }
                });
            });

        let rows = self.view.render();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("user_list_rows")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for row in &rows {
                        ui.push_id(row.key.0, |ui| {
                            ui.label(row.text.as_str());
                        });
                    }
                });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
