//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    FetchHandle, HttpUserListProvider, MissingUserListProvider, ProviderConfig, UserListProvider,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, config: ProviderConfig) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let provider = build_provider(&config, &ui_tx);
        runtime.block_on(serve_commands(cmd_rx, ui_tx, provider));
        tracing::info!("backend worker stopped");
    });
}

fn build_provider(config: &ProviderConfig, ui_tx: &Sender<UiEvent>) -> Arc<dyn UserListProvider> {
    match HttpUserListProvider::new(config) {
        Ok(provider) => {
            tracing::info!(endpoint = %provider.endpoint(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
            Arc::new(provider)
        }
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                err.to_string(),
            )));
            tracing::error!(error = %err, "user list provider unavailable");
            Arc::new(MissingUserListProvider)
        }
    }
}

/// Runs until the UI side drops its command sender.
pub(crate) async fn serve_commands(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    provider: Arc<dyn UserListProvider>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::FetchUsers => {
                let result = FetchHandle::spawn(Arc::clone(&provider)).join().await;
                if ui_tx.send(UiEvent::UsersFetched(result)).is_err() {
                    break;
                }
            }
        }
    }
}
