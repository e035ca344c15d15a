use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::warn;

use crate::flavor::{FlavorGraph, load_flavor_map};

mod map;
mod render_utils;
mod sim;
mod ui;

use map::FlavorMapLayout;

pub struct FlavorMapApp {
    data_path: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<FlavorGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<FlavorGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: FlavorGraph,
    selected: Option<String>,
    hovered: Option<String>,
    search: String,
    map: FlavorMapLayout,
}

impl FlavorMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: String) -> Receiver<Result<FlavorGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_flavor_map(&data_path).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                warn!(%error, "flavor map load failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for FlavorMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading flavor map...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load flavor map");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
