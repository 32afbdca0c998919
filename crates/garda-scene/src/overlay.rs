//! Status overlay

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use garda_core::lifecycle::Stage;
use garda_core::state::KeyAction;

use crate::types::*;

/// egui overlay showing load state and key bindings.
/// Requires `EguiPlugin` to be added by the application.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, overlay_system);
    }
}

fn stage_color(stage: Stage) -> egui::Color32 {
    match stage {
        Stage::FontLoaded => egui::Color32::from_rgb(50, 200, 50),
        Stage::Degraded => egui::Color32::from_rgb(220, 60, 60),
        Stage::Initializing => egui::Color32::from_rgb(255, 200, 50),
        Stage::Idle | Stage::Unmounted => egui::Color32::GRAY,
    }
}

fn overlay_system(
    mut contexts: EguiContexts,
    lifecycle: Res<SceneLifecycle>,
    status: Res<FontStatus>,
    state: Res<SharedState>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let stage = lifecycle.stage();

    egui::Window::new("Garda")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(stage_color(stage), "●");
                ui.label(stage.to_string());
            });

            match stage {
                Stage::Initializing => {
                    ui.label(egui::RichText::new(format!("Loading {}", status.source)).small());
                }
                Stage::Degraded => {
                    if let Some(error) = &status.error {
                        ui.colored_label(egui::Color32::from_rgb(220, 60, 60), error);
                    }
                }
                Stage::FontLoaded => {
                    if let Some(family) = &status.family {
                        ui.label(egui::RichText::new(family).small().color(egui::Color32::GRAY));
                    }
                    ui.separator();
                    for action in KeyAction::ALL {
                        ui.horizontal(|ui| {
                            ui.monospace(action.key());
                            ui.label(action.description());
                        });
                    }
                    ui.separator();
                    ui.label(format!("Cube: [{:.2}, {:.2}, {:.2}]", state.cube.x, state.cube.y, state.cube.z));
                    ui.label(format!("Camera x: {:.2}", state.camera.x));
                }
                Stage::Idle | Stage::Unmounted => {}
            }
        });
}
