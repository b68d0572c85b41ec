mod app;
mod config;
mod data;
mod render;
mod state;
mod ui;

use app::StatboardApp;
use config::DashboardConfig;
use eframe::egui;
use eframe::egui_wgpu;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = DashboardConfig::from_environment();
    tracing::info!("Using source {}", config.source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Statboard")
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
                instance_descriptor: eframe::wgpu::InstanceDescriptor {
                    backends: eframe::wgpu::Backends::PRIMARY | eframe::wgpu::Backends::GL,
                    ..Default::default()
                },
                power_preference: eframe::wgpu::PowerPreference::LowPower,
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "Statboard",
        options,
        Box::new(|cc| {
            let tables = config.table_set()?;
            Ok(Box::new(StatboardApp::new(cc, config, tables)?))
        }),
    )
}
