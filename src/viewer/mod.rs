//! Dispersion viewer - eframe window around the scene and renderer

mod app;
mod camera;
mod panel;
mod settings;
mod viewport;

pub use camera::OrbitCamera;
pub use settings::Settings;

use std::path::PathBuf;
use anyhow::Result;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Run the viewer on `model`, showing the mesh named `mesh_name`.
/// `log_level` is the filter used when `RUST_LOG` is unset.
pub fn run(model: PathBuf, mesh_name: String, log_level: &str) -> Result<()> {
    let trace_guard = init_tracing(log_level);

    // Friendly panic handler for GPU errors
    std::panic::set_hook(Box::new(|info| {
        let msg = info.payload()
            .downcast_ref::<String>()
            .map(|s| s.as_str())
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("Unknown error");

        if msg.contains("wgpu") || msg.contains("Buffer") || msg.contains("shader") {
            eprintln!("\n[GPU Error] {}", msg);
            eprintln!("\nThe adapter rejected a render resource. Try another backend via WGPU_BACKEND.");
        } else {
            eprintln!("\n[Error] {}", msg);
            if let Some(loc) = info.location() {
                eprintln!("  at {}:{}:{}", loc.file(), loc.line(), loc.column());
            }
        }
    }));

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: {
            let mut vp = egui::ViewportBuilder::default()
                .with_inner_size([settings.window_width, settings.window_height])
                .with_title("Dispersion");
            if let (Some(x), Some(y)) = (settings.window_x, settings.window_y) {
                vp = vp.with_position([x, y]);
            }
            vp
        },
        renderer: eframe::Renderer::Wgpu,
        wgpu_options: egui_wgpu::WgpuConfiguration {
            wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
                device_descriptor: std::sync::Arc::new(|adapter| {
                    let base_limits = if adapter.get_info().backend == wgpu::Backend::Gl {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    };
                    wgpu::DeviceDescriptor {
                        label: Some("dispersion device"),
                        required_limits: wgpu::Limits {
                            max_texture_dimension_2d: 8192,
                            ..base_limits
                        },
                        ..Default::default()
                    }
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "Dispersion",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::DispersionApp::new(
                cc,
                settings,
                model.clone(),
                mesh_name.clone(),
                trace_guard,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run: {}", e))
}

/// Console logging filtered by `RUST_LOG`, else `default_level`. With
/// `DISPERSION_TRACE=1` spans also go to `trace.json` in Chrome format.
fn init_tracing(default_level: &str) -> Option<tracing_chrome::FlushGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    if std::env::var("DISPERSION_TRACE").ok().as_deref() != Some("1") {
        // try_init also routes `log` records (wgpu, winit) into tracing
        let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
        return None;
    }

    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
        .file("trace.json")
        .build();

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(chrome_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    Some(guard)
}
