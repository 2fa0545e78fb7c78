//! Parameter panel built from the control table

use egui::Ui;

use crate::params::{DispersionParams, ParamSpec};

/// Draw every control. Returns true when any value changed this frame.
pub fn show(ui: &mut Ui, params: &mut DispersionParams) -> bool {
    let mut changed = false;

    ui.heading("Material");
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("light");
        for value in [&mut params.light.x, &mut params.light.y, &mut params.light.z] {
            changed |= ui.add(egui::DragValue::new(value).speed(0.05)).changed();
        }
    });

    let mut folder: Option<&str> = None;
    let specs = DispersionParams::specs();
    let mut i = 0;
    while i < specs.len() {
        let spec = &specs[i];
        match spec.folder {
            Some(name) if folder != Some(name) => {
                // Consecutive specs sharing a folder go under one header
                let end = specs[i..]
                    .iter()
                    .position(|s| s.folder != Some(name))
                    .map_or(specs.len(), |n| i + n);
                egui::CollapsingHeader::new(name)
                    .default_open(true)
                    .show(ui, |ui| {
                        for spec in &specs[i..end] {
                            changed |= control(ui, params, spec);
                        }
                    });
                folder = Some(name);
                i = end;
            }
            _ => {
                changed |= control(ui, params, spec);
                i += 1;
            }
        }
    }

    ui.add_space(8.0);
    if ui.button("Reset").clicked() {
        params.reset();
        changed = true;
    }

    changed
}

fn control(ui: &mut Ui, params: &mut DispersionParams, spec: &ParamSpec) -> bool {
    let Some(value) = params.slot_mut(spec.name) else {
        return false;
    };
    let response = match &spec.range {
        Some(range) => {
            let mut slider = egui::Slider::new(value, range.clone()).text(spec.name);
            if let Some(step) = spec.step {
                slider = slider.step_by(step as f64);
            }
            ui.add(slider)
        }
        None => {
            ui.horizontal(|ui| {
                ui.label(spec.name);
                ui.add(egui::DragValue::new(value).speed(0.1))
            })
            .inner
        }
    };
    response.changed()
}
