use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – trace toggles
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per mass group and per plotted species.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Traces");
    ui.separator();

    if state.channels.is_empty() {
        ui.label("No event file loaded.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all_masses();
        }
    });

    let masses = state.mass_keys();
    let species = state.plot.species.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Dark-matter mass");
            for mass in masses {
                let [r, g, b] = state.colors.color_for(mass);
                let text = RichText::new(mass.label()).color(Color32::from_rgb(r, g, b));
                let mut checked = !state.filter.hidden_masses.contains(&mass);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_mass(mass);
                }
            }

            ui.separator();
            ui.strong("Species");
            for s in species {
                let mut checked = !state.filter.hidden_species.contains(&s);
                let label = format!("{} ({})", s.name(), s.symbol());
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_species(s);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.channels.is_empty() {
            let rows: usize = state.channels.iter().map(|c| c.rows).sum();
            let skipped: usize = state.channels.iter().map(|c| c.skipped).sum();
            ui.label(format!(
                "{} channel(s), {} mass groups, {rows} rows ({skipped} skipped)",
                state.channels.len(),
                state.mass_keys().len(),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Open event file")
        .add_filter("Event files", &["txt", "dat"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
