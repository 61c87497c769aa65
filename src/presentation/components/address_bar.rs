use eframe::egui;

pub enum AddressAction {
    Back,
    Forward,
    Navigate(String),
    CopyShareLink,
}

/// Back/forward buttons and an editable location field.
pub struct AddressBar {
    draft: String,
}

impl AddressBar {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        location: &str,
        can_go_back: bool,
        can_go_forward: bool,
    ) -> Vec<AddressAction> {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            if ui.add_enabled(can_go_back, egui::Button::new("◀")).clicked() {
                actions.push(AddressAction::Back);
            }
            if ui
                .add_enabled(can_go_forward, egui::Button::new("▶"))
                .clicked()
            {
                actions.push(AddressAction::Forward);
            }

            let field_id = ui.make_persistent_id("address_field");
            let editing = ui.memory(|memory| memory.has_focus(field_id));
            if !editing {
                self.draft = location.to_string();
            }

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.draft)
                    .id(field_id)
                    .desired_width(ui.available_width() - 160.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                actions.push(AddressAction::Navigate(self.draft.trim().to_string()));
            }
            if ui.button("Go").clicked() {
                actions.push(AddressAction::Navigate(self.draft.trim().to_string()));
            }
            if ui.button("Copy link").clicked() {
                actions.push(AddressAction::CopyShareLink);
            }
        });

        actions
    }
}

impl Default for AddressBar {
    fn default() -> Self {
        Self::new()
    }
}
