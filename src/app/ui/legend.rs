use eframe::egui::{RichText, Sense, Ui, vec2};

use super::super::ViewModel;
use super::super::render_utils::category_color;

impl ViewModel {
    pub(in crate::app) fn draw_legend(&self, ui: &mut Ui) {
        ui.heading("Categories");
        ui.add_space(6.0);

        for (index, category) in self.categories.iter().enumerate() {
            let count = self
                .category_index
                .iter()
                .filter(|&&airport_category| airport_category == index)
                .count();
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 6.0, category_color(index));
                ui.label(category.as_str());
                ui.label(RichText::new(count.to_string()).weak());
            });
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label(RichText::new("Drag an airport to pin it. Scroll to zoom, right-drag to pan.").small());
    }
}
