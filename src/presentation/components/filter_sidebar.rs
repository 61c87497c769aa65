use crate::domain::entities::{FacetCatalog, FilterState, OrganicFilter, PriceRange};
use eframe::egui;
use std::collections::BTreeSet;

pub enum SidebarAction {
    Apply(FilterState),
    ClearAll,
}

/// Filter controls for the product listing.
///
/// Works on a copy of the store's state each frame and reports it when any
/// control changed it. The search box keeps its own draft and commits on
/// Enter or when it loses focus.
pub struct FilterSidebar {
    search_draft: String,
    committed_search: Option<String>,
    rejected_search: Option<String>,
}

impl FilterSidebar {
    pub fn new() -> Self {
        Self {
            search_draft: String::new(),
            committed_search: None,
            rejected_search: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        facets: &FacetCatalog,
        current: &FilterState,
    ) -> Vec<SidebarAction> {
        let mut actions = Vec::new();
        let mut draft = current.clone();

        if self.committed_search.as_deref() != current.search_term() {
            self.committed_search = current.search_term().map(str::to_string);
            self.search_draft = self.committed_search.clone().unwrap_or_default();
            self.rejected_search = None;
        }

        ui.horizontal(|ui| {
            ui.heading("Filters");
            let active = current.active_filter_count();
            if ui
                .add_enabled(active > 0, egui::Button::new(format!("Clear all ({})", active)))
                .clicked()
            {
                actions.push(SidebarAction::ClearAll);
            }
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Search:");
            let response = ui.text_edit_singleline(&mut self.search_draft);
            if response.lost_focus() {
                self.rejected_search = (!draft.set_search_term(&self.search_draft))
                    .then(|| self.search_draft.trim().to_string());
            }
        });
        if let Some(term) = &self.rejected_search {
            ui.small(format!("{:?} cannot be searched for", term));
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            Self::price_section(ui, &mut draft);
            Self::checklist(ui, "Categories", &facets.categories, draft.categories().clone(), |v| {
                draft.toggle_category(v)
            });
            Self::checklist(ui, "Brands", &facets.brands, draft.brands().clone(), |v| {
                draft.toggle_brand(v)
            });
            Self::checklist(ui, "Discounts", &facets.discounts, draft.discounts().clone(), |v| {
                draft.toggle_discount(v)
            });
            Self::attribute_section(ui, facets, &mut draft);
            Self::rating_section(ui, facets.max_rating, &mut draft);
            Self::availability_section(ui, &mut draft);
        });

        if draft != *current {
            actions.push(SidebarAction::Apply(draft));
        }
        actions
    }

    fn price_section(ui: &mut egui::Ui, draft: &mut FilterState) {
        egui::CollapsingHeader::new("Price")
            .default_open(true)
            .show(ui, |ui| {
                let range = draft.price_range();
                let (mut min, mut max) = (range.min(), range.max());
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut min).range(0..=max).prefix("$"));
                    ui.label("to");
                    ui.add(egui::DragValue::new(&mut max).range(min..=u64::MAX).prefix("$"));
                });
                if (min, max) != (range.min(), range.max()) {
                    draft.set_price_range(PriceRange::new(min, max));
                }
            });
    }

    fn checklist(
        ui: &mut egui::Ui,
        title: &str,
        options: &[String],
        selected: BTreeSet<String>,
        mut toggle: impl FnMut(&str),
    ) {
        egui::CollapsingHeader::new(title)
            .default_open(true)
            .show(ui, |ui| {
                // Selections arriving from a link may name values this catalog does not list.
                let extra = selected.iter().filter(|value| !options.contains(*value));
                for option in options.iter().chain(extra) {
                    let mut checked = selected.contains(option);
                    if ui.checkbox(&mut checked, option.as_str()).changed() {
                        toggle(option.as_str());
                    }
                }
            });
    }

    fn attribute_section(ui: &mut egui::Ui, facets: &FacetCatalog, draft: &mut FilterState) {
        egui::CollapsingHeader::new("Attributes")
            .default_open(false)
            .show(ui, |ui| {
                for (name, values) in &facets.attributes {
                    ui.label(name.as_str());
                    ui.horizontal_wrapped(|ui| {
                        for value in values {
                            let mut checked = draft.attributes().contains(name, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                draft.attributes_mut().toggle(name, value);
                            }
                        }
                    });
                }
            });
    }

    fn rating_section(ui: &mut egui::Ui, max_rating: u32, draft: &mut FilterState) {
        let mut rating = draft.rating();
        egui::ComboBox::from_label("Minimum rating")
            .selected_text(match rating {
                Some(stars) => format!("{}★ & up", stars),
                None => "Any".to_string(),
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut rating, None, "Any");
                for stars in 1..=max_rating {
                    ui.selectable_value(&mut rating, Some(stars), format!("{}★ & up", stars));
                }
            });
        if rating != draft.rating() {
            draft.set_rating(rating);
        }
    }

    fn availability_section(ui: &mut egui::Ui, draft: &mut FilterState) {
        ui.separator();

        let mut in_stock = draft.in_stock();
        if ui.checkbox(&mut in_stock, "In stock only").changed() {
            draft.set_in_stock(in_stock);
        }
        let mut bestseller = draft.is_bestseller();
        if ui.checkbox(&mut bestseller, "Bestsellers").changed() {
            draft.set_bestseller(bestseller);
        }
        let mut featured = draft.is_featured();
        if ui.checkbox(&mut featured, "Featured").changed() {
            draft.set_featured(featured);
        }

        let mut organic = draft.organic();
        ui.horizontal(|ui| {
            ui.label("Organic:");
            for option in [
                OrganicFilter::Unset,
                OrganicFilter::OrganicOnly,
                OrganicFilter::NonOrganicOnly,
            ] {
                ui.radio_value(&mut organic, option, option.to_string());
            }
        });
        if organic != draft.organic() {
            draft.set_organic(organic);
        }
    }
}

impl Default for FilterSidebar {
    fn default() -> Self {
        Self::new()
    }
}
