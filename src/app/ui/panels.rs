use eframe::egui::{self, Align, Context, Layout, ScrollArea, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::flavor::{FlavorGraph, Ingredient, Region};

use super::super::ViewModel;
use super::super::map::{FlavorMapLayout, MapEvent, MapProps};
use super::super::render_utils::cluster_color;

fn region_members(region: &Region) -> &[String] {
    &region.members
}

fn encode_node_color(ingredient: &Ingredient) -> egui::Color32 {
    cluster_color(&ingredient.cluster_id)
}

impl ViewModel {
    pub(in crate::app) fn new(graph: FlavorGraph) -> Self {
        Self {
            graph,
            selected: None,
            hovered: None,
            search: String::new(),
            map: FlavorMapLayout::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("flavor map");
                    ui.separator();
                    ui.label(format!("data: {data_path}"));
                    ui.label(format!("ingredients: {}", self.graph.ingredient_count()));
                    ui.label(format!("pairings: {}", self.graph.pairing_count()));
                    ui.label(format!("regions: {}", self.graph.region_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.checkbox(&mut self.map.show_region_overlay, "Region outlines");
                    });
                });
            });

        egui::SidePanel::left("ingredients")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_side_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading flavor map...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_map(ui);
            }
        });
    }

    fn draw_map(&mut self, ui: &mut Ui) {
        let props = MapProps {
            nodes: &self.graph.ingredients,
            links: &self.graph.pairings,
            regions: &self.graph.regions,
            region_links: &self.graph.region_links,
            members_of: region_members,
            encode_node_color: &encode_node_color,
            selected_node: self.selected.as_deref(),
            hovered_node: self.hovered.as_deref(),
        };
        let events = self.map.show(ui, &props);

        for event in events {
            match event {
                MapEvent::NodeHoverEnter(id) => self.hovered = Some(id),
                MapEvent::NodeHoverExit(_) => self.hovered = None,
                MapEvent::NodeClicked(id) => self.set_selected(Some(id)),
                MapEvent::BackgroundClicked => self.set_selected(None),
            }
        }
    }

    fn draw_side_panel(&mut self, ui: &mut Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.search);
        });
        ui.separator();

        let mut pending_selection = None;

        ScrollArea::vertical()
            .id_salt("ingredient_list")
            .max_height(ui.available_height() * 0.5)
            .show(ui, |ui| {
                let matcher = SkimMatcherV2::default();
                let query = self.search.trim();

                let mut rows = self
                    .graph
                    .ingredients
                    .iter()
                    .filter_map(|ingredient| {
                        if query.is_empty() {
                            Some((0, ingredient))
                        } else {
                            matcher
                                .fuzzy_match(&ingredient.name, query)
                                .map(|score| (score, ingredient))
                        }
                    })
                    .collect::<Vec<_>>();
                rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));

                for (_score, ingredient) in rows {
                    let is_selected = self.selected.as_deref() == Some(ingredient.id.as_str());
                    if ui.selectable_label(is_selected, &ingredient.name).clicked() {
                        pending_selection =
                            Some(if is_selected { None } else { Some(ingredient.id.clone()) });
                    }
                }
            });

        if let Some(selection) = pending_selection {
            self.set_selected(selection);
        }

        ui.separator();
        self.draw_selected_details(ui);
    }

    fn draw_selected_details(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click an ingredient to see its pairings.");
            return;
        };
        let Some(ingredient) = self.graph.ingredient(&selected_id) else {
            return;
        };

        ui.heading(&ingredient.name);
        ui.label(format!("cluster: {}", ingredient.cluster_id));

        let region_names = self
            .graph
            .regions_of(&selected_id)
            .map(|region| region.name.clone())
            .collect::<Vec<_>>();
        if !region_names.is_empty() {
            ui.label(format!("regions: {}", region_names.join(", ")));
        }

        let paired = self
            .graph
            .paired_with(&selected_id)
            .filter_map(|id| self.graph.ingredient(id))
            .map(|paired| (paired.id.clone(), paired.name.clone()))
            .collect::<Vec<_>>();

        ui.add_space(4.0);
        ui.label(format!("pairs with {}:", paired.len()));

        let mut jump_to = None;
        ScrollArea::vertical()
            .id_salt("pairing_list")
            .show(ui, |ui| {
                for (id, name) in paired {
                    if ui.link(name).clicked() {
                        jump_to = Some(id);
                    }
                }
            });

        if let Some(id) = jump_to {
            self.set_selected(Some(id));
        }
    }

    /// Selection changes re-seed the map on its next frame, which re-heats
    /// both simulations without resetting positions.
    fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;
        self.map.mark_dirty();
    }
}
