use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub cluster_id: String,
}

/// An undirected pairing between two ingredients.
#[derive(Clone, Debug)]
pub struct Pairing {
    pub source: String,
    pub target: String,
}

/// A cuisine region grouping a set of member ingredients. Regions have no
/// stored radius; it is derived from the member count at draw time.
#[derive(Clone, Debug)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct RegionLink {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default)]
pub struct FlavorGraph {
    pub ingredients: Vec<Ingredient>,
    pub pairings: Vec<Pairing>,
    pub regions: Vec<Region>,
    pub region_links: Vec<RegionLink>,
    index_by_id: HashMap<String, usize>,
}

impl FlavorGraph {
    pub fn new(
        ingredients: Vec<Ingredient>,
        pairings: Vec<Pairing>,
        regions: Vec<Region>,
        region_links: Vec<RegionLink>,
    ) -> Self {
        let index_by_id = ingredients
            .iter()
            .enumerate()
            .map(|(index, ingredient)| (ingredient.id.clone(), index))
            .collect();

        Self {
            ingredients,
            pairings,
            regions,
            region_links,
            index_by_id,
        }
    }

    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.ingredients.get(index))
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn pairing_count(&self) -> usize {
        self.pairings.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions whose member list contains `id`, in declaration order.
    pub fn regions_of(&self, id: &str) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(move |region| region.members.iter().any(|member| member == id))
    }

    /// Ids paired with `id` through any pairing, in declaration order.
    pub fn paired_with<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairings.iter().filter_map(move |pairing| {
            if pairing.source == id {
                Some(pairing.target.as_str())
            } else if pairing.target == id {
                Some(pairing.source.as_str())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> FlavorGraph {
        FlavorGraph::new(
            vec![
                Ingredient {
                    id: "apple".into(),
                    name: "Apple".into(),
                    cluster_id: "fruity".into(),
                },
                Ingredient {
                    id: "sage".into(),
                    name: "Sage".into(),
                    cluster_id: "herbal".into(),
                },
            ],
            vec![Pairing {
                source: "apple".into(),
                target: "sage".into(),
            }],
            vec![Region {
                id: "mediterranean".into(),
                name: "Mediterranean".into(),
                members: vec!["sage".into()],
            }],
            Vec::new(),
        )
    }

    #[test]
    fn lookup_by_id() {
        let graph = graph();
        assert_eq!(graph.ingredient("sage").map(|i| i.name.as_str()), Some("Sage"));
        assert!(graph.ingredient("missing").is_none());
    }

    #[test]
    fn paired_with_is_symmetric() {
        let graph = graph();
        assert_eq!(graph.paired_with("apple").collect::<Vec<_>>(), ["sage"]);
        assert_eq!(graph.paired_with("sage").collect::<Vec<_>>(), ["apple"]);
    }

    #[test]
    fn regions_of_member() {
        let graph = graph();
        assert_eq!(graph.regions_of("sage").count(), 1);
        assert_eq!(graph.regions_of("apple").count(), 0);
    }
}
