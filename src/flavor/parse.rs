use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use super::{FlavorGraph, Ingredient, Pairing, Region, RegionLink};

#[derive(Debug, Deserialize)]
struct FlavorMapFile {
    ingredients: Vec<IngredientRecord>,
    #[serde(default)]
    pairings: Vec<EndpointsRecord>,
    #[serde(default)]
    regions: Vec<RegionRecord>,
    #[serde(default)]
    region_links: Vec<EndpointsRecord>,
}

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    id: String,
    name: String,
    cluster: String,
}

#[derive(Debug, Deserialize)]
struct EndpointsRecord {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct RegionRecord {
    id: String,
    name: String,
    #[serde(default)]
    members: Vec<String>,
}

pub fn load_flavor_map(path: impl AsRef<Path>) -> anyhow::Result<FlavorGraph> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading flavor map from {}", path.display()))?;
    let file: FlavorMapFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing flavor map JSON in {}", path.display()))?;

    let graph = FlavorGraph::new(
        file.ingredients
            .into_iter()
            .map(|record| Ingredient {
                id: record.id,
                name: record.name,
                cluster_id: record.cluster,
            })
            .collect(),
        file.pairings
            .into_iter()
            .map(|record| Pairing {
                source: record.source,
                target: record.target,
            })
            .collect(),
        file.regions
            .into_iter()
            .map(|record| Region {
                id: record.id,
                name: record.name,
                members: record.members,
            })
            .collect(),
        file.region_links
            .into_iter()
            .map(|record| RegionLink {
                source: record.source,
                target: record.target,
            })
            .collect(),
    );

    info!(
        ingredients = graph.ingredient_count(),
        pairings = graph.pairing_count(),
        regions = graph.region_count(),
        "loaded flavor map"
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let raw = r#"{
            "ingredients": [
                {"id": "basil", "name": "Basil", "cluster": "herbal"},
                {"id": "tomato", "name": "Tomato", "cluster": "fruity"}
            ],
            "pairings": [{"source": "basil", "target": "tomato"}],
            "regions": [
                {"id": "it", "name": "Italian", "members": ["basil", "tomato"]}
            ],
            "region_links": []
        }"#;

        let file: FlavorMapFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.ingredients.len(), 2);
        assert_eq!(file.pairings.len(), 1);
        assert_eq!(file.regions[0].members.len(), 2);
    }

    #[test]
    fn optional_collections_default_to_empty() {
        let raw = r#"{"ingredients": []}"#;
        let file: FlavorMapFile = serde_json::from_str(raw).unwrap();
        assert!(file.pairings.is_empty());
        assert!(file.regions.is_empty());
        assert!(file.region_links.is_empty());
    }
}
