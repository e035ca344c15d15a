mod graph;
mod parse;

pub use graph::{FlavorGraph, Ingredient, Pairing, Region, RegionLink};
pub use parse::load_flavor_map;
