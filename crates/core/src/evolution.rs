//! Evolution chain documents and their flattening into an ordered list of stages

use serde::{Deserialize, Serialize};

use crate::pokemon::{NamedResource, Pokemon};

/// Response of `/evolution-chain/{id}`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvolutionChainResponse {
    #[serde(default)]
    pub id: u32,
    pub chain: ChainLink,
}

/// One node of the branching evolution tree
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// Resolved stage of an evolution chain
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvolutionStage {
    pub id: u32,
    pub name: String,
    pub sprite: String,
}

impl From<&Pokemon> for EvolutionStage {
    fn from(pokemon: &Pokemon) -> Self {
        Self {
            id: pokemon.id,
            name: pokemon.name.clone(),
            sprite: pokemon.primary_image(),
        }
    }
}

/// Flatten an evolution tree into its species, depth first in pre-order.
///
/// Siblings keep the order in which the API lists them and each branch is
/// exhausted before the next one starts.
pub fn flatten_chain(root: &ChainLink) -> Vec<NamedResource> {
    let mut species = Vec::new();
    let mut stack = vec![root];

    while let Some(link) = stack.pop() {
        species.push(link.species.clone());
        // Reversed so the first listed branch is popped first
        stack.extend(link.evolves_to.iter().rev());
    }

    species
}
