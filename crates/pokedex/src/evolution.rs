use futures::future::join_all;
use pokedex_core::evolution::{flatten_chain, EvolutionStage};
use pokedex_core::pokemon::{id_from_url, NamedResource, Pokemon};

use crate::api::CatalogSource;
use crate::prelude::*;

/// Resolve an evolution chain into its stages, in pre-order.
///
/// The chain document is fetched once; every species is then resolved to a
/// full record. A stage that cannot be resolved is logged and skipped without
/// affecting the stages after it.
pub async fn resolve_evolution_chain<S: CatalogSource>(
    source: &S,
    chain_ref: &str,
) -> Result<Vec<EvolutionStage>, Error> {
    let chain = source.get_evolution_chain(chain_ref).await?;
    let species = flatten_chain(&chain.chain);

    // join_all keeps input order, so stages come back in traversal order
    let resolved = join_all(species.iter().map(|s| resolve_species(source, s))).await;

    Ok(species
        .iter()
        .zip(resolved)
        .filter_map(|(species, result)| match result {
            Ok(pokemon) => Some(EvolutionStage::from(&pokemon)),
            Err(e) => {
                log::warn!("Skipping evolution stage {}: {}", species.name, e);
                None
            }
        })
        .collect())
}

/// Look a species up by name, then by the id in its URL.
///
/// Species whose default form has a different name (e.g. `deoxys`) are only
/// reachable by id.
async fn resolve_species<S: CatalogSource>(
    source: &S,
    species: &NamedResource,
) -> Result<Pokemon, Error> {
    match source.get_pokemon(&species.name).await {
        Err(Error::NotFound(url)) => match id_from_url(&species.url, "pokemon-species") {
            Some(id) => source.get_pokemon(&id.to_string()).await,
            None => Err(Error::NotFound(url)),
        },
        other => other,
    }
}

/// Evolution stages for a species, empty when it has no chain
pub async fn evolution_for_species<S: CatalogSource>(
    source: &S,
    species_id: u32,
) -> Result<Vec<EvolutionStage>, Error> {
    let species = source.get_species(species_id).await?;
    match species.evolution_chain {
        Some(chain) => resolve_evolution_chain(source, &chain.url).await,
        None => Ok(vec![]),
    }
}

/// Fetch a pokemon and the evolution chain it belongs to
pub async fn evolution_for<S: CatalogSource>(
    source: &S,
    name_or_id: &str,
) -> Result<(Pokemon, Vec<EvolutionStage>), Error> {
    let pokemon = source.get_pokemon(name_or_id).await?;
    let stages = evolution_for_species(source, pokemon.species_id()).await?;
    Ok((pokemon, stages))
}
