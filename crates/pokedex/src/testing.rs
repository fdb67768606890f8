//! In-memory [`CatalogSource`] used by the shell tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use pokedex_core::evolution::{ChainLink, EvolutionChainResponse};
use pokedex_core::pokemon::{
    NamedResource, Pokemon, PokemonListResponse, SpeciesResponse, Sprites, TypeMember,
    TypeMembersResponse, TypeSlot,
};

use crate::api::CatalogSource;
use crate::prelude::*;

/// Serve `router` on an ephemeral localhost port and return its base URL
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// HTTP client that never goes through a proxy, for talking to [`serve`]
pub fn local_http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn named(name: &str, url: &str) -> NamedResource {
    NamedResource {
        name: name.to_string(),
        url: url.to_string(),
    }
}

/// Every fifth pokemon is water, the rest are fire
pub fn fake_pokemon(id: u32) -> Pokemon {
    let kind = if id % 5 == 0 { "water" } else { "fire" };
    Pokemon {
        id,
        name: format!("mon{id}"),
        height: 10,
        weight: 100,
        sprites: Sprites {
            front_default: Some(format!("https://img.test/{id}.png")),
            ..Sprites::default()
        },
        types: vec![TypeSlot {
            slot: 1,
            kind: named(kind, &format!("https://pokeapi.co/api/v2/type/{kind}/")),
        }],
        stats: vec![],
        species: Some(named(
            &format!("mon{id}"),
            &format!("https://pokeapi.co/api/v2/pokemon-species/{id}/"),
        )),
    }
}

#[derive(Default)]
pub struct FakeSource {
    pokemon: Vec<Pokemon>,
    chains: HashMap<String, EvolutionChainResponse>,
    species: HashMap<u32, String>,
    fail_lists: AtomicUsize,
    detail_status: AtomicU16,
    list_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_pokemon(count: u32) -> Self {
        Self {
            pokemon: (1..=count).map(fake_pokemon).collect(),
            ..Self::default()
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.pokemon.retain(|p| p.name != name);
    }

    /// Make the next `times` list requests fail with HTTP 503
    pub fn fail_next_lists(&self, times: usize) {
        self.fail_lists.store(times, Ordering::SeqCst);
    }

    /// Make every detail request fail with `status`
    pub fn fail_details_with(&self, status: u16) {
        self.detail_status.store(status, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Register a chain document and point every species in it at it
    pub fn add_chain(&mut self, url: &str, chain: ChainLink) {
        for species in pokedex_core::evolution::flatten_chain(&chain) {
            if let Some(p) = self.pokemon.iter().find(|p| p.name == species.name) {
                self.species.insert(p.id, url.to_string());
            }
        }
        self.chains
            .insert(url.to_string(), EvolutionChainResponse { id: 1, chain });
    }
}

pub fn link(name: &str, evolves_to: Vec<ChainLink>) -> ChainLink {
    ChainLink {
        species: named(
            name,
            &format!("https://pokeapi.co/api/v2/pokemon-species/{name}/"),
        ),
        evolves_to,
    }
}

impl CatalogSource for FakeSource {
    async fn list_pokemon(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<PokemonListResponse, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Gives concurrent callers a chance to run while this request is in flight
        tokio::task::yield_now().await;

        let failing = self.fail_lists.load(Ordering::SeqCst);
        if failing > 0 {
            self.fail_lists.store(failing - 1, Ordering::SeqCst);
            return Err(Error::Remote {
                status: 503,
                url: "fake://pokemon".to_string(),
            });
        }

        let results: Vec<NamedResource> = self
            .pokemon
            .iter()
            .skip(offset)
            .take(limit)
            .map(|p| named(&p.name, &format!("https://pokeapi.co/api/v2/pokemon/{}/", p.id)))
            .collect();
        let next = (offset + limit < self.pokemon.len()).then(|| "fake://next".to_string());

        Ok(PokemonListResponse {
            count: self.pokemon.len() as u32,
            next,
            previous: None,
            results,
        })
    }

    async fn get_pokemon(&self, name_or_id: &str) -> Result<Pokemon, Error> {
        let status = self.detail_status.load(Ordering::SeqCst);
        if status != 0 {
            return Err(Error::Remote {
                status,
                url: format!("fake://pokemon/{name_or_id}"),
            });
        }

        self.pokemon
            .iter()
            .find(|p| p.name == name_or_id || p.id.to_string() == name_or_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("fake://pokemon/{name_or_id}")))
    }

    async fn get_types(&self) -> Result<Vec<NamedResource>, Error> {
        Ok(vec![
            named("fire", "https://pokeapi.co/api/v2/type/fire/"),
            named("water", "https://pokeapi.co/api/v2/type/water/"),
        ])
    }

    async fn get_type_members(&self, name: &str) -> Result<TypeMembersResponse, Error> {
        let pokemon = self
            .pokemon
            .iter()
            .filter(|p| p.type_names().iter().any(|t| t == name))
            .map(|p| TypeMember {
                pokemon: named(&p.name, &format!("https://pokeapi.co/api/v2/pokemon/{}/", p.id)),
            })
            .collect();
        Ok(TypeMembersResponse { pokemon })
    }

    async fn get_species(&self, id: u32) -> Result<SpeciesResponse, Error> {
        Ok(SpeciesResponse {
            evolution_chain: self
                .species
                .get(&id)
                .map(|url| pokedex_core::pokemon::ChainReference { url: url.clone() }),
        })
    }

    async fn get_evolution_chain(
        &self,
        reference: &str,
    ) -> Result<EvolutionChainResponse, Error> {
        self.chains
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::NotFound(reference.to_string()))
    }
}
