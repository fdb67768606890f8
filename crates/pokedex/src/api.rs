use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::try_join_all;
use pokedex_core::cache::{normalize_key, CacheStats, ResponseCache};
use pokedex_core::evolution::EvolutionChainResponse;
use pokedex_core::pokemon::{
    NamedResource, Pokemon, PokemonListResponse, SpeciesResponse, TypeListResponse,
    TypeMembersResponse,
};
use pokedex_core::types::selectable_types;
use serde::de::DeserializeOwned;

use crate::prelude::*;

pub const POKEAPI_BASE: &str = "https://pokeapi.co/api/v2";

/// Members fetched for a type listing
pub const TYPE_MEMBER_LIMIT: usize = 100;

/// Read access to the PokeAPI resources the catalog needs
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn list_pokemon(&self, limit: usize, offset: usize)
        -> Result<PokemonListResponse, Error>;

    async fn get_pokemon(&self, name_or_id: &str) -> Result<Pokemon, Error>;

    /// Selectable types, reserved ones already removed
    async fn get_types(&self) -> Result<Vec<NamedResource>, Error>;

    async fn get_type_members(&self, name: &str) -> Result<TypeMembersResponse, Error>;

    async fn get_species(&self, id: u32) -> Result<SpeciesResponse, Error>;

    /// Fetch an evolution chain by full URL or numeric id
    async fn get_evolution_chain(&self, reference: &str)
        -> Result<EvolutionChainResponse, Error>;
}

/// Fetch one list page and the full record of every entry.
///
/// Details are fetched concurrently and returned in page order. Returns the
/// records and whether the API reported a next page.
pub async fn load_page<S: CatalogSource>(
    source: &S,
    limit: usize,
    offset: usize,
) -> Result<(Vec<Pokemon>, bool), Error> {
    let page = source.list_pokemon(limit, offset).await?;
    let has_more = page.next.is_some();
    let details = try_join_all(page.results.iter().map(|r| source.get_pokemon(&r.name))).await?;
    Ok((details, has_more))
}

/// Full records for the first [`TYPE_MEMBER_LIMIT`] members of a type
pub async fn get_pokemon_by_type<S: CatalogSource>(
    source: &S,
    type_name: &str,
) -> Result<Vec<Pokemon>, Error> {
    let members = source.get_type_members(type_name).await?;
    try_join_all(
        members
            .pokemon
            .iter()
            .take(TYPE_MEMBER_LIMIT)
            .map(|m| source.get_pokemon(&m.pokemon.name)),
    )
    .await
}

/// Look a pokemon up by exact name or id.
///
/// A miss is an empty result rather than an error; any other failure propagates.
pub async fn search_pokemon<S: CatalogSource>(
    source: &S,
    query: &str,
) -> Result<Vec<Pokemon>, Error> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Ok(vec![]);
    }

    match source.get_pokemon(&query).await {
        Ok(pokemon) => Ok(vec![pokemon]),
        Err(Error::NotFound(_)) => Ok(vec![]),
        Err(e) => Err(e),
    }
}

/// PokeAPI client memoizing every successful response
#[derive(Debug, Clone)]
pub struct PokeClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<Mutex<ResponseCache<Arc<serde_json::Value>>>>,
}

impl PokeClient {
    pub fn new(base_url: &str, cache_capacity: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self::with_http(http, base_url, cache_capacity))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, cache_capacity: usize) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(Mutex::new(ResponseCache::new(cache_capacity))),
        }
    }

    pub fn from_global(global: &crate::Global) -> Result<Self> {
        Self::new(&global.base_url, global.cache_capacity)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResponseCache<Arc<serde_json::Value>>> {
        // Entries are only ever replaced whole, so a poisoned lock is still consistent
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(&self, url: &str) -> String {
        normalize_key(&self.base_url, url)
    }

    /// GET `url` as JSON, served from the cache when present
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let key = self.key(url);

        let cached = self.lock_cache().get(&key);
        let value = match cached {
            Some(value) => {
                log::debug!("cache hit: {}", key);
                value
            }
            None => {
                log::debug!("cache miss: {}", key);
                let value = Arc::new(self.fetch_value(url).await?);
                self.lock_cache().insert(key, value.clone());
                value
            }
        };

        T::deserialize(&*value).map_err(|e| Error::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_value(&self, url: &str) -> Result<serde_json::Value, Error> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json().await.map_err(|e| Error::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Point the by-id and by-name keys of a fetched pokemon at one entry
    fn register_aliases(&self, requested_url: &str, pokemon: &Pokemon) {
        let requested = self.key(requested_url);
        let canonical = format!("pokemon/{}", pokemon.id);
        let by_name = format!("pokemon/{}", pokemon.name.to_lowercase());

        let mut cache = self.lock_cache();
        if requested != canonical {
            let Some(value) = cache.get(&requested) else {
                return;
            };
            cache.insert(canonical.clone(), value);
            cache.alias(requested, &canonical);
        }
        cache.alias(by_name, &canonical);
    }
}

impl CatalogSource for PokeClient {
    async fn list_pokemon(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<PokemonListResponse, Error> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn get_pokemon(&self, name_or_id: &str) -> Result<Pokemon, Error> {
        let url = format!(
            "{}/pokemon/{}",
            self.base_url,
            urlencoding::encode(&name_or_id.trim().to_lowercase())
        );
        let pokemon: Pokemon = self.fetch_json(&url).await?;
        self.register_aliases(&url, &pokemon);
        Ok(pokemon)
    }

    async fn get_types(&self) -> Result<Vec<NamedResource>, Error> {
        let url = format!("{}/type?limit=100", self.base_url);
        let response: TypeListResponse = self.fetch_json(&url).await?;
        Ok(selectable_types(response.results))
    }

    async fn get_type_members(&self, name: &str) -> Result<TypeMembersResponse, Error> {
        let url = format!(
            "{}/type/{}",
            self.base_url,
            urlencoding::encode(&name.trim().to_lowercase())
        );
        self.fetch_json(&url).await
    }

    async fn get_species(&self, id: u32) -> Result<SpeciesResponse, Error> {
        let url = format!("{}/pokemon-species/{id}", self.base_url);
        self.fetch_json(&url).await
    }

    async fn get_evolution_chain(
        &self,
        reference: &str,
    ) -> Result<EvolutionChainResponse, Error> {
        let url = if reference.starts_with("http") {
            reference.to_string()
        } else {
            format!("{}/evolution-chain/{}", self.base_url, reference)
        };
        self.fetch_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{local_http, serve, FakeSource};
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Local PokeAPI stand-in counting every request it answers
    async fn pokeapi_server() -> (PokeClient, Arc<AtomicUsize>) {
        async fn pokemon(
            State(requests): State<Arc<AtomicUsize>>,
            Path(name): Path<String>,
        ) -> Response {
            requests.fetch_add(1, Ordering::SeqCst);
            match name.as_str() {
                "pikachu" | "25" => axum::Json(serde_json::json!({
                    "id": 25,
                    "name": "pikachu",
                    "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}]
                }))
                .into_response(),
                "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
                "garbled" => (
                    StatusCode::OK,
                    [("content-type", "application/json")],
                    "{not json",
                )
                    .into_response(),
                _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            }
        }

        let requests = Arc::new(AtomicUsize::new(0));
        let router = axum::Router::new()
            .route("/pokemon/{name}", axum::routing::get(pokemon))
            .with_state(requests.clone());
        let base_url = serve(router).await;

        (PokeClient::with_http(local_http(), &base_url, 8), requests)
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_network_once() {
        let (client, requests) = pokeapi_server().await;

        let first = client.get_pokemon("pikachu").await.unwrap();
        let second = client.get_pokemon("Pikachu").await.unwrap();
        assert_eq!(first.id, 25);
        assert_eq!(second.name, "pikachu");
        assert_eq!(requests.load(Ordering::SeqCst), 1);

        // Same record by id comes from the alias registered for the name
        let by_id = client.get_pokemon("25").await.unwrap();
        assert_eq!(by_id.name, "pikachu");
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert_eq!(client.cache_stats().misses, 1);
    }

    #[tokio::test]
    async fn test_http_failures_map_to_errors() {
        let (client, requests) = pokeapi_server().await;

        let missing = client.get_pokemon("missingno").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let server_error = client.get_pokemon("boom").await;
        assert!(matches!(
            server_error,
            Err(Error::Remote { status: 500, .. })
        ));

        let garbled = client.get_pokemon("garbled").await;
        assert!(matches!(garbled, Err(Error::Parse { .. })));

        // Failures are not memoized
        assert!(client.get_pokemon("boom").await.is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PokeClient::with_http(local_http(), &format!("http://{addr}"), 8);
        let result = client.get_pokemon("pikachu").await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_load_page_keeps_page_order() {
        let source = FakeSource::with_pokemon(5);
        let (items, has_more) = load_page(&source, 3, 0).await.unwrap();
        let ids: Vec<u32> = items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(has_more);

        let (items, has_more) = load_page(&source, 3, 3).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(!has_more);
    }

    #[tokio::test]
    async fn test_load_page_fails_when_a_detail_fails() {
        let mut source = FakeSource::with_pokemon(3);
        source.remove("mon2");
        let result = load_page(&source, 3, 0).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_miss_is_empty() {
        let source = FakeSource::with_pokemon(3);
        assert!(search_pokemon(&source, "missingno").await.unwrap().is_empty());
        assert!(search_pokemon(&source, "   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_trimmed_and_lowercased() {
        let source = FakeSource::with_pokemon(3);
        let found = search_pokemon(&source, "  MON2 ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[tokio::test]
    async fn test_search_propagates_other_errors() {
        let source = FakeSource::with_pokemon(3);
        source.fail_details_with(500);
        let result = search_pokemon(&source, "mon1").await;
        assert!(matches!(result, Err(Error::Remote { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_pokemon_by_type_is_capped() {
        let source = FakeSource::with_pokemon(150);
        let fire = get_pokemon_by_type(&source, "fire").await.unwrap();
        assert_eq!(fire.len(), TYPE_MEMBER_LIMIT);
        assert!(fire.iter().all(|p| p.type_names() == vec!["fire".to_string()]));
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = PokeClient::new("https://pokeapi.co/api/v2/", 8).unwrap();
        assert_eq!(client.base_url(), POKEAPI_BASE);
        assert_eq!(
            client.key("https://pokeapi.co/api/v2/pokemon/25"),
            "pokemon/25"
        );
    }

    #[test]
    fn test_aliases_merge_name_and_id_lookups() {
        let client = PokeClient::new(POKEAPI_BASE, 8).unwrap();
        let pokemon: Pokemon =
            serde_json::from_str(r#"{"id": 25, "name": "pikachu"}"#).unwrap();
        let by_name = format!("{}/pokemon/pikachu", POKEAPI_BASE);

        client.lock_cache().insert(
            client.key(&by_name),
            Arc::new(serde_json::to_value(&pokemon).unwrap()),
        );
        client.register_aliases(&by_name, &pokemon);

        let mut cache = client.lock_cache();
        assert!(cache.contains("pokemon/25"));
        assert!(cache.contains("pokemon/pikachu"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("pokemon/25").is_some());
    }
}
