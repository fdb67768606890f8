use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::types::{type_color, type_gradient};

/// Highest value a base stat can reach, used to scale stat bars
pub const MAX_BASE_STAT: u32 = 255;

/// `{name, url}` reference used all over the PokeAPI
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Pokemon record from `/pokemon/{name or id}`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub species: Option<NamedResource>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
    #[serde(default)]
    pub other: OtherSprites,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Artwork,
    #[serde(default)]
    pub home: Artwork,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Artwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StatSlot {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

/// One page of `/pokemon?limit=&offset=`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonListResponse {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// Response of `/type`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeListResponse {
    pub results: Vec<NamedResource>,
}

/// Response of `/type/{name}`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeMembersResponse {
    #[serde(default)]
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}

/// Response of `/pokemon-species/{id}`, reduced to what the viewer needs
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpeciesResponse {
    pub evolution_chain: Option<ChainReference>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChainReference {
    pub url: String,
}

impl Pokemon {
    /// Names of the types in slot order
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.kind.name.clone()).collect()
    }

    /// Official artwork, then home artwork, then the default sprite.
    ///
    /// Returns an empty string when the record carries no image at all.
    pub fn primary_image(&self) -> String {
        let other = &self.sprites.other;
        other
            .official_artwork
            .front_default
            .as_ref()
            .or(other.home.front_default.as_ref())
            .or(self.sprites.front_default.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }

    /// Species id taken from the species reference, falling back to the pokemon id
    pub fn species_id(&self) -> u32 {
        self.species
            .as_ref()
            .and_then(|s| id_from_url(&s.url, "pokemon-species"))
            .unwrap_or(self.id)
    }
}

/// Extract the numeric id that follows `/{resource}/` in a PokeAPI URL
///
/// `id_from_url("https://pokeapi.co/api/v2/pokemon/25/", "pokemon")` returns `Some(25)`.
pub fn id_from_url(url: &str, resource: &str) -> Option<u32> {
    static RESOURCE_ID: OnceLock<Regex> = OnceLock::new();
    let re = RESOURCE_ID.get_or_init(|| Regex::new(r"/([a-z0-9-]+)/(\d+)/?$").unwrap());

    let caps = re.captures(url)?;
    if caps.get(1)?.as_str() != resource {
        return None;
    }
    caps.get(2)?.as_str().parse::<u32>().ok()
}

/// Format an id the way cards show it (`#001`, `#025`, `#1025`)
pub fn display_number(id: u32) -> String {
    format!("#{id:03}")
}

/// Turn a stat name into a label (`special-attack` becomes `special attack`)
///
/// Only the first hyphen is replaced.
pub fn stat_label(name: &str) -> String {
    name.replacen('-', " ", 1)
}

/// Width of a stat bar as a percentage of [`MAX_BASE_STAT`], capped at 100
pub fn stat_percent(base_stat: u32) -> f64 {
    (f64::from(base_stat) / f64::from(MAX_BASE_STAT) * 100.0).min(100.0)
}

/// Entry of a list page with its id recovered from the reference URL
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListEntry {
    pub id: u32,
    pub name: String,
    pub url: String,
}

/// Page of references plus pagination metadata
#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub entries: Vec<ListEntry>,
    pub total: u32,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
    pub next_page_command: Option<String>,
}

/// Card view of a pokemon
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PokemonSummary {
    pub id: u32,
    pub number: String,
    pub name: String,
    pub types: Vec<String>,
    pub image: String,
    pub color: String,
    pub background: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatOutput {
    pub name: String,
    pub label: String,
    pub value: u32,
    pub percent: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SpriteOutput {
    pub label: String,
    pub url: String,
}

/// Detail view of a pokemon
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PokemonDetail {
    #[serde(flatten)]
    pub summary: PokemonSummary,
    pub height_m: f64,
    pub weight_kg: f64,
    pub stats: Vec<StatOutput>,
    pub sprites: Vec<SpriteOutput>,
}

/// Transform a list page into output with ids and a next-page command
pub fn transform_list_page(page: PokemonListResponse, limit: usize, offset: usize) -> ListOutput {
    let entries = page
        .results
        .into_iter()
        .map(|r| ListEntry {
            id: id_from_url(&r.url, "pokemon").unwrap_or(0),
            name: r.name,
            url: r.url,
        })
        .collect();

    let has_more = page.next.is_some();
    let next_page_command = if has_more {
        Some(format!(
            "pokedex list --limit {} --offset {}",
            limit,
            offset + limit
        ))
    } else {
        None
    };

    ListOutput {
        entries,
        total: page.count,
        limit,
        offset,
        has_more,
        next_page_command,
    }
}

pub fn summarize(pokemon: &Pokemon) -> PokemonSummary {
    let types = pokemon.type_names();
    let color = types
        .first()
        .map(|t| type_color(t))
        .unwrap_or_else(|| type_color(""))
        .to_string();

    PokemonSummary {
        id: pokemon.id,
        number: display_number(pokemon.id),
        name: pokemon.name.clone(),
        background: type_gradient(&types),
        types,
        image: pokemon.primary_image(),
        color,
    }
}

pub fn detail(pokemon: &Pokemon) -> PokemonDetail {
    let stats = pokemon
        .stats
        .iter()
        .map(|s| StatOutput {
            name: s.stat.name.clone(),
            label: stat_label(&s.stat.name),
            value: s.base_stat,
            percent: stat_percent(s.base_stat),
        })
        .collect();

    let sprites = [
        ("Front", &pokemon.sprites.front_default),
        ("Back", &pokemon.sprites.back_default),
        ("Shiny Front", &pokemon.sprites.front_shiny),
        ("Shiny Back", &pokemon.sprites.back_shiny),
    ]
    .into_iter()
    .filter_map(|(label, url)| {
        url.as_ref().map(|u| SpriteOutput {
            label: label.to_string(),
            url: u.clone(),
        })
    })
    .collect();

    PokemonDetail {
        summary: summarize(pokemon),
        height_m: pokemon.height_m(),
        weight_kg: pokemon.weight_kg(),
        stats,
        sprites,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::pokemon;
    use super::*;

    const PIKACHU_JSON: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "sprites": {
            "front_default": "https://img.test/25.png",
            "back_default": null,
            "front_shiny": "https://img.test/shiny/25.png",
            "back_shiny": null,
            "other": {
                "official-artwork": { "front_default": "https://img.test/art/25.png" },
                "home": { "front_default": "https://img.test/home/25.png" }
            }
        },
        "types": [
            { "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }
        ],
        "stats": [
            { "base_stat": 35, "effort": 0, "stat": { "name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/" } },
            { "base_stat": 50, "effort": 0, "stat": { "name": "special-attack", "url": "https://pokeapi.co/api/v2/stat/4/" } }
        ],
        "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" }
    }"#;

    #[test]
    fn test_deserialize_full_record() {
        let p: Pokemon = serde_json::from_str(PIKACHU_JSON).unwrap();
        assert_eq!(p.id, 25);
        assert_eq!(p.type_names(), vec!["electric".to_string()]);
        assert_eq!(p.stats.len(), 2);
        assert_eq!(p.species_id(), 25);
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let p: Pokemon = serde_json::from_str(r#"{"id": 1, "name": "bulbasaur"}"#).unwrap();
        assert_eq!(p.primary_image(), "");
        assert!(p.types.is_empty());
        assert_eq!(p.species_id(), 1);
    }

    #[test]
    fn test_primary_image_prefers_official_artwork() {
        let p: Pokemon = serde_json::from_str(PIKACHU_JSON).unwrap();
        assert_eq!(p.primary_image(), "https://img.test/art/25.png");
    }

    #[test]
    fn test_primary_image_falls_back_to_home_then_default() {
        let mut p: Pokemon = serde_json::from_str(PIKACHU_JSON).unwrap();
        p.sprites.other.official_artwork.front_default = None;
        assert_eq!(p.primary_image(), "https://img.test/home/25.png");

        p.sprites.other.home.front_default = None;
        assert_eq!(p.primary_image(), "https://img.test/25.png");
    }

    #[test]
    fn test_measurements_are_scaled() {
        let p: Pokemon = serde_json::from_str(PIKACHU_JSON).unwrap();
        assert_eq!(p.height_m(), 0.4);
        assert_eq!(p.weight_kg(), 6.0);
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/pokemon/25/", "pokemon"),
            Some(25)
        );
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/pokemon-species/133/", "pokemon"),
            None
        );
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/pokemon-species/133/", "pokemon-species"),
            Some(133)
        );
        assert_eq!(id_from_url("not a url", "pokemon"), None);
    }

    #[test]
    fn test_id_from_url_repeated_lookups() {
        let urls: Vec<String> = (1..=500)
            .map(|id| format!("https://pokeapi.co/api/v2/pokemon/{}/", id))
            .collect();
        let ids: Vec<u32> = urls
            .iter()
            .filter_map(|url| id_from_url(url, "pokemon"))
            .collect();
        assert_eq!(ids, (1..=500).collect::<Vec<u32>>());

        // The shared pattern must not leak one resource into another
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/evolution-chain/67", "evolution-chain"),
            Some(67)
        );
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/evolution-chain/67", "chain"),
            None
        );
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/pokemon/25/", "pokemon-species"),
            None
        );
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/pikachu/", "pokemon"), None);
    }

    #[test]
    fn test_display_number_pads_to_three_digits() {
        assert_eq!(display_number(1), "#001");
        assert_eq!(display_number(25), "#025");
        assert_eq!(display_number(1025), "#1025");
    }

    #[test]
    fn test_stat_label_replaces_first_hyphen_only() {
        assert_eq!(stat_label("special-attack"), "special attack");
        assert_eq!(stat_label("a-b-c"), "a b-c");
        assert_eq!(stat_label("hp"), "hp");
    }

    #[test]
    fn test_stat_percent_is_capped() {
        assert_eq!(stat_percent(255), 100.0);
        assert_eq!(stat_percent(300), 100.0);
        assert_eq!(stat_percent(0), 0.0);
    }

    #[test]
    fn test_transform_list_page() {
        let page = PokemonListResponse {
            count: 1302,
            next: Some("https://pokeapi.co/api/v2/pokemon?offset=2&limit=2".to_string()),
            previous: None,
            results: vec![
                NamedResource {
                    name: "bulbasaur".to_string(),
                    url: "https://pokeapi.co/api/v2/pokemon/1/".to_string(),
                },
                NamedResource {
                    name: "ivysaur".to_string(),
                    url: "https://pokeapi.co/api/v2/pokemon/2/".to_string(),
                },
            ],
        };

        let output = transform_list_page(page, 2, 0);
        assert_eq!(output.entries.len(), 2);
        assert_eq!(output.entries[1].id, 2);
        assert!(output.has_more);
        assert_eq!(
            output.next_page_command.as_deref(),
            Some("pokedex list --limit 2 --offset 2")
        );
    }

    #[test]
    fn test_transform_last_page_has_no_next_command() {
        let page = PokemonListResponse {
            count: 1,
            next: None,
            previous: None,
            results: vec![],
        };
        let output = transform_list_page(page, 24, 24);
        assert!(!output.has_more);
        assert!(output.next_page_command.is_none());
    }

    #[test]
    fn test_summarize_dual_type_uses_gradient() {
        let p = pokemon(6, "charizard", &["fire", "flying"]);
        let summary = summarize(&p);
        assert_eq!(summary.number, "#006");
        assert_eq!(summary.color, "#EE8130");
        assert_eq!(
            summary.background,
            "linear-gradient(135deg, #EE8130, #A98FF3)"
        );
    }

    #[test]
    fn test_detail_lists_present_sprites_only() {
        let p: Pokemon = serde_json::from_str(PIKACHU_JSON).unwrap();
        let d = detail(&p);
        let labels: Vec<&str> = d.sprites.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Front", "Shiny Front"]);
        assert_eq!(d.stats[1].label, "special attack");
    }
}
