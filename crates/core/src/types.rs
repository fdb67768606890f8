//! Pokemon types (the catalog categories) and their display colors

use crate::pokemon::NamedResource;

/// Types that exist in the API but never appear on a pokemon
pub const RESERVED_TYPES: [&str; 2] = ["unknown", "shadow"];

/// Color used for any type missing from [`TYPE_COLORS`]
pub const DEFAULT_TYPE_COLOR: &str = "#68A090";

pub const TYPE_COLORS: [(&str, &str); 18] = [
    ("normal", "#A8A77A"),
    ("fire", "#EE8130"),
    ("water", "#6390F0"),
    ("electric", "#F7D02C"),
    ("grass", "#7AC74C"),
    ("ice", "#96D9D6"),
    ("fighting", "#C22E28"),
    ("poison", "#A33EA1"),
    ("ground", "#E2BF65"),
    ("flying", "#A98FF3"),
    ("psychic", "#F95587"),
    ("bug", "#A6B91A"),
    ("rock", "#B6A136"),
    ("ghost", "#735797"),
    ("dragon", "#6F35FC"),
    ("dark", "#705746"),
    ("steel", "#B7B7CE"),
    ("fairy", "#D685AD"),
];

pub fn type_color(name: &str) -> &'static str {
    TYPE_COLORS
        .iter()
        .find(|(t, _)| *t == name)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_TYPE_COLOR)
}

/// Background for a card: the single type color, or a diagonal gradient
pub fn type_gradient(types: &[String]) -> String {
    match types {
        [] => DEFAULT_TYPE_COLOR.to_string(),
        [only] => type_color(only).to_string(),
        many => {
            let colors: Vec<&str> = many.iter().map(|t| type_color(t)).collect();
            format!("linear-gradient(135deg, {})", colors.join(", "))
        }
    }
}

/// Parse a `#RRGGBB` color into its channels
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Drop the reserved types from the `/type` listing, keeping API order
pub fn selectable_types(types: Vec<NamedResource>) -> Vec<NamedResource> {
    types
        .into_iter()
        .filter(|t| !RESERVED_TYPES.contains(&t.name.as_str()))
        .collect()
}
