//! Core library for pokedex
//!
//! This crate implements the **Functional Core** of the pokedex application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`pokedex_core`** (this crate): PokeAPI data shapes, the filter pipeline,
//!   the catalog state machine and its view model
//! - **`pokedex`**: HTTP access, caching, the evolution resolver and the CLI / MCP
//!   surfaces (the Imperative Shell)
//!
//! Nothing in here talks to the network. The catalog state only changes through
//! [`catalog::reduce`], which returns the effects the shell has to carry out, so
//! every transition can be tested with fixture data.
//!
//! # Module Organization
//!
//! - [`pokemon`]: API records and their card / detail transformations
//! - [`types`]: type palette, gradients and the selectable type list
//! - [`evolution`]: evolution chain documents and pre-order flattening
//! - [`filter`]: filter criteria and the visible window
//! - [`catalog`]: session state, intents, reducer and view model
//! - [`favorites`]: favorites set and its JSON file persistence
//! - [`cache`]: bounded LRU response cache with key aliases
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use pokedex_core::catalog::{reduce, view, Action, CatalogState, Effect};
//! use pokedex_core::favorites::FavoritesSet;
//!
//! let mut state = CatalogState::new(24, FavoritesSet::default());
//! let effects = reduce(&mut state, Action::Start);
//!
//! assert!(matches!(effects[..], [Effect::LoadInitial { .. }]));
//! assert!(view(&state).loading);
//! ```

pub mod cache;
pub mod catalog;
pub mod evolution;
pub mod favorites;
pub mod filter;
pub mod pokemon;
pub mod types;
