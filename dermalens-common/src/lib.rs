//! # Dermalens Common Library
//!
//! Shared code for the Dermalens insights engine including:
//! - Domain vocabulary (concerns, zones, skin types, catalog items, assessments)
//! - Typed parsers for serialized catalog and model data
//! - Configuration loading
//! - Logging initialisation
//! - Injectable time source

pub mod config;
pub mod error;
pub mod logging;
pub mod parse;
pub mod time;
pub mod types;

pub use error::{Error, Result};
pub use time::{Clock, ManualClock, SystemClock};
pub use types::{
    Assessment, CatalogItem, CatalogRecord, ConcernKind, IngredientId, ProductCategory, SkinType,
    ZoneKind,
};
