pub mod alias_index;
pub mod benchmark;
pub mod catalog;

pub use alias_index::*;
pub use benchmark::*;
pub use catalog::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Failed to read benchmark catalog at {0}: {1}")]
    CatalogLoad(String, String),

    #[error("Failed to parse benchmark catalog {0}: {1}")]
    CatalogParse(String, String),

    #[error("Taxonomy snapshot contains no benchmark definitions")]
    EmptyTaxonomy,

    #[error("Duplicate canonical name in taxonomy: {0}")]
    DuplicateCanonicalName(String),
}
