pub mod error;
pub mod posters;
pub mod tmdb;
pub mod traits;

pub use error::ProviderError;
pub use posters::HttpPosterLoader;
pub use tmdb::{TmdbCatalogSource, TmdbSettings};
pub use traits::{
    CatalogSource, DiscoverQuery, PosterLoader, SourcePage, SourceQuery,
};
