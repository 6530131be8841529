pub mod enrich;
pub mod error;
pub mod feed;
pub mod store;
pub mod types;

pub use enrich::Enricher;
pub use error::Error;
pub use feed::{FeedFilter, FeedSource};
pub use store::{ArticleStore, NewArticle};
pub use types::{Enrichment, Importance, Location, NormalizedArticle, RawArticle};

pub type Result<T> = std::result::Result<T, Error>;
