//! Listing ingestion, caching, filtering and result serialization for autovalue.

mod cache;
mod domain;
mod error;
mod filter;
mod reader;
mod summary;
mod writer;

pub use cache::{CsvSource, TableCache, TableSource, DEFAULT_TTL};
pub use domain::{column, current_year, ExperimentName, Listing, ListingTable, VehicleCategory};
pub use error::IoError;
pub use filter::{search_makes, ListingFilter};
pub use reader::ListingReader;
pub use summary::{MakeCount, MarketSummary, PriceSegment, SegmentCount, TOP_MAKES};
pub use writer::ResultWriter;
