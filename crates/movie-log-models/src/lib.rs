pub mod date_range;
pub mod imdb_id;
pub mod viewing;

pub use date_range::{DateRange, DateRangeError};
pub use imdb_id::{extract_imdb_id, ImdbId, InvalidImdbId};
pub use viewing::{NewViewing, PriorViewing, ViewingEntry};
