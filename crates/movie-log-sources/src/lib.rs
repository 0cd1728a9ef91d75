pub mod error;
pub mod fake;
pub mod omdb;
pub mod traits;

pub use error::GatewayError;
pub use fake::FakeMetadata;
pub use omdb::OmdbClient;
pub use traits::MetadataGateway;
