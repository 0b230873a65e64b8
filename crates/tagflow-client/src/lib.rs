mod error;
pub use error::{ClientError, ClientResult};

mod transport;
pub use transport::{CatalogClient, CatalogConfig};

mod ops;

mod resolve;
