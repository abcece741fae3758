// Certificate State Container and everything it owns besides geometry and sections:
// metadata, the content payload, the seed instance, and the HTTP handlers that drive it.

pub mod handlers;
pub mod model;
pub mod payload;
pub mod seed;
pub mod store;

pub use model::{CertificateState, Metadata, MetadataPatch};
pub use payload::CertificateData;
pub use store::{CertificateStore, SubscriptionId};
