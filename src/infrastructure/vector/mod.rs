//! Vector index: similarity retriever and storage backends

mod local;
mod remote;
mod retriever;

pub use local::LocalVectorBackend;
pub use remote::RemoteVectorBackend;
pub use retriever::{cosine_similarity, VectorRetriever};
