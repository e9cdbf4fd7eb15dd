//! Embedding model and classifier-head artifacts for the statistical tier.

mod bert;
mod head;

pub use bert::BertEmbedder;
pub use head::LinearHead;
