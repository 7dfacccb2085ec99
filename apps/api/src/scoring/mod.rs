// Scoring: semantic similarity over embeddings plus Jaccard skill overlap.
// All embedding calls go through the `Embedder` trait.

pub mod combiner;
pub mod embedding;
