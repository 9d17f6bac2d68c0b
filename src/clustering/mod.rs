mod kmeans;
pub use kmeans::{KMeans, KMeansResult, KMEANS_MAX_ITER, KMEANS_TOLERANCE};
