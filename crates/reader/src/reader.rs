//! The `Reader` capability.

use async_trait::async_trait;

use crate::{Document, ReaderError};

/// A source of documents for an indexing pipeline.
///
/// Implementations hold whatever configuration they need (credentials,
/// stream selection) and produce a finite, ordered batch of documents per
/// call. Pipelines depend on `dyn Reader` so that any reader can be swapped
/// for any other.
///
/// ## Contract
///
/// - The returned `Vec` preserves the order in which the upstream source
///   emitted records.
/// - An upstream source with no records yields an empty `Vec`, not an error.
/// - A failure yields `Err` and no documents; partial batches are never
///   returned.
/// - The call completes before returning; there is no streaming and no
///   built-in retry, cancellation, or timeout.
#[async_trait]
pub trait Reader: Send + Sync {
    /// Loads every document the reader is configured to produce.
    async fn load_data(&self) -> Result<Vec<Document>, ReaderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedReader(Vec<&'static str>);

    #[async_trait]
    impl Reader for FixedReader {
        async fn load_data(&self) -> Result<Vec<Document>, ReaderError> {
            Ok(self.0.iter().map(|text| Document::new(*text)).collect())
        }
    }

    #[tokio::test]
    async fn test_reader_is_usable_as_trait_object() {
        let readers: Vec<Box<dyn Reader>> = vec![
            Box::new(FixedReader(vec!["a", "b"])),
            Box::new(FixedReader(vec![])),
        ];

        let mut counts = Vec::new();
        for reader in &readers {
            counts.push(reader.load_data().await.unwrap().len());
        }
        assert_eq!(counts, vec![2, 0]);
    }
}
