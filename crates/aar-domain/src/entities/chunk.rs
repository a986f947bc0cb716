//! Chunk entity: a byte range of a file, optionally embedded for similarity search.
//!
//! The embedding subsystem itself is an opaque external collaborator (see
//! `spec.md` Non-goals); this entity only tracks whether an embedding exists,
//! not its vector content.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ChunkId, FileRecordId, ProjectId};

/// A contiguous byte range of a file, the unit the embedding subsystem indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Content-hash identifier (stable across re-chunking of identical bytes).
    pub id: ChunkId,
    /// Owning project.
    pub project_id: ProjectId,
    /// The file this chunk was cut from.
    pub file_id: FileRecordId,
    /// Inclusive start byte offset.
    pub start_byte: usize,
    /// Exclusive end byte offset.
    pub end_byte: usize,
    /// Whether an embedding has been computed and stored for this chunk.
    pub embedding_present: bool,
}

impl Chunk {
    /// Number of bytes spanned by this chunk.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Whether this chunk spans zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
