/// Errors raised while loading a mesh description
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The mesh source could not be opened or read.
    #[error("failed to read mesh file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `v` or `f` line could not be tokenized into the expected fields.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A face references a vertex that does not exist.
    #[error("line {line}: face index {index} out of range (mesh has {vertex_count} vertices)")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        vertex_count: usize,
    },
}

impl MeshError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
