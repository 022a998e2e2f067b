use std::fmt;

use joingate_core::FileId;

/// Storage key of a file record.
///
/// Rendered as `{prefix}:file:{file_id}` by backends with a flat keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey<'a> {
    pub prefix: &'a str,
    pub file_id: &'a FileId,
}

impl<'a> RecordKey<'a> {
    pub fn new(prefix: &'a str, file_id: &'a FileId) -> Self {
        Self { prefix, file_id }
    }

    /// The canonical string form of the key.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RecordKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:file:{}", self.prefix, self.file_id)
    }
}
