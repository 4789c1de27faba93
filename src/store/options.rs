//! Store construction options

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::{DocumentDecoder, DocumentEncoder, JsonCodec};

use super::errors::{StoreError, StoreResult};

pub const DEFAULT_DB_NAME: &str = "default";
pub const DEFAULT_EXTENSION: &str = "pallas";

/// Where the database file lives and how documents are encoded.
///
/// The backing file is `<data_dir>/<db_name>.<extension>`.
#[derive(Clone)]
pub struct StoreOptions {
    db_name: String,
    extension: String,
    data_dir: PathBuf,
    encoder: Arc<dyn DocumentEncoder>,
    decoder: Arc<dyn DocumentDecoder>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            db_name: DEFAULT_DB_NAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            data_dir: PathBuf::from("."),
            encoder: Arc::new(JsonCodec),
            decoder: Arc::new(JsonCodec),
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }

    /// File extension without the leading dot
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn DocumentEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn DocumentDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Uses one value as both encoder and decoder
    pub fn with_codec<C>(self, codec: C) -> Self
    where
        C: DocumentEncoder + DocumentDecoder + 'static,
    {
        let codec = Arc::new(codec);
        self.with_encoder(codec.clone()).with_decoder(codec)
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn encoder(&self) -> &dyn DocumentEncoder {
        self.encoder.as_ref()
    }

    pub fn decoder(&self) -> &dyn DocumentDecoder {
        self.decoder.as_ref()
    }

    /// Path of this store's backing file
    pub fn database_path(&self) -> PathBuf {
        self.path_for(&self.db_name)
    }

    /// Path of the backing file for another database name in the same directory
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file_name = if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.extension)
        };
        self.data_dir.join(file_name)
    }

    pub fn validate(&self) -> StoreResult<()> {
        validate_name("database name", &self.db_name)?;
        if self.extension.starts_with('.') || has_separator(&self.extension) {
            return Err(StoreError::invalid_options(format!(
                "invalid file extension '{}'",
                self.extension
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_name(what: &str, name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::invalid_options(format!("{} must not be empty", what)));
    }
    if has_separator(name) || name == "." || name == ".." {
        return Err(StoreError::invalid_options(format!(
            "{} '{}' must not be a path",
            what, name
        )));
    }
    Ok(())
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("db_name", &self.db_name)
            .field("extension", &self.extension)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorCode;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert_eq!(options.db_name(), "default");
        assert_eq!(options.extension(), "pallas");
        assert_eq!(options.database_path(), PathBuf::from("./default.pallas"));
    }

    #[test]
    fn test_builder_overrides_path() {
        let options = StoreOptions::new()
            .with_db_name("users")
            .with_extension("db")
            .with_data_dir("/tmp/data");
        assert_eq!(options.database_path(), PathBuf::from("/tmp/data/users.db"));
        assert_eq!(options.path_for("other"), PathBuf::from("/tmp/data/other.db"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        for name in ["", "a/b", "..", "a\\b"] {
            let err = StoreOptions::new().with_db_name(name).validate().unwrap_err();
            assert_eq!(err.code(), StoreErrorCode::InvalidOptions);
        }
        assert!(StoreOptions::new().with_extension(".db").validate().is_err());
        assert!(StoreOptions::new().validate().is_ok());
    }
}
