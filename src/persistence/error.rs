//! Persistence-specific error handling
//!
//! Helpers shared by the world file reader and writer.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::constants::persistence::TEMP_EXTENSION;
use crate::error::{EngineError, EngineResult};

/// Type alias for persistence operation results
pub type PersistenceResult<T> = EngineResult<T>;

/// Create a corrupted world file error for a 1-based line number
pub fn corrupted_line(line: usize, reason: impl Into<String>) -> EngineError {
    EngineError::CorruptWorldFile {
        line,
        reason: reason.into(),
    }
}

/// Write `data` to a temporary sibling of `path`, then rename it over `path`
pub fn atomic_write(path: &Path, data: &[u8]) -> PersistenceResult<()> {
    let temp_path = path.with_extension(match path.extension() {
        Some(ext) => format!("{}.{}", ext.to_string_lossy(), TEMP_EXTENSION),
        None => TEMP_EXTENSION.to_string(),
    });

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(error) = result {
        // Leave nothing half-written behind
        let _ = fs::remove_file(&temp_path);
        return Err(error.into());
    }
    Ok(())
}
