use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Error, ErrorKind, Result, StateProvider};

/// Provider keeping all keys in a single JSON object on disk.
pub struct JsonFileProvider {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileProvider {
    /// Opens `path`. A missing file starts an empty store, and so does a file
    /// that does not hold a JSON object; the latter is overwritten on the
    /// next flush.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!(
                        "State file '{}' does not hold an object, starting empty",
                        path.display()
                    );
                    Map::new()
                }
                Err(err) => {
                    log::warn!(
                        "Could not parse state file '{}': {}, starting empty",
                        path.display(),
                        err
                    );
                    Map::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No state file at '{}', starting empty", path.display());
                Map::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(JsonFileProvider {
            path: path.to_owned(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateProvider for JsonFileProvider {
    fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_owned(), value);
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;

        // Written beside the target, then renamed over it.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|err| {
                Error::new(
                    ErrorKind::StateWrite,
                    &format!("{}: {}", self.path.display(), err),
                )
            })?;

        log::debug!("Flushed state to '{}'", self.path.display());
        Ok(())
    }
}
