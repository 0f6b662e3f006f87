use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use beatdeck_core::score::{PlayerId, ScoreRecord};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ScoreBackend;
use super::table::ScoreTable;
use crate::error::StoreError;

/// Rows could repeat a player; written before the unique index existed.
const LEGACY_SCHEMA: u32 = 1;
const UNIQUE_SCHEMA: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        entries: Vec<ScoreRecord>,
    },
    Legacy(Vec<ScoreRecord>),
}

impl StoreFile {
    fn into_table(self) -> ScoreTable {
        match self {
            StoreFile::Versioned {
                schema_version,
                entries,
            } => ScoreTable {
                rows: entries,
                unique: schema_version >= UNIQUE_SCHEMA,
            },
            StoreFile::Legacy(entries) => ScoreTable {
                rows: entries,
                unique: false,
            },
        }
    }
}

/// Leaderboard persisted as a single JSON document shared by every process
/// that opens the same path.
///
/// Writers hold an exclusive lock on `<path>.lock`, re-read the document,
/// apply their change and replace the file by rename. Readers never lock:
/// they always see one complete document, either the one before or the one
/// after a write.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Exclusive advisory lock, released when dropped.
struct WriteLock {
    file: File,
}

impl WriteLock {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(io_err)?;
        FileExt::lock_exclusive(&file).map_err(io_err)?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl JsonFileBackend {
    /// Opens `path`, creating an empty store when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let backend = Self {
            lock_path: sibling(&path, ".lock"),
            path,
        };

        let _lock = WriteLock::acquire(&backend.lock_path)?;
        if backend.path.exists() {
            let table = read_table(&backend.path)?;
            debug!(path = %backend.path.display(), rows = table.rows.len(), unique = table.unique, "opened leaderboard file");
        } else {
            write_table(&backend.path, &ScoreTable::unique())?;
            info!(path = %backend.path.display(), "created leaderboard file");
        }
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ScoreTable, StoreError> {
        read_table(&self.path)
    }

    /// Runs `change` against the document as it is on disk right now and
    /// writes the result back, all under the write lock.
    fn update<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ScoreTable) -> Result<T, StoreError>,
    {
        let _lock = WriteLock::acquire(&self.lock_path)?;
        let mut table = self.load()?;
        let value = change(&mut table)?;
        write_table(&self.path, &table)?;
        Ok(value)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn read_table(path: &Path) -> Result<ScoreTable, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: StoreFile =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed.into_table())
}

fn write_table(path: &Path, table: &ScoreTable) -> Result<(), StoreError> {
    let tmp = sibling(path, ".tmp");
    let written = write_document(&tmp, table).and_then(|()| {
        fs::rename(&tmp, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_document(tmp: &Path, table: &ScoreTable) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: tmp.to_path_buf(),
        source,
    };
    let document = StoreFile::Versioned {
        schema_version: if table.unique {
            UNIQUE_SCHEMA
        } else {
            LEGACY_SCHEMA
        },
        entries: table.rows.clone(),
    };

    let mut writer = BufWriter::new(File::create(tmp).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, &document).map_err(|source| StoreError::Corrupt {
        path: tmp.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    writer
        .into_inner()
        .map_err(|err| io_err(err.into_error()))?
        .sync_all()
        .map_err(io_err)
}

impl ScoreBackend for JsonFileBackend {
    fn ping(&self) -> Result<(), StoreError> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(StoreError::Unavailable(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(err) => Err(StoreError::Unavailable(format!(
                "{}: {err}",
                self.path.display()
            ))),
        }
    }

    fn unique_index_enforced(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.unique)
    }

    fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.load()?.rows)
    }

    fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self.load()?.find(player).cloned())
    }

    fn insert(&self, record: ScoreRecord) -> Result<(), StoreError> {
        self.update(|table| table.insert(record))
    }

    fn replace_if(&self, expected: &ScoreRecord, record: ScoreRecord) -> Result<bool, StoreError> {
        self.update(|table| Ok(table.replace_if(expected, record)))
    }

    fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError> {
        self.update(|table| Ok(table.collapse_player(player, keep)))
    }

    fn create_unique_index(&self) -> Result<(), StoreError> {
        self.update(ScoreTable::create_unique_index)
    }
}
