//! Path resolution, error types, and the shared row-level I/O that both
//! catalogs sit on. The file format is deliberately dumb: semicolon-delimited
//! lines, first line is a header whose field count defines the expected
//! column count, and appends are raw newline-prefixed writes to the end of
//! the file. No locking and no atomic rename; the application is single-user
//! and single-process, which is the only reason that is acceptable.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".amplify";
/// Headphone catalog file name inside the data directory.
const HEADPHONES_FILE: &str = "cans.csv";
/// Amplifier catalog file name inside the data directory.
const AMPLIFIERS_FILE: &str = "amps.csv";

/// Starter headphone catalog written on first run. Four data columns plus
/// three reserved trailing columns kept for file-format compatibility.
const HEADPHONES_SEED: &str = "\
brand;model;impedance;sensitivity;;;
Sennheiser;6XX;300;103;;;
Sennheiser;HD 600;300;97;;;
Beyerdynamic;DT 770 Pro;80;96;;;
Beyerdynamic;DT 990 Pro;250;96;;;
AKG;K702;62;105;;;
Focal;Clear MG;55;104;;;";

/// Starter amplifier catalog written on first run.
const AMPLIFIERS_SEED: &str = "\
name;voltage;current
Apple USB-C dongle;1;31
Qudelix 5K;2;120
JDS Labs Atom 2;7.7;350
Schiit Magni Heretic;6;500";

/// Failures the catalog layer can surface. A missing file is its own
/// variant rather than an empty catalog so callers can tell "nothing there"
/// apart from "nothing in it".
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read catalog {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write catalog {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not locate home directory")]
    NoHome,
}

/// Handle to the directory holding both catalog files. Constructed once at
/// startup and passed explicitly to whoever needs it; there is no ambient
/// global catalog state.
pub struct CatalogStore {
    dir: PathBuf,
}

impl CatalogStore {
    /// Resolve `~/.amplify`, creating the directory if needed, and return a
    /// store rooted there.
    pub fn open() -> Result<Self, CatalogError> {
        let base_dirs = BaseDirs::new().ok_or(CatalogError::NoHome)?;
        let dir = base_dirs.home_dir().join(DATA_DIR_NAME);
        fs::create_dir_all(&dir).map_err(|source| CatalogError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Store rooted at an arbitrary directory. Tests use this to point the
    /// catalogs at a temporary location.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the starter catalogs for any file that does not exist yet.
    /// Existing files are left untouched, so user edits survive restarts.
    pub fn seed_if_missing(&self) -> Result<(), CatalogError> {
        seed_file(&self.headphones_path(), HEADPHONES_SEED)?;
        seed_file(&self.amplifiers_path(), AMPLIFIERS_SEED)
    }

    pub(crate) fn headphones_path(&self) -> PathBuf {
        self.dir.join(HEADPHONES_FILE)
    }

    pub(crate) fn amplifiers_path(&self) -> PathBuf {
        self.dir.join(AMPLIFIERS_FILE)
    }
}

fn seed_file(path: &Path, contents: &str) -> Result<(), CatalogError> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, contents).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every data row whose field count matches the header's. Rows with a
/// different field count are dropped without error; that lenient policy is
/// part of the file format's contract, so a half-written trailing line never
/// poisons the whole catalog.
pub(crate) fn read_rows(path: &Path) -> Result<Vec<csv::StringRecord>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::Missing(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .map_err(|source| read_error(path, source))?;

    let expected_fields = reader
        .headers()
        .map_err(|source| read_error(path, source))?
        .len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| read_error(path, source))?;
        if record.len() == expected_fields {
            rows.push(record);
        }
    }
    Ok(rows)
}

fn read_error(path: &Path, source: csv::Error) -> CatalogError {
    CatalogError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Append one record: its fields joined by `;`, prefixed by a newline, as
/// raw bytes at the end of the file. Callers reload the catalog afterwards;
/// there is no incremental in-memory update.
pub(crate) fn append_row(path: &Path, fields: &[String]) -> Result<(), CatalogError> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CatalogError::Missing(path.to_path_buf())
            } else {
                CatalogError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

    let line = format!("\n{}", fields.join(";"));
    file.write_all(line.as_bytes())
        .map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
}
