use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Color used for class indices the catalog does not know about.
pub const FALLBACK_COLOR: [u8; 3] = [255, 255, 255];

/// A fixed mapping from class index to a display name and an RGB color.
///
/// The renderer is catalog-agnostic: it accepts any catalog and falls back
/// to white and an empty name for indices the catalog does not cover.
/// Colors are stored RGB throughout; the `image` crate is RGB end-to-end,
/// so no channel reordering exists anywhere in the crate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassCatalog {
    entries: HashMap<u32, (String, [u8; 3])>,
}

impl ClassCatalog {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S, [u8; 3])>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(index, name, color)| (index, (name.into(), color)))
                .collect(),
        }
    }

    /// Display name for a class index, or the empty string for an unknown one.
    pub fn name_of(&self, class_index: u32) -> &str {
        self.entries
            .get(&class_index)
            .map(|(name, _)| name.as_str())
            .unwrap_or("")
    }

    /// RGB color for a class index, or white for an unknown one.
    pub fn color_of(&self, class_index: u32) -> [u8; 3] {
        self.entries
            .get(&class_index)
            .map(|(_, color)| *color)
            .unwrap_or(FALLBACK_COLOR)
    }

    /// The harvest-stage vocabulary of the oil-palm bunch dataset. Colors
    /// are the original labeling tool's BGR tuples converted to RGB, so
    /// rendered output matches it pixel for pixel.
    pub fn harvest_stage() -> Self {
        Self::from_entries([
            (0, "Abnormal", [0, 255, 0]),
            (1, "Buah Busuk", [0, 0, 255]),
            (2, "Buah Lewat Masak", [255, 0, 0]),
            (3, "Buah Masak", [0, 255, 255]),
            (4, "Buah Mentah", [255, 255, 0]),
            (5, "Tandan Kosong", [255, 0, 150]),
        ])
    }

    /// The English bunch-condition vocabulary for the same class indices.
    /// The red and cyan colors sit on the opposite indices compared to
    /// [`ClassCatalog::harvest_stage`], matching the original labeling tool.
    pub fn bunch_condition() -> Self {
        Self::from_entries([
            (0, "Abnormal bunch", [0, 255, 0]),
            (1, "Damaged bunch", [0, 0, 255]),
            (2, "Overripe bunch", [0, 255, 255]),
            (3, "Ripe bunch", [255, 0, 0]),
            (4, "Unripe bunch", [255, 255, 0]),
            (5, "Empty bunch", [255, 0, 150]),
        ])
    }

    /// Reads a catalog from a json object of the shape
    /// `{"<class_index>": ["<name>", [r, g, b]], ...}`.
    pub fn from_json_file(filepath: &Path) -> Result<Self, CatalogError> {
        let file = File::open(filepath).map_err(|source| CatalogError::Unreadable {
            path: filepath.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let raw: HashMap<String, (String, [u8; 3])> =
            serde_json::from_reader(reader).map_err(|source| CatalogError::Malformed {
                path: filepath.to_path_buf(),
                source,
            })?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, (name, color)) in raw {
            let index: u32 = key.parse().map_err(|_| CatalogError::BadClassIndex {
                path: filepath.to_path_buf(),
                key: key.clone(),
            })?;
            entries.insert(index, (name, color));
        }
        Ok(Self { entries })
    }
}

/// A set of custom errors for catalog files that cannot be loaded.
#[derive(Debug)]
pub enum CatalogError {
    Unreadable { path: PathBuf, source: std::io::Error },
    Malformed { path: PathBuf, source: serde_json::Error },
    BadClassIndex { path: PathBuf, key: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Unreadable { path, source } => {
                write!(f, "Failed to read catalog file {:?}: {}.", path, source)
            }
            CatalogError::Malformed { path, source } => {
                write!(f, "Failed to parse catalog file {:?}: {}.", path, source)
            }
            CatalogError::BadClassIndex { path, key } => {
                write!(
                    f,
                    "Failed to parse catalog file {:?}, key {:?} is not a class index.",
                    path, key
                )
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Unreadable { source, .. } => Some(source),
            CatalogError::Malformed { source, .. } => Some(source),
            CatalogError::BadClassIndex { .. } => None,
        }
    }
}
