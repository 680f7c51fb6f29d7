use ab_glyph::FontVec;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Locations tried for a label font when the caller does not supply one.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A set of custom errors for label fonts that cannot be loaded.
#[derive(Debug)]
pub enum FontError {
    Unreadable { path: PathBuf, source: std::io::Error },
    Invalid { path: PathBuf },
    NoneFound { searched: Vec<PathBuf> },
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Unreadable { path, source } => {
                write!(f, "Failed to read font file {:?}: {}.", path, source)
            }
            FontError::Invalid { path } => {
                write!(f, "Failed to parse font file {:?} as a TTF/OTF font.", path)
            }
            FontError::NoneFound { searched } => {
                write!(
                    f,
                    "No label font found; pass one explicitly or install one of {:?}.",
                    searched
                )
            }
        }
    }
}

impl Error for FontError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FontError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Loads the font used for box labels, either from an explicit path or from
/// the first hit in a list of common system font locations.
pub fn load_label_font(explicit_path: Option<&Path>) -> Result<FontVec, FontError> {
    if let Some(path) = explicit_path {
        return read_font(path);
    }
    for candidate in FONT_SEARCH_PATHS {
        let path = Path::new(candidate);
        if path.exists() {
            return read_font(path);
        }
    }
    Err(FontError::NoneFound {
        searched: FONT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
    })
}

fn read_font(path: &Path) -> Result<FontVec, FontError> {
    let bytes = fs::read(path).map_err(|source| FontError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| FontError::Invalid { path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_font_path_is_an_error() {
        let err = load_label_font(Some(Path::new("/definitely/not/a/font.ttf"))).unwrap_err();
        assert!(matches!(err, FontError::Unreadable { .. }));
    }
}
