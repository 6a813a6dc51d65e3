use std::{
    collections::HashSet,
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{Descriptor, EngineError, FaceEngine};

/// File extensions accepted as reference images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// A known person: the label comes from the file name, the descriptor from
/// the single face in that file.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceFace {
    pub label: String,
    pub descriptor: Descriptor,
}

impl ReferenceFace {
    pub fn new(label: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            label: label.into(),
            descriptor,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read face directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode reference image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("face engine failed on {}: {source}", .path.display())]
    Engine {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error("no face found in {}", PathList(.files))]
    NoFace { files: Vec<PathBuf> },
}

struct PathList<'a>(&'a [PathBuf]);

impl fmt::Display for PathList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// Known faces, in file name order. Built once; restart to reload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceDatabase {
    faces: Vec<ReferenceFace>,
}

impl FaceDatabase {
    pub fn new(faces: Vec<ReferenceFace>) -> Self {
        Self { faces }
    }

    /// Build the database from a flat directory of `<label>.jpg|png` files.
    ///
    /// Every image must contain a face. Images without one are collected and
    /// reported together so a single restart fixes them all.
    pub fn load(dir: impl AsRef<Path>, engine: &dyn FaceEngine) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let mut faces = Vec::new();
        let mut faceless = Vec::new();

        for path in reference_images(dir)? {
            let image = image::open(&path).map_err(|source| LoadError::Image {
                path: path.clone(),
                source,
            })?;
            let detections = engine.detect(&image).map_err(|source| LoadError::Engine {
                path: path.clone(),
                source,
            })?;
            let Some(first) = detections.into_iter().next() else {
                warn!(path = %path.display(), "reference image has no face");
                faceless.push(path);
                continue;
            };
            let label = label_for(&path);
            debug!(%label, "loaded reference face");
            faces.push(ReferenceFace::new(label, first.descriptor));
        }

        if !faceless.is_empty() {
            return Err(LoadError::NoFace { files: faceless });
        }

        let mut seen = HashSet::new();
        for face in &faces {
            if !seen.insert(face.label.as_str()) {
                warn!(label = %face.label, "duplicate reference label");
            }
        }

        let db = Self::new(faces);
        info!(count = db.len(), labels = ?db.labels().collect::<Vec<_>>(), "loaded known faces");
        Ok(db)
    }

    pub fn faces(&self) -> &[ReferenceFace] {
        &self.faces
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|f| f.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// First reference, in database order, that the engine says matches
    /// `candidate`. Later, possibly closer, references are not considered.
    pub fn first_match(&self, engine: &dyn FaceEngine, candidate: &Descriptor) -> Option<&ReferenceFace> {
        self.faces
            .iter()
            .find(|face| engine.matches(&face.descriptor, candidate))
    }
}

/// Reference image files in `dir`, sorted by file name.
pub fn reference_images(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_reference_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_reference_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

fn label_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
