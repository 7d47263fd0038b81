use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque handle to a playable piece of content.
///
/// In roster files a clip is written either as a bare path string or as an
/// object with `path` and an optional `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "clip_serde::ClipRepr")]
pub struct Clip {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Clip {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Clip {
            path: path.into(),
            title: None,
        }
    }

    pub fn with_title(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Clip {
            path: path.into(),
            title: Some(title.into()),
        }
    }

    /// Title if set, otherwise the file stem.
    pub fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

mod clip_serde {
    use super::Clip;
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub enum ClipRepr {
        Path(PathBuf),
        Full {
            path: PathBuf,
            #[serde(default)]
            title: Option<String>,
        },
    }

    impl From<ClipRepr> for Clip {
        fn from(repr: ClipRepr) -> Self {
            match repr {
                ClipRepr::Path(path) => Clip { path, title: None },
                ClipRepr::Full { path, title } => Clip { path, title },
            }
        }
    }
}

/// A possibly-empty collection of clips that content is drawn from uniformly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentPool {
    clips: Vec<Clip>,
}

impl ContentPool {
    pub fn new(clips: Vec<Clip>) -> Self {
        ContentPool { clips }
    }

    /// Pick one clip uniformly at random. `None` for an empty pool.
    pub fn pick(&self, rng: &mut fastrand::Rng) -> Option<&Clip> {
        if self.clips.is_empty() {
            return None;
        }
        let idx = rng.usize(..self.clips.len());
        self.clips.get(idx)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl From<Vec<Clip>> for ContentPool {
    fn from(clips: Vec<Clip>) -> Self {
        ContentPool::new(clips)
    }
}

impl FromIterator<Clip> for ContentPool {
    fn from_iter<I: IntoIterator<Item = Clip>>(iter: I) -> Self {
        ContentPool::new(iter.into_iter().collect())
    }
}
