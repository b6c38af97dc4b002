//! Archive collaborator - a path-keyed blob store
//!
//! A tileset archive holds four blobs under fixed path conventions. The
//! container format itself is not handled here; [`MemoryArchive`] keeps
//! blobs in memory and can mirror them to and from a directory tree.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::glob;
use log::{debug, warn};

/// Path-keyed blob store.
pub trait Archive {
    fn get(&self, path: &str) -> Option<&[u8]>;

    fn set(&mut self, path: &str, data: Vec<u8>);

    /// All stored paths, sorted.
    fn keys(&self) -> Vec<&str>;
}

/// In-memory archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryArchive {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Read every file under `root`, keyed by its `/`-separated relative path.
    pub fn load_dir(root: &Path) -> io::Result<Self> {
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("archive directory '{}' not found", root.display()),
            ));
        }

        let pattern = format!("{}/**/*", glob::Pattern::escape(&root.display().to_string()));
        let paths = glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut archive = Self::new();
        for path in paths.filter_map(Result::ok).filter(|p| p.is_file()) {
            let Some(key) = relative_key(root, &path) else { continue };
            let data = fs::read(&path)?;
            debug!("archive: {} ({} bytes)", key, data.len());
            archive.files.insert(key, data);
        }
        Ok(archive)
    }

    /// Write every blob below `root`, creating directories as needed.
    pub fn save_dir(&self, root: &Path) -> io::Result<()> {
        for (key, data) in &self.files {
            let path = root.join(key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, data)?;
        }
        Ok(())
    }
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let parts: Vec<String> =
        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

impl Archive for MemoryArchive {
    fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    fn set(&mut self, path: &str, data: Vec<u8>) {
        self.files.insert(path.to_string(), data);
    }

    fn keys(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }
}

const TEXTURE_DIR: &str = "BG_tex/";
const TEXTURE_SUFFIX: &str = "_tex.bin.LZ";
const BEHAVIOR_PREFIX: &str = "BG_chk/d_bgchk_";
const OBJECT_DIR: &str = "BG_unt/";
const META_SUFFIX: &str = "_hd.bin";
const BIN_SUFFIX: &str = ".bin";

/// Archive paths of the four tileset blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub texture: String,
    pub behaviors: String,
    pub objects: String,
    pub metadata: String,
}

impl AssetPaths {
    /// Paths for a tileset with internal name `name`.
    pub fn for_name(name: &str) -> Self {
        Self {
            texture: format!("{TEXTURE_DIR}{name}{TEXTURE_SUFFIX}"),
            behaviors: format!("{BEHAVIOR_PREFIX}{name}{BIN_SUFFIX}"),
            objects: format!("{OBJECT_DIR}{name}{BIN_SUFFIX}"),
            metadata: format!("{OBJECT_DIR}{name}{META_SUFFIX}"),
        }
    }
}

/// Blob paths found in an archive by their naming pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedAssets {
    pub texture: Option<String>,
    pub behaviors: Option<String>,
    pub objects: Option<String>,
    pub metadata: Option<String>,
}

impl LocatedAssets {
    /// Find one tileset's blobs.
    ///
    /// The internal name comes from the first texture key, or from the
    /// first other blob when no texture exists. All four paths are then
    /// looked up under that name, so blobs of different tilesets never mix.
    pub fn scan<A: Archive + ?Sized>(archive: &A) -> Self {
        let keys = archive.keys();
        let names: Vec<&str> = keys.iter().filter_map(|key| texture_name(key)).collect();
        if names.len() > 1 {
            warn!("archive holds {} textures, using '{}'", names.len(), names[0]);
        }

        let name = names.first().copied().or_else(|| keys.iter().find_map(|key| blob_name(key)));
        let Some(name) = name else {
            return Self::default();
        };
        debug!("scanning assets for '{}'", name);

        let paths = AssetPaths::for_name(name);
        let present = |path: String| archive.get(&path).is_some().then_some(path);
        Self {
            texture: present(paths.texture),
            behaviors: present(paths.behaviors),
            objects: present(paths.objects),
            metadata: present(paths.metadata),
        }
    }

    /// Labels of the blobs that were not found.
    pub fn missing(&self) -> Vec<String> {
        [
            ("texture", &self.texture),
            ("behaviors", &self.behaviors),
            ("objects", &self.objects),
            ("object metadata", &self.metadata),
        ]
        .into_iter()
        .filter(|(_, path)| path.is_none())
        .map(|(label, _)| label.to_string())
        .collect()
    }

    /// Internal name taken from the texture path.
    pub fn name(&self) -> Option<&str> {
        texture_name(self.texture.as_deref()?)
    }
}

fn texture_name(key: &str) -> Option<&str> {
    key.strip_prefix(TEXTURE_DIR)?.strip_suffix(TEXTURE_SUFFIX)
}

/// Tileset name in a behavior, object or metadata path.
fn blob_name(key: &str) -> Option<&str> {
    if let Some(rest) = key.strip_prefix(BEHAVIOR_PREFIX) {
        return rest.strip_suffix(BIN_SUFFIX);
    }
    let rest = key.strip_prefix(OBJECT_DIR)?;
    rest.strip_suffix(META_SUFFIX).or_else(|| rest.strip_suffix(BIN_SUFFIX))
}
