//! Module discovery and the handle space
//!
//! The registry walks the module installation root once, at engine
//! initialization, and assigns each usable module a dense zero-based index
//! in scan order. Candidate directories are visited sorted by file name, so
//! the same directory snapshot always produces the same indices; indices
//! are still not identities and may differ across installations; callers
//! resolve modules by id or name.

pub mod descriptor;
pub mod manifest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, ErrorCode, Result};

pub use descriptor::{ModuleDescriptor, Range3};
pub use manifest::MANIFEST_FILENAME;

/// Registry of discovered modules.
#[derive(Debug)]
pub struct Registry {
    root: PathBuf,
    modules: Vec<ModuleDescriptor>,
}

impl Registry {
    /// Scan `root` for module installations.
    ///
    /// Fails when the directory does not exist. Malformed candidates are
    /// rejected with a warning and do not abort the scan; a directory with
    /// no usable modules yields an empty registry.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::new(
                ErrorCode::DirectoryNotFound,
                format!("module directory {} does not exist", root.display()),
            ));
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(root)
            .map_err(|err| {
                Error::new(
                    ErrorCode::IoError,
                    format!("cannot list {}: {err}", root.display()),
                )
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        // Scan order is normalized by name so one directory snapshot always
        // yields the same index assignment.
        candidates.sort();

        let mut modules = Vec::new();
        let mut names: HashSet<String> = HashSet::new();

        for candidate in candidates {
            if !candidate.join(MANIFEST_FILENAME).is_file() {
                debug!("Skipping {}: no manifest", candidate.display());
                continue;
            }
            match manifest::read_manifest(&candidate) {
                Ok(mut desc) => {
                    disambiguate_name(&mut desc, &mut names);
                    info!(
                        "Discovered module '{}' id={} v{}.{} at {}",
                        desc.name,
                        desc.id,
                        desc.version,
                        desc.subversion,
                        candidate.display()
                    );
                    modules.push(desc);
                }
                Err(err) => {
                    warn!("Rejecting module candidate {}: {err}", candidate.display());
                }
            }
        }

        if modules.is_empty() {
            info!("No modules found under {}", root.display());
        }

        Ok(Self {
            root: root.to_path_buf(),
            modules,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn num_modules(&self) -> usize {
        self.modules.len()
    }

    /// Descriptor at `index`; the reference is stable for the registry's
    /// lifetime.
    pub fn descriptor(&self, index: usize) -> Option<&ModuleDescriptor> {
        self.modules.get(index)
    }

    /// Resolve an index from module id and version.
    ///
    /// With version and subversion both zero, resolves to the highest
    /// `(version, subversion)` pair among modules sharing `id`.
    pub fn find_by_id(&self, id: i32, version: u32, subversion: u32) -> Option<usize> {
        if version == 0 && subversion == 0 {
            self.modules
                .iter()
                .enumerate()
                .filter(|(_, m)| m.id == id)
                .max_by_key(|(_, m)| (m.version, m.subversion))
                .map(|(idx, _)| idx)
        } else {
            self.modules
                .iter()
                .position(|m| m.id == id && m.version == version && m.subversion == subversion)
        }
    }

    /// Resolve an index from the exact module name; first match wins.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }
}

/// Names must be unique within the registry; a duplicate gets its version
/// appended, and a numeric suffix on top if even that collides.
fn disambiguate_name(desc: &mut ModuleDescriptor, names: &mut HashSet<String>) {
    if names.insert(desc.name.clone()) {
        return;
    }

    let versioned = format!("{}-{}.{}", desc.name, desc.version, desc.subversion);
    let unique = if names.insert(versioned.clone()) {
        versioned
    } else {
        let mut n = 2;
        loop {
            let candidate = format!("{versioned}-{n}");
            if names.insert(candidate.clone()) {
                break candidate;
            }
            n += 1;
        }
    };
    warn!("Duplicate module name '{}' renamed to '{unique}'", desc.name);
    desc.set_name(unique);
}
