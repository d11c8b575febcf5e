// Copyright 2024-2025 the apigee-edge contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Turns a filesystem source into an uploadable bundle archive.
//!
//! A source that is already a `.zip` file passes through untouched. A source
//! directory is packed from its kind-specific root folder (`apiproxy/` or
//! `sharedflowbundle/`) into a temporary archive that is removed when the
//! returned [`PackedBundle`] is dropped.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::deployable::AssetKind;
use crate::error::EdgeError;

const ARCHIVE_EXTENSION: &str = "zip";

/// An archive ready for upload. Holds the temporary directory alive while the
/// archive is in use; dropping the bundle removes it on every exit path.
#[derive(Debug)]
pub struct PackedBundle {
    archive: PathBuf,
    derived_name: Option<String>,
    _tmp: Option<TempDir>,
}

impl PackedBundle {
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// The asset name derived from the source directory's basename. Only set
    /// when the caller supplied no name, and only informational: the
    /// authoritative name is whatever the import response carries.
    pub fn derived_name(&self) -> Option<&str> {
        self.derived_name.as_deref()
    }
}

/// Backup files (`foo.js~`) and editor lock files (`#foo.js#`) never belong
/// in a bundle.
fn is_backup_or_lock(name: &str) -> bool {
    name.ends_with('~') || (name.starts_with('#') && name.ends_with('#'))
}

/// Produce an uploadable archive for `source`.
pub fn pack(
    source: &Path,
    kind: AssetKind,
    explicit_name: Option<&str>,
) -> Result<PackedBundle, EdgeError> {
    let descriptor = kind.descriptor();

    let metadata = std::fs::metadata(source).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EdgeError::NotFound {
                operation: "pack",
                resource: source.display().to_string(),
                message: "no such file or directory".to_string(),
            }
        } else {
            EdgeError::fs(source, e)
        }
    })?;

    if metadata.is_file() {
        if source.extension().and_then(|e| e.to_str()) != Some(ARCHIVE_EXTENSION) {
            return Err(EdgeError::Format("source must be a zipfile".to_string()));
        }
        return Ok(PackedBundle {
            archive: source.to_path_buf(),
            derived_name: None,
            _tmp: None,
        });
    }

    let derived_name = match explicit_name {
        Some(_) => None,
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned()),
    };

    let root = source.join(descriptor.bundle_folder);
    if !root.is_dir() {
        return Err(EdgeError::NotFound {
            operation: "pack",
            resource: root.display().to_string(),
            message: format!(
                "a {} source directory must contain a {} folder",
                descriptor.type_tag, descriptor.bundle_folder
            ),
        });
    }

    let tmp = tempfile::Builder::new()
        .prefix("apigee-edge-")
        .tempdir()
        .map_err(|e| EdgeError::fs(std::env::temp_dir(), e))?;
    let archive = tmp.path().join("bundle.zip");

    write_archive(&root, descriptor.bundle_folder, &archive)?;
    debug!("packed {} into {}", source.display(), archive.display());

    Ok(PackedBundle {
        archive,
        derived_name,
        _tmp: Some(tmp),
    })
}

fn write_archive(root: &Path, base: &str, target: &Path) -> Result<(), EdgeError> {
    let zip_err = |e: zip::result::ZipError| {
        EdgeError::fs(
            target,
            std::io::Error::new(std::io::ErrorKind::Other, e),
        )
    };

    let file = File::create(target).map_err(|e| EdgeError::fs(target, e))?;
    let mut writer = ZipWriter::new(file);

    // The bundle is unzipped by a Java process that insists on Deflate as the
    // compression method for every entry, directories included.
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Sibling order is sorted so the same tree always produces the same
    // archive layout.
    let mut walk = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walk.next() {
        let entry = entry.map_err(|e| EdgeError::fs(root, e.into()))?;

        let name = entry.file_name().to_string_lossy();
        if is_backup_or_lock(&name) {
            if entry.file_type().is_dir() {
                walk.skip_current_dir();
            }
            continue;
        }

        let rel = entry.path().strip_prefix(root).map_err(|_| {
            EdgeError::Format(format!(
                "entry {} escapes the bundle root",
                entry.path().display()
            ))
        })?;
        let mut entry_name = String::from(base);
        for component in rel.components() {
            entry_name.push('/');
            entry_name.push_str(&component.as_os_str().to_string_lossy());
        }

        if entry.file_type().is_dir() {
            writer.add_directory(entry_name, options).map_err(zip_err)?;
        } else {
            writer.start_file(entry_name, options).map_err(zip_err)?;
            let mut contents =
                File::open(entry.path()).map_err(|e| EdgeError::fs(entry.path(), e))?;
            std::io::copy(&mut contents, &mut writer)
                .map_err(|e| EdgeError::fs(entry.path(), e))?;
        }
    }

    writer.finish().map_err(zip_err)?;
    Ok(())
}
