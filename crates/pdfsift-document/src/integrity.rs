// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact fingerprints — SHA-256 digests recorded in the processing report.

use std::path::Path;

use pdfsift_core::error::Result;
use pdfsift_core::types::{Artifact, ArtifactKind};
use sha2::{Digest, Sha256};

/// Hash a file without reading it into memory.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Describe a file already written to the output directory.
pub fn artifact(kind: ArtifactKind, path: &Path) -> Result<Artifact> {
    Ok(Artifact {
        kind,
        path: path.to_path_buf(),
        bytes: std::fs::metadata(path)?.len(),
        sha256: hash_file(path)?,
    })
}
