//! Resolution of compiled contract artifacts across build toolchains
//!
//! The contracts may have been compiled by either Hardhat or Foundry, which
//! place their output under different directory layouts; resolution probes
//! both in a fixed priority order rather than assuming which toolchain ran

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::json_abi::JsonAbi;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    constants::{FOUNDRY_OUT_DIR, HARDHAT_ARTIFACTS_DIR, HARDHAT_SOURCES_DIR},
    errors::ScriptError,
};

/// A resolved contract artifact: the interface schema and deployable
/// bytecode for a named contract
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    /// The contract name the artifact was resolved for
    pub name: String,
    /// The contract's interface schema
    pub abi: JsonAbi,
    /// The contract's deployment bytecode
    pub bytecode: Vec<u8>,
    /// The artifact file the descriptor was loaded from
    pub path: PathBuf,
}

/// The on-disk artifact schema common to both toolchains
#[derive(Deserialize)]
struct RawArtifact {
    /// The contract's interface
    abi: JsonAbi,
    /// The contract's deployment bytecode
    bytecode: RawBytecode,
}

/// The bytecode field of an artifact file
///
/// Hardhat stores the bytecode as a plain hex string, Foundry nests it
/// under an `object` key
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// A bare hex string
    Plain(String),
    /// A Foundry bytecode object
    Wrapped {
        /// The hex-encoded bytecode
        object: String,
    },
}

impl RawBytecode {
    /// The hex string underlying either representation
    fn as_hex(&self) -> &str {
        match self {
            RawBytecode::Plain(hex) => hex,
            RawBytecode::Wrapped { object } => object,
        }
    }
}

/// Locates compiled artifacts for named contracts under a project root
pub struct ArtifactLocator {
    /// The root directory under which build outputs are searched
    root: PathBuf,
}

impl ArtifactLocator {
    /// Create a locator rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the artifact for the named contract
    ///
    /// Probes the Hardhat layout before the Foundry layout; the first
    /// candidate that exists and parses wins. If neither does, every build
    /// output directory is scanned recursively for a file named after the
    /// contract before giving up
    pub fn locate(&self, contract: &str) -> Result<ArtifactDescriptor, ScriptError> {
        let candidates = self.candidate_paths(contract);
        for path in &candidates {
            if let Some(descriptor) = self.try_load(contract, path) {
                return Ok(descriptor);
            }
        }

        // Registry fallback: the artifact may live under a source path that
        // does not mirror the contract name
        let file_name = format!("{contract}.json");
        for dir in self.search_roots() {
            if let Some(path) = find_named_file(&dir, &file_name) {
                if let Some(descriptor) = self.try_load(contract, &path) {
                    return Ok(descriptor);
                }
            }
        }

        let searched = candidates
            .iter()
            .map(|p| p.display().to_string())
            .chain(self.search_roots().iter().map(|p| p.display().to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        Err(ScriptError::ArtifactNotFound(format!(
            "no artifact for contract {contract}; searched: {searched}"
        )))
    }

    /// The candidate artifact paths for a contract, in priority order
    fn candidate_paths(&self, contract: &str) -> Vec<PathBuf> {
        let sol_dir = format!("{contract}.sol");
        let json_file = format!("{contract}.json");
        vec![
            self.root
                .join(HARDHAT_ARTIFACTS_DIR)
                .join(HARDHAT_SOURCES_DIR)
                .join(&sol_dir)
                .join(&json_file),
            self.root.join(FOUNDRY_OUT_DIR).join(&sol_dir).join(&json_file),
        ]
    }

    /// The build output directories scanned by the registry fallback
    fn search_roots(&self) -> Vec<PathBuf> {
        vec![
            self.root.join(HARDHAT_ARTIFACTS_DIR),
            self.root.join(FOUNDRY_OUT_DIR),
        ]
    }

    /// Attempt to load an artifact from a single path
    ///
    /// A missing file is a normal miss; an existing file that fails to parse
    /// is logged and skipped so a later candidate may still resolve
    fn try_load(&self, contract: &str, path: &Path) -> Option<ArtifactDescriptor> {
        if !path.is_file() {
            return None;
        }

        match load_artifact(contract, path) {
            Ok(descriptor) => {
                info!("resolved {contract} artifact at {}", path.display());
                Some(descriptor)
            }
            Err(e) => {
                warn!("skipping unusable artifact at {}: {e}", path.display());
                None
            }
        }
    }
}

/// Parse the artifact file at the given path
fn load_artifact(contract: &str, path: &Path) -> Result<ArtifactDescriptor, ScriptError> {
    let contents =
        fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    let raw: RawArtifact =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let bytecode = hex::decode(raw.bytecode.as_hex().trim_start_matches("0x"))
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    Ok(ArtifactDescriptor {
        name: contract.to_string(),
        abi: raw.abi,
        bytecode,
        path: path.to_path_buf(),
    })
}

/// Recursively search a directory for a file with the given name
fn find_named_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries.flatten().find_map(|entry| {
        let path = entry.path();
        if path.is_dir() {
            find_named_file(&path, file_name)
        } else {
            (path.file_name()? == file_name).then_some(path)
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_docs_in_private_items)]

    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// A minimal Hardhat-shaped artifact
    const HARDHAT_ARTIFACT: &str = r#"{"abi": [], "bytecode": "0x6080604052"}"#;
    /// A minimal Foundry-shaped artifact
    const FOUNDRY_ARTIFACT: &str = r#"{"abi": [], "bytecode": {"object": "0x60016002"}}"#;

    /// Write an artifact file, creating parent directories
    fn write_artifact(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_resolves_hardhat_layout() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "artifacts/src/Foo.sol/Foo.json", HARDHAT_ARTIFACT);

        let descriptor = ArtifactLocator::new(dir.path()).locate("Foo").unwrap();
        assert_eq!(descriptor.bytecode, hex::decode("6080604052").unwrap());
    }

    #[test]
    fn test_resolves_foundry_layout_when_hardhat_absent() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "out/Foo.sol/Foo.json", FOUNDRY_ARTIFACT);

        let descriptor = ArtifactLocator::new(dir.path()).locate("Foo").unwrap();
        assert_eq!(descriptor.bytecode, hex::decode("60016002").unwrap());
    }

    #[test]
    fn test_hardhat_layout_wins_when_both_present() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "artifacts/src/Foo.sol/Foo.json", HARDHAT_ARTIFACT);
        write_artifact(dir.path(), "out/Foo.sol/Foo.json", FOUNDRY_ARTIFACT);

        let descriptor = ArtifactLocator::new(dir.path()).locate("Foo").unwrap();
        assert_eq!(descriptor.bytecode, hex::decode("6080604052").unwrap());
    }

    #[test]
    fn test_unparseable_first_candidate_falls_through() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "artifacts/src/Foo.sol/Foo.json", "not json");
        write_artifact(dir.path(), "out/Foo.sol/Foo.json", FOUNDRY_ARTIFACT);

        let descriptor = ArtifactLocator::new(dir.path()).locate("Foo").unwrap();
        assert_eq!(descriptor.bytecode, hex::decode("60016002").unwrap());
    }

    #[test]
    fn test_registry_fallback_scans_nested_paths() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "artifacts/src/nested/Bar.sol/Foo.json",
            HARDHAT_ARTIFACT,
        );

        let descriptor = ArtifactLocator::new(dir.path()).locate("Foo").unwrap();
        assert_eq!(descriptor.name, "Foo");
    }

    #[test]
    fn test_missing_artifact_names_contract_and_paths() {
        let dir = TempDir::new().unwrap();
        let err = ArtifactLocator::new(dir.path()).locate("Foo").unwrap_err();
        match err {
            ScriptError::ArtifactNotFound(msg) => {
                assert!(msg.contains("Foo"));
                assert!(msg.contains("artifacts"));
                assert!(msg.contains("out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
