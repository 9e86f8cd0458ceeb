//! Schema override discovery and loading.
//!
//! A schema directory holds one YAML file per element type, named after the
//! type tag (`olt.yaml`, `splice-closure.yml`, ...). Each file replaces the
//! built-in schema of that type:
//!
//! ```yaml
//! fields:
//!   - path: metadata.vendor
//!     kind: text
//!     label: Vendor
//!     required: true
//! rules:
//!   - rule: powerOrdering
//!     transmit: metadata.optical.txPower
//!     receive: metadata.optical.rxPower
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::descriptor::FieldDescriptor;
use super::errors::SchemaError;
use super::registry::TypeSchema;
use super::rules::FormRule;
use crate::entity::ElementType;

/// On-disk shape of a schema file.
#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    rules: Vec<FormRule>,
}

/// A discovered schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInfo {
    /// Type tag taken from the file stem.
    pub name: String,
    pub path: PathBuf,
}

/// Discover schema files in a directory.
///
/// Finds all `.yaml` / `.yml` files among the direct children of `root`.
/// Returns an empty list if the directory doesn't exist.
pub fn discover_schemas(root: &Path) -> Result<Vec<SchemaInfo>, SchemaError> {
    if !root.exists() {
        return Ok(vec![]);
    }

    let root = root
        .canonicalize()
        .map_err(|_| SchemaError::MissingDir(root.display().to_string()))?;

    let mut out = Vec::new();

    for entry in WalkDir::new(&root).max_depth(1) {
        let entry = entry.map_err(|e| SchemaError::WalkError(root.display().to_string(), e))?;

        let path = entry.path();
        if !path.is_file() || !is_yaml_file(path) {
            continue;
        }

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("").to_string();
        if !name.is_empty() {
            out.push(SchemaInfo { name, path: path.to_path_buf() });
        }
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

/// Repository of schema override files.
#[derive(Debug)]
pub struct SchemaRepository {
    pub root: PathBuf,
    pub schemas: Vec<SchemaInfo>,
}

impl SchemaRepository {
    /// Scan `root` for schema files. A missing directory yields an empty repository.
    pub fn new(root: &Path) -> Result<Self, SchemaError> {
        let schemas = discover_schemas(root)?;
        debug!("found {} schema file(s) in {}", schemas.len(), root.display());
        Ok(Self { root: root.to_path_buf(), schemas })
    }

    pub fn list_all(&self) -> &[SchemaInfo] {
        &self.schemas
    }

    /// Load and check every discovered schema.
    pub fn load_all(&self) -> Result<Vec<TypeSchema>, SchemaError> {
        self.schemas.iter().map(|info| load_schema_file(&info.path)).collect()
    }
}

/// Load and check one schema file.
pub fn load_schema_file(path: &Path) -> Result<TypeSchema, SchemaError> {
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown");
    let element_type = name.parse::<ElementType>().map_err(|_| SchemaError::UnknownType {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;

    let source = fs::read_to_string(path)
        .map_err(|e| SchemaError::Io { path: path.to_path_buf(), source: e })?;

    let file: SchemaFile = serde_yaml::from_str(&source)
        .map_err(|e| SchemaError::Parse { path: path.to_path_buf(), source: e })?;

    TypeSchema::new(element_type, file.fields, file.rules)
}
