//! Library of shader sources, keyed by stage and name.
//!
//! Resource files follow the `<name>.<vertex|fragment>.<ext>` convention, e.g.
//! `volume.fragment.glsl`. The library is owned by the application and passed
//! to whatever builds composers from it.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShaderKitError};
use crate::part::CodePart;

/// The program stage a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
}

impl ShaderStage {
    /// Returns the stage's file name component.
    pub fn suffix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "vertex" => Some(ShaderStage::Vertex),
            "fragment" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Splits a resource file name into its lowercased name and stage.
///
/// Returns `None` for names that do not follow `<name>.<stage>.<ext>`.
pub fn parse_resource_name(file_name: &str) -> Option<(String, ShaderStage)> {
    let mut pieces = file_name.rsplitn(3, '.');
    let ext = pieces.next()?;
    let stage = ShaderStage::from_suffix(pieces.next()?)?;
    let name = pieces.next()?;
    if ext.is_empty() || name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), stage))
}

/// Shader sources by stage and name.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    sources: HashMap<ShaderStage, HashMap<String, String>>,
}

impl ShaderLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a source, replacing any previous one of that stage and name.
    pub fn insert(&mut self, stage: ShaderStage, name: impl Into<String>, source: impl Into<String>) {
        self.sources
            .entry(stage)
            .or_default()
            .insert(name.into(), source.into());
    }

    /// Gets a source.
    pub fn source(&self, stage: ShaderStage, name: &str) -> Option<&str> {
        self.sources
            .get(&stage)?
            .get(name)
            .map(String::as_str)
    }

    /// Returns true if a source of that stage and name is stored.
    pub fn contains(&self, stage: ShaderStage, name: &str) -> bool {
        self.source(stage, name).is_some()
    }

    /// Returns the names stored for a stage, sorted.
    pub fn names(&self, stage: ShaderStage) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sources
            .get(&stage)
            .into_iter()
            .flat_map(HashMap::keys)
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of stored sources.
    pub fn len(&self) -> usize {
        self.sources.values().map(HashMap::len).sum()
    }

    /// Returns true if no sources are stored.
    pub fn is_empty(&self) -> bool {
        self.sources.values().all(HashMap::is_empty)
    }

    /// Loads every `<name>.<stage>.<ext>` file in `dir`.
    ///
    /// Other files and subdirectories are skipped. Returns the number of
    /// sources loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut loaded = 0;

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some((name, stage)) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_resource_name)
            else {
                log::debug!("skipping {}", path.display());
                continue;
            };

            let source = std::fs::read_to_string(&path)?;
            log::debug!("loaded {stage} source '{name}' from {}", path.display());
            self.insert(stage, name, source);
            loaded += 1;
        }

        log::debug!("loaded {loaded} shader source(s) from {}", dir.display());
        Ok(loaded)
    }

    /// Builds a part from a stored source.
    pub fn part(
        &self,
        stage: ShaderStage,
        source_name: &str,
        part_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Arc<CodePart>> {
        let source = self
            .source(stage, source_name)
            .ok_or_else(|| ShaderKitError::SourceNotFound(format!("{source_name}.{stage}")))?;
        Ok(Arc::new(CodePart::new(part_name, version, source)))
    }
}
