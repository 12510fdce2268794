//! Resolving policy names to documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{PolicyDocument, PolicyError};

/// Source of policy documents, keyed by file name (e.g. `SE_DevOps.json`).
pub trait PolicyLoader {
    /// Load and parse the named document.
    ///
    /// # Errors
    /// Returns [`PolicyError::PolicyNotFound`] when no document has that name
    /// and [`PolicyError::PolicyDocumentInvalid`] when it cannot be parsed.
    fn load(&self, name: &str) -> Result<PolicyDocument, PolicyError>;
}

/// Loads documents from a directory, one file per policy.
///
/// # Examples
///
/// ```
/// use accountstack_policy::{FsPolicyLoader, PolicyError, PolicyLoader};
///
/// let loader = FsPolicyLoader::new("policy-definitions");
/// assert!(matches!(
///     loader.load("definitely-missing.json"),
///     Err(PolicyError::PolicyNotFound { .. })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct FsPolicyLoader {
    root: PathBuf,
}

impl FsPolicyLoader {
    /// Create a loader reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory documents are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PolicyLoader for FsPolicyLoader {
    fn load(&self, name: &str) -> Result<PolicyDocument, PolicyError> {
        let path = self.root.join(name);

        // Names are plain file names; anything that could leave the directory
        // can never match.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PolicyError::PolicyNotFound {
                name: name.to_owned(),
                path,
            });
        }

        let text = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PolicyError::PolicyNotFound {
                    name: name.to_owned(),
                    path: path.clone(),
                }
            } else {
                PolicyError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let document = PolicyDocument::parse(name, &text)?;
        tracing::debug!(
            name,
            path = %path.display(),
            characters = document.character_count(),
            "loaded policy document"
        );
        Ok(document)
    }
}

/// In-memory document set, for fixtures and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyLoader {
    documents: BTreeMap<String, String>,
}

impl MemoryPolicyLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a document's raw text.
    #[must_use]
    pub fn with_document(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Add (or replace) a document's raw text.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(name.into(), text.into());
    }
}

impl PolicyLoader for MemoryPolicyLoader {
    fn load(&self, name: &str) -> Result<PolicyDocument, PolicyError> {
        let text = self
            .documents
            .get(name)
            .ok_or_else(|| PolicyError::PolicyNotFound {
                name: name.to_owned(),
                path: PathBuf::from(name),
            })?;
        PolicyDocument::parse(name, text)
    }
}
