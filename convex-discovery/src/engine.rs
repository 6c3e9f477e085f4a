//! The discovery pass: barrel → modules → signatures → parsed functions.

use crate::cache::{DiscoveryCache, GENERATED_DIR};
use crate::error::DiscoveryError;
use crate::parser::resolver::read_barrel;
use crate::parser::{ModuleEntry, SignatureExtractor, SourceLanguage};
use convex_schema::{FunctionDefinition, ParsedFunction};
use std::path::{Path, PathBuf};

/// File name of the generated API barrel inside [`GENERATED_DIR`].
pub const BARREL_FILE: &str = "api.d.ts";

/// Grammars probed for each module, in order of preference.
const MODULE_LANGUAGES: [SourceLanguage; 2] = [SourceLanguage::TypeScript, SourceLanguage::JavaScript];

/// Everything one discovery pass needs: where the backend lives, the parser,
/// and optionally a cache.
pub struct DiscoveryContext {
    backend_dir: PathBuf,
    extractor: SignatureExtractor,
    cache: Option<DiscoveryCache>,
}

impl DiscoveryContext {
    /// Create an uncached context for the backend at `backend_dir`.
    ///
    /// # Errors
    /// Returns an error if the parser grammars fail to load.
    pub fn new(backend_dir: impl Into<PathBuf>) -> Result<Self, DiscoveryError> {
        Ok(Self {
            backend_dir: backend_dir.into(),
            extractor: SignatureExtractor::new()?,
            cache: None,
        })
    }

    /// Attach a cache storing its entry under `cache_dir`.
    pub fn with_cache(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache = Some(DiscoveryCache::new(cache_dir, self.backend_dir.clone()));
        self
    }

    pub fn backend_dir(&self) -> &Path {
        &self.backend_dir
    }

    pub fn cache(&self) -> Option<&DiscoveryCache> {
        self.cache.as_ref()
    }

    /// Path of the generated API barrel.
    pub fn barrel_path(&self) -> PathBuf {
        self.backend_dir.join(GENERATED_DIR).join(BARREL_FILE)
    }

    /// Discover every exported function, consulting the cache first.
    ///
    /// Never fails: resolver and parser errors are logged and the affected
    /// modules contribute nothing. An empty result is for the caller to judge.
    pub fn discover(&self) -> Vec<ParsedFunction> {
        if let Some(cached) = self.cache.as_ref().and_then(DiscoveryCache::get) {
            return cached;
        }

        let functions = match self.scan() {
            Ok(functions) => functions,
            Err(e) => {
                tracing::warn!(
                    "Function discovery failed in {}: {}",
                    self.backend_dir.display(),
                    e
                );
                Vec::new()
            }
        };

        tracing::info!(
            "Discovered {} functions in {}",
            functions.len(),
            self.backend_dir.display()
        );

        if let Some(cache) = &self.cache {
            cache.set(&functions);
        }
        functions
    }

    /// Drop any cached entry, then discover from source.
    pub fn refresh(&self) -> Vec<ParsedFunction> {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        self.discover()
    }

    /// Full uncached scan.
    ///
    /// # Errors
    /// Returns an error only if the barrel itself cannot be read or parsed;
    /// individual module failures are logged and skipped.
    pub fn scan(&self) -> Result<Vec<ParsedFunction>, DiscoveryError> {
        let modules = read_barrel(&self.barrel_path())?;
        tracing::debug!("Barrel declares {} modules", modules.len());

        let mut functions = Vec::new();
        for module in &modules {
            match self.scan_module(module) {
                Ok(definitions) => functions.extend(definitions.iter().map(|def| {
                    ParsedFunction::from_definition(def).with_reference(module.reference(&def.name))
                })),
                Err(e) => tracing::warn!("Skipping module {}: {}", module.name, e),
            }
        }
        Ok(functions)
    }

    fn scan_module(&self, module: &ModuleEntry) -> Result<Vec<FunctionDefinition>, DiscoveryError> {
        let Some((path, language)) = self.locate(module) else {
            tracing::debug!("No source file for module {}", module.file);
            return Ok(Vec::new());
        };

        let content = std::fs::read_to_string(&path)?;
        let definitions = self.extractor.extract(&content, &module.name, language)?;
        tracing::debug!(
            "Found {} functions in {}",
            definitions.len(),
            path.display()
        );
        Ok(definitions)
    }

    /// Source file backing `module`, preferring TypeScript.
    fn locate(&self, module: &ModuleEntry) -> Option<(PathBuf, SourceLanguage)> {
        MODULE_LANGUAGES.into_iter().find_map(|language| {
            let path = self
                .backend_dir
                .join(format!("{}.{}", module.file, language.extension()));
            path.is_file().then_some((path, language))
        })
    }
}

/// Convert explicitly registered definitions without touching disk or cache.
pub fn convert_provided(definitions: &[FunctionDefinition]) -> Vec<ParsedFunction> {
    definitions
        .iter()
        .map(ParsedFunction::from_definition)
        .collect()
}
