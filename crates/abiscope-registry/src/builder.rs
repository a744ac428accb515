//! Compiles a corpus of interface documents into a [`SignatureRegistry`].
//!
//! Collision rules:
//! - **functions**: the first signature seen for a selector wins; later ones
//!   are dropped.
//! - **events**: signatures are grouped by topic. Within a topic a variant is
//!   identified by its `indexed_count`; a new count is appended as another
//!   variant, a repeated count keeps the first.
//!
//! The build never fails. Unreadable or malformed documents are skipped and
//! recorded in the [`BuildReport`].

use abiscope_core::{
    error::RegistryError,
    signature::{EventSignature, FunctionSignature},
};
use alloy_primitives::{Selector, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::corpus::{self, AbiItem};
use crate::registry::SignatureRegistry;

/// Builder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// File extensions treated as corpus documents when scanning a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["json".into(), "abi".into()]
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// What happened during a build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub entries_skipped: usize,
    pub entries_ignored: usize,
    pub functions_registered: usize,
    /// Same canonical signature seen again
    pub functions_duplicate: usize,
    /// Different signature, same selector: dropped
    pub functions_collided: usize,
    pub event_variants_registered: usize,
    /// Same topic and indexed count seen again
    pub events_duplicate: usize,
    pub diagnostics: Vec<String>,
}

/// Accumulates signatures and applies the collision policies.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    config: BuilderConfig,
    events_by_topic: IndexMap<B256, Vec<EventSignature>>,
    functions_by_selector: IndexMap<Selector, FunctionSignature>,
    report: BuildReport,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a function. Returns `false` if its selector was taken.
    pub fn add_function(&mut self, sig: FunctionSignature) -> bool {
        if let Some(existing) = self.functions_by_selector.get(&sig.selector) {
            if existing.signature == sig.signature {
                self.report.functions_duplicate += 1;
            } else {
                debug!(
                    selector = %sig.selector,
                    kept = %existing.signature,
                    dropped = %sig.signature,
                    "selector collision"
                );
                self.report.functions_collided += 1;
            }
            return false;
        }
        self.functions_by_selector.insert(sig.selector, sig);
        self.report.functions_registered += 1;
        true
    }

    /// Register an event variant. Returns `false` if the topic already has a
    /// variant with the same `indexed_count`.
    pub fn add_event(&mut self, sig: EventSignature) -> bool {
        let variants = self.events_by_topic.entry(sig.topic).or_default();
        if variants.iter().any(|v| v.indexed_count == sig.indexed_count) {
            self.report.events_duplicate += 1;
            return false;
        }
        if !variants.is_empty() {
            debug!(
                topic = %sig.topic,
                signature = %sig.signature,
                indexed_count = sig.indexed_count,
                "additional event variant"
            );
        }
        variants.push(sig);
        self.report.event_variants_registered += 1;
        true
    }

    /// Parse one ABI JSON document and register its functions and events.
    ///
    /// Returns `false` if the document could not be parsed at all; it is
    /// then skipped with a diagnostic.
    pub fn add_document(&mut self, source_name: &str, json: &str) -> bool {
        self.report.documents_scanned += 1;
        let doc = match corpus::parse_document(source_name, json) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(source = source_name, error = %e, "skipping interface document");
                self.report.documents_skipped += 1;
                self.report.diagnostics.push(e.to_string());
                return false;
            }
        };

        for msg in doc.skipped {
            warn!(source = source_name, "skipping entry: {msg}");
            self.report.entries_skipped += 1;
            self.report.diagnostics.push(msg);
        }
        self.report.entries_ignored += doc.ignored;

        for item in doc.items {
            match item {
                AbiItem::Function(f) => {
                    self.add_function(f);
                }
                AbiItem::Event(e) => {
                    self.add_event(e);
                }
            }
        }
        true
    }

    /// Read and register a single document from disk.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let name = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(content) => self.add_document(&name, &content),
            Err(e) => {
                warn!(source = %name, error = %e, "unreadable interface document");
                self.report.documents_scanned += 1;
                self.report.documents_skipped += 1;
                self.report.diagnostics.push(format!("{name}: {e}"));
                false
            }
        }
    }

    /// Load every document under `dir` (recursively) whose extension is in
    /// [`BuilderConfig::extensions`].
    ///
    /// Files are visited in sorted path order so that "first wins" is
    /// reproducible across machines. Returns the number of documents that
    /// parsed. Fails only if `dir` is not a directory.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        if !dir.is_dir() {
            return Err(RegistryError::NotADirectory {
                path: dir.display().to_string(),
            });
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable corpus path");
                    self.report.diagnostics.push(e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.wants(entry.path()) {
                continue;
            }
            if self.load_file(entry.path()) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|want| want.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Diagnostics gathered so far.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Freeze the tables.
    pub fn build(self) -> SignatureRegistry {
        self.finish().0
    }

    /// Freeze the tables and hand back the build report.
    pub fn finish(self) -> (SignatureRegistry, BuildReport) {
        let registry = SignatureRegistry::from_parts(self.events_by_topic, self.functions_by_selector);
        let stats = registry.stats();
        info!(
            documents = self.report.documents_scanned,
            skipped = self.report.documents_skipped,
            functions = stats.functions,
            topics = stats.topics,
            event_variants = stats.event_variants,
            "signature registry built"
        );
        (registry, self.report)
    }
}
