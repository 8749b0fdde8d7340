use indexmap::IndexSet;
use swc_ecma_ast::ImportDecl;

use crate::config::ExtractTargets;
use crate::resolve::{import_binding, is_import_from};

/// Names the extractor matches against in one file.
///
/// Seeded from configuration; `hook` and `component` are narrowed to their
/// local aliases when an import from `package` is seen. `instance` and
/// `function` name call sites rather than imports and are never rebound here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRegistry {
    names: ExtractTargets,
}

impl TargetRegistry {
    pub fn new(defaults: &ExtractTargets) -> Self {
        Self {
            names: defaults.clone(),
        }
    }

    pub fn package(&self) -> &str {
        &self.names.package
    }

    pub fn instance(&self) -> &str {
        &self.names.instance
    }

    pub fn hook(&self) -> &str {
        &self.names.hook
    }

    pub fn function(&self) -> &str {
        &self.names.function
    }

    pub fn component(&self) -> &str {
        &self.names.component
    }

    pub fn names(&self) -> &ExtractTargets {
        &self.names
    }

    /// Rebind `hook` and `component` through the import's specifiers.
    /// Returns false (and changes nothing) for imports of other modules.
    /// Repeated imports from the package keep rebinding; the last one wins.
    pub fn rebind_from_import(&mut self, decl: &ImportDecl) -> bool {
        if !is_import_from(decl, &self.names.package) {
            return false;
        }
        self.names.hook = import_binding(decl, &self.names.hook);
        self.names.component = import_binding(decl, &self.names.component);
        true
    }
}

/// Tracks which local name currently invokes the translate function.
///
/// Entering a block saves the active binding; leaving it restores the saved
/// one, so a rebind inside a block is invisible once the block ends.
#[derive(Debug, Clone)]
pub struct ScopeTracker {
    active: String,
    saved: Vec<String>,
}

impl ScopeTracker {
    pub fn new(function: &str) -> Self {
        Self {
            active: function.to_string(),
            saved: Vec::new(),
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn enter_block(&mut self) {
        self.saved.push(self.active.clone());
    }

    pub fn exit_block(&mut self) {
        // Unbalanced exits leave the binding alone
        if let Some(previous) = self.saved.pop() {
            self.active = previous;
        }
    }

    /// Last rebind in a block wins.
    pub fn rebind(&mut self, name: impl Into<String>) {
        self.active = name.into();
    }
}

/// Extraction state owned by exactly one file traversal.
#[derive(Debug, Clone)]
pub struct FileExtractionState {
    /// Set once the file is excluded or fails the strict import check
    pub should_skip: bool,
    /// Discovered messages in first-seen order
    pub messages: IndexSet<String>,
    pub targets: TargetRegistry,
    pub scope: ScopeTracker,
}

impl FileExtractionState {
    pub fn new(defaults: &ExtractTargets) -> Self {
        Self {
            should_skip: false,
            messages: IndexSet::new(),
            targets: TargetRegistry::new(defaults),
            scope: ScopeTracker::new(&defaults.function),
        }
    }

    /// Record a message unless the file is skipped. Returns whether the
    /// message was new for this file.
    pub fn collect(&mut self, message: String) -> bool {
        if self.should_skip {
            return false;
        }
        self.messages.insert(message)
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages.into_iter().collect()
    }
}
