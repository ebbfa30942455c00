//! Compiled pattern cache.
//!
//! # Design Decisions
//! - Injected, not global: each router (and each test) owns its cache
//! - Populated lazily, never evicted; templates are immutable text
//! - Lock-free reads; a compile race may build a pattern twice, the
//!   first insert wins and both callers get a valid pattern
//! - Failed compilations are not cached

use std::sync::Arc;

use dashmap::DashMap;

use super::pattern::{CompiledPattern, PatternError, PatternKind};
use crate::model::Tenant;

/// Concurrent map of template text to compiled pattern.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: DashMap<(PatternKind, String), Arc<CompiledPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pattern for `template`, compiling it on first use.
    pub fn get_or_compile(
        &self,
        template: &str,
        kind: PatternKind,
    ) -> Result<Arc<CompiledPattern>, PatternError> {
        let key = (kind, template.to_string());
        if let Some(hit) = self.patterns.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }

        let compiled = Arc::new(CompiledPattern::compile(template, kind)?);
        tracing::debug!(template = %template, kind = ?kind, "Compiled URL pattern");
        Ok(Arc::clone(self.patterns.entry(key).or_insert(compiled).value()))
    }

    /// The pattern documents of `tenant` are matched against.
    pub fn document_pattern(&self, tenant: &Tenant) -> Result<Arc<CompiledPattern>, PatternError> {
        let kind = if tenant.single_version {
            PatternKind::SingleVersion
        } else {
            PatternKind::Document
        };
        self.get_or_compile(&tenant.document_template(), kind)
    }

    /// The pattern `tenant` mounts its subprojects under.
    pub fn subproject_pattern(&self, tenant: &Tenant) -> Result<Arc<CompiledPattern>, PatternError> {
        self.get_or_compile(&tenant.subproject_template(), PatternKind::Subproject)
    }

    /// Number of distinct compiled templates.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
