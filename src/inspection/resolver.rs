// ABOUTME: Narrow symbol-resolution interface between the host editor and the inspector.
// ABOUTME: SymbolTable is a serde-loadable resolver built from a host export.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::site::{DeclaredType, SiteKind, UsageSite};
use crate::policy::{MethodUsage, TypeUsage};

/// Resolves usage sites to types. `None` means resolution failed and the
/// site must not be reported.
pub trait SymbolResolver {
    /// Declared type of a field or local-variable site.
    fn resolve_declared_type(&self, site: &UsageSite) -> Option<DeclaredType>;

    /// Full signature of a method-call site's target.
    fn resolve_call_target(&self, site: &UsageSite) -> Option<MethodUsage>;

    /// The type a site depends on: the declared class of a field or local,
    /// or the owner of a call target.
    fn resolve_owner_type(&self, site: &UsageSite) -> Option<TypeUsage> {
        match site.kind {
            SiteKind::Field | SiteKind::LocalVariable => match self.resolve_declared_type(site)? {
                DeclaredType::Class(name) => Some(TypeUsage::new(name)),
                DeclaredType::Primitive(_) => None,
            },
            SiteKind::MethodCall => self
                .resolve_call_target(site)
                .map(|target| TypeUsage::new(target.owner_type)),
        }
    }
}

/// Pre-resolved symbols keyed by [`UsageSite::symbol`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    #[serde(default)]
    pub types: HashMap<String, DeclaredType>,
    #[serde(default)]
    pub methods: HashMap<String, MethodUsage>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type(&mut self, symbol: &str, declared: DeclaredType) {
        self.types.insert(symbol.to_string(), declared);
    }

    pub fn insert_method(&mut self, symbol: &str, target: MethodUsage) {
        self.methods.insert(symbol.to_string(), target);
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve_declared_type(&self, site: &UsageSite) -> Option<DeclaredType> {
        self.types.get(&site.symbol).cloned()
    }

    fn resolve_call_target(&self, site: &UsageSite) -> Option<MethodUsage> {
        self.methods.get(&site.symbol).cloned()
    }
}
