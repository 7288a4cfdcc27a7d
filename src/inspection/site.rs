// ABOUTME: Usage sites exported by the host editor — fields, locals, and method calls.
// ABOUTME: A SourceFile groups the sites of one file; an InspectionReport bundles files and symbols.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::resolver::SymbolTable;

/// What kind of syntax node a usage site came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    Field,
    LocalVariable,
    MethodCall,
}

/// One place in the source that references a type or calls a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSite {
    pub kind: SiteKind,
    /// Host-defined location, e.g. `Counter.java:12:5`.
    pub location: String,
    /// Host symbol handed back to the resolver.
    pub symbol: String,
}

impl UsageSite {
    pub fn new(kind: SiteKind, location: &str, symbol: &str) -> Self {
        Self {
            kind,
            location: location.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// The declared type of a field or local variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    /// A class type, by fully-qualified name.
    Class(String),
    /// Primitives and other non-class types are never checked.
    Primitive(String),
}

/// All usage sites of one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub test_source: bool,
    #[serde(default)]
    pub sites: Vec<UsageSite>,
}

/// Everything a host exports for one inspection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionReport {
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub symbols: SymbolTable,
}

impl InspectionReport {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&content)?;
        Ok(report)
    }
}
