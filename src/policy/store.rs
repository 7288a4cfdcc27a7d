// ABOUTME: Allow-list store trait plus a JSON-backed implementation with glob package patterns.
// ABOUTME: Exact class entries carry method descriptors; duplicate-safe entry management.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use super::types::MethodDescriptor;

/// Read-only source of permitted types and method signatures.
pub trait AllowlistStore {
    /// Whether the fully-qualified type may be referenced at all.
    fn is_class_allowed(&self, type_name: &str) -> bool;

    /// Every descriptor on `type_name` named `method_name`, regardless of arity.
    fn allowed_methods(&self, type_name: &str, method_name: &str) -> Vec<MethodDescriptor>;
}

impl<T: AllowlistStore + ?Sized> AllowlistStore for &T {
    fn is_class_allowed(&self, type_name: &str) -> bool {
        (**self).is_class_allowed(type_name)
    }

    fn allowed_methods(&self, type_name: &str, method_name: &str) -> Vec<MethodDescriptor> {
        (**self).allowed_methods(type_name, method_name)
    }
}

impl<T: AllowlistStore + ?Sized> AllowlistStore for Arc<T> {
    fn is_class_allowed(&self, type_name: &str) -> bool {
        (**self).is_class_allowed(type_name)
    }

    fn allowed_methods(&self, type_name: &str, method_name: &str) -> Vec<MethodDescriptor> {
        (**self).allowed_methods(type_name, method_name)
    }
}

/// Permitted methods of one class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassEntry {
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

/// Top-level allow-list file that persists to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistFile {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Glob patterns over fully-qualified names (e.g. `java.lang.*`).
    /// Matching classes are allowed but contribute no method descriptors.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Explicitly permitted classes keyed by fully-qualified name.
    #[serde(default)]
    pub classes: HashMap<String, ClassEntry>,
}

impl Default for AllowlistFile {
    fn default() -> Self {
        Self {
            version: 1,
            packages: Vec::new(),
            classes: HashMap::new(),
        }
    }
}

impl AllowlistFile {
    /// Load an allow-list from disk. Returns an empty allow-list if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&content)?;
        Ok(file)
    }

    /// Save the allow-list to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Permit a package pattern, skipping exact duplicates.
    pub fn add_package(&mut self, pattern: &str) {
        if self.packages.iter().any(|p| p == pattern) {
            return;
        }
        self.packages.push(pattern.to_string());
    }

    /// Permit a class with no methods yet. Existing entries are left untouched.
    pub fn add_class(&mut self, type_name: &str) {
        self.classes.entry(type_name.to_string()).or_default();
    }

    /// Permit a method signature, creating the class entry if needed.
    pub fn add_method(&mut self, type_name: &str, descriptor: MethodDescriptor) {
        let entry = self.classes.entry(type_name.to_string()).or_default();

        // Skip duplicates.
        if entry.methods.contains(&descriptor) {
            return;
        }
        entry.methods.push(descriptor);
    }

    fn matches_package(&self, type_name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            Pattern::new(pattern)
                .map(|p| p.matches(type_name))
                .unwrap_or(false)
        })
    }
}

impl AllowlistStore for AllowlistFile {
    fn is_class_allowed(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name) || self.matches_package(type_name)
    }

    fn allowed_methods(&self, type_name: &str, method_name: &str) -> Vec<MethodDescriptor> {
        let Some(entry) = self.classes.get(type_name) else {
            return Vec::new();
        };
        entry
            .methods
            .iter()
            .filter(|d| d.name == method_name)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AllowlistFile {
        let mut file = AllowlistFile::default();
        file.add_package("java.lang.*");
        file.add_method("java.math.BigInteger", MethodDescriptor::new("add", &["java.math.BigInteger"]));
        file.add_method("java.math.BigInteger", MethodDescriptor::new("signum", &[]));
        file.add_method("java.math.BigInteger", MethodDescriptor::new("add", &["long"]));
        file
    }

    #[test]
    fn default_allowlist_file() {
        let file = AllowlistFile::default();
        assert_eq!(file.version, 1);
        assert!(file.packages.is_empty());
        assert!(file.classes.is_empty());
        assert!(!file.is_class_allowed("java.lang.String"));
    }

    #[test]
    fn explicit_class_is_allowed() {
        let file = sample();
        assert!(file.is_class_allowed("java.math.BigInteger"));
        assert!(!file.is_class_allowed("java.math.BigDecimal"));
    }

    #[test]
    fn package_glob_allows_class() {
        let file = sample();
        assert!(file.is_class_allowed("java.lang.String"));
        assert!(file.is_class_allowed("java.lang.invoke.MethodHandle"));
        assert!(!file.is_class_allowed("java.io.File"));
    }

    #[test]
    fn invalid_glob_never_matches() {
        let mut file = AllowlistFile::default();
        file.add_package("java.[lang");
        assert!(!file.is_class_allowed("java.[lang"));
    }

    #[test]
    fn allowed_methods_filters_by_name() {
        let file = sample();
        let adds = file.allowed_methods("java.math.BigInteger", "add");
        assert_eq!(adds.len(), 2);
        assert!(adds.iter().all(|d| d.name == "add"));

        assert!(file.allowed_methods("java.math.BigInteger", "pow").is_empty());
        assert!(file.allowed_methods("java.lang.String", "length").is_empty());
    }

    #[test]
    fn add_method_no_duplicates() {
        let mut file = AllowlistFile::default();
        file.add_method("a.B", MethodDescriptor::new("c", &["int"]));
        file.add_method("a.B", MethodDescriptor::new("c", &["int"]));
        assert_eq!(file.classes["a.B"].methods.len(), 1);

        file.add_package("a.*");
        file.add_package("a.*");
        assert_eq!(file.packages.len(), 1);
    }

    #[test]
    fn add_class_keeps_existing_methods() {
        let mut file = sample();
        file.add_class("java.math.BigInteger");
        assert_eq!(file.classes["java.math.BigInteger"].methods.len(), 3);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("allowlist.json");

        let original = sample();
        original.save(&path).unwrap();

        let loaded = AllowlistFile::load(&path).unwrap();
        assert_eq!(loaded.version, original.version);
        assert_eq!(loaded.packages, vec!["java.lang.*".to_string()]);
        assert!(loaded.is_class_allowed("java.math.BigInteger"));
        assert_eq!(loaded.allowed_methods("java.math.BigInteger", "signum").len(), 1);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.json");
        let file = AllowlistFile::load(&path).unwrap();
        assert_eq!(file.version, 1);
        assert!(file.classes.is_empty());
    }

    #[test]
    fn load_from_json_with_defaults() {
        let json = serde_json::json!({
            "version": 1,
            "classes": {
                "java.util.Arrays": { "methods": [ { "name": "fill", "params": ["int[]", "int"] } ] },
                "java.lang.Object": {}
            }
        });
        let file: AllowlistFile = serde_json::from_value(json).unwrap();
        assert!(file.packages.is_empty());
        assert!(file.is_class_allowed("java.lang.Object"));
        assert_eq!(file.allowed_methods("java.util.Arrays", "fill")[0].params.len(), 2);
    }
}
