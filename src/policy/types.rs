// ABOUTME: Core types for the allow-list policy — usages, method descriptors, verdicts.
// ABOUTME: Also holds the exempt namespace defaults and the signature matching mode.

use serde::{Deserialize, Serialize};

/// Namespaces whose members bypass every allow-list check.
pub const DEFAULT_EXEMPT_PREFIXES: &[&str] = &["org.aion.avm.userlib", "org.aion.avm.api"];

/// A referenced type: field type, local-variable type, or call-target owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeUsage {
    pub fully_qualified_name: String,
}

impl TypeUsage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fully_qualified_name: name.into(),
        }
    }
}

/// A specific call-site signature. Parameter order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodUsage {
    pub owner_type: String,
    pub method_name: String,
    #[serde(default)]
    pub param_types: Vec<String>,
}

impl MethodUsage {
    pub fn new(owner_type: &str, method_name: &str, param_types: &[&str]) -> Self {
        Self {
            owner_type: owner_type.to_string(),
            method_name: method_name.to_string(),
            param_types: param_types.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// `Owner.method`, as shown in violation messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner_type, self.method_name)
    }
}

/// One allow-listed signature for a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Empty means the no-argument overload.
    #[serde(default)]
    pub params: Vec<String>,
}

impl MethodDescriptor {
    pub fn new(name: &str, params: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// How parameter lists of equal arity are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMatching {
    /// The first position whose type names agree marks the descriptor allowed.
    #[default]
    Lenient,
    /// Every position must agree.
    Strict,
}

/// The outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied { reason: String },
}

impl Verdict {
    pub(crate) fn denied(subject: &str) -> Self {
        Verdict::Denied {
            reason: denial_reason(subject),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Human-readable reason attached to every denial.
pub fn denial_reason(subject: &str) -> String {
    format!("{subject} is not allowed in a restricted smart-contract context")
}
