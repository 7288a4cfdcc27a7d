// ABOUTME: Policy matcher — decides whether a type or method usage is permitted.
// ABOUTME: Exempt prefixes short-circuit; method signatures are matched by arity then position.

use tracing::debug;

use super::store::AllowlistStore;
use super::types::{
    DEFAULT_EXEMPT_PREFIXES, MethodDescriptor, MethodUsage, SignatureMatching, TypeUsage, Verdict,
};

/// Stateless decision function over an allow-list snapshot.
///
/// Store lookups are not cached here; wrap the store in a
/// [`CachedAllowlist`](super::cached::CachedAllowlist) if that is wanted.
pub struct PolicyMatcher<S> {
    store: S,
    exempt_prefixes: Vec<String>,
    matching: SignatureMatching,
}

impl<S: AllowlistStore> PolicyMatcher<S> {
    /// Create a matcher with the default exempt namespaces and lenient matching.
    pub fn new(store: S) -> Self {
        Self {
            store,
            exempt_prefixes: DEFAULT_EXEMPT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            matching: SignatureMatching::default(),
        }
    }

    /// Replace the exempt namespace prefixes.
    pub fn with_exempt_prefixes<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.exempt_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_signature_matching(mut self, matching: SignatureMatching) -> Self {
        self.matching = matching;
        self
    }

    fn is_exempt(&self, type_name: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
    }

    /// Whether the type may be referenced in a restricted contract.
    pub fn is_type_allowed(&self, type_name: &str) -> bool {
        if self.is_exempt(type_name) {
            return true;
        }
        self.store.is_class_allowed(type_name)
    }

    /// Whether a call with this exact signature is permitted.
    ///
    /// The owner type's own allowance is not consulted: callers report
    /// type-level violations separately, and both may fire for one usage.
    pub fn is_method_allowed(
        &self,
        owner_type: &str,
        method_name: &str,
        param_types: &[String],
    ) -> bool {
        if self.is_exempt(owner_type) {
            return true;
        }
        if method_name.is_empty() {
            return false;
        }

        let descriptors = self.store.allowed_methods(owner_type, method_name);

        // No-argument overloads need no positional scan.
        if param_types.is_empty() && descriptors.iter().any(|d| d.params.is_empty()) {
            return true;
        }

        let allowed = descriptors
            .iter()
            .filter(|d| d.params.len() == param_types.len())
            .any(|d| self.params_match(d, param_types));

        debug!(
            owner_type,
            method_name,
            ?param_types,
            candidates = descriptors.len(),
            allowed,
            "method signature checked"
        );
        allowed
    }

    /// Compare equal-arity parameter lists according to the matching mode.
    fn params_match(&self, descriptor: &MethodDescriptor, param_types: &[String]) -> bool {
        let mut pairs = descriptor.params.iter().zip(param_types);
        match self.matching {
            SignatureMatching::Lenient => pairs.any(|(expected, actual)| expected == actual),
            SignatureMatching::Strict => pairs.all(|(expected, actual)| expected == actual),
        }
    }

    /// Type check with a reportable reason.
    pub fn check_type(&self, usage: &TypeUsage) -> Verdict {
        if self.is_type_allowed(&usage.fully_qualified_name) {
            Verdict::Allowed
        } else {
            Verdict::denied(&usage.fully_qualified_name)
        }
    }

    /// Method check with a reportable reason.
    pub fn check_method(&self, usage: &MethodUsage) -> Verdict {
        if self.is_method_allowed(&usage.owner_type, &usage.method_name, &usage.param_types) {
            Verdict::Allowed
        } else {
            Verdict::denied(&usage.qualified_name())
        }
    }
}
