// ABOUTME: Inspector — walks resolved usage sites of a file and collects policy violations.
// ABOUTME: Resolution failures suppress reporting; type and method checks fire independently.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::resolver::SymbolResolver;
use super::site::{SiteKind, SourceFile, UsageSite};
use crate::policy::{AllowlistStore, PolicyMatcher, TypeUsage, Verdict};

/// Which check produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Type,
    Method,
}

/// A reportable policy denial at one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub location: String,
    pub kind: ViolationKind,
    /// The denied type name, or `Owner.method` for method violations.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Applies a [`PolicyMatcher`] to the usage sites a host exports.
pub struct Inspector<'a, S> {
    matcher: &'a PolicyMatcher<S>,
}

impl<'a, S: AllowlistStore> Inspector<'a, S> {
    pub fn new(matcher: &'a PolicyMatcher<S>) -> Self {
        Self { matcher }
    }

    /// Check every site of a file. Test sources are never inspected.
    pub fn inspect_file<R: SymbolResolver>(&self, file: &SourceFile, resolver: &R) -> Vec<Violation> {
        if file.test_source {
            debug!(path = %file.path, "skipping test source");
            return Vec::new();
        }
        file.sites
            .iter()
            .flat_map(|site| self.inspect_site(site, resolver))
            .collect()
    }

    /// Check a single site.
    pub fn inspect_site<R: SymbolResolver>(&self, site: &UsageSite, resolver: &R) -> Vec<Violation> {
        match site.kind {
            SiteKind::Field | SiteKind::LocalVariable => {
                self.inspect_declaration(site, resolver).into_iter().collect()
            }
            SiteKind::MethodCall => self.inspect_call(site, resolver),
        }
    }

    fn inspect_declaration<R: SymbolResolver>(
        &self,
        site: &UsageSite,
        resolver: &R,
    ) -> Option<Violation> {
        // Primitives and unresolved declarations have no owner type.
        let Some(usage) = resolver.resolve_owner_type(site) else {
            debug!(location = %site.location, symbol = %site.symbol, "declaration not checked");
            return None;
        };
        violation(site, ViolationKind::Type, &usage.fully_qualified_name, self.matcher.check_type(&usage))
    }

    fn inspect_call<R: SymbolResolver>(&self, site: &UsageSite, resolver: &R) -> Vec<Violation> {
        let Some(target) = resolver.resolve_call_target(site) else {
            debug!(location = %site.location, symbol = %site.symbol, "call target unresolved");
            return Vec::new();
        };

        let owner = TypeUsage::new(target.owner_type.clone());
        let type_violation = violation(
            site,
            ViolationKind::Type,
            &owner.fully_qualified_name,
            self.matcher.check_type(&owner),
        );
        let method_violation = violation(
            site,
            ViolationKind::Method,
            &target.qualified_name(),
            self.matcher.check_method(&target),
        );
        type_violation.into_iter().chain(method_violation).collect()
    }
}

fn violation(site: &UsageSite, kind: ViolationKind, subject: &str, verdict: Verdict) -> Option<Violation> {
    match verdict {
        Verdict::Allowed => None,
        Verdict::Denied { reason } => Some(Violation {
            location: site.location.clone(),
            kind,
            subject: subject.to_string(),
            message: reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::resolver::SymbolTable;
    use crate::inspection::site::DeclaredType;
    use crate::policy::{AllowlistFile, MethodDescriptor, MethodUsage};

    fn matcher() -> PolicyMatcher<AllowlistFile> {
        let mut store = AllowlistFile::default();
        store.add_method("java.math.BigInteger", MethodDescriptor::new("add", &["java.math.BigInteger"]));
        store.add_class("java.lang.String");
        PolicyMatcher::new(store)
    }

    fn symbols() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.insert_type("total", DeclaredType::Class("java.math.BigInteger".into()));
        table.insert_type("file", DeclaredType::Class("java.io.File".into()));
        table.insert_type("n", DeclaredType::Primitive("int".into()));
        table.insert_type("api", DeclaredType::Class("org.aion.avm.api.Address".into()));
        table.insert_method(
            "total.add",
            MethodUsage::new("java.math.BigInteger", "add", &["java.math.BigInteger"]),
        );
        table.insert_method(
            "total.pow",
            MethodUsage::new("java.math.BigInteger", "pow", &["int"]),
        );
        table.insert_method(
            "file.delete",
            MethodUsage::new("java.io.File", "delete", &[]),
        );
        table
    }

    #[test]
    fn allowed_declarations_produce_nothing() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        for symbol in ["total", "n", "api"] {
            let site = UsageSite::new(SiteKind::Field, "C.java:1", symbol);
            assert!(inspector.inspect_site(&site, &symbols()).is_empty(), "{symbol}");
        }
    }

    #[test]
    fn denied_local_variable_reported() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let site = UsageSite::new(SiteKind::LocalVariable, "C.java:7", "file");
        let violations = inspector.inspect_site(&site, &symbols());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Type);
        assert_eq!(violations[0].subject, "java.io.File");
        assert_eq!(
            violations[0].to_string(),
            "C.java:7: java.io.File is not allowed in a restricted smart-contract context"
        );
    }

    #[test]
    fn allowed_call_produces_nothing() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let site = UsageSite::new(SiteKind::MethodCall, "C.java:10", "total.add");
        assert!(inspector.inspect_site(&site, &symbols()).is_empty());
    }

    #[test]
    fn denied_method_on_allowed_type() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let site = UsageSite::new(SiteKind::MethodCall, "C.java:11", "total.pow");
        let violations = inspector.inspect_site(&site, &symbols());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Method);
        assert_eq!(violations[0].subject, "java.math.BigInteger.pow");
    }

    #[test]
    fn denied_type_and_method_both_fire() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let site = UsageSite::new(SiteKind::MethodCall, "C.java:12", "file.delete");
        let kinds: Vec<ViolationKind> = inspector
            .inspect_site(&site, &symbols())
            .iter()
            .map(|v| v.kind)
            .collect();
        assert_eq!(kinds, vec![ViolationKind::Type, ViolationKind::Method]);
    }

    #[test]
    fn unresolved_sites_are_suppressed() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let call = UsageSite::new(SiteKind::MethodCall, "C.java:13", "mystery()");
        let field = UsageSite::new(SiteKind::Field, "C.java:14", "mystery");
        assert!(inspector.inspect_site(&call, &symbols()).is_empty());
        assert!(inspector.inspect_site(&field, &symbols()).is_empty());
    }

    /// Declares every field as an array and reports its element class as the owner.
    struct ElementTypeResolver;

    impl SymbolResolver for ElementTypeResolver {
        fn resolve_declared_type(&self, _site: &UsageSite) -> Option<DeclaredType> {
            Some(DeclaredType::Class("java.io.File[]".into()))
        }

        fn resolve_call_target(&self, _site: &UsageSite) -> Option<MethodUsage> {
            None
        }

        fn resolve_owner_type(&self, _site: &UsageSite) -> Option<TypeUsage> {
            Some(TypeUsage::new("java.io.File"))
        }
    }

    #[test]
    fn declarations_use_resolver_owner_type() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let site = UsageSite::new(SiteKind::Field, "C.java:20", "files");
        let violations = inspector.inspect_site(&site, &ElementTypeResolver);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].subject, "java.io.File");
    }

    #[test]
    fn test_sources_are_skipped() {
        let m = matcher();
        let inspector = Inspector::new(&m);
        let mut file = SourceFile {
            path: "src/test/java/CTest.java".to_string(),
            test_source: true,
            sites: vec![UsageSite::new(SiteKind::Field, "CTest.java:3", "file")],
        };
        assert!(inspector.inspect_file(&file, &symbols()).is_empty());

        file.test_source = false;
        assert_eq!(inspector.inspect_file(&file, &symbols()).len(), 1);
    }
}
