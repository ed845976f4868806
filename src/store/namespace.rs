//! Per-service root namespace
//!
//! Operator paths are relative to `/<prefix><service>`, where any `/` in the
//! service name is replaced by `__` so the root stays a single segment.

/// Default namespace prefix
pub const DEFAULT_PREFIX: &str = "dcos-service-";

/// Resolves operator paths against a service root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    service: String,
    root: String,
}

impl Namespace {
    /// Namespace with an explicit prefix
    pub fn new(prefix: &str, service: &str) -> Self {
        Self {
            service: service.to_string(),
            root: format!("/{}{}", prefix, service.replace('/', "__")),
        }
    }

    /// Namespace with the default prefix
    pub fn for_service(service: &str) -> Self {
        Self::new(DEFAULT_PREFIX, service)
    }

    /// Service name as given by the operator
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Absolute root path
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute path for an operator path
    ///
    /// Surrounding `/` are trimmed; the store rejects trailing separators.
    pub fn resolve(&self, path: &str) -> String {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            self.root.clone()
        } else {
            format!("{}/{}", self.root, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_flattens_service_separators() {
        let ns = Namespace::for_service("group/kafka");
        assert_eq!(ns.root(), "/dcos-service-group__kafka");
        assert_eq!(ns.service(), "group/kafka");
    }

    #[test]
    fn test_resolve_trims_separators() {
        let ns = Namespace::for_service("hello");
        assert_eq!(ns.resolve(""), "/dcos-service-hello");
        assert_eq!(ns.resolve("/"), "/dcos-service-hello");
        assert_eq!(ns.resolve("Tasks/hello-0"), "/dcos-service-hello/Tasks/hello-0");
        assert_eq!(ns.resolve("/Tasks/hello-0/"), "/dcos-service-hello/Tasks/hello-0");
    }

    #[test]
    fn test_custom_prefix() {
        let ns = Namespace::new("svc-", "x");
        assert_eq!(ns.resolve("a"), "/svc-x/a");
    }
}
