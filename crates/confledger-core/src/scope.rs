use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// NamespaceScope
///
/// The (application, cluster, namespace) triple every engine operation is
/// keyed by. One parameterized scope value replaces the per-shape handler
/// fan-out of the admin surface.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NamespaceScope {
    pub app: String,
    pub cluster: String,
    pub namespace: String,
}

impl NamespaceScope {
    #[must_use]
    pub fn new(
        app: impl Into<String>,
        cluster: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            app: app.into(),
            cluster: cluster.into(),
            namespace: namespace.into(),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app, self.cluster, self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_triple() {
        let scope = NamespaceScope::new("shop", "default", "application");
        assert_eq!(scope.to_string(), "shop/default/application");
    }

    #[test]
    fn scopes_compare_by_all_segments() {
        let a = NamespaceScope::new("shop", "default", "application");
        let b = NamespaceScope::new("shop", "default", "db");
        assert_ne!(a, b);
        assert!(a < b);
    }
}
