//! Public route classification.

use axum::http::Method;

use crate::config::PublicRouteConfig;

struct PublicRoute {
    path: String,
    methods: Vec<String>,
}

/// Static allow-list of `{path, methods}` pairs exempt from bearer
/// authentication. Everything not listed is protected.
pub struct RouteTable {
    public: Vec<PublicRoute>,
}

impl RouteTable {
    pub fn new(routes: &[PublicRouteConfig]) -> Self {
        let public = routes
            .iter()
            .map(|route| PublicRoute {
                path: route.path.clone(),
                methods: route
                    .methods
                    .iter()
                    .map(|m| m.to_ascii_uppercase())
                    .collect(),
            })
            .collect();
        Self { public }
    }

    /// Whether `method path` may skip authentication. Paths match
    /// exactly; methods are compared case-insensitively.
    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.public
            .iter()
            .any(|route| route.path == path && route.methods.iter().any(|m| m == method.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(&[
            PublicRouteConfig {
                path: "/health".to_string(),
                methods: vec!["get".to_string()],
            },
            PublicRouteConfig {
                path: "/secure-encrypt/test".to_string(),
                methods: vec!["GET".to_string(), "POST".to_string()],
            },
        ])
    }

    #[test]
    fn test_listed_route_is_public() {
        let table = table();
        assert!(table.is_public(&Method::GET, "/health"));
        assert!(table.is_public(&Method::POST, "/secure-encrypt/test"));
    }

    #[test]
    fn test_method_must_be_listed() {
        let table = table();
        assert!(!table.is_public(&Method::POST, "/health"));
        assert!(!table.is_public(&Method::DELETE, "/secure-encrypt/test"));
    }

    #[test]
    fn test_unlisted_path_is_protected() {
        let table = table();
        assert!(!table.is_public(&Method::GET, "/secure-encrypt"));
        assert!(!table.is_public(&Method::GET, "/health/extra"));
    }

    #[test]
    fn test_config_method_case_is_ignored() {
        let table = table();
        // "get" in config still matches the canonical GET method.
        assert!(table.is_public(&Method::GET, "/health"));
    }
}
