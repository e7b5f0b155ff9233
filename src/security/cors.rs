//! Cross-origin policy.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

/// Parse a configured method name. Surrounding whitespace is ignored and the
/// name is matched case-insensitively, so `" get"` is `GET`.
pub fn parse_method(raw: &str) -> Option<Method> {
    let name = raw.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    Method::from_bytes(name.as_bytes()).ok()
}

/// Build the CORS layer from config. `*` in the origin list allows any origin;
/// entries that are not valid header values or methods are skipped.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .allow_methods
        .iter()
        .filter_map(|m| parse_method(m))
        .collect();

    let layer = CorsLayer::new().allow_methods(methods);

    if config.allow_origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_normalized() {
        assert_eq!(parse_method("GET"), Some(Method::GET));
        assert_eq!(parse_method(" get "), Some(Method::GET));
        assert_eq!(parse_method("Options"), Some(Method::OPTIONS));
    }

    #[test]
    fn blank_or_malformed_methods_are_rejected() {
        assert_eq!(parse_method(""), None);
        assert_eq!(parse_method("   "), None);
        assert_eq!(parse_method("GE T"), None);
    }
}
