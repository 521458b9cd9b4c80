//! Template context — conversion of a [`VariableScope`] into the engine's
//! rendering payload.

use prism_core::VariableScope;

/// Build a [`tera::Context`] exposing every scope key as a top-level variable.
///
/// Values are passed through unchanged, so nested objects and arrays stay
/// addressable with dotted and indexed access (`{{ db.host }}`,
/// `{{ hosts[0] }}`).
pub fn to_tera_context(scope: &VariableScope) -> tera::Context {
    let mut ctx = tera::Context::new();
    for (key, value) in scope.iter() {
        ctx.insert(key.as_str(), value);
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_key_is_exposed() {
        let mut scope = VariableScope::new();
        scope.insert("name", "svc");
        scope.insert("db", json!({"host": "localhost", "port": 5432}));
        let ctx = to_tera_context(&scope);
        assert_eq!(ctx.get("name"), Some(&json!("svc")));
        assert_eq!(ctx.get("db"), Some(&json!({"host": "localhost", "port": 5432})));
    }

    #[test]
    fn empty_scope_gives_empty_context() {
        let ctx = to_tera_context(&VariableScope::new());
        assert!(ctx.get("anything").is_none());
    }
}
