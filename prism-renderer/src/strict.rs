//! Strict truthiness for conditions.
//!
//! Tera raises on an undefined variable printed with `{{ }}`, but a bare
//! variable used as a condition (`{% if name %}`, `a and name`, `not name`)
//! is looked up leniently and an undefined one counts as false. After a
//! template is parsed, every such condition is rewritten into a call to
//! [`TRUTHY_FN`]. The call evaluates its argument with normal lookup rules,
//! so an undefined variable becomes a render error while defined values keep
//! their usual truthiness.
//!
//! Explicit guards are untouched: `name is defined`, `name is undefined` and
//! `name | default(value=...)` still accept an undefined `name`.

use std::collections::HashMap;
use std::mem;

use serde_json::Value;
use tera::ast::{Expr, ExprVal, FunctionCall, LogicOperator, Node};
use tera::Tera;

/// Function injected in place of lenient conditions.
pub(crate) const TRUTHY_FN: &str = "strict_truthy";

const VALUE_ARG: &str = "value";
/// Tera's whole-context dump variable; always defined.
const CONTEXT_DUMP: &str = "__tera_context";

/// Register [`TRUTHY_FN`] and rewrite every template loaded into `tera`.
pub(crate) fn install(tera: &mut Tera) {
    tera.register_function(TRUTHY_FN, truthy);
    for template in tera.templates.values_mut() {
        rewrite_nodes(&mut template.ast);
        for definition in template.macros.values_mut() {
            for default in definition.args.values_mut().flatten() {
                rewrite_expr(default, false);
            }
            rewrite_nodes(&mut definition.body);
        }
        for chain in template.blocks_definitions.values_mut() {
            for (_, block) in chain.iter_mut() {
                rewrite_nodes(&mut block.body);
            }
        }
    }
}

fn truthy(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let value = args
        .get(VALUE_ARG)
        .ok_or_else(|| tera::Error::msg(format!("`{TRUTHY_FN}` requires a `{VALUE_ARG}` argument")))?;
    Ok(Value::Bool(is_truthy(value)))
}

/// Tera's truthiness rules.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn rewrite_nodes(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => rewrite_expr(expr, false),
            Node::Set(_, set) => rewrite_expr(&mut set.value, false),
            Node::FilterSection(_, section, _) => {
                rewrite_call(&mut section.filter);
                rewrite_nodes(&mut section.body);
            }
            Node::Block(_, block, _) => rewrite_nodes(&mut block.body),
            Node::Forloop(_, forloop, _) => {
                rewrite_expr(&mut forloop.container, false);
                rewrite_nodes(&mut forloop.body);
                if let Some(body) = forloop.empty_body.as_mut() {
                    rewrite_nodes(body);
                }
            }
            Node::If(branches, _) => {
                for (_, condition, body) in branches.conditions.iter_mut() {
                    rewrite_expr(condition, true);
                    rewrite_nodes(body);
                }
                if let Some((_, body)) = branches.otherwise.as_mut() {
                    rewrite_nodes(body);
                }
            }
            Node::MacroDefinition(_, definition, _) => rewrite_nodes(&mut definition.body),
            _ => {}
        }
    }
}

/// `condition` is true when Tera evaluates `expr` for its truthiness.
fn rewrite_expr(expr: &mut Expr, condition: bool) {
    for filter in expr.filters.iter_mut() {
        rewrite_call(filter);
    }

    let lenient_lookup = matches!(&expr.val, ExprVal::Ident(name) if name != CONTEXT_DUMP)
        && (condition || expr.negated);
    if lenient_lookup {
        wrap_in_truthy(expr);
        return;
    }

    match &mut expr.val {
        ExprVal::Logic(logic) => {
            let operands_are_conditions =
                matches!(logic.operator, LogicOperator::And | LogicOperator::Or);
            rewrite_expr(&mut logic.lhs, operands_are_conditions);
            rewrite_expr(&mut logic.rhs, operands_are_conditions);
        }
        ExprVal::Math(math) => {
            rewrite_expr(&mut math.lhs, false);
            rewrite_expr(&mut math.rhs, false);
        }
        ExprVal::In(membership) => {
            rewrite_expr(&mut membership.lhs, false);
            rewrite_expr(&mut membership.rhs, false);
        }
        ExprVal::Test(test) => {
            for arg in test.args.iter_mut() {
                rewrite_expr(arg, false);
            }
        }
        ExprVal::FunctionCall(call) => rewrite_call(call),
        ExprVal::MacroCall(call) => {
            for arg in call.args.values_mut() {
                rewrite_expr(arg, false);
            }
        }
        ExprVal::Array(items) => {
            for item in items.iter_mut() {
                rewrite_expr(item, false);
            }
        }
        _ => {}
    }
}

fn rewrite_call(call: &mut FunctionCall) {
    for arg in call.args.values_mut() {
        rewrite_expr(arg, false);
    }
}

/// `name | f` becomes `strict_truthy(value=name | f)`. Negation stays on the
/// outer expression.
fn wrap_in_truthy(expr: &mut Expr) {
    let inner = Expr {
        val: mem::replace(&mut expr.val, ExprVal::Bool(false)),
        negated: false,
        filters: mem::take(&mut expr.filters),
    };
    let mut args = HashMap::new();
    args.insert(VALUE_ARG.to_string(), inner);
    expr.val = ExprVal::FunctionCall(FunctionCall {
        name: TRUTHY_FN.to_string(),
        args,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, ctx: Value) -> tera::Result<String> {
        let mut tera = Tera::default();
        tera.add_raw_template("t", source)?;
        install(&mut tera);
        tera.render("t", &tera::Context::from_value(ctx)?)
    }

    #[test]
    fn undefined_condition_is_an_error() {
        assert!(render("{% if missing %}y{% else %}n{% endif %}", json!({})).is_err());
    }

    #[test]
    fn undefined_negated_condition_is_an_error() {
        assert!(render("{% if not missing %}y{% endif %}", json!({})).is_err());
        assert!(render("{{ not missing }}", json!({})).is_err());
    }

    #[test]
    fn undefined_operand_of_and_is_an_error() {
        let err = render("{% if on and missing %}y{% endif %}", json!({"on": true}));
        assert!(err.is_err());
    }

    #[test]
    fn short_circuit_skips_unevaluated_operand() {
        let out = render("{% if on and missing %}y{% else %}n{% endif %}", json!({"on": false}));
        assert_eq!(out.unwrap(), "n");
    }

    #[test]
    fn defined_values_keep_truthiness() {
        let ctx = json!({"t": "x", "f": "", "zero": 0, "list": [1], "empty": []});
        let out = render(
            "{% if t %}1{% endif %}{% if f %}2{% endif %}{% if zero %}3{% endif %}\
             {% if list %}4{% endif %}{% if empty %}5{% endif %}{% if not f %}6{% endif %}",
            ctx,
        );
        assert_eq!(out.unwrap(), "146");
    }

    #[test]
    fn explicit_guards_accept_undefined() {
        let out = render(
            "{% if missing is defined %}a{% endif %}\
             {% if missing | default(value=false) %}b{% else %}c{% endif %}",
            json!({}),
        );
        assert_eq!(out.unwrap(), "c");
    }

    #[test]
    fn filtered_condition_uses_filtered_value() {
        let out = render(
            "{% if items | length > 1 %}many{% endif %}{% if items | length %}some{% endif %}",
            json!({"items": [1]}),
        );
        assert_eq!(out.unwrap(), "some");
    }

    #[test]
    fn loop_variables_are_defined() {
        let out = render(
            "{% for i in items %}{% if loop.first %}[{% endif %}{{ i }}{% endfor %}",
            json!({"items": [1, 2]}),
        );
        assert_eq!(out.unwrap(), "[12");
    }

    #[test]
    fn conditions_inside_blocks_are_strict() {
        let source = "{% block b %}{% if missing %}y{% endif %}{% endblock b %}";
        assert!(render(source, json!({})).is_err());
    }
}
