//! The CEL environment templates are compiled and evaluated in

use super::{EvalError, EvaluationContext, strings};
use cel_interpreter::objects::Map;
use cel_interpreter::{Context, Program, Value};
use cel_parser::Parser;
use cel_parser::ast::{EntryExpr, Expr, IdedEntryExpr, IdedExpr, operators};
use std::collections::HashMap;
use std::sync::Arc;

const LOG_TARGET: &str = "      expr";

/// The single variable templates may reference
pub const BODY_VARIABLE: &str = "body";

/// Functions provided by the CEL standard library
const STANDARD_FUNCTIONS: &[&str] = &[
    "bytes",
    "contains",
    "double",
    "duration",
    "endsWith",
    "getDate",
    "getDayOfMonth",
    "getDayOfWeek",
    "getDayOfYear",
    "getFullYear",
    "getHours",
    "getMilliseconds",
    "getMinutes",
    "getMonth",
    "getSeconds",
    "int",
    "matches",
    "max",
    "min",
    "size",
    "startsWith",
    "string",
    "timestamp",
    "uint",
];

/// Operators the interpreter evaluates, as they appear in the parsed expression
const OPERATORS: &[&str] = &[
    operators::ADD,
    operators::SUBSTRACT,
    operators::MULTIPLY,
    operators::DIVIDE,
    operators::MODULO,
    operators::NEGATE,
    operators::EQUALS,
    operators::NOT_EQUALS,
    operators::LESS,
    operators::LESS_EQUALS,
    operators::GREATER,
    operators::GREATER_EQUALS,
    operators::LOGICAL_AND,
    operators::LOGICAL_OR,
    operators::LOGICAL_NOT,
    operators::CONDITIONAL,
    operators::INDEX,
    operators::IN,
    operators::NOT_STRICTLY_FALSE,
];

/// Template expressions that produce an empty string without being evaluated
const EMPTY_SENTINELS: &[&str] = &["", "''"];

/// Compiles and evaluates CEL expressions
///
/// The environment declares one variable, `body`, and the string extension
/// functions. Building it registers every function, so create it once per run
/// and evaluate all templates against the same instance.
pub struct Environment {
    root: Context<'static>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        let mut root = Context::default();
        strings::register(&mut root);
        Self { root }
    }

    /// Parse and check an expression
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Compile`] if the expression does not parse and
    /// [`EvalError::Check`] if it references anything the environment does not declare
    pub fn compile(&self, expression: &str) -> Result<CompiledExpression, EvalError> {
        let compile_error = |message: String| EvalError::Compile {
            expression: expression.to_string(),
            message,
        };

        let program = Program::compile(expression).map_err(|e| compile_error(e.to_string()))?;
        let parsed = Parser::default().parse(expression).map_err(|e| compile_error(e.to_string()))?;

        let mut checker = Checker {
            expression,
            bound: vec![BODY_VARIABLE],
        };
        checker.check(&parsed)?;

        Ok(CompiledExpression {
            expression: expression.to_string(),
            program,
        })
    }

    /// Bind an evaluation context so expressions can be run against it
    #[must_use]
    pub fn activate(&self, context: &EvaluationContext) -> Activation<'_> {
        let mut scope = self.root.new_inner_scope();
        scope.add_variable_from_value(BODY_VARIABLE, convert_json_map(context.body()));
        Activation { environment: self, scope }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}

/// Static checks performed after parsing
///
/// Every identifier must be `body` or a variable bound by an enclosing
/// comprehension (`all`, `exists`, `exists_one`, `filter`, `map`). Every call
/// must name an operator or a function the environment provides, and
/// namespaced functions must be called through their namespace.
struct Checker<'a> {
    expression: &'a str,
    bound: Vec<&'a str>,
}

impl<'a> Checker<'a> {
    fn check(&mut self, expr: &'a IdedExpr) -> Result<(), EvalError> {
        match &expr.expr {
            Expr::Unspecified | Expr::Literal(_) => Ok(()),

            // names starting with '@' are accumulators introduced by macro expansion
            Expr::Ident(name) => {
                if name.starts_with('@') || self.bound.contains(&name.as_str()) {
                    Ok(())
                } else {
                    Err(self.error(format!("undeclared reference to '{name}'")))
                }
            }

            Expr::Call(call) => {
                let name = call.func_name.as_str();
                if !OPERATORS.contains(&name) && !STANDARD_FUNCTIONS.contains(&name) && !strings::FUNCTIONS.contains(&name) {
                    return Err(self.error(format!("undeclared reference to function '{name}'")));
                }

                let namespaced = call.target.as_deref().is_some_and(is_strings_namespace);
                if strings::NAMESPACED_FUNCTIONS.contains(&name) {
                    if !namespaced {
                        return Err(self.error(format!(
                            "function '{name}' must be called as '{}.{name}'",
                            strings::NAMESPACE
                        )));
                    }
                } else if let Some(target) = &call.target {
                    self.check(target)?;
                }

                call.args.iter().try_for_each(|arg| self.check(arg))
            }

            Expr::Comprehension(comprehension) => {
                self.check(&comprehension.iter_range)?;
                self.check(&comprehension.accu_init)?;

                let depth = self.bound.len();
                self.bound.push(&comprehension.iter_var);
                if let Some(second) = &comprehension.iter_var2 {
                    self.bound.push(second);
                }
                self.bound.push(&comprehension.accu_var);

                let result = self
                    .check(&comprehension.loop_cond)
                    .and_then(|()| self.check(&comprehension.loop_step))
                    .and_then(|()| self.check(&comprehension.result));

                self.bound.truncate(depth);
                result
            }

            Expr::List(list) => list.elements.iter().try_for_each(|element| self.check(element)),
            Expr::Map(map) => map.entries.iter().try_for_each(|entry| self.check_entry(entry)),
            Expr::Select(select) => self.check(&select.operand),

            // the interpreter cannot evaluate message construction
            Expr::Struct(structure) => Err(self.error(format!("unsupported message construction '{}'", structure.type_name))),
        }
    }

    fn check_entry(&mut self, entry: &'a IdedEntryExpr) -> Result<(), EvalError> {
        match &entry.expr {
            EntryExpr::StructField(field) => self.check(&field.value),
            EntryExpr::MapEntry(map_entry) => {
                self.check(&map_entry.key)?;
                self.check(&map_entry.value)
            }
        }
    }

    fn error(&self, message: String) -> EvalError {
        EvalError::Check {
            expression: self.expression.to_string(),
            message,
        }
    }
}

fn is_strings_namespace(target: &IdedExpr) -> bool {
    matches!(&target.expr, Expr::Ident(name) if name == strings::NAMESPACE)
}

/// An expression that parsed and passed checking
#[derive(Debug)]
pub struct CompiledExpression {
    expression: String,
    program: Program,
}

impl CompiledExpression {
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Execute against an activation
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Runtime`] if execution fails
    pub fn run(&self, activation: &Activation<'_>) -> Result<Value, EvalError> {
        self.program.execute(&activation.scope).map_err(|e| EvalError::Runtime {
            expression: self.expression.clone(),
            message: e.to_string(),
        })
    }
}

/// An environment with `body` bound to a particular evaluation context
pub struct Activation<'env> {
    environment: &'env Environment,
    scope: Context<'env>,
}

impl Activation<'_> {
    /// Compile and run an expression
    ///
    /// # Errors
    ///
    /// Returns an error if the expression fails to compile, check, or run
    pub fn evaluate(&self, expression: &str) -> Result<Value, EvalError> {
        self.environment.compile(expression)?.run(self)
    }

    /// Evaluate a template to a string
    ///
    /// The template is trimmed first. An empty template or the empty-quote
    /// template `''` yields an empty string without touching the CEL engine.
    /// Any other template must evaluate to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails or the result is not a string
    pub fn eval_string(&self, template: &str) -> Result<String, EvalError> {
        let expression = template.trim();
        if EMPTY_SENTINELS.contains(&expression) {
            return Ok(String::new());
        }

        match self.evaluate(expression) {
            Ok(Value::String(s)) => Ok(s.to_string()),
            Ok(other) => {
                log::error!(target: LOG_TARGET, "Expression '{expression}' did not evaluate to a string, got '{other:?}'");
                Err(EvalError::TypeMismatch {
                    expression: expression.to_string(),
                    found: format!("{other:?}"),
                })
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Could not evaluate expression '{expression}': {e}");
                Err(e)
            }
        }
    }
}

impl core::fmt::Debug for Activation<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Activation").finish_non_exhaustive()
    }
}

/// Returns `true` if the template short-circuits to an empty string
#[must_use]
pub fn is_empty_sentinel(template: &str) -> bool {
    EMPTY_SENTINELS.contains(&template.trim())
}

fn convert_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Value {
    let fields: HashMap<Arc<String>, Value> = map
        .iter()
        .map(|(k, v)| (Arc::new(k.clone()), convert_json_value(v)))
        .collect();
    Value::Map(Map::from(fields))
}

/// Convert a JSON value to a CEL value
fn convert_json_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(Arc::new(s.clone())),
        serde_json::Value::Array(items) => Value::List(Arc::new(items.iter().map(convert_json_value).collect())),
        serde_json::Value::Object(map) => convert_json_map(map),
    }
}
