use crate::generator::error::GenError;
use crate::lexer::{Literal, Token, TokenKind};
use crate::parser::{Expr, ExprVisitor, Stmt, StmtVisitor};

/// Function names rewritten to calls against host event-handler APIs
/// instead of emitted as ordinary top-level functions.
const RESERVED_EVENT_HANDLERS: [&str; 3] = ["_forever", "_on_collision", "_on_clone_start"];

/// A folded compile-time constant. `None` elsewhere in this module stands
/// for the evaluator's "unknown" result (its null/undefined case) — any
/// expression shape the evaluator can't reduce, or a `Binary`/`Unary` whose
/// operand didn't itself fold to a number.
#[derive(Debug, Clone, PartialEq)]
enum ConstValue {
    Number(f64),
    String(String),
    Bool(bool),
}

impl ConstValue {
    /// Mirrors the host `value.toString()` call the design's return-folding
    /// rule invokes: a folded string renders as its raw contents, with no
    /// surrounding quotes — unlike a `Literal` string emitted in the normal
    /// (non-folded) expression path, which does get quoted. This asymmetry
    /// is a property of the original return-folding rule, not an oversight.
    fn to_js_string(&self) -> String {
        match self {
            ConstValue::Number(n) => format_number(*n),
            ConstValue::String(s) => s.clone(),
            ConstValue::Bool(b) => b.to_string(),
        }
    }
}

/// Walks an AST and emits target source text. Performs the one mid-end
/// transformation this transpiler does: constant folding of arithmetic on
/// `return` values, plus the event-handler identifier rewrite.
#[derive(Default)]
pub struct Generator;

impl Generator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&mut self, statements: &[Stmt]) -> Result<String, GenError> {
        let lines = statements
            .iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Result<Vec<String>, GenError>>()?;
        Ok(lines.join("\n"))
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<String, GenError> {
        expr.accept(self)
    }
}

/// Pure, total constant evaluator. Only ever consulted at a `Return` site —
/// folding is deliberately not generalized to every expression position
/// (see the design notes on scope).
fn fold_constant(expr: &Expr) -> Option<ConstValue> {
    match expr {
        Expr::Literal { value } => match value {
            Literal::Number(n) => Some(ConstValue::Number(*n)),
            Literal::String(s) => Some(ConstValue::String(s.clone())),
            Literal::Bool(b) => Some(ConstValue::Bool(*b)),
            Literal::Nil => None,
        },
        Expr::Binary {
            left,
            operator,
            right,
        } => {
            let (Some(ConstValue::Number(a)), Some(ConstValue::Number(b))) =
                (fold_constant(left), fold_constant(right))
            else {
                return None;
            };
            match operator.kind {
                TokenKind::Plus => Some(ConstValue::Number(a + b)),
                TokenKind::Minus => Some(ConstValue::Number(a - b)),
                TokenKind::Multiply => Some(ConstValue::Number(a * b)),
                // floating-point division with no divide-by-zero special case:
                // this follows the host's own ±inf/NaN rules through to the
                // stringified output, by design (see the design notes).
                TokenKind::Divide => Some(ConstValue::Number(a / b)),
                _ => None,
            }
        }
        Expr::Unary { operator, right } if operator.kind == TokenKind::Minus => {
            match fold_constant(right) {
                Some(ConstValue::Number(n)) => Some(ConstValue::Number(-n)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Renders a number the way the target language's `Number.prototype.toString`
/// would: no trailing `.0` for integral values, `NaN`/`Infinity` spelled out.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// lowercase, split on runs of space/hyphen/underscore, keep the first word
/// as-is and title-case the rest, then join with no separator.
fn camel_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut words = lower
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|w| !w.is_empty());

    let mut result = match words.next() {
        Some(first) => first.to_string(),
        None => return String::new(),
    };

    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.push(first.to_ascii_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

fn reserved_event_handler_name(name: &str) -> Option<String> {
    if RESERVED_EVENT_HANDLERS.contains(&name) {
        let stripped = name.strip_prefix('_').unwrap_or(name);
        Some(camel_case(stripped))
    } else {
        None
    }
}

impl ExprVisitor<Result<String, GenError>> for Generator {
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<String, GenError> {
        let l = self.emit_expr(left)?;
        let r = self.emit_expr(right)?;
        let symbol = match operator.kind {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Multiply => "*",
            TokenKind::Divide => "/",
            _ => {
                return Err(GenError::UnknownBinaryOperator {
                    lexeme: operator.lexeme.clone(),
                });
            }
        };
        Ok(format!("({l} {symbol} {r})"))
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<String, GenError> {
        let r = self.emit_expr(right)?;
        match operator.kind {
            TokenKind::Minus => Ok(format!("(-{r})")),
            _ => Err(GenError::UnknownUnaryOperator {
                lexeme: operator.lexeme.clone(),
            }),
        }
    }

    fn visit_literal(&mut self, value: &Literal) -> Result<String, GenError> {
        Ok(match value {
            Literal::Nil => "null".to_string(),
            Literal::Number(n) => format_number(*n),
            Literal::String(s) => format!("\"{s}\""),
            Literal::Bool(b) => b.to_string(),
        })
    }

    fn visit_variable(&mut self, name: &Token) -> Result<String, GenError> {
        Ok(name.lexeme.clone())
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, args: &[Expr]) -> Result<String, GenError> {
        let callee_text = self.emit_expr(callee)?;
        let mut arg_texts = Vec::with_capacity(args.len());
        for arg in args {
            arg_texts.push(self.emit_expr(arg)?);
        }
        Ok(format!("{callee_text}({})", arg_texts.join(", ")))
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> Result<String, GenError> {
        let object_text = self.emit_expr(object)?;
        Ok(format!("{object_text}.{}", name.lexeme))
    }

    fn visit_assign(&mut self, name: &Token, value: &Expr) -> Result<String, GenError> {
        let value_text = self.emit_expr(value)?;
        Ok(format!("{} = {value_text}", name.lexeme))
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<String, GenError> {
        let object_text = self.emit_expr(object)?;
        let value_text = self.emit_expr(value)?;
        Ok(format!("{object_text}.{} = {value_text}", name.lexeme))
    }
}

impl StmtVisitor<Result<String, GenError>> for Generator {
    fn visit_var(&mut self, name: &Token, initializer: &Expr) -> Result<String, GenError> {
        let init_text = self.emit_expr(initializer)?;
        Ok(format!("let {}: any = {init_text};", name.lexeme))
    }

    fn visit_expression(&mut self, expression: &Expr) -> Result<String, GenError> {
        let expr_text = self.emit_expr(expression)?;
        Ok(format!("{expr_text};"))
    }

    fn visit_print(&mut self, expression: &Expr) -> Result<String, GenError> {
        let expr_text = self.emit_expr(expression)?;
        Ok(format!("console.log({expr_text});"))
    }

    fn visit_function(&mut self, name: &Token, params: &[Token], body: &[Stmt]) -> Result<String, GenError> {
        let params_text = params
            .iter()
            .map(|p| format!("{}: any", p.lexeme))
            .collect::<Vec<_>>()
            .join(", ");

        let mut body_lines = Vec::with_capacity(body.len());
        for stmt in body {
            body_lines.push(format!("  {}", stmt.accept(self)?));
        }
        let body_text = body_lines.join("\n");

        if let Some(rewritten) = reserved_event_handler_name(&name.lexeme) {
            log::trace!("rewriting event handler '{}' to '{rewritten}'", name.lexeme);
            Ok(format!("{rewritten}(({params_text}) => {{\n{body_text}\n}})"))
        } else {
            Ok(format!(
                "function {}({params_text}) {{\n{body_text}\n}}",
                name.lexeme
            ))
        }
    }

    fn visit_return(&mut self, _keyword: &Token, value: Option<&Expr>) -> Result<String, GenError> {
        let Some(expr) = value else {
            return Ok("return;".to_string());
        };

        match fold_constant(expr) {
            Some(folded) => {
                log::debug!("folded return expression to constant {folded:?}");
                Ok(format!("return {};", folded.to_js_string()))
            }
            None => {
                let expr_text = self.emit_expr(expr)?;
                Ok(format!("return {expr_text};"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn transpile(src: &str) -> String {
        let tokens = Lexer::new(src).scan_tokens().expect("lexing should succeed");
        let stmts = Parser::new(tokens).parse().expect("parsing should succeed");
        Generator::new()
            .generate(&stmts)
            .expect("generation should succeed")
    }

    #[test]
    fn var_decl_with_constant_arithmetic() {
        assert_eq!(transpile("var x = 1 + 2"), "let x: any = (1 + 2);");
    }

    #[test]
    fn var_decl_without_initializer() {
        assert_eq!(transpile("var y"), "let y: any = null;");
    }

    #[test]
    fn print_of_member_access() {
        assert_eq!(transpile("print(a.b)"), "console.log(a.b);");
    }

    #[test]
    fn function_return_folds_constant_arithmetic() {
        assert_eq!(
            transpile("func add(a, b) return 1 + 2 end"),
            "function add(a: any, b: any) {\n  return 3;\n}"
        );
    }

    #[test]
    fn function_return_of_variables_is_not_folded() {
        assert_eq!(
            transpile("func add(a, b) return a + b end"),
            "function add(a: any, b: any) {\n  return (a + b);\n}"
        );
    }

    #[test]
    fn on_collision_is_rewritten_to_host_handler_call() {
        assert_eq!(
            transpile("func _on_collision(o) print(o) end"),
            "onCollision((o: any) => {\n  console.log(o);\n})"
        );
    }

    #[test]
    fn forever_and_on_clone_start_are_rewritten() {
        assert_eq!(
            transpile("func _forever() print(1) end"),
            "forever(() => {\n  console.log(1);\n})"
        );
        assert_eq!(
            transpile("func _on_clone_start() print(1) end"),
            "onCloneStart(() => {\n  console.log(1);\n})"
        );
    }

    #[test]
    fn compound_plus_equal_emits_reassignment() {
        assert_eq!(transpile("x += 5"), "x = (x + 5);");
    }

    #[test]
    fn every_binary_and_unary_is_parenthesized() {
        assert_eq!(transpile("print(1 + 2 * 3)"), "console.log((1 + (2 * 3)));");
        assert_eq!(transpile("print(-1)"), "console.log((-1));");
    }

    #[test]
    fn return_bare_literal_string_folds_without_quotes() {
        // the constant evaluator returns a plain Literal(string) as-is, and
        // that's "neither null nor undefined" so the return-folding rule
        // still fires — the string comes out unquoted, unlike the normal
        // (non-folded) string emission path.
        assert_eq!(
            transpile("func f() return \"hi\" end"),
            "function f() {\n  return hi;\n}"
        );
    }

    #[test]
    fn string_literal_in_ordinary_position_is_quoted() {
        assert_eq!(transpile("print(\"hi\")"), "console.log(\"hi\");");
    }

    #[test]
    fn division_by_zero_folds_to_infinity() {
        assert_eq!(
            transpile("func f() return 1 / 0 end"),
            "function f() {\n  return Infinity;\n}"
        );
    }

    #[test]
    fn return_with_no_value_emits_bare_return() {
        assert_eq!(transpile("func f() return end"), "function f() {\n  return;\n}");
    }

    #[test]
    fn top_level_statements_join_with_newline_no_trailing() {
        let out = transpile("var x = 1\nvar y = 2");
        assert_eq!(out, "let x: any = 1;\nlet y: any = 2;");
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn camel_case_helper_matches_spec_examples() {
        assert_eq!(camel_case("on_collision"), "onCollision");
        assert_eq!(camel_case("on_clone_start"), "onCloneStart");
        assert_eq!(camel_case("forever"), "forever");
        assert_eq!(camel_case(""), "");
    }
}
