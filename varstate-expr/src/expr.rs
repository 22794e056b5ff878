//! Condition expression parsing and evaluation.
//!
//! Conditions are boolean expressions whose references are resolved by a
//! [`Scope`]. The language supports:
//!
//! - `name` - reference in the default namespace (must yield a boolean)
//! - `ns:name` - reference in namespace `ns`
//! - `"text"`, `true`, `false`, `null` - literals
//! - `a == b`, `a != b` - equality of operands
//! - `any("pattern") == operand` - some variable matching the pattern has the value
//! - `all("pattern") == operand` - every variable matching the pattern has the value
//! - `!expr`, `expr && expr`, `expr || expr` - logic (AND binds tighter than OR)
//! - `(expr)` - grouping
//!
//! Examples:
//! - `red` - the scope's default lookup for `red` is true
//! - `LHS:mode == RHS:edit && !locked`
//! - `any("panel\\..*") == "open"`

use crate::error::ExprError;
use crate::scope::Scope;
use crate::value::Value;

/// An operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal value.
    Literal(Value),
    /// A reference resolved through the scope.
    Reference {
        namespace: Option<String>,
        name: String,
    },
}

impl Operand {
    fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Result<Value, ExprError> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Reference { namespace, name } => scope
                .resolve_variable(name, namespace.as_deref())
                .ok_or_else(|| ExprError::Unresolved {
                    namespace: namespace.clone(),
                    name: name.clone(),
                }),
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

impl CompareOp {
    fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }
}

/// Quantifier over the variables of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    All,
}

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Operand that must evaluate to a boolean.
    Operand(Operand),
    /// Comparison of two operands.
    Compare(Operand, CompareOp, Operand),
    /// Comparison of every variable matching `pattern` against an operand.
    Quantified {
        quantifier: Quantifier,
        pattern: String,
        op: CompareOp,
        operand: Operand,
    },
    /// Logical AND.
    And(Box<Expr>, Box<Expr>),
    /// Logical OR.
    Or(Box<Expr>, Box<Expr>),
    /// Logical NOT.
    Not(Box<Expr>),
}

/// Parses a condition expression.
pub fn parse(text: &str) -> Result<Expr, ExprError> {
    Expr::parse(text)
}

impl Expr {
    /// Parses a condition expression from a string.
    pub fn parse(s: &str) -> Result<Self, ExprError> {
        let mut parser = Parser::new(s);
        parser.skip_whitespace();
        if parser.at_end() {
            return Err(parser.error("empty expression"));
        }

        let expr = parser.parse_expr()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }

        tracing::trace!(expression = s, "parsed condition");
        Ok(expr)
    }

    /// Evaluates the expression against a scope.
    pub fn is_true<S: Scope + ?Sized>(&self, scope: &S) -> Result<bool, ExprError> {
        match self {
            Expr::Operand(operand) => {
                let value = operand.evaluate(scope)?;
                value.as_bool().ok_or(ExprError::TypeMismatch {
                    expected: "boolean",
                    found: value.kind(),
                })
            }
            Expr::Compare(left, op, right) => {
                let left = left.evaluate(scope)?;
                let right = right.evaluate(scope)?;
                Ok(op.apply(&left, &right))
            }
            Expr::Quantified {
                quantifier,
                pattern,
                op,
                operand,
            } => {
                let expected = operand.evaluate(scope)?;
                let variables = scope.all_variables(pattern)?;
                let mut hits = variables.iter().map(|v| op.apply(&v.value, &expected));
                Ok(match quantifier {
                    Quantifier::Any => hits.any(|hit| hit),
                    Quantifier::All => hits.all(|hit| hit),
                })
            }
            Expr::And(left, right) => Ok(left.is_true(scope)? && right.is_true(scope)?),
            Expr::Or(left, right) => Ok(left.is_true(scope)? || right.is_true(scope)?),
            Expr::Not(inner) => Ok(!inner.is_true(scope)?),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Recursive descent parser for condition expressions.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, reason: impl Into<String>) -> ExprError {
        ExprError::Syntax {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        self.skip_whitespace();

        while self.peek_str("||") {
            self.pos += 2;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        self.skip_whitespace();

        while self.peek_str("&&") {
            self.pos += 2;
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();

        if self.peek_char() == Some('!') && !self.peek_str("!=") {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();

        if self.peek_char() == Some('(') {
            self.pos += 1;
            let expr = self.parse_expr()?;
            self.skip_whitespace();
            if self.peek_char() != Some(')') {
                return Err(self.error("expected ')'"));
            }
            self.pos += 1;
            return Ok(expr);
        }

        if let Some(quantifier) = self.peek_quantifier() {
            return self.parse_quantified(quantifier);
        }

        self.parse_comparison()
    }

    /// Detects `any(` / `all(` without consuming input.
    fn peek_quantifier(&self) -> Option<Quantifier> {
        let rest = &self.input[self.pos..];
        let (quantifier, tail) = if let Some(tail) = rest.strip_prefix("any") {
            (Quantifier::Any, tail)
        } else if let Some(tail) = rest.strip_prefix("all") {
            (Quantifier::All, tail)
        } else {
            return None;
        };

        tail.trim_start().starts_with('(').then_some(quantifier)
    }

    fn parse_quantified(&mut self, quantifier: Quantifier) -> Result<Expr, ExprError> {
        // keyword is exactly three bytes
        self.pos += 3;
        self.skip_whitespace();
        self.pos += 1;
        self.skip_whitespace();

        let pattern = self.parse_string()?;
        self.skip_whitespace();
        if self.peek_char() != Some(')') {
            return Err(self.error("expected ')' after quantifier pattern"));
        }
        self.pos += 1;
        self.skip_whitespace();

        let op = self
            .parse_operator()
            .ok_or_else(|| self.error("quantifier requires '==' or '!='"))?;
        let operand = self.parse_operand()?;

        Ok(Expr::Quantified {
            quantifier,
            pattern,
            op,
            operand,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let left = self.parse_operand()?;
        self.skip_whitespace();

        match self.parse_operator() {
            Some(op) => {
                let right = self.parse_operand()?;
                Ok(Expr::Compare(left, op, right))
            }
            None => Ok(Expr::Operand(left)),
        }
    }

    fn parse_operator(&mut self) -> Option<CompareOp> {
        self.skip_whitespace();
        if self.peek_str("==") {
            self.pos += 2;
            Some(CompareOp::Eq)
        } else if self.peek_str("!=") {
            self.pos += 2;
            Some(CompareOp::Ne)
        } else {
            None
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ExprError> {
        self.skip_whitespace();

        if self.peek_char() == Some('"') {
            return Ok(Operand::Literal(Value::Str(self.parse_string()?)));
        }

        let word = self.parse_name()?;

        // ns:name
        if self.peek_char() == Some(':') {
            self.pos += 1;
            let name = self.parse_name()?;
            return Ok(Operand::Reference {
                namespace: Some(word),
                name,
            });
        }

        Ok(match word.as_str() {
            "true" => Operand::Literal(Value::Bool(true)),
            "false" => Operand::Literal(Value::Bool(false)),
            "null" => Operand::Literal(Value::Null),
            _ => Operand::Reference {
                namespace: None,
                name: word,
            },
        })
    }

    fn parse_name(&mut self) -> Result<String, ExprError> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if is_name_char(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if start == self.pos {
            return Err(match self.peek_char() {
                Some(c) => self.error(format!("unexpected character '{}'", c)),
                None => self.error("unexpected end of expression"),
            });
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, ExprError> {
        if self.peek_char() != Some('"') {
            return Err(self.error("expected string"));
        }
        self.pos += 1;

        let mut out = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return Ok(out);
            } else {
                out.push(c);
            }
        }

        Err(self.error("unterminated string"))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }
}
