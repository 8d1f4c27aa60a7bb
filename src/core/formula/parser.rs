//! Formula parser
//!
//! Converts a sequence of tokens into an Abstract Syntax Tree (AST).
//! Uses recursive descent parsing with operator precedence.

use super::tokenizer::Token;
use rust_decimal::Decimal;

/// Abstract Syntax Tree node for formula expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal
    Number(Decimal),
    /// A string literal
    Text(String),
    /// A reference resolved against the evaluation scope. Dotted node
    /// references (NodeOne.minP) are looked up as a single flat key.
    Reference(String),
    /// Function call: NAME(arg1, arg2, ...)
    FunctionCall { name: String, args: Vec<Expr> },
    /// Binary operation: left op right
    BinaryOp {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation: -expr
    UnaryOp { op: String, operand: Box<Expr> },
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parser for formula tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the tokens into an AST
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("Empty expression", 0));
        }
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", self.peek()),
                self.position,
            ));
        }

        Ok(expr)
    }

    /// Check if we've consumed all tokens
    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Peek at the current token
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Advance to the next token and return the current
    fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.tokens.get(self.position - 1)
    }

    /// Check if current token matches and consume it
    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check if current token is an operator with given value
    fn match_operator(&mut self, op: &str) -> bool {
        if let Some(Token::Operator(s)) = self.peek() {
            if s == op {
                self.advance();
                return true;
            }
        }
        false
    }

    /// Check if current token is any of the given operators
    fn match_any_operator(&mut self, ops: &[&str]) -> Option<String> {
        if let Some(Token::Operator(s)) = self.peek() {
            if ops.contains(&s.as_str()) {
                let op = s.clone();
                self.advance();
                return Some(op);
            }
        }
        None
    }

    /// Expression: comparison
    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.comparison()
    }

    /// Comparison: term (( "=" | "<>" | "<" | ">" | "<=" | ">=" ) term)*
    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;

        while let Some(op) = self.match_any_operator(&["=", "<>", "<", ">", "<=", ">="]) {
            let right = self.term()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Term: factor (( "+" | "-" ) factor)*
    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;

        while let Some(op) = self.match_any_operator(&["+", "-"]) {
            let right = self.factor()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Factor: power (( "*" | "/" ) power)*
    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.power()?;

        while let Some(op) = self.match_any_operator(&["*", "/"]) {
            let right = self.power()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Power: unary ( "^" power )?   (right-associative)
    fn power(&mut self) -> Result<Expr, ParseError> {
        let left = self.unary()?;

        if self.match_operator("^") {
            let right = self.power()?; // right-associative
            Ok(Expr::BinaryOp {
                op: "^".to_string(),
                left: Box::new(left),
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    /// Unary: ( "-" ) unary | call
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_operator("-") {
            let operand = self.unary()?;
            Ok(Expr::UnaryOp {
                op: "-".to_string(),
                operand: Box::new(operand),
            })
        } else {
            self.call()
        }
    }

    /// Call: primary ( "(" arguments? ")" )?
    ///
    /// Only a named reference may be called; the grammar has no
    /// first-class function values.
    fn call(&mut self) -> Result<Expr, ParseError> {
        let expr = self.primary()?;

        if self.match_token(&Token::OpenParen) {
            let args = self.arguments()?;
            if !self.match_token(&Token::CloseParen) {
                return Err(ParseError::new(
                    "Expected ')' after function arguments",
                    self.position,
                ));
            }

            match expr {
                Expr::Reference(name) => Ok(Expr::FunctionCall { name, args }),
                _ => Err(ParseError::new(
                    "Only a function name may be called",
                    self.position,
                )),
            }
        } else {
            Ok(expr)
        }
    }

    /// Arguments: ( expr ( "," expr )* )?
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        // Check for empty argument list
        if let Some(Token::CloseParen) = self.peek() {
            return Ok(args);
        }

        // First argument
        args.push(self.expression()?);

        // Remaining arguments
        while self.match_token(&Token::Comma) {
            args.push(self.expression()?);
        }

        Ok(args)
    }

    /// Primary: NUMBER | STRING | IDENTIFIER | "(" expr ")"
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().cloned();

        match token {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::Text(s)) => {
                self.advance();
                Ok(Expr::Text(s))
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                Ok(Expr::Reference(name))
            }
            Some(Token::OpenParen) => {
                self.advance();
                let expr = self.expression()?;
                if !self.match_token(&Token::CloseParen) {
                    return Err(ParseError::new(
                        "Expected ')' after expression",
                        self.position,
                    ));
                }
                Ok(expr)
            }
            Some(token) => Err(ParseError::new(
                format!("Unexpected token: {:?}", token),
                self.position,
            )),
            None => Err(ParseError::new(
                "Unexpected end of expression",
                self.position,
            )),
        }
    }
}

/// Convenience function to parse tokens into an AST
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formula::tokenizer::tokenize;

    /// Helper to parse a formula string directly
    fn parse_formula(formula: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(formula).map_err(|e| ParseError::new(e.message, e.position))?;
        parse(tokens)
    }

    fn num(s: &str) -> Expr {
        Expr::Number(s.parse().unwrap())
    }

    #[test]
    fn test_parse_number() {
        let expr = parse_formula("42").unwrap();
        assert_eq!(expr, num("42"));
    }

    #[test]
    fn test_parse_negative_number() {
        let expr = parse_formula("-42").unwrap();
        assert_eq!(
            expr,
            Expr::UnaryOp {
                op: "-".to_string(),
                operand: Box::new(num("42")),
            }
        );
    }

    #[test]
    fn test_parse_string() {
        let expr = parse_formula("\"hello\"").unwrap();
        assert_eq!(expr, Expr::Text("hello".to_string()));
    }

    #[test]
    fn test_parse_reference() {
        let expr = parse_formula("var_minP").unwrap();
        assert_eq!(expr, Expr::Reference("var_minP".to_string()));
    }

    #[test]
    fn test_parse_dotted_reference_is_flat() {
        let expr = parse_formula("NodeOne.minP").unwrap();
        assert_eq!(expr, Expr::Reference("NodeOne.minP".to_string()));
    }

    #[test]
    fn test_parse_operator_precedence_mul_over_add() {
        // a + b * c should be a + (b * c)
        let expr = parse_formula("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: "+".to_string(),
                left: Box::new(Expr::Reference("a".to_string())),
                right: Box::new(Expr::BinaryOp {
                    op: "*".to_string(),
                    left: Box::new(Expr::Reference("b".to_string())),
                    right: Box::new(Expr::Reference("c".to_string())),
                }),
            }
        );
    }

    #[test]
    fn test_parse_operator_precedence_power() {
        // 2 ^ 3 ^ 2 should be 2 ^ (3 ^ 2) (right-associative)
        let expr = parse_formula("2 ^ 3 ^ 2").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: "^".to_string(),
                left: Box::new(num("2")),
                right: Box::new(Expr::BinaryOp {
                    op: "^".to_string(),
                    left: Box::new(num("3")),
                    right: Box::new(num("2")),
                }),
            }
        );
    }

    #[test]
    fn test_parse_parentheses() {
        // (a + b) * c
        let expr = parse_formula("(a + b) * c").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: "*".to_string(),
                left: Box::new(Expr::BinaryOp {
                    op: "+".to_string(),
                    left: Box::new(Expr::Reference("a".to_string())),
                    right: Box::new(Expr::Reference("b".to_string())),
                }),
                right: Box::new(Expr::Reference("c".to_string())),
            }
        );
    }

    #[test]
    fn test_parse_function_call_multiple_args() {
        let expr = parse_formula("ROUND(value, 2)").unwrap();
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "ROUND".to_string(),
                args: vec![Expr::Reference("value".to_string()), num("2")],
            }
        );
    }

    #[test]
    fn test_parse_nested_function_calls() {
        let expr = parse_formula("ROUND(MAX(a, b), 2)").unwrap();
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "ROUND".to_string(),
                args: vec![
                    Expr::FunctionCall {
                        name: "MAX".to_string(),
                        args: vec![
                            Expr::Reference("a".to_string()),
                            Expr::Reference("b".to_string()),
                        ],
                    },
                    num("2"),
                ],
            }
        );
    }

    #[test]
    fn test_parse_if_expression() {
        let expr = parse_formula("IF(x > 10, \"yes\", \"no\")").unwrap();
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "IF".to_string(),
                args: vec![
                    Expr::BinaryOp {
                        op: ">".to_string(),
                        left: Box::new(Expr::Reference("x".to_string())),
                        right: Box::new(num("10")),
                    },
                    Expr::Text("yes".to_string()),
                    Expr::Text("no".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_parse_unary_minus_in_expression() {
        let expr = parse_formula("a + -b").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: "+".to_string(),
                left: Box::new(Expr::Reference("a".to_string())),
                right: Box::new(Expr::UnaryOp {
                    op: "-".to_string(),
                    operand: Box::new(Expr::Reference("b".to_string())),
                }),
            }
        );
    }

    #[test]
    fn test_parse_error_empty() {
        let result = parse_formula("");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_missing_close_paren() {
        let result = parse_formula("MAX(a, b");
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("')'"));
    }

    #[test]
    fn test_parse_error_trailing_tokens() {
        let result = parse_formula("1/0_invalid_token");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_calling_non_function() {
        let result = parse_formula("(a + b)(c)");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_with_formula_prefix() {
        // Leading = should be stripped by the tokenizer
        let expr = parse_formula("=price * 1.1").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: "*".to_string(),
                left: Box::new(Expr::Reference("price".to_string())),
                right: Box::new(num("1.1")),
            }
        );
    }
}
