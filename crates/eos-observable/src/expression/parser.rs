use eos_core::{EosError, ErrorInfo, QualifiedName};

use super::{BinaryOperator, Expression, Function, KinematicsSpecification};

pub(super) struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    pub(super) fn parse(mut self) -> Result<Expression, EosError> {
        let expression = self.sum()?;
        self.skip_whitespace();
        if self.position != self.input.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(expression)
    }

    fn error(&self, message: &str) -> EosError {
        EosError::Syntax(
            ErrorInfo::new("eos_observable.expression_syntax", message)
                .with_context("expression", self.input)
                .with_context("position", self.position.to_string()),
        )
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.position += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), EosError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    /// Consumes everything up to `terminator` and the terminator itself.
    fn until(&mut self, terminator: &str) -> Result<&'a str, EosError> {
        let rest = self.rest();
        let end = rest
            .find(terminator)
            .ok_or_else(|| self.error(&format!("missing closing '{terminator}'")))?;
        self.position += end + terminator.len();
        Ok(rest[..end].trim())
    }

    fn sum(&mut self) -> Result<Expression, EosError> {
        let mut lhs = self.product()?;
        loop {
            let operator = match self.peek() {
                Some('+') => BinaryOperator::Add,
                Some('-') => BinaryOperator::Subtract,
                _ => return Ok(lhs),
            };
            self.position += 1;
            let rhs = self.product()?;
            lhs = binary(operator, lhs, rhs);
        }
    }

    fn product(&mut self) -> Result<Expression, EosError> {
        let mut lhs = self.unary()?;
        loop {
            let operator = match self.peek() {
                Some('*') => BinaryOperator::Multiply,
                Some('/') => BinaryOperator::Divide,
                _ => return Ok(lhs),
            };
            self.position += 1;
            let rhs = self.unary()?;
            lhs = binary(operator, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expression, EosError> {
        if self.eat("-") {
            return Ok(Expression::Negate(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expression, EosError> {
        let base = self.primary()?;
        if self.eat("^") {
            let exponent = self.unary()?;
            return Ok(binary(BinaryOperator::Power, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expression, EosError> {
        match self.peek() {
            Some('(') => {
                self.position += 1;
                let inner = self.sum()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some('<') => {
                self.expect("<<")?;
                let start = self.position;
                let text = self.until(">>")?;
                let name = QualifiedName::new(text).map_err(|err| match err {
                    EosError::Syntax(info) => EosError::Syntax(
                        info.with_context("expression", self.input)
                            .with_context("position", start.to_string()),
                    ),
                    other => other,
                })?;
                let kinematics = if self.peek() == Some('[') && !self.rest().starts_with("[[") {
                    self.kinematics_specification()?
                } else {
                    KinematicsSpecification::default()
                };
                Ok(Expression::Observable { name, kinematics })
            }
            Some('[') => {
                self.expect("[[")?;
                let name = self.until("]]")?;
                if name.is_empty() {
                    return Err(self.error("empty parameter reference"));
                }
                Ok(Expression::Parameter(name.to_string()))
            }
            Some('{') => {
                self.position += 1;
                let name = self.until("}")?;
                if name.is_empty() {
                    return Err(self.error("empty kinematic reference"));
                }
                Ok(Expression::Kinematic(name.to_string()))
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number().map(Expression::Constant),
            Some(c) if c.is_ascii_alphabetic() => {
                let identifier = self.identifier();
                let function = Function::from_name(identifier)
                    .ok_or_else(|| self.error(&format!("unknown function '{identifier}'")))?;
                self.expect("(")?;
                let argument = self.sum()?;
                self.expect(")")?;
                Ok(Expression::Call {
                    function,
                    argument: Box::new(argument),
                })
            }
            Some(_) => Err(self.error("expected a number, reference or '('")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.position += end;
        &rest[..end]
    }

    fn number(&mut self) -> Result<f64, EosError> {
        self.skip_whitespace();
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut end = 0;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exponent = end + 1;
            if exponent < bytes.len() && (bytes[exponent] == b'+' || bytes[exponent] == b'-') {
                exponent += 1;
            }
            if exponent < bytes.len() && bytes[exponent].is_ascii_digit() {
                while exponent < bytes.len() && bytes[exponent].is_ascii_digit() {
                    exponent += 1;
                }
                end = exponent;
            }
        }
        let value = rest[..end]
            .parse::<f64>()
            .map_err(|_| self.error(&format!("malformed number '{}'", &rest[..end])))?;
        self.position += end;
        Ok(value)
    }

    fn variable(&mut self) -> Result<&'a str, EosError> {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == '=' || c == ',' || c == ']' || c.is_whitespace())
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a kinematic variable"));
        }
        self.position += end;
        Ok(&rest[..end])
    }

    fn kinematics_specification(&mut self) -> Result<KinematicsSpecification, EosError> {
        self.expect("[")?;
        let mut specification = KinematicsSpecification::default();
        loop {
            let variable = self.variable()?.to_string();
            if specification.alias_of(&variable).is_some() || specification.is_fixed(&variable) {
                return Err(self.error(&format!("kinematic variable '{variable}' given twice")));
            }
            if self.eat("=>") {
                let source = self.variable()?.to_string();
                specification.aliases.push((variable, source));
            } else if self.eat("=") {
                let negative = self.eat("-");
                let value = self.number()?;
                specification.values.push((variable, if negative { -value } else { value }));
            } else {
                return Err(self.error("expected '=>' or '='"));
            }
            if self.eat("]") {
                return Ok(specification);
            }
            self.expect(",")?;
        }
    }
}

fn binary(operator: BinaryOperator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::Binary {
        operator,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
