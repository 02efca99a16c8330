//! This module defines the Abstract Syntax Tree produced by the parser.
//!
//! Statements and expressions are closed enums; every node renders its
//! canonical fully-parenthesized form through `Display` (this is the
//! "inspect" string used by tests and by quote objects) and its leading token
//! text through `token_literal`.
//!
//! Nodes are immutable values. The only tree transformation is [`modify`],
//! which rebuilds a node bottom-up and hands every expression it does not
//! unpack itself (leaves, calls and macro literals) to a rewriting closure.
//! Macro expansion and quasiquotation are both built on it.

use std::fmt;

/// A bound name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOperator::Bang => "!",
            PrefixOperator::Minus => "-",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    Boolean(bool),
    String(String),
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Array(Vec<Expression>),
    /// Key/value expression pairs in source order
    Hash(Vec<(Expression, Expression)>),
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    Macro {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Let { name: Identifier, value: Expression },
    Return(Option<Expression>),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// Any AST node, for APIs that accept a node of unknown kind
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Program),
    Statement(Statement),
    Block(BlockStatement),
    Expression(Expression),
}

// Convenience constructors, mostly used by the parser and by tests

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn prefix(operator: PrefixOperator, right: Expression) -> Self {
        Expression::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            function: Box::new(function),
            arguments,
        }
    }

    pub fn index(left: Expression, index: Expression) -> Self {
        Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }

    /// The literal text of the token this expression starts with
    pub fn token_literal(&self) -> String {
        match self {
            Expression::Identifier(ident) => ident.0.clone(),
            Expression::Integer(value) => value.to_string(),
            Expression::Boolean(value) => value.to_string(),
            Expression::String(value) => value.clone(),
            Expression::Prefix { operator, .. } => operator.to_string(),
            Expression::Infix { operator, .. } => operator.to_string(),
            Expression::If { .. } => "if".into(),
            Expression::Function { .. } => "fn".into(),
            Expression::Call { .. } => "(".into(),
            Expression::Array(_) => "[".into(),
            Expression::Hash(_) => "{".into(),
            Expression::Index { .. } => "[".into(),
            Expression::Macro { .. } => "macro".into(),
        }
    }

    /// Name of the callee when this is a call of a bare identifier
    pub fn called_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Call { function, .. } => match function.as_ref() {
                Expression::Identifier(ident) => Some(ident),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Statement {
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Let { .. } => "let".into(),
            Statement::Return(_) => "return".into(),
            Statement::Expression(expr) => expr.token_literal(),
        }
    }
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        BlockStatement { statements }
    }
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or_default()
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Boolean(value) => write!(f, "{value}"),
            Expression::String(value) => f.write_str(value),
            Expression::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, "else {alternative}")?;
                }
                Ok(())
            }
            Expression::Function { parameters, body } => {
                f.write_str("fn(")?;
                write_joined(f, parameters, ", ")?;
                write!(f, ") {body}")
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_joined(f, arguments, ", ")?;
                f.write_str(")")
            }
            Expression::Array(elements) => {
                f.write_str("[")?;
                write_joined(f, elements, ", ")?;
                f.write_str("]")
            }
            Expression::Hash(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("}")
            }
            Expression::Index { left, index } => write!(f, "({left}[{index}])"),
            Expression::Macro { parameters, body } => {
                f.write_str("macro(")?;
                write_joined(f, parameters, ", ")?;
                write!(f, ") {body}")
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Return(Some(value)) => write!(f, "return {value};"),
            Statement::Return(None) => f.write_str("return;"),
            Statement::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.statements, "")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.statements, "")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Program(program) => write!(f, "{program}"),
            Node::Statement(statement) => write!(f, "{statement}"),
            Node::Block(block) => write!(f, "{block}"),
            Node::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

//
// Tree rewriting
//

impl Expression {
    /// Rebuild this expression, rewriting children first. Container
    /// expressions are reconstructed around their rewritten children; every
    /// other expression (identifiers, literals, calls, macro literals) is
    /// passed to `f` as a whole.
    pub fn modify<F>(self, f: &mut F) -> Expression
    where
        F: FnMut(Expression) -> Expression,
    {
        match self {
            Expression::Prefix { operator, right } => Expression::Prefix {
                operator,
                right: Box::new(right.modify(f)),
            },
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = left.modify(f);
                let right = right.modify(f);
                Expression::infix(left, operator, right)
            }
            Expression::Index { left, index } => {
                let left = left.modify(f);
                let index = index.modify(f);
                Expression::index(left, index)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => Expression::If {
                condition: Box::new(condition.modify(f)),
                consequence: consequence.modify(f),
                alternative: alternative.map(|block| block.modify(f)),
            },
            Expression::Function { parameters, body } => Expression::Function {
                parameters,
                body: body.modify(f),
            },
            Expression::Array(elements) => {
                Expression::Array(elements.into_iter().map(|e| e.modify(f)).collect())
            }
            Expression::Hash(pairs) => Expression::Hash(
                pairs
                    .into_iter()
                    .map(|(key, value)| {
                        let key = key.modify(f);
                        (key, value.modify(f))
                    })
                    .collect(),
            ),
            leaf @ (Expression::Identifier(_)
            | Expression::Integer(_)
            | Expression::Boolean(_)
            | Expression::String(_)
            | Expression::Call { .. }
            | Expression::Macro { .. }) => f(leaf),
        }
    }
}

impl Statement {
    pub fn modify<F>(self, f: &mut F) -> Statement
    where
        F: FnMut(Expression) -> Expression,
    {
        match self {
            Statement::Let { name, value } => Statement::Let {
                name,
                value: value.modify(f),
            },
            Statement::Return(value) => Statement::Return(value.map(|v| v.modify(f))),
            Statement::Expression(expr) => Statement::Expression(expr.modify(f)),
        }
    }
}

impl BlockStatement {
    pub fn modify<F>(self, f: &mut F) -> BlockStatement
    where
        F: FnMut(Expression) -> Expression,
    {
        BlockStatement::new(self.statements.into_iter().map(|s| s.modify(f)).collect())
    }
}

impl Program {
    pub fn modify<F>(self, f: &mut F) -> Program
    where
        F: FnMut(Expression) -> Expression,
    {
        Program::new(self.statements.into_iter().map(|s| s.modify(f)).collect())
    }
}

/// Rewrite any node with `f`; see [`Expression::modify`] for which
/// expressions reach the closure.
pub fn modify<F>(node: Node, mut f: F) -> Node
where
    F: FnMut(Expression) -> Expression,
{
    match node {
        Node::Program(program) => Node::Program(program.modify(&mut f)),
        Node::Statement(statement) => Node::Statement(statement.modify(&mut f)),
        Node::Block(block) => Node::Block(block.modify(&mut f)),
        Node::Expression(expr) => Node::Expression(expr.modify(&mut f)),
    }
}
