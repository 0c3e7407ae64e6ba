//! Tree-walking evaluator.
//!
//! Every recursive step returns `Result<_, EvalError>` so that `?` stops an
//! expression at the first failing operand, left before right. The public
//! [`eval`] entry point turns a failure back into an [`Object::Error`] value.

use crate::engine::ast::{
    BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::engine::env::Environment;
use crate::engine::object::{Function, Object, ObjectType, native_bool, null};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument, trace};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("wrong number of arguments: want={expected}, got={found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("division by zero: {0} / 0")]
    DivisionByZero(i64),
}

/// Any AST node the evaluator accepts.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Block(&'a BlockStatement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(statement: &'a Statement) -> Self {
        Node::Statement(statement)
    }
}

impl<'a> From<&'a BlockStatement> for Node<'a> {
    fn from(block: &'a BlockStatement) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expression: &'a Expression) -> Self {
        Node::Expression(expression)
    }
}

/// Reduces a node to exactly one object. Failures come back as
/// `Object::Error` carrying the message verbatim; statements that produce no
/// value (`let`) yield `null`.
pub fn eval<'a>(node: impl Into<Node<'a>>, env: Rc<RefCell<Environment>>) -> Rc<Object> {
    let result = match node.into() {
        Node::Program(program) => eval_program(program, env).map(or_null),
        Node::Statement(statement) => eval_statement(statement, env).map(or_null),
        Node::Block(block) => eval_block_statement(block, env).map(or_null),
        Node::Expression(expression) => eval_expression(expression, env),
    };
    result.unwrap_or_else(|error| {
        debug!(%error, "Evaluation failed");
        Rc::new(Object::Error(error.to_string()))
    })
}

fn or_null(value: Option<Rc<Object>>) -> Rc<Object> {
    value.unwrap_or_else(null)
}

/// Evaluates top-level statements in order, unwrapping the first `return`.
/// `Ok(None)` means the last statement evaluated was a `let` (or the program
/// was empty) and there is nothing to show.
#[instrument(skip(program, env), fields(statements = program.statements.len()))]
pub fn eval_program(
    program: &Program,
    env: Rc<RefCell<Environment>>,
) -> Result<Option<Rc<Object>>, EvalError> {
    trace!("Starting evaluation");
    let mut result = None;
    for statement in &program.statements {
        result = eval_statement(statement, Rc::clone(&env))?;
        if let Some(value) = &result {
            if let Object::ReturnValue(inner) = value.as_ref() {
                trace!("Top-level return, stopping program");
                return Ok(Some(Rc::clone(inner)));
            }
        }
    }
    Ok(result)
}

// Unlike eval_program, a ReturnValue is passed up still wrapped so the
// enclosing call can tell that a return happened.
fn eval_block_statement(
    block: &BlockStatement,
    env: Rc<RefCell<Environment>>,
) -> Result<Option<Rc<Object>>, EvalError> {
    let mut result = None;
    for statement in &block.statements {
        result = eval_statement(statement, Rc::clone(&env))?;
        if matches!(result.as_deref(), Some(Object::ReturnValue(_))) {
            trace!("Return inside block, stopping block");
            break;
        }
    }
    Ok(result)
}

fn eval_statement(
    statement: &Statement,
    env: Rc<RefCell<Environment>>,
) -> Result<Option<Rc<Object>>, EvalError> {
    match statement {
        Statement::Expression(expression) => eval_expression(expression, env).map(Some),
        Statement::Return(value) => {
            let value = match value {
                Some(expression) => eval_expression(expression, env)?,
                None => null(),
            };
            Ok(Some(Rc::new(Object::ReturnValue(value))))
        }
        Statement::Let { name, value } => {
            let value = eval_expression(value, Rc::clone(&env))?;
            debug!(variable_name = %name, value = %value, "'let' binding");
            env.borrow_mut().define(name.clone(), value);
            Ok(None)
        }
    }
}

#[instrument(level = "trace", skip(expression, env), fields(expression = %expression), ret, err)]
fn eval_expression(
    expression: &Expression,
    env: Rc<RefCell<Environment>>,
) -> Result<Rc<Object>, EvalError> {
    match expression {
        Expression::Integer(value) => Ok(Rc::new(Object::Integer(*value))),
        Expression::Boolean(value) => Ok(native_bool(*value)),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            eval_prefix_expression(*operator, &right)
        }
        Expression::Infix {
            left,
            operator,
            right,
        } => {
            let left = eval_expression(left, Rc::clone(&env))?;
            let right = eval_expression(right, env)?;
            eval_infix_expression(*operator, &left, &right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if_expression(condition, consequence, alternative.as_ref(), env),
        Expression::Identifier(name) => eval_identifier(name, &env),
        Expression::Function(literal) => {
            trace!(parameters = ?literal.parameters, "Creating closure");
            Ok(Rc::new(Object::Function(Function {
                parameters: literal.parameters.clone(),
                body: Rc::clone(&literal.body),
                env,
            })))
        }
        Expression::Call {
            function,
            arguments,
        } => {
            let function = eval_expression(function, Rc::clone(&env))?;
            let arguments = eval_expressions(arguments, &env)?;
            apply_function(&function, arguments)
        }
    }
}

fn eval_identifier(name: &str, env: &Rc<RefCell<Environment>>) -> Result<Rc<Object>, EvalError> {
    env.borrow()
        .get(name)
        .ok_or_else(|| EvalError::IdentifierNotFound(name.to_string()))
}

// Left to right; the first failing argument stops the rest.
fn eval_expressions(
    expressions: &[Expression],
    env: &Rc<RefCell<Environment>>,
) -> Result<Vec<Rc<Object>>, EvalError> {
    expressions
        .iter()
        .map(|expression| eval_expression(expression, Rc::clone(env)))
        .collect()
}

fn eval_prefix_expression(
    operator: PrefixOperator,
    right: &Rc<Object>,
) -> Result<Rc<Object>, EvalError> {
    match operator {
        PrefixOperator::Bang => Ok(native_bool(!is_truthy(right))),
        PrefixOperator::Minus => match right.as_ref() {
            Object::Integer(value) => Ok(Rc::new(Object::Integer(value.wrapping_neg()))),
            other => Err(EvalError::UnknownPrefixOperator {
                operator,
                right: other.object_type(),
            }),
        },
    }
}

fn eval_infix_expression(
    operator: InfixOperator,
    left: &Rc<Object>,
    right: &Rc<Object>,
) -> Result<Rc<Object>, EvalError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        // Booleans and null are singletons, so identity is equality.
        _ if operator == InfixOperator::Eq => Ok(native_bool(Rc::ptr_eq(left, right))),
        _ if operator == InfixOperator::NotEq => Ok(native_bool(!Rc::ptr_eq(left, right))),
        _ if left.object_type() != right.object_type() => Err(EvalError::TypeMismatch {
            left: left.object_type(),
            operator,
            right: right.object_type(),
        }),
        _ => Err(EvalError::UnknownInfixOperator {
            left: left.object_type(),
            operator,
            right: right.object_type(),
        }),
    }
}

fn eval_integer_infix_expression(
    operator: InfixOperator,
    left: i64,
    right: i64,
) -> Result<Rc<Object>, EvalError> {
    let value = match operator {
        InfixOperator::Plus => left.wrapping_add(right),
        InfixOperator::Minus => left.wrapping_sub(right),
        InfixOperator::Asterisk => left.wrapping_mul(right),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(EvalError::DivisionByZero(left));
            }
            left.wrapping_div(right)
        }
        InfixOperator::Lt => return Ok(native_bool(left < right)),
        InfixOperator::Gt => return Ok(native_bool(left > right)),
        InfixOperator::Eq => return Ok(native_bool(left == right)),
        InfixOperator::NotEq => return Ok(native_bool(left != right)),
    };
    Ok(Rc::new(Object::Integer(value)))
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &BlockStatement,
    alternative: Option<&BlockStatement>,
    env: Rc<RefCell<Environment>>,
) -> Result<Rc<Object>, EvalError> {
    let condition = eval_expression(condition, Rc::clone(&env))?;
    debug!(condition = %condition, "Evaluated 'if' condition");

    if is_truthy(&condition) {
        trace!("Condition is truthy, evaluating consequence");
        eval_block_statement(consequence, env).map(or_null)
    } else if let Some(alternative) = alternative {
        trace!("Condition is false-y, evaluating alternative");
        eval_block_statement(alternative, env).map(or_null)
    } else {
        trace!("Condition is false-y, no alternative, returning null");
        Ok(null())
    }
}

/// Only the `null` and `false` singletons are false-y; every other value,
/// including the integer 0, is truthy.
pub fn is_truthy(object: &Rc<Object>) -> bool {
    !(Rc::ptr_eq(object, &null()) || Rc::ptr_eq(object, &native_bool(false)))
}

/// Calls a closure: arguments are bound in a fresh scope whose parent is the
/// closure's captured environment, never the caller's.
fn apply_function(
    callee: &Rc<Object>,
    arguments: Vec<Rc<Object>>,
) -> Result<Rc<Object>, EvalError> {
    let Object::Function(function) = callee.as_ref() else {
        return Err(EvalError::NotAFunction(callee.object_type()));
    };

    if arguments.len() != function.parameters.len() {
        return Err(EvalError::ArityMismatch {
            expected: function.parameters.len(),
            found: arguments.len(),
        });
    }

    let call_env = Environment::new_enclosed(Rc::clone(&function.env));
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        call_env.borrow_mut().define(parameter.clone(), argument);
    }

    debug!(parameters = ?function.parameters, "Evaluating function body");
    let result = eval_block_statement(&function.body, call_env)?;
    Ok(unwrap_return_value(result))
}

fn unwrap_return_value(result: Option<Rc<Object>>) -> Rc<Object> {
    let Some(value) = result else {
        return null();
    };
    if let Object::ReturnValue(inner) = value.as_ref() {
        return Rc::clone(inner);
    }
    value
}
