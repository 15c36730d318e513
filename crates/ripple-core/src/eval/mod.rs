// Tree-walking evaluator for the Ripple language
// Single-threaded and synchronous. Arrays are shared, mutable storage:
// cloning a Value::Array aliases the same cells, and augmented assignment
// mutates them in place. That aliasing is what the rewriting engine's
// copy-before-mutate policy exists for.

pub mod builtins;
pub mod error;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::ast::{
    self, BinOp, CmpOp, Expr, ExprKind, FunctionDef, Program, Stmt, StmtKind, ToSource, UnaryOp,
};

pub use error::EvalError;

/// A namespace of bindings, shared by reference.
pub type Namespace = Rc<RefCell<IndexMap<String, Value>>>;

/// A native decorator: receives the freshly defined function value and
/// returns its replacement.
pub type DecoratorHook = dyn Fn(&mut Interpreter, Value) -> Result<Value>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Numeric array with shared, mutable storage.
    Array(Rc<RefCell<Vec<f64>>>),
    Function(Rc<FunctionValue>),
}

/// A user-defined function: its definition node, defining file, and the
/// globals namespace it resolves free names against.
///
/// The stored definition doubles as the introspection surface: the
/// function's source is regenerated from it, decorators included.
pub struct FunctionValue {
    pub def: FunctionDef,
    pub file: String,
    pub globals: Namespace,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Regenerated source of the definition, decorator lines included.
    pub fn source(&self) -> String {
        self.def.to_source()
    }

    /// 1-based starting line of the definition.
    pub fn line(&self) -> u32 {
        self.def.span.line
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({})", self.def.name)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
        }
    }

    pub fn array(data: Vec<f64>) -> Value {
        Value::Array(Rc::new(RefCell::new(data)))
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Deep copy: arrays get fresh storage, lists copy element-wise.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Array(cells) => Value::array(cells.borrow().clone()),
            Value::List(elements) => {
                Value::List(elements.iter().map(Value::deep_copy).collect())
            }
            other => other.clone(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(elements) => !elements.is_empty(),
            Value::Array(cells) => !cells.borrow().is_empty(),
            Value::Function(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Array(cells) => {
                write!(f, "[")?;
                for (i, x) in cells.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "<fn {}>", func.def.name),
        }
    }
}

/// Control flow result for handling early returns
enum Flow {
    Normal,
    Return(Value),
}

/// Name resolution scope: the innermost bindings plus an optional fallback
/// namespace. Assignment always writes the innermost bindings.
struct Scope {
    vars: Namespace,
    fallback: Option<Namespace>,
    file: Rc<str>,
}

impl Scope {
    fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.fallback
            .as_ref()
            .and_then(|ns| ns.borrow().get(name).cloned())
    }

    fn set(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }
}

pub struct Interpreter {
    globals: Namespace,
    decorators: HashMap<String, Rc<DecoratorHook>>,
    print_hook: Option<Box<dyn FnMut(&str)>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            globals: Rc::new(RefCell::new(IndexMap::new())),
            decorators: HashMap::new(),
            print_hook: None,
        }
    }

    pub fn globals(&self) -> &Namespace {
        &self.globals
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    /// Registers a native decorator under `name`.
    pub fn register_decorator<F>(&mut self, name: &str, hook: F)
    where
        F: Fn(&mut Interpreter, Value) -> Result<Value> + 'static,
    {
        self.decorators.insert(name.to_string(), Rc::new(hook));
    }

    /// Routes `print` output through `hook` instead of stdout.
    pub fn set_print_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.print_hook = Some(Box::new(hook));
    }

    pub(crate) fn emit_output(&mut self, line: &str) {
        match &mut self.print_hook {
            Some(hook) => hook(line),
            None => println!("{line}"),
        }
    }

    /// Parses and evaluates `source` against the global namespace. Returns
    /// the value of the last expression statement, or `Null`.
    pub fn run(&mut self, source: &str, file: &str) -> Result<Value> {
        let program = crate::parser::parse(source)?;
        self.eval_program(&program, file)
    }

    /// Evaluates a parsed program against the global namespace.
    pub fn eval_program(&mut self, program: &Program, file: &str) -> Result<Value> {
        let scope = Scope {
            vars: self.globals.clone(),
            fallback: None,
            file: file.into(),
        };
        let mut last = Value::Null;
        for stmt in &program.body {
            if let StmtKind::Expr { value } = &stmt.kind {
                last = self.eval_expr(value, &scope)?;
            } else {
                match self.exec_stmt(stmt, &scope)? {
                    Flow::Normal => {}
                    Flow::Return(_) => return Err(EvalError::ReturnOutsideFunction.into()),
                }
            }
        }
        Ok(last)
    }

    /// Evaluates a program in a fresh namespace whose reads fall back to the
    /// ambient globals, and returns the new bindings it introduced.
    pub(crate) fn eval_unit(&mut self, program: &Program, file: &str) -> Result<Namespace> {
        let bindings: Namespace = Rc::new(RefCell::new(IndexMap::new()));
        let scope = Scope {
            vars: bindings.clone(),
            fallback: Some(self.globals.clone()),
            file: file.into(),
        };
        for stmt in &program.body {
            match self.exec_stmt(stmt, &scope)? {
                Flow::Normal => {}
                Flow::Return(_) => return Err(EvalError::ReturnOutsideFunction.into()),
            }
        }
        Ok(bindings)
    }

    /// Calls a function value with the given arguments.
    pub fn call_function(&mut self, func: &Value, args: Vec<Value>) -> Result<Value> {
        let Value::Function(func) = func else {
            return Err(EvalError::NotCallable {
                type_name: func.type_name().to_string(),
            }
            .into());
        };
        if args.len() != func.def.params.len() {
            return Err(EvalError::ArityMismatch {
                name: func.def.name.clone(),
                expected: func.def.params.len(),
                got: args.len(),
            }
            .into());
        }
        trace!(function = %func.def.name, "calling function");
        let locals: IndexMap<String, Value> =
            func.def.params.iter().cloned().zip(args).collect();
        let scope = Scope {
            vars: Rc::new(RefCell::new(locals)),
            fallback: Some(func.globals.clone()),
            file: func.file.as_str().into(),
        };
        match self.exec_block(&func.def.body, &scope)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt], scope: &Scope) -> Result<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> Result<Flow> {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                self.define_function(def, scope)?;
                Ok(Flow::Normal)
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value, scope)?;
                self.assign_to(target, value, scope)?;
                Ok(Flow::Normal)
            }
            StmtKind::AugAssign { target, op, value } => {
                let rhs = self.eval_expr(value, scope)?;
                self.aug_assign_to(target, *op, rhs, scope)?;
                Ok(Flow::Normal)
            }
            StmtKind::Return { value } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                if self.eval_expr(cond, scope)?.truthy() {
                    self.exec_block(then_body, scope)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval_expr(cond, scope)?.truthy() {
                    match self.exec_block(body, scope)? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Expr { value } => {
                self.eval_expr(value, scope)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn define_function(&mut self, def: &FunctionDef, scope: &Scope) -> Result<()> {
        let mut value = Value::Function(Rc::new(FunctionValue {
            def: def.clone(),
            file: scope.file.to_string(),
            globals: self.globals.clone(),
        }));
        // Decorators apply bottom-up, nearest to the definition first.
        for decorator in def.decorators.iter().rev() {
            let name = ast::base_name(decorator).ok_or_else(|| EvalError::InvalidOperation {
                message: "decorator has no base name".to_string(),
            })?;
            let hook = self.decorators.get(name).cloned().ok_or_else(|| {
                EvalError::UnknownDecorator {
                    name: name.to_string(),
                }
            })?;
            debug!(decorator = name, function = %def.name, "applying decorator");
            value = hook(self, value)?;
        }
        scope.set(&def.name, value);
        Ok(())
    }

    fn assign_to(&mut self, target: &Expr, value: Value, scope: &Scope) -> Result<()> {
        match &target.kind {
            ExprKind::Name(name) => {
                scope.set(name, value);
                Ok(())
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                match object {
                    Value::Array(cells) => {
                        let len = cells.borrow().len();
                        let idx = resolve_index(&index, len)?;
                        let Some(x) = value.as_f64() else {
                            return Err(EvalError::type_error(
                                "array element assignment",
                                "a number",
                                value.type_name(),
                            )
                            .into());
                        };
                        cells.borrow_mut()[idx] = x;
                        Ok(())
                    }
                    other => Err(EvalError::InvalidOperation {
                        message: format!("cannot index-assign into {}", other.type_name()),
                    }
                    .into()),
                }
            }
            ExprKind::Property { .. } => Err(EvalError::InvalidOperation {
                message: "properties are read-only".to_string(),
            }
            .into()),
            _ => Err(EvalError::InvalidOperation {
                message: "cannot assign to this expression".to_string(),
            }
            .into()),
        }
    }

    fn aug_assign_to(
        &mut self,
        target: &Expr,
        op: BinOp,
        rhs: Value,
        scope: &Scope,
    ) -> Result<()> {
        match &target.kind {
            ExprKind::Name(name) => {
                let current = scope.get(name).ok_or_else(|| EvalError::VariableNotFound {
                    name: name.clone(),
                })?;
                if let Value::Array(cells) = &current {
                    aug_assign_array(op, cells, &rhs)?;
                } else {
                    let updated = binary_op(op, &current, &rhs)?;
                    scope.set(name, updated);
                }
                Ok(())
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                match object {
                    Value::Array(cells) => {
                        let len = cells.borrow().len();
                        let idx = resolve_index(&index, len)?;
                        let Some(y) = rhs.as_f64() else {
                            return Err(EvalError::type_error(
                                "array element update",
                                "a number",
                                rhs.type_name(),
                            )
                            .into());
                        };
                        let current = cells.borrow()[idx];
                        let updated = float_op(op, current, y)?;
                        cells.borrow_mut()[idx] = updated;
                        Ok(())
                    }
                    other => Err(EvalError::InvalidOperation {
                        message: format!("cannot update element of {}", other.type_name()),
                    }
                    .into()),
                }
            }
            _ => Err(EvalError::InvalidOperation {
                message: "cannot update this expression in place".to_string(),
            }
            .into()),
        }
    }

    fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> Result<Value> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Name(name) => {
                scope.get(name).ok_or_else(|| {
                    EvalError::VariableNotFound { name: name.clone() }.into()
                })
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                Ok(binary_op(*op, &left, &right)?)
            }
            ExprKind::Compare { op, left, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                Ok(compare_op(*op, &left, &right)?)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                Ok(unary_op(*op, &operand)?)
            }
            ExprKind::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, scope)?);
                }
                match &callee.kind {
                    ExprKind::Name(name) => {
                        if let Some(value) = scope.get(name) {
                            self.call_function(&value, values)
                        } else if builtins::is_builtin(name) {
                            builtins::call(self, name, values)
                        } else {
                            Err(EvalError::VariableNotFound { name: name.clone() }.into())
                        }
                    }
                    _ => Err(EvalError::InvalidOperation {
                        message: "only named functions are callable".to_string(),
                    }
                    .into()),
                }
            }
            ExprKind::Property { object, name } => {
                let object = self.eval_expr(object, scope)?;
                let len = match (&object, name.as_str()) {
                    (Value::Str(s), "len") => s.chars().count(),
                    (Value::List(elements), "len") => elements.len(),
                    (Value::Array(cells), "len") => cells.borrow().len(),
                    _ => {
                        return Err(EvalError::PropertyNotFound {
                            property: name.clone(),
                            type_name: object.type_name().to_string(),
                        }
                        .into())
                    }
                };
                Ok(Value::Int(len as i64))
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                match object {
                    Value::Array(cells) => {
                        let len = cells.borrow().len();
                        let idx = resolve_index(&index, len)?;
                        let x = cells.borrow()[idx];
                        Ok(Value::Float(x))
                    }
                    Value::List(elements) => {
                        let idx = resolve_index(&index, elements.len())?;
                        Ok(elements[idx].clone())
                    }
                    other => Err(EvalError::type_error(
                        "indexing",
                        "a list or array",
                        other.type_name(),
                    )
                    .into()),
                }
            }
            ExprKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, scope)?);
                }
                Ok(Value::List(values))
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_index(value: &Value, len: usize) -> Result<usize, EvalError> {
    let Value::Int(i) = value else {
        return Err(EvalError::type_error(
            "indexing",
            "an integer",
            value.type_name(),
        ));
    };
    if *i < 0 || *i as usize >= len {
        return Err(EvalError::IndexOutOfRange { index: *i, len });
    }
    Ok(*i as usize)
}

fn op_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "addition",
        BinOp::Sub => "subtraction",
        BinOp::Mul => "multiplication",
        BinOp::Div => "division",
        BinOp::Mod => "modulo",
    }
}

fn int_op(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => Ok(Value::Int(a + b)),
        BinOp::Sub => Ok(Value::Int(a - b)),
        BinOp::Mul => Ok(Value::Int(a * b)),
        BinOp::Div => {
            if b == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Int(a / b))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Int(a % b))
            }
        }
    }
}

fn float_op(op: BinOp, a: f64, b: f64) -> Result<f64, EvalError> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div => {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        BinOp::Mod => {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(a % b)
            }
        }
    }
}

fn array_pair_op(op: BinOp, a: &[f64], b: &[f64]) -> Result<Vec<f64>, EvalError> {
    if a.len() != b.len() {
        return Err(EvalError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| float_op(op, *x, *y))
        .collect()
}

pub(crate) fn binary_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            if op == BinOp::Add {
                Ok(Value::Str(format!("{a}{b}")))
            } else {
                Err(EvalError::binary_type_error(
                    op_name(op),
                    left.type_name(),
                    right.type_name(),
                ))
            }
        }
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Array(a), Value::Array(b)) => {
            let data = array_pair_op(op, &a.borrow(), &b.borrow())?;
            Ok(Value::array(data))
        }
        (Value::Array(a), r) if r.as_f64().is_some() => {
            let y = r.as_f64().unwrap_or_default();
            let data = a
                .borrow()
                .iter()
                .map(|x| float_op(op, *x, y))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(data))
        }
        (l, Value::Array(b)) if l.as_f64().is_some() => {
            let x = l.as_f64().unwrap_or_default();
            let data = b
                .borrow()
                .iter()
                .map(|y| float_op(op, x, *y))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(data))
        }
        (l, r) => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float(float_op(op, a, b)?)),
            _ => Err(EvalError::binary_type_error(
                op_name(op),
                l.type_name(),
                r.type_name(),
            )),
        },
    }
}

pub(crate) fn compare_op(op: CmpOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        CmpOp::Eq => return Ok(Value::Bool(left == right)),
        CmpOp::Ne => return Ok(Value::Bool(left != right)),
        _ => {}
    }
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        (l, r) => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(EvalError::binary_type_error(
                    "compare",
                    l.type_name(),
                    r.type_name(),
                ))
            }
        },
    };
    let result = match ordering {
        None => false,
        Some(ordering) => match op {
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Eq | CmpOp::Ne => false,
        },
    };
    Ok(Value::Bool(result))
}

pub(crate) fn unary_op(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::Neg => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Array(cells) => {
                let data = cells.borrow().iter().map(|x| -x).collect();
                Ok(Value::array(data))
            }
            other => Err(EvalError::type_error(
                "negation",
                "a number or array",
                other.type_name(),
            )),
        },
    }
}

/// In-place combine on shared array storage. The right side is snapshotted
/// first: it may alias the target cells.
fn aug_assign_array(
    op: BinOp,
    cells: &Rc<RefCell<Vec<f64>>>,
    rhs: &Value,
) -> Result<(), EvalError> {
    let current = cells.borrow().clone();
    let updated = match rhs {
        Value::Array(rhs_cells) => {
            let rhs_data = rhs_cells.borrow().clone();
            array_pair_op(op, &current, &rhs_data)?
        }
        scalar => {
            let Some(y) = scalar.as_f64() else {
                return Err(EvalError::binary_type_error(
                    op_name(op),
                    "array",
                    scalar.type_name(),
                ));
            };
            current
                .iter()
                .map(|x| float_op(op, *x, y))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    *cells.borrow_mut() = updated;
    Ok(())
}
