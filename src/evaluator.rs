use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::{self, Expression, Statement};
use crate::builtins::{self, BUILTINS};
use crate::object::{Env, Environment, Function, Object};

// Walks the AST against an environment. Owns the output sink `puts` writes
// to; everything else is pure.
pub struct Evaluator {
    out: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            out: Box::new(io::stdout()),
        }
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    // The value of a program is the value of its last statement. A `let`
    // yields no value at all, so a program that ends in one yields None.
    pub fn eval_program(&mut self, env: &Env, program: &ast::Program) -> Option<Rc<Object>> {
        let mut res = None;
        for stmt in &program.statements {
            res = self.eval_statement(env, stmt);
            if let Some(obj) = &res {
                match &**obj {
                    Object::Return(v) => return Some(Rc::clone(v)),
                    Object::Error(_) => return res,
                    _ => continue,
                }
            }
        }
        res
    }

    // Same as eval_program, except a Return is passed up unopened so the
    // enclosing call (or the top level) can see it.
    fn eval_block_statements(
        &mut self,
        env: &Env,
        statements: &[Statement],
    ) -> Option<Rc<Object>> {
        let mut res = None;
        for stmt in statements {
            res = self.eval_statement(env, stmt);
            if let Some(obj) = &res {
                match &**obj {
                    Object::Return(_) | Object::Error(_) => return res,
                    _ => continue,
                }
            }
        }
        res
    }

    fn eval_statement(&mut self, env: &Env, stmt: &Statement) -> Option<Rc<Object>> {
        use Statement::*;
        match stmt {
            LetStmt { name, value, .. } => {
                let result = self.eval_expression(env, value);
                if result.is_err() {
                    return Some(result);
                }
                Environment::set(env, &name.value, &result);
                None
            }
            ReturnStmt { value, .. } => {
                let result = self.eval_expression(env, value);
                if result.is_err() {
                    Some(result)
                } else {
                    Some(Rc::new(Object::Return(result)))
                }
            }
            ExpressionStmt { value, .. } => Some(self.eval_expression(env, value)),
        }
    }

    fn eval_expression(&mut self, env: &Env, expr: &Expression) -> Rc<Object> {
        use Expression::*;
        match expr {
            IntegerLiteral { value, .. } => Rc::new(Object::Int(*value)),
            StringLiteral { value, .. } => Rc::new(Object::Str(value.clone())),
            Boolean { value, .. } => Object::bool(*value),
            PrefixExpression {
                operator, right, ..
            } => {
                let right = self.eval_expression(env, right);
                if right.is_err() {
                    return right;
                }
                eval_prefix_expression(operator, &right)
            }
            InfixExpression {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.eval_expression(env, left);
                if left.is_err() {
                    return left;
                }
                let right = self.eval_expression(env, right);
                if right.is_err() {
                    return right;
                }
                eval_infix_expression(operator, &left, &right)
            }
            IfExpression {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(env, condition);
                if condition.is_err() {
                    return condition;
                }
                if is_truthy(&condition) {
                    self.eval_block_statements(env, &consequence.statements)
                        .unwrap_or_else(Object::null)
                } else if let Some(alt) = alternative {
                    self.eval_block_statements(env, &alt.statements)
                        .unwrap_or_else(Object::null)
                } else {
                    Object::null()
                }
            }
            Identifier(identifier) => {
                if let Some(obj) = Environment::get(env, &identifier.value) {
                    obj
                } else if builtins::is_builtin_name(&identifier.value) {
                    Rc::new(Object::BuiltinFunction(identifier.value.clone()))
                } else {
                    to_err_obj(format!("identifier not found: {}", &identifier.value))
                }
            }
            FunctionLiteral {
                parameters, body, ..
            } => {
                let parameters = parameters
                    .iter()
                    .map(|v| v.value.clone())
                    .collect::<Vec<_>>();
                let function = Function {
                    parameters,
                    body: body.clone(),
                    env: Rc::clone(env),
                };
                Rc::new(Object::Function(function))
            }
            ArrayLiteral { elements, .. } => {
                let evaluated_elems = self.eval_expressions(env, elements);
                if evaluated_elems.len() == 1 && evaluated_elems[0].is_err() {
                    return Rc::clone(&evaluated_elems[0]);
                }
                Rc::new(Object::Array(evaluated_elems))
            }
            HashLiteral { pairs, .. } => {
                let mut map = HashMap::new();
                for (key_expr, val_expr) in pairs {
                    let res = self.eval_expression(env, key_expr);
                    if res.is_err() {
                        return res;
                    }
                    let key = match res.as_key() {
                        Some(k) => k,
                        None => {
                            return to_err_obj(format!(
                                "unusable as hash key: {}",
                                res.type_as_str()
                            ))
                        }
                    };
                    let val = self.eval_expression(env, val_expr);
                    if val.is_err() {
                        return val;
                    }
                    // a duplicate key overwrites the earlier entry
                    map.insert(key, val);
                }
                Rc::new(Object::Hash(map))
            }
            IndexExpression { left, index, .. } => {
                let left = self.eval_expression(env, left);
                if left.is_err() {
                    return left;
                }
                let index = self.eval_expression(env, index);
                if index.is_err() {
                    return index;
                }
                eval_index_expression(&left, &index)
            }
            CallExpression {
                function: expr,
                arguments,
                ..
            } => {
                let res = self.eval_expression(env, expr);
                if res.is_err() {
                    return res;
                }
                let evaluated_args = self.eval_expressions(env, arguments);
                if evaluated_args.len() == 1 && evaluated_args[0].is_err() {
                    return Rc::clone(&evaluated_args[0]);
                }
                let function = match &*res {
                    Object::Function(f) => f,
                    Object::BuiltinFunction(name) => {
                        return self.apply_builtin(name, evaluated_args)
                    }
                    _ => {
                        return to_err_obj(format!("not a function: {}", res.type_as_str()));
                    }
                };

                if function.parameters.len() != evaluated_args.len() {
                    return to_err_obj(format!(
                        "wrong number of arguments. got={}, want={}",
                        evaluated_args.len(),
                        function.parameters.len(),
                    ));
                }
                let extended_env = Environment::with_outer(&function.env);
                for (obj, name) in evaluated_args.into_iter().zip(function.parameters.iter()) {
                    Environment::set(&extended_env, name, &obj);
                }
                let result = self.eval_block_statements(&extended_env, &function.body.statements);
                match result {
                    // the call boundary unwraps a Return
                    Some(obj) => match &*obj {
                        Object::Return(v) => Rc::clone(v),
                        _ => obj,
                    },
                    None => Object::null(),
                }
            }
        }
    }

    fn eval_expressions(&mut self, env: &Env, exprs: &[Expression]) -> Vec<Rc<Object>> {
        let mut results = Vec::new();
        for expr in exprs {
            let result = self.eval_expression(env, expr);
            if result.is_err() {
                return vec![result];
            }
            results.push(result);
        }
        results
    }

    fn apply_builtin(&mut self, name: &str, args: Vec<Rc<Object>>) -> Rc<Object> {
        if name == "puts" {
            for arg in args {
                // the sink is append-only and best-effort
                let _ = writeln!(self.out, "{}", arg.inspect());
            }
            return Object::null();
        }
        let builtin_function = BUILTINS.get(name).unwrap();
        builtin_function(args)
    }
}

fn is_truthy(obj: &Object) -> bool {
    match obj {
        Object::Null | Object::Bool(false) => false,
        _ => true,
    }
}

fn eval_index_expression(left: &Object, index: &Object) -> Rc<Object> {
    use Object::{Array, Hash, Int};
    match (left, index) {
        (Array(vs), Int(n)) => {
            if *n < 0 {
                return Object::null();
            }
            let index = *n as usize;
            vs.get(index).map(Rc::clone).unwrap_or(Object::null())
        }
        (Hash(map), _) => {
            let key = match index.as_key() {
                Some(k) => k,
                None => {
                    return to_err_obj(format!("unusable as hash key: {}", index.type_as_str()))
                }
            };
            map.get(&key).map(Rc::clone).unwrap_or(Object::null())
        }
        (_, _) => to_err_obj(format!(
            "index operator not supported: {}",
            left.type_as_str()
        )),
    }
}

fn eval_infix_expression(operator: &str, left: &Object, right: &Object) -> Rc<Object> {
    use Object::*;
    match (left, operator, right) {
        (Int(l), _, Int(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Bool(l), "==", Bool(r)) => Object::bool(l == r),
        (Bool(l), "!=", Bool(r)) => Object::bool(l != r),
        (Str(l), "+", Str(r)) => {
            let mut s = String::with_capacity(l.len() + r.len());
            s.push_str(l);
            s.push_str(r);
            Rc::new(Object::Str(s))
        }
        (l, _, r) if l.type_as_str() == r.type_as_str() => to_err_obj(format!(
            "unknown operator: {} {} {}",
            l.type_as_str(),
            operator,
            r.type_as_str()
        )),
        (_, _, _) => to_err_obj(format!(
            "type mismatch: {} {} {}",
            left.type_as_str(),
            operator,
            right.type_as_str()
        )),
    }
}

fn eval_integer_infix_expression(operator: &str, l: i64, r: i64) -> Rc<Object> {
    let int = |n| Rc::new(Object::Int(n));
    match operator {
        // wrapping arithmetic so overflow behaves the same in every profile
        "+" => int(l.wrapping_add(r)),
        "-" => int(l.wrapping_sub(r)),
        "*" => int(l.wrapping_mul(r)),
        "/" => {
            if r == 0 {
                to_err_obj("division by zero".into())
            } else {
                int(l.wrapping_div(r))
            }
        }
        "<" => Object::bool(l < r),
        ">" => Object::bool(l > r),
        "==" => Object::bool(l == r),
        "!=" => Object::bool(l != r),
        _ => to_err_obj(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn to_err_obj(msg: String) -> Rc<Object> {
    Rc::new(Object::Error(msg))
}

fn eval_prefix_expression(operator: &String, right: &Object) -> Rc<Object> {
    if operator == "!" {
        use Object::*;
        match right {
            Bool(v) => Object::bool(!v),
            Null => Object::bool(true),
            _ => Object::bool(false),
        }
    } else if operator == "-" {
        if let Object::Int(v) = right {
            Rc::new(Object::Int(v.wrapping_neg()))
        } else {
            to_err_obj(format!("unknown operator: -{}", right.type_as_str()))
        }
    } else {
        to_err_obj(format!(
            "unknown operator: {}{}",
            operator,
            right.type_as_str()
        ))
    }
}
