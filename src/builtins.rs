use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;

use crate::object::Object;

pub type BuiltinFn = fn(Vec<Rc<Object>>) -> Rc<Object>;

lazy_static! {
    // registry of the pure builtins; `puts` is dispatched by the evaluator
    // because it writes to the output sink
    pub static ref BUILTINS: HashMap<&'static str, BuiltinFn> = {
        let mut m: HashMap<&'static str, BuiltinFn> = HashMap::new();
        m.insert("len", len);
        m.insert("first", first);
        m.insert("last", last);
        m.insert("rest", rest);
        m.insert("push", push);
        m
    };
}

pub fn is_builtin_name(name: &str) -> bool {
    name == "puts" || BUILTINS.contains_key(name)
}

fn len(args: Vec<Rc<Object>>) -> Rc<Object> {
    let mut args = args;
    if args.len() != 1 {
        return Rc::new(Object::Error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )));
    }
    let arg = args.swap_remove(0);
    Rc::new(match &*arg {
        Object::Str(s) => Object::Int(s.len() as i64),
        Object::Array(vs) => Object::Int(vs.len() as i64),
        _ => Object::Error(format!(
            "argument to \"len\" not supported, got {}",
            arg.type_as_str()
        )),
    })
}

fn first(args: Vec<Rc<Object>>) -> Rc<Object> {
    let mut args = args;
    if args.len() != 1 {
        return Rc::new(Object::Error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )));
    }
    let arg = args.swap_remove(0);
    match &*arg {
        Object::Array(vs) => vs.first().map(Rc::clone).unwrap_or(Object::null()),
        _ => Rc::new(Object::Error(format!(
            "argument to \"first\" not supported, got {}",
            arg.type_as_str()
        ))),
    }
}

fn last(args: Vec<Rc<Object>>) -> Rc<Object> {
    let mut args = args;
    if args.len() != 1 {
        return Rc::new(Object::Error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )));
    }
    let arg = args.swap_remove(0);
    match &*arg {
        Object::Array(vs) => vs.last().map(Rc::clone).unwrap_or(Object::null()),
        _ => Rc::new(Object::Error(format!(
            "argument to \"last\" not supported, got {}",
            arg.type_as_str()
        ))),
    }
}

fn rest(args: Vec<Rc<Object>>) -> Rc<Object> {
    let mut args = args;
    if args.len() != 1 {
        return Rc::new(Object::Error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )));
    }
    let arg = args.swap_remove(0);
    match &*arg {
        Object::Array(vs) => {
            if !vs.is_empty() {
                // a fresh array; the argument is never mutated
                Rc::new(Object::Array(
                    vs[1..].iter().map(Rc::clone).collect::<Vec<_>>(),
                ))
            } else {
                Object::null()
            }
        }
        _ => Rc::new(Object::Error(format!(
            "argument to \"rest\" not supported, got {}",
            arg.type_as_str()
        ))),
    }
}

fn push(args: Vec<Rc<Object>>) -> Rc<Object> {
    let mut args = args;
    if args.len() != 2 {
        return Rc::new(Object::Error(format!(
            "wrong number of arguments. got={}, want=2",
            args.len()
        )));
    }
    let arg = args.swap_remove(0);
    let new_val = args.swap_remove(0);
    match &*arg {
        Object::Array(vs) => {
            let mut new_vs = Vec::with_capacity(vs.len() + 1);
            new_vs.extend(vs.iter().map(Rc::clone));
            new_vs.push(new_val);
            Rc::new(Object::Array(new_vs))
        }
        _ => Rc::new(Object::Error(format!(
            "argument to \"push\" not supported, got {}",
            arg.type_as_str()
        ))),
    }
}
