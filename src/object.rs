use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::BlockStatement;

pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub enum Object {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Rc<Object>>),
    Hash(HashMap<Key, Rc<Object>>),
    Function(Function),
    BuiltinFunction(String),
    Return(Rc<Object>),
    Error(String),
}

impl Object {
    pub fn null() -> Rc<Object> {
        Rc::new(Object::Null)
    }

    pub fn bool(b: bool) -> Rc<Object> {
        if b {
            Rc::new(Object::Bool(true))
        } else {
            Rc::new(Object::Bool(false))
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    // the hash key of a hashable object; arrays, hashes and functions have
    // none
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Object::Int(v) => Some(Key::Int(*v)),
            Object::Bool(v) => Some(Key::Bool(*v)),
            Object::Str(v) => Some(Key::Str(v.clone())),
            _ => None,
        }
    }

    pub fn inspect(&self) -> String {
        use Object::*;
        match self {
            Int(v) => v.to_string(),
            Bool(v) => v.to_string(),
            Str(v) => v.clone(),
            Null => "null".to_string(),
            Array(vs) => {
                let elems = vs
                    .iter()
                    .map(|v| v.inspect())
                    .collect::<Vec<_>>()
                    .join(", ");
                ["[", &elems, "]"].into_iter().collect::<String>()
            }
            Hash(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| {
                        let mut entry = k.to_string();
                        entry.push_str(": ");
                        entry.push_str(&v.inspect());
                        entry
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                ["{", &entries, "}"].into_iter().collect::<String>()
            }
            Return(v) => v.inspect(),
            Error(msg) => format!("ERROR: {}", msg),
            Function(f) => f.inspect(),
            BuiltinFunction(_) => "builtin function".to_string(),
        }
    }

    pub fn type_as_str(&self) -> &str {
        use Object::*;
        match self {
            Int(_) => "INTEGER",
            Bool(_) => "BOOLEAN",
            Str(_) => "STRING",
            Array(_) => "ARRAY",
            Hash(_) => "HASH",
            Null => "NULL",
            Return(_) => "RETURN_VALUE",
            Error(_) => "ERROR",
            Function { .. } => "FUNCTION",
            BuiltinFunction(_) => "BUILTIN",
        }
    }
}

// key derived from a hashable object: the variant tags the type, the payload
// carries the value, and the derived Hash/Eq give the structural identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{}", v),
            Key::Bool(v) => write!(f, "{}", v),
            Key::Str(v) => write!(f, "{}", v),
        }
    }
}

pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

impl Function {
    fn inspect(&self) -> String {
        let parts = [
            "fn(",
            &self.parameters.join(", "),
            ") ",
            &self.body.to_string(),
        ];
        parts.into_iter().collect::<String>()
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

pub struct Environment {
    outer: Option<Env>,
    curr: HashMap<String, Rc<Object>>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment {
            outer: None,
            curr: HashMap::new(),
        }))
    }

    pub fn with_outer(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            outer: Some(Rc::clone(outer)),
            curr: HashMap::new(),
        }))
    }

    // walks the scope chain outwards
    pub fn get(env: &Env, name: &str) -> Option<Rc<Object>> {
        let env = env.borrow();
        if let Some(v) = env.curr.get(name) {
            Some(Rc::clone(v))
        } else if let Some(outer) = &env.outer {
            Environment::get(outer, name)
        } else {
            None
        }
    }

    // always binds in the current frame; bindings are never reassigned in
    // place, an inner `let` shadows instead
    pub fn set(env: &Env, name: &str, val: &Rc<Object>) -> Rc<Object> {
        env.borrow_mut().curr.insert(name.into(), Rc::clone(val));
        Rc::clone(val)
    }
}
