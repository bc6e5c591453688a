use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::evaluator::Evaluator;
use crate::object::{Env, Environment, Object};
use crate::parser::{Parser, ParserError};

const PROMPT: &str = ">> ";

// the standard library, seeded into every session and batch environment
const PRELUDE: &str = r#"
let map = fn(arr, f) {
  let iter = fn(arr, acc) {
    if (len(arr) == 0) { acc }
    else { iter(rest(arr), push(acc, f(first(arr)))); }
  };
  iter(arr, []);
};
let reduce = fn(arr, initial, f) {
  let iter = fn(arr, result) {
    if (len(arr) == 0) { result }
    else { iter(rest(arr), f(result, first(arr))); }
  };
  iter(arr, initial);
};
let sum = fn(arr) { reduce(arr, 0, fn(a, e) { a + e }); };
"#;

// An interpreter session: a persistent environment with the prelude already
// bound, fed one source chunk at a time.
pub struct Monkey {
    evaluator: Evaluator,
    env: Env,
}

impl Default for Monkey {
    fn default() -> Self {
        Self::new()
    }
}

impl Monkey {
    pub fn new() -> Self {
        Self::with_evaluator(Evaluator::new())
    }

    // hands the `puts` output sink to the host
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::with_evaluator(Evaluator::with_output(out))
    }

    fn with_evaluator(mut evaluator: Evaluator) -> Self {
        let env = Environment::new();
        let prelude = Parser::parse(PRELUDE).expect("prelude parses");
        evaluator.eval_program(&env, &prelude);
        Self { evaluator, env }
    }

    // Evaluates a chunk of source in the session environment. Ok(None) means
    // the chunk produced no value (it ended in a binding).
    pub fn eval(&mut self, src: &str) -> Result<Option<Rc<Object>>, ParserError> {
        let program = Parser::parse(src)?;
        Ok(self.evaluator.eval_program(&self.env, &program))
    }
}

// The interactive loop: prompt, read a line, evaluate it in a session that
// spans the whole loop. End of input ends the loop.
pub fn start<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<()> {
    let mut monkey = Monkey::new();
    loop {
        write!(writer, "{}", PROMPT)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match monkey.eval(&line) {
            Err(err) => print_parser_errors(&mut writer, err.messages())?,
            Ok(Some(obj)) => {
                writer.write_all(obj.inspect().as_bytes())?;
                writer.write_all(b"\n")?;
            }
            Ok(None) => {}
        }
    }
}

fn print_parser_errors<W: Write>(writer: &mut W, msgs: &[String]) -> io::Result<()> {
    for msg in msgs {
        writeln!(writer, "\t{}", msg)?;
    }
    writer.flush()
}

// Batch evaluation: the whole source runs against a fresh prelude-seeded
// environment and the rendered results come back as one string. `ok` is
// false when the parser rejected the input; runtime errors render as
// ERROR lines and leave `ok` true.
pub fn run(src: &str) -> (String, bool) {
    let mut monkey = Monkey::new();
    // newlines are not significant, the source is evaluated as one chunk
    let src = src.replace('\n', "");

    let mut out = String::new();
    let mut ok = true;
    match monkey.eval(&src) {
        Err(err) => {
            for msg in err.messages() {
                out.push('\t');
                out.push_str(msg);
                out.push('\n');
            }
            ok = false;
        }
        Ok(Some(obj)) => {
            out.push_str(&obj.inspect());
            out.push('\n');
        }
        Ok(None) => {}
    }
    (out, ok)
}
