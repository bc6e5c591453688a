use std::{env, fs, process};

use monkey_interpreter::repl;
use monkey_interpreter::Monkey;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

fn main() -> eyre::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eyre::bail!("Only takes 1 or 0 args (for the file)")
    }
    if args.len() == 2 {
        let file_path = &args[1];
        let content = fs::read_to_string(file_path)?;
        let (rendered, ok) = repl::run(&content);
        print!("{}", rendered);
        if !ok {
            process::exit(1);
        }
        return Ok(());
    }

    // repl
    println!("Monkey lang");
    let mut monkey = Monkey::new();
    let mut rl = DefaultEditor::new()?;
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                match monkey.eval(&line) {
                    Err(err) => {
                        for msg in err.messages() {
                            println!("\t{}", msg);
                        }
                    }
                    Ok(Some(obj)) => println!("{}", obj.inspect()),
                    Ok(None) => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                break;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
