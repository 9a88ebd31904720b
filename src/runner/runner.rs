use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{fs, path::Path};

use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::generator::Generator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::runner::error::TranspileError;

/// Set when the last `run` call failed, so `run_file` can pick an exit
/// code and `run_prompt` can reset between lines.
pub static HAD_ERROR: AtomicBool = AtomicBool::new(false);

/// Runs the whole pipeline — `Lexer -> Parser -> Generator` — over one
/// in-memory source string. This is the entry point meant for embedding;
/// `run_file`/`run_prompt` below are a thin CLI demo built on top of it,
/// not part of the CORE pipeline.
pub fn transpile_source(source: &str) -> Result<String, TranspileError> {
    let tokens = Lexer::new(source)
        .scan_tokens()
        .map_err(TranspileError::Lex)?;
    let statements = Parser::new(tokens).parse()?;
    let target = Generator::new().generate(&statements)?;
    Ok(target)
}

pub fn run_file(path: &Path) -> io::Result<()> {
    let bytes = fs::read(path)?;
    let mut decoder = DecodeReaderBytesBuilder::new().build(bytes.as_slice());
    let mut source = String::new();
    decoder.read_to_string(&mut source)?;

    run(&source);

    if HAD_ERROR.load(Ordering::Relaxed) {
        std::process::exit(65);
    }
    Ok(())
}

pub fn run_prompt() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // EOF / Ctrl-D
        }

        run(&line);
        HAD_ERROR.store(false, Ordering::Relaxed);
    }
    Ok(())
}

fn run(source: &str) {
    match transpile_source(source) {
        Ok(target) => println!("{target}"),
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            HAD_ERROR.store(true, Ordering::Relaxed);
        }
    }
}
