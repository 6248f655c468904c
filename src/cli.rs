/// This module handles CLI arguments and takes action. Simplified using the
/// `clap` crate.
use std::fs;
use std::io::{self, Write};

use clap::Parser;

use crate::{compiler, vm::VM};

/// Exit status when the source did not compile
const EXIT_COMPILE_ERROR: i32 = 65;
/// Exit status when execution hit a runtime error
const EXIT_RUNTIME_ERROR: i32 = 70;
/// Exit status when the source file could not be read at all
const EXIT_IO_ERROR: i32 = 74;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Script to run. Without it an interactive prompt starts.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<String>,
    /// Disassemble each instruction and dump the stack while executing
    #[arg(short, long)]
    pub trace: bool,
}

/// Compiles and runs a script file, returning the process exit status
pub fn run_file(file_path: &str, trace: bool) -> i32 {
    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read file '{file_path}': {e}");
            return EXIT_IO_ERROR;
        }
    };

    let mut vm = VM::new();
    if trace {
        vm.enable_trace();
    }

    run_source(&source, &mut vm)
}

/// Compiles a source string and executes it on the given VM. Compile errors
/// are printed one per line and keep the chunk away from the VM entirely.
fn run_source(source: &str, vm: &mut VM) -> i32 {
    let chunk = match compiler::compile(source) {
        Ok(chunk) => chunk,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{error}");
            }
            return EXIT_COMPILE_ERROR;
        }
    };

    if let Err(e) = vm.run(&chunk) {
        eprintln!("{e}");
        return EXIT_RUNTIME_ERROR;
    }

    0
}

/// Starts a prompt that compiles and executes one line at a time. The VM
/// persists across lines, so globals defined earlier stay visible.
pub fn repl(trace: bool) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    let mut vm = VM::new();
    if trace {
        vm.enable_trace();
    }

    loop {
        print!("> ");

        if let Err(e) = stdout.flush() {
            eprintln!("Error flushing stdout: {e}");
            break;
        }

        match stdin.read_line(&mut line) {
            Ok(bytes_read) => {
                // Zero bytes means the input is closed, quit like a prompt
                // should on end of input
                if bytes_read == 0 {
                    println!();
                    break;
                }

                let source = line.trim_end();
                // Nothing to execute, ask for new input
                if source.is_empty() {
                    line.clear();
                    continue;
                }

                // Quit on request, just like many repls
                if source == "exit" {
                    break;
                }

                // Errors are printed and the prompt keeps going; a bad line
                // must not take the session down
                run_source(source, &mut vm);
            }
            Err(e) => {
                eprintln!("Error reading line: {e}");
                break;
            }
        }

        // Empty the buffer for the next line
        line.clear();
    }
}
