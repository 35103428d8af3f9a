//! The `tigerc` binary: reads a Tiger source file and runs it through the
//! front end. With `--emit-ir` the textual IR goes to stdout; otherwise the
//! compiled module is written to the `-o` path (the only serialization this
//! front end implements is the textual one; a real object/bitcode emitter
//! is external collaborator territory, same as the scanner and parser).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Compile a Tiger source file down to its IR.
#[derive(Parser)]
#[command(name = "tigerc", version, about)]
struct Cli {
    /// Tiger source file to compile
    input: PathBuf,

    /// Write the compiled module here
    #[arg(short, long, value_name = "FILE", required_unless_present = "emit_ir")]
    output: Option<PathBuf>,

    /// Print the textual IR to stdout instead of writing to `-o`
    #[arg(long)]
    emit_ir: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let module = match tigerc_compiler::compile(&source) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let rendered = tigerc_ir::print_module(&module);
    if cli.emit_ir {
        print!("{rendered}");
        return ExitCode::SUCCESS;
    }

    let path = cli.output.expect("clap requires -o unless --emit-ir");
    if let Err(e) = std::fs::write(&path, rendered) {
        eprintln!("error: cannot write '{}': {e}", path.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
