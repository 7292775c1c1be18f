//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI.

use anyhow::Context;
use clap::{crate_version, Arg, Command};
use simplec::{
    error::Diagnostics,
    ir::{self, DumpOptions, ModuleBuilder},
    lex::Lexer,
    parse, source,
};

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("Simple compiler")
        .version(crate_version!())
        .arg(
            Arg::new("dump")
                .short('d')
                .long("dump-ir")
                .help("Dump intermediate graphs to stdout"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .takes_value(true)
                .value_name("FILE")
                .help("Output file ('-' for stdout); defaults to the source stem"),
        )
        .arg(
            Arg::new("source")
                .required(true)
                .value_name("FILE")
                .help("Source file"),
        )
        .get_matches();

    let path = args.value_of("source").expect("source is required");

    // Fases delanteras; cualquier diagnóstico detiene la compilación
    // antes de que un grafo malformado alcance generación de código
    let module = match compile(path)? {
        Ok(module) => module,
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            std::process::exit(1);
        }
    };

    if args.is_present("dump") {
        let mut stdout = std::io::stdout();
        ir::emit(&module, DumpOptions::all(), &mut stdout).context("Failed to dump to stdout")?;
    }

    // Entrega del módulo terminado, por defecto a un archivo
    // nombrado según el stem del archivo fuente
    match args.value_of("output") {
        // Salida a stdout
        Some("-") => {
            let mut stdout = std::io::stdout();
            ir::emit(&module, DumpOptions::all(), &mut stdout)
                .context("Failed to emit to stdout")?;
        }

        // Salida a archivo
        explicit => {
            let path = match explicit {
                Some(path) => Path::new(path).to_owned(),
                None => Path::new(path).with_extension("ir"),
            };

            let file = File::create(&path)
                .with_context(|| format!("Failed to open for writing: {}", path.display()))?;

            let mut writer = BufWriter::new(file);
            ir::emit(&module, DumpOptions::all(), &mut writer)
                .with_context(|| format!("Failed to emit to file: {}", path.display()))?;

            writer
                .flush()
                .with_context(|| format!("Failed to emit to file: {}", path.display()))?;
        }
    }

    Ok(())
}

/// Ejecuta lexer, parser y lowering sobre un archivo fuente.
///
/// Los errores de E/S son fatales; los errores de compilación se
/// reportan como [`Diagnostics`] para despliegue uniforme.
fn compile(path: &str) -> anyhow::Result<Result<ir::Module, Diagnostics>> {
    let file = File::open(path).with_context(|| format!("Failed to open source file: {}", path))?;

    let (start, stream) = source::consume(BufReader::new(file), path);
    let lexer = Lexer::new(start.clone(), stream);

    let tokens = match lexer.try_exhaustive() {
        Ok(tokens) => tokens,
        Err(errors) => return Ok(Err(Diagnostics::from(errors).kind("Lexical error"))),
    };

    let program = match parse::parse(tokens.iter(), start) {
        Ok(program) => program,
        Err(error) => return Ok(Err(Diagnostics::from(error).kind("Syntax error"))),
    };

    let mut builder = ModuleBuilder::default();
    if let Err(error) = program.lower(&mut builder) {
        return Ok(Err(Diagnostics::from(error).kind("Lowering error")));
    }

    Ok(Ok(builder.seal()))
}
