use simplec::{
    error::Diagnostics,
    ir::{self, DumpOptions, ModuleBuilder},
    lex::Lexer,
    parse, source,
};

fn main() {
    let stdin = std::io::stdin();
    let stdin = stdin.lock();

    let (start, stream) = source::consume(stdin, "<stdin>");
    let lexer = Lexer::new(start.clone(), stream);

    let diagnostics = match lexer.try_exhaustive() {
        Err(errors) => Diagnostics::from(errors).kind("Lexical error"),

        Ok(tokens) => match parse::parse(tokens.iter(), start) {
            Err(error) => Diagnostics::from(error).kind("Syntax error"),

            Ok(program) => {
                print!("Program:\n{}\n", program);

                let mut builder = ModuleBuilder::default();
                match program.lower(&mut builder) {
                    Err(error) => Diagnostics::from(error).kind("Lowering error"),

                    Ok(()) => {
                        let module = builder.seal();

                        let mut stdout = std::io::stdout();
                        ir::emit(&module, DumpOptions::all(), &mut stdout)
                            .expect("failed to write to stdout");

                        return;
                    }
                }
            }
        },
    };

    eprint!("{}", diagnostics);
}
