use simplec::{lex::Lexer, parse, source};

fn main() {
    let stdin = std::io::stdin();
    let stdin = stdin.lock();

    let (start, stream) = source::consume(stdin, "<stdin>");
    let lexer = Lexer::new(start.clone(), stream);

    match lexer.try_exhaustive() {
        Err(errors) => eprintln!("{:#?}", errors),
        Ok(tokens) => {
            println!("Tokens: {:#?}", tokens);
            println!();
            println!("{:#?}", parse::parse(tokens.iter(), start));
        }
    }
}
