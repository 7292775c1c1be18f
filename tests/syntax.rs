use simplec::{
    lex::{Lexer, LexerError, Token},
    parse::{self, BinOp, Expr, ParserError, Program},
    source,
};

use std::rc::Rc;

// ── Lexer ────────────────────────────────────────────────────────────────

#[test]
fn keywords_are_reserved() {
    let tokens = tokens("def extern defined");

    assert_eq!(tokens.len(), 3);
    assert!(matches!(tokens[0], Token::Keyword(_)));
    assert!(matches!(tokens[1], Token::Keyword(_)));
    assert!(matches!(&tokens[2], Token::Id(id) if id.as_ref() == "defined"));
}

#[test]
fn punctuation_tokens() {
    let expected = [
        Token::Plus,
        Token::Minus,
        Token::Times,
        Token::Less,
        Token::Comma,
        Token::Semicolon,
        Token::OpenParen,
        Token::CloseParen,
        Token::Unknown('$'),
    ];

    assert_eq!(tokens("+ - * < , ; ( ) $"), expected);
}

#[test]
fn numeric_literals_resolve_to_values() {
    assert_eq!(tokens("42"), [Token::Number(42.0)]);
    assert_eq!(tokens("1.5"), [Token::Number(1.5)]);
    assert_eq!(tokens("0.25 3"), [Token::Number(0.25), Token::Number(3.0)]);
}

#[test]
fn comments_extend_to_end_of_line() {
    let tokens = tokens("1 # comment with ( garbage $\n2 # trailing comment");
    assert_eq!(tokens, [Token::Number(1.0), Token::Number(2.0)]);
}

#[test]
fn identifiers_are_alphanumeric_runs() {
    let tokens = tokens("a1b+c");

    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Id(id) if id.as_ref() == "a1b"));
    assert_eq!(tokens[1], Token::Plus);
    assert!(matches!(&tokens[2], Token::Id(id) if id.as_ref() == "c"));
}

#[test]
fn malformed_literal_is_rejected() {
    let (start, stream) = source::consume("1.2.3".as_bytes(), "<test>");
    let errors = Lexer::new(start, stream)
        .try_exhaustive()
        .expect_err("a literal with two periods should not lex");

    assert!(matches!(
        errors[0].val(),
        LexerError::MalformedNumber(lexeme) if lexeme == "1.2.3"
    ));
}

#[test]
fn tokens_carry_locations() {
    let (start, stream) = source::consume("a\n  b".as_bytes(), "<test>");
    let tokens = Lexer::new(start, stream)
        .try_exhaustive()
        .expect("lexing failed");

    let location = tokens[1].location();
    assert_eq!(location.start().line(), 2);
    assert_eq!(location.start().column(), 3);
}

// ── Expression parsing ───────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(top_level_expr("a + b * c"), "(a + (b * c))");
}

#[test]
fn comparison_binds_loosest() {
    assert_eq!(top_level_expr("a < b + c"), "(a < (b + c))");
}

#[test]
fn equal_precedence_associates_left() {
    assert_eq!(top_level_expr("a - b + c"), "((a - b) + c)");
    assert_eq!(top_level_expr("a * b * c"), "((a * b) * c)");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(top_level_expr("(a + b) * c"), "((a + b) * c)");
}

#[test]
fn constant_fold_shape() {
    // 2 * 3 - 4 parses as (2 * 3) - 4, never 2 * (3 - 4)
    let program = parse_ok("2 * 3 - 4");
    let expr = program.top_level()[0].val();

    match expr {
        Expr::Binary(lhs, BinOp::Sub, rhs) => {
            assert!(matches!(lhs.val(), Expr::Binary(_, BinOp::Mul, _)));
            assert!(matches!(rhs.val(), Expr::Number(value) if *value == 4.0));
        }

        other => panic!("expected subtraction at the root, found {}", other),
    }
}

#[test]
fn identifier_followed_by_paren_is_a_call() {
    let program = parse_ok("foo(1, bar(2), 3 + 4)");

    match program.top_level()[0].val() {
        Expr::Call(callee, args) => {
            assert_eq!(callee.as_ref().as_ref(), "foo");
            assert_eq!(args.len(), 3);
            assert!(matches!(args[1].val(), Expr::Call(_, _)));
            assert!(matches!(args[2].val(), Expr::Binary(_, BinOp::Add, _)));
        }

        other => panic!("expected a call, found {}", other),
    }
}

#[test]
fn bare_identifier_is_a_variable() {
    let program = parse_ok("foo");
    assert!(matches!(
        program.top_level()[0].val(),
        Expr::Variable(name) if name.as_ref() == "foo"
    ));
}

#[test]
fn empty_argument_list() {
    let program = parse_ok("foo()");
    assert!(matches!(
        program.top_level()[0].val(),
        Expr::Call(_, args) if args.is_empty()
    ));
}

// ── Top-level constructs ─────────────────────────────────────────────────

#[test]
fn semicolons_separate_top_level_expressions() {
    let program = parse_ok("1; 2; 3;");
    assert_eq!(program.top_level().len(), 3);
    assert!(program.functions().is_empty());
}

#[test]
fn definitions_and_externs_are_recorded() {
    let program = parse_ok("extern print(x)\ndef twice(x) x + x\ntwice(2);");

    assert_eq!(program.functions().len(), 1);
    assert_eq!(program.top_level().len(), 1);
    assert_eq!(program.prototypes().count(), 2);
    assert!(program.lookup(&id("print")).is_some());
}

#[test]
fn prototype_redeclaration_keeps_the_first() {
    let program = parse_ok("extern foo(a)\ndef foo(a b) a");

    let prototype = program.lookup(&id("foo")).expect("foo is not declared");
    assert_eq!(prototype.arity(), 1);
    assert_eq!(prototype.parameters()[0].as_ref().as_ref(), "a");

    // La función comparte el prototipo de la primera declaración
    assert!(Rc::ptr_eq(program.functions()[0].prototype(), prototype));
}

// ── Syntax errors ────────────────────────────────────────────────────────

#[test]
fn duplicate_parameter_is_rejected() {
    assert!(matches!(
        parse_err("def f(a a) a"),
        ParserError::DuplicateParameter(name) if name.as_ref() == "a"
    ));
}

#[test]
fn unbalanced_parenthesis() {
    assert!(matches!(parse_err("(1 + 2"), ParserError::UnexpectedEof));
}

#[test]
fn missing_function_name() {
    assert!(matches!(
        parse_err("def (a) a"),
        ParserError::ExpectedFunctionName
    ));
}

#[test]
fn bad_argument_separator() {
    assert!(matches!(
        parse_err("f(1 2)"),
        ParserError::MissingSeparationToken
    ));
}

#[test]
fn stray_character_fails_at_the_parser() {
    assert!(matches!(parse_err("1 + $"), ParserError::ExpectedExpr(_)));
}

// ── Round trip ───────────────────────────────────────────────────────────

#[test]
fn reparsing_rendered_output_is_stable() {
    let source = "extern print(x)\ndef add(a b) a + b\nprint(add(1, 2 * 3));\n1 < 2;";

    let first = parse_ok(source).to_string();
    let second = parse_ok(&first).to_string();

    assert_eq!(first, second);
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn tokens(source_text: &str) -> Vec<Token> {
    let (start, stream) = source::consume(source_text.as_bytes(), "<test>");
    Lexer::new(start, stream)
        .try_exhaustive()
        .expect("lexing failed")
        .into_iter()
        .map(|token| token.into_inner())
        .collect()
}

fn parse_ok(source_text: &str) -> Program {
    let (start, stream) = source::consume(source_text.as_bytes(), "<test>");
    let tokens = Lexer::new(start.clone(), stream)
        .try_exhaustive()
        .expect("lexing failed");

    parse::parse(tokens.iter(), start).expect("parsing failed")
}

fn parse_err(source_text: &str) -> ParserError {
    let (start, stream) = source::consume(source_text.as_bytes(), "<test>");
    let tokens = Lexer::new(start.clone(), stream)
        .try_exhaustive()
        .expect("lexing failed");

    parse::parse(tokens.iter(), start)
        .expect_err("parsing should have failed")
        .into_inner()
}

fn top_level_expr(source_text: &str) -> String {
    parse_ok(source_text).top_level()[0].val().to_string()
}

fn id(name: &str) -> simplec::lex::Identifier {
    simplec::lex::Identifier::new(name)
}
