//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco y los comentarios se descartan durante esta operación. Cada
//! token emitido esta asociado a una ubicación en el código fuente original,
//! lo cual permite rastrear errores en tanto los mismos como constructos
//! más elevados de fases posteriores.
//!
//! # Contenido de un token
//! Este lexer no produce lexemas para casos donde no son necesarios o terminan
//! siendo más complicados. Los operadores, la puntuación y las palabras clave
//! se identifican por el hecho de lo que son y no incluyen lexemas. Por su
//! parte, los identificadores sí incluyen su lexema original. Las constantes
//! literales se resuelven a sus valores en vez de preservar sus lexemas.
//!
//! # Reglas importantes del lenguaje
//! - Los identificadores empiezan con una letra y continúan con
//!   letras o dígitos.
//! - Las palabras `def` y `extern` son reservadas y nunca clasifican
//!   como identificadores.
//! - Un `#` descarta el resto de la línea donde aparece.
//! - Cualquier otro carácter que no forme parte de un token conocido
//!   se emite como [`Token::Unknown`]; es responsabilidad del parser
//!   rechazarlo al no calzar con ninguna regla gramatical.
//!
//! # Errores
//! El lexer es capaz de recuperarse parcialmente de condiciones de error.
//! Esto ocurre en suficiente grado como para reportar más de un error por
//! ejecución, pero no lo suficiente como para permitir el avance a las
//! demás fases de la compilación.

use crate::source::{InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    rc::Rc,
    str::FromStr,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Error de E/S originado por el [`InputStream`].
    #[error("I/O error")]
    Input(#[from] std::io::Error),

    /// Una constante numérica no es un literal decimal válido.
    #[error("Bad numeric literal `{0}`")]
    MalformedNumber(String),
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<String>);

impl Identifier {
    /// Construye un identificador a partir de su lexema.
    pub fn new<S: Into<String>>(lexeme: S) -> Self {
        Identifier(Rc::new(lexeme.into()))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente. El final de la entrada no
/// tiene token propio: el lexer simplemente deja de producir ítems.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal numérico.
    Number(f64),

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `<`
    Less,

    /// `,`
    Comma,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// Cualquier otro carácter, preservado para diagnósticos.
    Unknown(char),
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Id(id) => write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Number(number) => write!(fmt, "literal `{}`", number),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Times => fmt.write_str("`*`"),
            Less => fmt.write_str("`<`"),
            Comma => fmt.write_str("`,`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            Unknown(c) => write!(fmt, "character {:?}", c),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Def,
    Extern,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Keyword::Def => "def",
            Keyword::Extern => "extern",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "def" => Ok(Keyword::Def),
            "extern" => Ok(Keyword::Extern),
            _ => Err(()),
        }
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada. El único lookahead que se
/// mantiene entre llamadas es el carácter que delimitó al token
/// anterior, ya que el mismo inicia al token siguiente.
pub struct Lexer<S: Iterator> {
    source: std::iter::Peekable<S>,
    state: State,
    start: Location,
    last: Location,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de error.
    Error,

    /// Estado de completitud; siempre emite el token incluido,
    /// consume la entrada actual y pasa a [`State::Start`].
    Complete(Token),

    /// Comentario de línea iniciado por `#`.
    ///
    /// Este estado vuelve a [`State::Start`] al encontrar `'\n'`.
    Comment,

    /// Constante numérica.
    ///
    /// Este estado acumula mientras el siguiente carácter sea un
    /// dígito o un punto decimal. El lexema completo se convierte
    /// al finalizar, fallando si no es un literal decimal válido.
    Numeric(String),

    /// Término que puede ser un identificador o una palabra clave.
    Word(String),
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(start: Location, source: S) -> Self {
        let last = start.clone();
        Lexer {
            source: source.peekable(),
            state: State::Start,
            start,
            last,
        }
    }

    /// Reduce la entrada a sea una secuencia conocida de tokens
    /// infalibles o una secuencia de errores.
    ///
    /// En caso de que ocurra al menos un error, el lexer dejará
    /// de buscar tokens exitosos y comenzará a acumular solamente
    /// errores. El propósito de esta función es permitir la
    /// recolección de múltiples errores léxicos en una misma ejecución
    /// del compilador.
    pub fn try_exhaustive(mut self) -> Result<Vec<Located<Token>>, Vec<Located<LexerError>>> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next() {
            match result {
                Ok(token) => tokens.push(token),
                Err(error) => {
                    drop(tokens);

                    let mut errors = vec![error];
                    errors.extend(self.filter_map(Result::err));

                    return Err(errors);
                }
            }
        }

        Ok(tokens)
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<Token>, LexerError> {
        use {State::*, Token::*};

        let token = loop {
            // Se espera un siguiente carácter, fallando si hay error de E/S
            let next_char = match self.source.peek() {
                None => None,
                Some(Ok((c, _))) => Some(*c),
                Some(Err(_)) => {
                    let error = self.source.next().expect("peeked item vanished");
                    break Err(error.err().expect("peeked error vanished").into());
                }
            };

            // La posición de origen se mueve junto a la posición
            // siguiente siempre que no se haya encontrado una
            // frontera de token
            if let (Start, Some(Ok((_, location)))) = (&self.state, self.source.peek()) {
                self.start = location.clone();
            }

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                // Condiciones de error: se descarta la línea donde
                // ocurrió el error. Al llegar al final de la línea
                // el lexer se recupera y reinicia.
                (Error, None) => return Ok(None),
                (Error, Some('\n')) => self.state = Start,
                (Error, Some(_)) => (),

                (Start, None) => return Ok(None),

                // Comentarios de línea
                (Start, Some('#')) => self.state = Comment,

                // Identificadores y palabras clave
                (Start, Some(c)) if c.is_ascii_alphabetic() => self.state = Word(c.to_string()),

                // Inicio de una constante numérica. No se consume el
                // dígito, ya que esta lógica ya está implementada en el
                // respectivo caso para un estado de constante numérica.
                (Start, Some(c)) if c.is_ascii_digit() => {
                    self.state = Numeric(String::new());
                    continue;
                }

                // Espacios en blanco
                (Start, Some(c)) if c.is_ascii_whitespace() => (),

                // Operadores y puntuación
                (Start, Some(c)) => {
                    self.state = Complete(match c {
                        '+' => Plus,
                        '-' => Minus,
                        '*' => Times,
                        '<' => Less,
                        ',' => Comma,
                        ';' => Semicolon,
                        '(' => OpenParen,
                        ')' => CloseParen,
                        other => Unknown(other),
                    });
                }

                // Emisión retardada de tokens cualesquiera
                (Complete(value), _) => break Ok(std::mem::replace(value, Plus)),

                // Los comentarios descartan la línea donde ocurren
                (Comment, Some('\n')) => self.state = Start,
                (Comment, Some(_)) => (),
                (Comment, None) => self.state = Start,

                // Acumulación de constantes numéricas
                (Numeric(lexeme), Some(c)) if c.is_ascii_digit() || c == '.' => {
                    lexeme.push(c);
                }

                // Si sigue algo que no puede extender la constante, ha terminado
                (Numeric(lexeme), _) => match lexeme.parse() {
                    Ok(value) => break Ok(Token::Number(value)),
                    Err(_) => break Err(LexerError::MalformedNumber(std::mem::take(lexeme))),
                },

                // Extensión de términos
                (Word(word), Some(c)) if c.is_ascii_alphanumeric() => {
                    word.push(c);
                }

                // Si sigue algo que no puede formar parte del término, ha terminado
                (Word(word), _) => {
                    if let Ok(keyword) = self::Keyword::from_str(word) {
                        break Ok(Keyword(keyword));
                    } else {
                        break Ok(Id(Identifier(Rc::new(std::mem::take(word)))));
                    }
                }
            }

            // Si no hubo `continue`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some(Ok((_, location))) = self.source.next() {
                self.last = location;
            }
        };

        token.map(Some)
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some(token)) => {
                self.state = State::Start;

                let location = Location::span(self.start.clone(), &self.last);
                Some(Ok(Located::at(token, location)))
            }

            Err(error) => {
                self.state = State::Error;

                let location = Location::span(self.start.clone(), &self.last);
                Some(Err(Located::at(error, location)))
            }
        }
    }
}
