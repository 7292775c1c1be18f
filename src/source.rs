//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los distintos objetos internos que el compilador construye
//! deben llevar cuenta de posiciones o rangos de ubicaciones en
//! el código fuente original, lo cual permite determinar un punto
//! exacto o aproximado en donde ocurre un error de abstracción
//! arbitraria.

use std::{
    cell::RefCell,
    fmt::{self, Debug, Display, Formatter},
    io::{self, BufRead},
    ops::Range,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un flujo de entrada, carácter por carácter.
///
/// Cada carácter emitido lleva asociada su propia ubicación.
pub trait InputStream: Iterator<Item = io::Result<(char, Location)>> {}

impl<S: Iterator<Item = io::Result<(char, Location)>>> InputStream for S {}

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    /// Transforma el valor con la misma ubicación.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        Located {
            value: map(self.value),
            location: self.location,
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> Position {
        self.position.start
    }

    /// Obtiene la posición de fin, exclusiva.
    pub fn end(&self) -> Position {
        self.position.end
    }

    /// Obtiene el origen de esta ubicación.
    pub fn source(&self) -> &Rc<Source> {
        &self.from
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name())?;

        let Range { start, end } = self.position;
        if end == start.advance() {
            // Solo se señala una columna en específico
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Decrementa el número de columna.
    pub fn back(self) -> Position {
        Position {
            line: self.line,
            column: self.column - 1,
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }

    /// Ajusta la posición a la siguiente columna de tabulador.
    pub fn tab(self) -> Position {
        let column = 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP;
        Position {
            line: self.line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Nombre de origen e histórico interior de líneas.
///
/// Las líneas se registran conforme se van leyendo, de manera que al
/// momento de reportar un error ya se conoce el texto de toda línea
/// que pueda ser señalada por una ubicación.
pub struct Source {
    name: String,
    lines: RefCell<Vec<String>>,
}

impl Source {
    /// Obtiene el nombre del origen.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presta el texto de una línea, si se conoce.
    pub fn with_line<F>(&self, number: u32, reader: F) -> fmt::Result
    where
        F: FnOnce(&str) -> fmt::Result,
    {
        match number
            .checked_sub(1)
            .and_then(|index| self.lines.borrow().get(index as usize).cloned())
        {
            Some(line) => reader(&line),
            None => Ok(()),
        }
    }
}

/// Transforma un flujo de entrada estándar en uno que itera por carácter.
///
/// Esta función existe debido a que `std` no ofrece algún mecanismo
/// no trivial para realizar la misma operación. La tupla de retorno
/// incluye la ubicación del primer carácter del flujo, la cual sirve
/// como posición por defecto para errores en entradas vacías.
pub fn consume<R, S>(reader: R, name: S) -> (Location, impl InputStream)
where
    R: BufRead,
    S: Into<String>,
{
    let source = Rc::new(Source {
        name: name.into(),
        lines: Default::default(),
    });

    let start = Location {
        from: Rc::clone(&source),
        position: Position::default()..Position::default().advance(),
    };

    let stream = CharStream {
        reader,
        source: Rc::clone(&source),
        line: Vec::new(),
        column: 0,
        position: Position::default(),
        failed: false,
    };

    (start, stream)
}

/// Iterador de caracteres sobre un lector de líneas.
///
/// Al final de cada línea se emite un `'\n'` sintético, incluso si
/// la última línea del archivo no termina en salto de línea.
struct CharStream<R> {
    reader: R,
    source: Rc<Source>,
    line: Vec<char>,
    column: usize,
    position: Position,
    failed: bool,
}

impl<R: BufRead> Iterator for CharStream<R> {
    type Item = io::Result<(char, Location)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.column >= self.line.len() {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,

                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }

                Ok(_) => {
                    let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r');

                    self.line = trimmed.chars().chain(std::iter::once('\n')).collect();
                    self.column = 0;
                    self.source.lines.borrow_mut().push(trimmed.to_owned());
                }
            }
        }

        let c = self.line[self.column];
        self.column += 1;

        let here = self.position;
        self.position = match c {
            '\n' => here.newline(),
            '\t' => here.tab(),
            _ => here.advance(),
        };

        let location = Location {
            from: Rc::clone(&self.source),
            position: here..here.advance(),
        };

        Some(Ok((c, location)))
    }
}
