//! Acumulación y despliegue de diagnósticos.
//!
//! Todo error de las fases del compilador termina aquí: un canal de
//! solo escritura que asocia cada mensaje con la ubicación original
//! donde fue detectado y que sabe renderizar el extracto de código
//! señalado.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

/// Un error con ubicación conocida, borrado de tipo.
pub trait LocatedError: sealed::Sealed {
    fn message(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn message(&self) -> &dyn Error {
        self.as_ref()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

/// Colección de errores de una misma fase, lista para desplegarse.
pub struct Diagnostics {
    kind: &'static str,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    /// Etiqueta los errores con la fase que los produjo.
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            errors: Vec::new(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics::from(vec![error])
    }
}

impl<E: 'static + LocatedError> From<Vec<E>> for Diagnostics {
    fn from(errors: Vec<E>) -> Self {
        Diagnostics {
            errors: errors
                .into_iter()
                .map(|error| Box::new(error) as Box<dyn LocatedError>)
                .collect(),
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in &self.errors {
            writeln!(fmt, "{}: {}", self.kind, error.message())?;
            writeln!(fmt, " --> {}", error.location())?;
            excerpt(error.location(), fmt)?;
            writeln!(fmt)?;
        }

        let noun = if self.errors.len() == 1 {
            "error"
        } else {
            "errors"
        };

        writeln!(fmt, "Build failed with {} {}", self.errors.len(), noun)
    }
}

/// Reproduce las líneas señaladas por una ubicación, subrayando el
/// rango exacto cuando este cabe en una sola línea.
fn excerpt(location: &Location, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (start, end) = (location.start(), location.end());
    let gutter = end.line().to_string().len();

    writeln!(fmt, "{:gutter$} |", "", gutter = gutter)?;
    for line in start.line()..=end.line() {
        location.source().with_line(line, |text| {
            writeln!(fmt, "{:>gutter$} | {}", line, text, gutter = gutter)
        })?;
    }

    if start.line() == end.line() {
        // La posición de fin es exclusiva, por lo cual el subrayado
        // termina una columna antes
        let skip = (start.column() - 1) as usize;
        let width = (end.column() - start.column()).max(1) as usize;

        writeln!(
            fmt,
            "{:gutter$} | {:skip$}{:^<width$}",
            "",
            "",
            "",
            gutter = gutter,
            skip = skip,
            width = width
        )?;
    }

    Ok(())
}
