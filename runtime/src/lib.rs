//! Biblioteca de soporte para programas Simple.
//!
//! # Propósito
//! El lenguaje incluye rutinas de E/S que no pueden expresarse en el
//! propio lenguaje. Esta biblioteca las implementa, así como el punto
//! de entrada nativo que transfiere control al programa compilado.
//!
//! # Enlazado
//! `libruntime` espera en tiempo de enlazado la presencia del símbolo
//! `__simple_main`, el cual debe ser emitido por el back end a partir
//! del grafo de entrada y es el verdadero punto de entrada del
//! programa. Desde la perspectiva del programa fuente, las rutinas de
//! esta biblioteca se declaran con `extern` y se invocan como
//! cualquier otra función.
//!
//! # Uso
//! Todos los símbolos se exportan "unmangled" con la convención de
//! llamada de C. El compilador no necesita conocer más que el nombre
//! de cada rutina: toda firma es doubles hacia un único double.
//! Cometer una equivocación en la aridad de una declaración `extern`
//! resulta en Comportamiento Indefinido, razón por la cual el front
//! end rechaza llamadas cuya aridad no calza con la declaración.
//!
//! # Toma de control
//! Es posible utilizar la biblioteca desde Rust para propósitos de
//! prueba. Ello requiere definir
//! `#[no_mangle] extern "C" fn __simple_main() -> f64` e invocar a
//! [`handover()`].

use std::io::{self, Read, Write};

/// Escribe el carácter cuyo código es `c`, truncado a byte.
///
/// Retorna siempre cero, de manera que la rutina pueda usarse en
/// posición de expresión.
#[no_mangle]
pub extern "C" fn putchard(c: f64) -> f64 {
    let byte = [c as u8];

    let stdout = io::stdout();
    let _ = stdout.lock().write_all(&byte);

    0.0
}

/// Lee un único carácter de la entrada estándar.
///
/// Al agotarse la entrada se retorna `-1.0`, igual que `getchar()`.
#[no_mangle]
pub extern "C" fn getchard() -> f64 {
    let stdin = io::stdin();
    let mut byte = [0];

    match stdin.lock().read(&mut byte) {
        Ok(1) => byte[0] as f64,
        _ => -1.0,
    }
}

/// Lee un número de la entrada estándar.
///
/// Se descartan espacios en blanco iniciales y se consume el token
/// que les sigue. Si el token no es un literal decimal válido o la
/// entrada se agotó, se retorna cero.
#[no_mangle]
pub extern "C" fn read() -> f64 {
    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    let mut token = String::new();
    let mut byte = [0];

    loop {
        match stdin.read(&mut byte) {
            Ok(1) => {
                let c = byte[0] as char;
                if c.is_ascii_whitespace() {
                    if token.is_empty() {
                        continue;
                    }

                    break;
                }

                token.push(c);
            }

            _ => break,
        }
    }

    token.parse().unwrap_or(0.0)
}

/// Imprime un número en su propia línea.
#[no_mangle]
pub extern "C" fn print(d: f64) {
    println!("{:.6}", d);
}

/// Transfiere control al programa.
///
/// Esta función es el mecanismo seguro para iniciar un programa que
/// enlazó contra `libruntime`.
pub fn handover() -> f64 {
    extern "C" {
        fn __simple_main() -> f64;
    }

    unsafe { __simple_main() }
}

/// Punto de entrada nativo de todo ejecutable enlazado.
///
/// Se omite bajo `cfg(test)` para no chocar con el punto de entrada
/// del harness de pruebas.
#[cfg(not(test))]
#[no_mangle]
pub extern "C" fn main() -> i32 {
    handover();
    0
}
