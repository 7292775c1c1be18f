//! Compilador para el lenguaje Simple.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente.
//! Este archivo se somete primero a análisis léxico en [`lex`], de
//! lo cual se obtiene un flujo de tokens. El flujo de tokens se
//! dispone en un AST por medio de análisis sintáctico en [`parse`]:
//! prototipos, funciones y la secuencia de expresiones de nivel
//! superior que conforma el punto de entrada implícito. El árbol
//! sintáctico se traduce en [`lower`] a la representación intermedia
//! de grafos de funciones descrita en [`ir`], con lo cual concluyen
//! las fases delanteras del compilador.
//!
//! # Back end
//! La generación de código a partir del módulo terminado es un
//! colaborador externo: este crate construye y entrega el conjunto
//! de grafos a través de la costura [`ir::GraphBuilder`] y nunca
//! inspecciona cómo se seleccionan instrucciones ni cómo se emite el
//! artefacto final. Los programas compilados enlazan contra la
//! biblioteca de soporte `runtime`, la cual provee las rutinas de
//! E/S invocables desde código fuente y el punto de entrada nativo.

pub mod error;
pub mod ir;
pub mod lex;
pub mod lower;
pub mod parse;
pub mod source;
