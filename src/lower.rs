//! Lowering del AST hacia grafos de funciones.
//!
//! Esta fase recorre el [`Program`](parse::Program) y emite llamadas
//! de construcción contra un [`GraphBuilder`], resolviendo nombres a
//! valores en el proceso. Primero se crea la entidad de todo
//! prototipo, luego un grafo por función y finalmente el grafo
//! sintetizado del punto de entrada, que evalúa las expresiones de
//! nivel superior en orden de aparición.
//!
//! # Orden de efectos
//! Las llamadas son las únicas expresiones con efectos observables.
//! Cada una consume el token de efectos actual y produce el
//! siguiente, de manera que el IR resultante preserva el orden del
//! código fuente incluso a través de llamadas anidadas; el orden de
//! evaluación de argumentos (izquierda a derecha) es una garantía
//! visible para el usuario y no un detalle de implementación.

use std::collections::HashMap;
use thiserror::Error;

use crate::{
    ir::{ArithOp, Effect, Entity, GraphBuilder, Value},
    lex::Identifier,
    parse::{self, BinOp, Expr, Function},
    source::Located,
};

/// Símbolo del punto de entrada que la biblioteca de soporte espera
/// encontrar en todo programa compilado.
pub const ENTRY_SYMBOL: &str = "__simple_main";

/// Error de lowering.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LowerError {
    /// Llamada a un nombre sin prototipo declarado.
    #[error("Cannot call unknown function `{0}`")]
    UnresolvedCallee(Identifier),

    /// Referencia a un nombre que no es parámetro de la función
    /// que lo contiene.
    #[error("Unknown variable `{0}`")]
    UnresolvedVariable(Identifier),

    /// La cantidad de argumentos no calza con el prototipo.
    #[error("Function `{callee}` takes {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: Identifier,
        expected: usize,
        found: usize,
    },
}

pub type Lower<T> = Result<T, Located<LowerError>>;

/// Tabla de vínculos nombre→valor de un único grafo.
type Bindings = HashMap<Identifier, Value>;

impl parse::Program {
    /// Baja el programa completo contra un constructor de grafos.
    ///
    /// En caso de error no se cierra ningún grafo adicional: el
    /// constructor queda a medias y debe descartarse, de manera que
    /// ningún grafo malformado alcance generación de código.
    pub fn lower<B: GraphBuilder>(&self, builder: &mut B) -> Lower<()> {
        let mut entities = HashMap::new();
        for prototype in self.prototypes() {
            let entity = builder.declare(prototype.name().as_ref().as_ref(), prototype.arity());
            entities.insert(prototype.name().as_ref().clone(), (entity, prototype.arity()));
        }

        let mut context = Context { builder, entities };
        for function in self.functions() {
            context.function(function)?;
        }

        context.entry(self.top_level())
    }
}

/// Estado compartido entre los grafos de un mismo programa.
struct Context<'a, B: GraphBuilder> {
    builder: &'a mut B,
    entities: HashMap<Identifier, (Entity, usize)>,
}

impl<B: GraphBuilder> Context<'_, B> {
    /// Baja una función definida hacia su propio grafo.
    fn function(&mut self, function: &Function) -> Lower<()> {
        let prototype = function.prototype();
        let (entity, _) = self.entities[prototype.name().as_ref()];

        let mut effect = self.builder.begin(entity);

        // El alcance de un parámetro es el cuerpo completo; no hay
        // anidamiento ni shadowing
        let mut bindings = Bindings::new();
        for (index, parameter) in prototype.parameters().iter().enumerate() {
            bindings.insert(parameter.as_ref().clone(), self.builder.parameter(index));
        }

        let result = self.eval(function.body(), &bindings, &mut effect)?;
        self.builder.finish(effect, result);

        Ok(())
    }

    /// Sintetiza el grafo del punto de entrada.
    ///
    /// Las expresiones de nivel superior se evalúan contra una tabla
    /// de vínculos vacía, encadenando el token de efectos entre ellas
    /// igual que dentro de un cuerpo de función. El resultado del
    /// grafo es el valor de la última expresión, o cero si no hay
    /// ninguna.
    fn entry(&mut self, top_level: &[Located<Expr>]) -> Lower<()> {
        let entity = self.builder.declare(ENTRY_SYMBOL, 0);
        let mut effect = self.builder.begin(entity);

        let bindings = Bindings::new();
        let mut result = None;
        for expr in top_level {
            result = Some(self.eval(expr, &bindings, &mut effect)?);
        }

        let result = match result {
            Some(value) => value,
            None => self.builder.constant(0.0),
        };

        self.builder.finish(effect, result);
        self.builder.entry(entity);

        Ok(())
    }

    /// Baja una expresión a un único valor.
    fn eval(
        &mut self,
        expr: &Located<Expr>,
        bindings: &Bindings,
        effect: &mut Effect,
    ) -> Lower<Value> {
        match expr.as_ref() {
            Expr::Number(value) => Ok(self.builder.constant(*value)),

            Expr::Variable(name) => match bindings.get(name) {
                Some(value) => Ok(*value),
                None => Err(Located::at(
                    LowerError::UnresolvedVariable(name.clone()),
                    expr.location().clone(),
                )),
            },

            Expr::Binary(lhs, op, rhs) => {
                let lhs = self.eval(lhs, bindings, effect)?;
                let rhs = self.eval(rhs, bindings, effect)?;

                Ok(match op {
                    BinOp::Add => self.builder.arithmetic(ArithOp::Add, lhs, rhs),
                    BinOp::Sub => self.builder.arithmetic(ArithOp::Sub, lhs, rhs),
                    BinOp::Mul => self.builder.arithmetic(ArithOp::Mul, lhs, rhs),

                    // El resultado booleano se ensancha para que una
                    // comparación sirva como operando ordinario
                    BinOp::Less => {
                        let condition = self.builder.compare(lhs, rhs);
                        self.builder.widen(condition)
                    }
                })
            }

            Expr::Call(callee, args) => {
                let (entity, arity) = match self.entities.get(callee.as_ref()) {
                    Some(&resolved) => resolved,
                    None => {
                        return Err(Located::at(
                            LowerError::UnresolvedCallee(callee.as_ref().clone()),
                            callee.location().clone(),
                        ))
                    }
                };

                if args.len() != arity {
                    return Err(Located::at(
                        LowerError::ArityMismatch {
                            callee: callee.as_ref().clone(),
                            expected: arity,
                            found: args.len(),
                        },
                        expr.location().clone(),
                    ));
                }

                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.eval(arg, bindings, effect)?);
                }

                let (next, value) = self.builder.call(*effect, entity, arguments);
                *effect = next;

                Ok(value)
            }
        }
    }
}
