//! Representación intermedia de grafos de funciones.
//!
//! Cada función del programa se traduce a un [`Graph`]: una secuencia
//! de nodos de valor donde los efectos observables (llamadas) quedan
//! encadenados por un token de memoria explícito. El constructor de
//! grafos ([`GraphBuilder`]) es la costura con el back end: la fase
//! de lowering solo invoca sus operaciones y nunca inspecciona cómo
//! se materializan. [`ModuleBuilder`] es la implementación de
//! referencia en memoria, cuyo [`Module`] final es lo que se entrega
//! a generación de código.

use bitflags::bitflags;
use std::io::{self, Write};

/// Identidad invocable de una función declarada, con su firma.
///
/// Toda firma es `N` parámetros de doble precisión hacia un único
/// resultado de doble precisión.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entity(pub u32);

/// Un valor ya construido dentro del grafo actual.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Value(pub u32);

/// Token de orden de efectos.
///
/// No es un valor numérico: encadena cada llamada con la anterior
/// para que el back end no pueda reordenarlas ni paralelizarlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Effect(pub u32);

/// Operación aritmética de dos operandos.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// Constructor incremental de grafos.
///
/// El contrato de secuencia es: toda entidad se declara antes de
/// abrir cualquier grafo que la refiera, cada grafo se abre con
/// [`begin`](GraphBuilder::begin) y se cierra con un único
/// [`finish`](GraphBuilder::finish), y exactamente un grafo se
/// designa como punto de entrada.
pub trait GraphBuilder {
    /// Crea la entidad para una firma nombre/aridad. Ocurre
    /// exactamente una vez por prototipo.
    fn declare(&mut self, name: &str, parameters: usize) -> Entity;

    /// Abre el grafo de una entidad y entrega su token de
    /// efectos inicial.
    fn begin(&mut self, entity: Entity) -> Effect;

    /// Obtiene el valor del parámetro en la posición dada.
    fn parameter(&mut self, index: usize) -> Value;

    /// Construye una constante.
    fn constant(&mut self, value: f64) -> Value;

    /// Construye un nodo aritmético.
    fn arithmetic(&mut self, op: ArithOp, lhs: Value, rhs: Value) -> Value;

    /// Construye una comparación y extrae su resultado "menor que".
    fn compare(&mut self, lhs: Value, rhs: Value) -> Value;

    /// Ensancha un resultado de comparación a la representación
    /// numérica común, de manera que pueda usarse como cualquier
    /// otro valor.
    fn widen(&mut self, condition: Value) -> Value;

    /// Construye una llamada sobre el token de efectos actual.
    ///
    /// Retorna el token actualizado junto con el resultado escalar;
    /// el token retornado pasa a ser el actual para todo lo que se
    /// construya después.
    fn call(&mut self, effect: Effect, callee: Entity, arguments: Vec<Value>) -> (Effect, Value);

    /// Cierra el grafo actual con su valor de retorno.
    fn finish(&mut self, effect: Effect, result: Value);

    /// Designa la entidad cuyo grafo es el punto de entrada.
    fn entry(&mut self, entity: Entity);
}

/// Un nodo de grafo.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Start,
    Parameter(usize),
    Constant(f64),
    Arithmetic(ArithOp, Value, Value),
    Compare(Value, Value),
    Widen(Value),
    Call {
        effect: Effect,
        callee: Entity,
        arguments: Vec<Value>,
    },
    Return {
        effect: Effect,
        value: Value,
    },
}

/// Firma de una entidad declarada.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub parameters: usize,
}

/// El grafo de una función.
///
/// Los nodos están en orden de construcción; un [`Value`] o un
/// [`Effect`] indexa dentro de `nodes`. El último nodo es siempre
/// el retorno.
#[derive(Debug)]
pub struct Graph {
    pub entity: Entity,
    pub nodes: Vec<Node>,
}

/// Conjunto completo de grafos listo para generación de código.
#[derive(Debug, Default)]
pub struct Module {
    pub entities: Vec<Signature>,
    pub graphs: Vec<Graph>,
    pub entry: Option<Entity>,
}

impl Module {
    /// Obtiene la firma de una entidad.
    pub fn signature(&self, entity: Entity) -> &Signature {
        &self.entities[entity.0 as usize]
    }

    /// Busca el grafo de una entidad, si fue generado.
    ///
    /// Las entidades declaradas con `extern` no poseen grafo.
    pub fn graph(&self, entity: Entity) -> Option<&Graph> {
        self.graphs.iter().find(|graph| graph.entity == entity)
    }
}

/// Implementación en memoria de [`GraphBuilder`].
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
    current: Option<Graph>,
}

impl ModuleBuilder {
    /// Entrega el módulo terminado.
    pub fn seal(self) -> Module {
        assert!(self.current.is_none(), "a graph is still under construction");
        self.module
    }

    fn push(&mut self, node: Node) -> u32 {
        let graph = self
            .current
            .as_mut()
            .expect("node built outside of any graph");

        graph.nodes.push(node);
        graph.nodes.len() as u32 - 1
    }
}

impl GraphBuilder for ModuleBuilder {
    fn declare(&mut self, name: &str, parameters: usize) -> Entity {
        let entity = Entity(self.module.entities.len() as u32);
        self.module.entities.push(Signature {
            name: name.to_owned(),
            parameters,
        });

        entity
    }

    fn begin(&mut self, entity: Entity) -> Effect {
        assert!(self.current.is_none(), "graphs cannot nest");

        self.current = Some(Graph {
            entity,
            nodes: vec![Node::Start],
        });

        Effect(0)
    }

    fn parameter(&mut self, index: usize) -> Value {
        Value(self.push(Node::Parameter(index)))
    }

    fn constant(&mut self, value: f64) -> Value {
        Value(self.push(Node::Constant(value)))
    }

    fn arithmetic(&mut self, op: ArithOp, lhs: Value, rhs: Value) -> Value {
        Value(self.push(Node::Arithmetic(op, lhs, rhs)))
    }

    fn compare(&mut self, lhs: Value, rhs: Value) -> Value {
        Value(self.push(Node::Compare(lhs, rhs)))
    }

    fn widen(&mut self, condition: Value) -> Value {
        Value(self.push(Node::Widen(condition)))
    }

    fn call(&mut self, effect: Effect, callee: Entity, arguments: Vec<Value>) -> (Effect, Value) {
        let node = self.push(Node::Call {
            effect,
            callee,
            arguments,
        });

        // El mismo nodo encarna tanto el resultado escalar como el
        // token de efectos actualizado
        (Effect(node), Value(node))
    }

    fn finish(&mut self, effect: Effect, result: Value) {
        self.push(Node::Return {
            effect,
            value: result,
        });

        let graph = self.current.take().expect("finish outside of any graph");
        self.module.graphs.push(graph);
    }

    fn entry(&mut self, entity: Entity) {
        self.module.entry = Some(entity);
    }
}

bitflags! {
    /// Secciones a incluir al volcar un módulo.
    pub struct DumpOptions: u32 {
        /// Tabla de entidades con sus firmas.
        const ENTITIES = 0x01;

        /// Listado de nodos de cada grafo.
        const GRAPHS = 0x02;
    }
}

/// Vuelca la forma textual de un módulo.
///
/// Este listado es el artefacto que consume el colaborador de
/// generación de código; también sirve para inspección manual
/// mediante la opción de volcado del driver.
pub fn emit<W: Write>(module: &Module, options: DumpOptions, output: &mut W) -> io::Result<()> {
    if options.contains(DumpOptions::ENTITIES) {
        for (index, signature) in module.entities.iter().enumerate() {
            let marker = match module.entry {
                Some(entry) if entry.0 as usize == index => " entry",
                _ => "",
            };

            writeln!(
                output,
                "entity {} {}/{}{}",
                index, signature.name, signature.parameters, marker
            )?;
        }

        writeln!(output)?;
    }

    if options.contains(DumpOptions::GRAPHS) {
        for graph in &module.graphs {
            writeln!(output, "graph {}:", module.signature(graph.entity).name)?;

            for (index, node) in graph.nodes.iter().enumerate() {
                write!(output, "  %{}: ", index)?;
                match node {
                    Node::Start => writeln!(output, "start")?,
                    Node::Parameter(position) => writeln!(output, "param {}", position)?,
                    Node::Constant(value) => writeln!(output, "const {}", value)?,

                    Node::Arithmetic(op, lhs, rhs) => {
                        let mnemonic = match op {
                            ArithOp::Add => "add",
                            ArithOp::Sub => "sub",
                            ArithOp::Mul => "mul",
                        };

                        writeln!(output, "{} %{}, %{}", mnemonic, lhs.0, rhs.0)?;
                    }

                    Node::Compare(lhs, rhs) => writeln!(output, "lt %{}, %{}", lhs.0, rhs.0)?,
                    Node::Widen(condition) => writeln!(output, "widen %{}", condition.0)?,

                    Node::Call {
                        effect,
                        callee,
                        arguments,
                    } => {
                        write!(output, "call {}(", module.signature(*callee).name)?;
                        for (position, argument) in arguments.iter().enumerate() {
                            if position > 0 {
                                write!(output, ", ")?;
                            }

                            write!(output, "%{}", argument.0)?;
                        }

                        writeln!(output, ") mem %{}", effect.0)?;
                    }

                    Node::Return { effect, value } => {
                        writeln!(output, "return %{} mem %{}", value.0, effect.0)?;
                    }
                }
            }

            writeln!(output)?;
        }
    }

    Ok(())
}
