//! Bind factory arguments to factories and check the resulting graph.
//!
//! A factory argument is a dependency edge to whichever factory produces that type. The binding table makes the
//! mapping explicit (produced-type identity → factory) so that missing producers, ambiguous producers and cycles are
//! reported while generating instead of surfacing as compile errors or unbounded recursion in the generated code.

use std::collections::HashMap;

use dicon_model::{FuncDescriptor, TypeDescriptor, TypeKey};

use crate::errors::{GenerateError, GenerateResult};

/// Produced-type identity → index of the producing factory.
#[derive(Debug)]
pub struct BindingTable<'a> {
    factories: &'a [FuncDescriptor],
    producers: HashMap<TypeKey, usize>,
}

impl<'a> BindingTable<'a> {
    /// Index every factory by the type it produces.
    ///
    /// Factories without a produced type are skipped; signatures are validated separately.
    pub fn build(factories: &'a [FuncDescriptor]) -> GenerateResult<Self> {
        let mut producers: HashMap<TypeKey, usize> = HashMap::new();
        for (idx, factory) in factories.iter().enumerate() {
            let Some(produced) = factory.produced_type() else {
                continue;
            };
            let key = produced.key();
            if let Some(&first) = producers.get(&key) {
                return Err(GenerateError::DuplicateProducer {
                    produced: key.to_string(),
                    first: factories[first].name.clone(),
                    second: factory.name.clone(),
                });
            }
            producers.insert(key, idx);
        }
        Ok(Self { factories, producers })
    }

    /// The factory producing `ty`, if any.
    pub fn producer_of(&self, ty: &TypeDescriptor) -> Option<&'a FuncDescriptor> {
        self.producer_index(ty).map(|idx| &self.factories[idx])
    }

    fn producer_index(&self, ty: &TypeDescriptor) -> Option<usize> {
        self.producers.get(&ty.key()).copied()
    }

    /// Resolve every argument of `factory` to its producer, in argument order.
    pub fn bind(&self, factory: &FuncDescriptor) -> GenerateResult<Vec<&'a FuncDescriptor>> {
        factory
            .arguments
            .iter()
            .map(|arg| {
                self.producer_of(arg).ok_or_else(|| GenerateError::MissingFactory {
                    factory: factory.name.clone(),
                    dependency: arg.key().to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Factory dependency graph (adjacency by factory index).
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    factories: &'a [FuncDescriptor],
    edges: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph from a binding table; fails on the first unbound argument.
    pub fn from_bindings(table: &BindingTable<'a>) -> GenerateResult<Self> {
        let factories = table.factories;
        let mut edges = Vec::with_capacity(factories.len());
        for factory in factories {
            let mut deps = Vec::with_capacity(factory.arguments.len());
            for arg in &factory.arguments {
                let idx = table.producer_index(arg).ok_or_else(|| GenerateError::MissingFactory {
                    factory: factory.name.clone(),
                    dependency: arg.key().to_string(),
                })?;
                deps.push(idx);
            }
            edges.push(deps);
        }
        Ok(Self { factories, edges })
    }

    /// Fail with the offending path if any factory (transitively) depends on itself.
    ///
    /// Roots are visited in input order, so the reported cycle is deterministic. The walk keeps its own stack of
    /// `(factory, next argument)` frames, so chain length is bounded by memory rather than by the thread's stack.
    pub fn check_acyclic(&self) -> GenerateResult<()> {
        let mut marks = vec![Mark::Unvisited; self.factories.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for root in 0..self.factories.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::Visiting;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let Some(&dep) = self.edges[node].get(next) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;
                match marks[dep] {
                    Mark::Done => {}
                    Mark::Visiting => return Err(self.cycle_through(&stack, dep)),
                    Mark::Unvisited => {
                        marks[dep] = Mark::Visiting;
                        stack.push((dep, 0));
                    }
                }
            }
        }
        Ok(())
    }

    /// The path from `node`'s frame to the top of the walk, closed back onto `node`.
    fn cycle_through(&self, stack: &[(usize, usize)], node: usize) -> GenerateError {
        let start = stack.iter().position(|&(n, _)| n == node).unwrap_or(0);
        let mut cycle: Vec<String> = stack[start..]
            .iter()
            .map(|&(n, _)| self.factories[n].name.clone())
            .collect();
        cycle.push(self.factories[node].name.clone());
        GenerateError::DependencyCycle { path: cycle }
    }
}
