//! Dataflow graph runtime: typed cells, dependency edges and glitch-free passes.
//!
//! Cells are declared in order and a derived cell may only list already
//! declared cells as dependencies, so declaration order is a topological
//! order and a cycle cannot be expressed. A pass writes one or more root
//! cells, recomputes every transitive dependent exactly once in declaration
//! order, and commits all staged values together at the end.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use engine_logging::engine_trace;
use thiserror::Error;

/// Values that can live in a cell.
pub trait CellValue: Any + Clone + PartialEq + fmt::Debug + Send + Sync {}

impl<T: Any + Clone + PartialEq + fmt::Debug + Send + Sync> CellValue for T {}

trait Slot: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_slot(&self) -> Box<dyn Slot>;
    fn eq_slot(&self, other: &dyn Slot) -> bool;
    fn fmt_slot(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: CellValue> Slot for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_slot(&self) -> Box<dyn Slot> {
        Box::new(self.clone())
    }

    fn eq_slot(&self, other: &dyn Slot) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn fmt_slot(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type Derive = Arc<dyn Fn(&PassContext<'_>) -> Box<dyn Slot> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed handle to a cell of a [`Graph`].
pub struct Cell<T> {
    id: CellId,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Cell<T> {
    pub fn id(&self) -> CellId {
        self.id
    }
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cell<T> {}

impl<T> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({})", self.id)
    }
}

impl<T> PartialEq for Cell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Cell<T> {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cell `{cell}` depends on undeclared cell {dependency}")]
    UnknownDependency {
        cell: &'static str,
        dependency: CellId,
    },
    #[error("cell {0} does not exist")]
    UnknownCell(CellId),
    #[error("cell `{0}` is derived and cannot be written")]
    NotARoot(&'static str),
    #[error("value written to cell `{0}` has the wrong type")]
    TypeMismatch(&'static str),
    #[error("forward reference already bound to cell {0}")]
    AlreadyBound(CellId),
}

struct Node {
    name: &'static str,
    value: Box<dyn Slot>,
    version: u64,
    dependents: Vec<CellId>,
    derive: Option<Derive>,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            value: self.value.clone_slot(),
            version: self.version,
            dependents: self.dependents.clone(),
            derive: self.derive.clone(),
        }
    }
}

/// Read access handed to a derivation while a pass is running.
pub struct PassContext<'a> {
    nodes: &'a [Node],
    staged: &'a [Option<Box<dyn Slot>>],
    current: CellId,
    pass: u64,
}

impl PassContext<'_> {
    /// Value of `cell` as already recomputed in this pass, or as committed at
    /// pass start when it has not been (or will not be) recomputed.
    ///
    /// # Panics
    /// Panics if `cell` belongs to another graph with a different layout.
    pub fn get<T: CellValue>(&self, cell: Cell<T>) -> &T {
        let idx = cell.id.0;
        let slot = match self.staged.get(idx) {
            Some(Some(staged)) => &**staged,
            _ => &*self.nodes[idx].value,
        };
        downcast(slot, self.nodes[idx].name)
    }

    /// The cell's own value as committed before this pass; `None` while the
    /// cell is being declared.
    pub fn prior<T: CellValue>(&self) -> Option<&T> {
        self.nodes
            .get(self.current.0)
            .map(|node| downcast(&*node.value, node.name))
    }

    /// Reads a cell declared after the running one, at its pass-start value.
    /// `None` until the handle is bound and the cell exists.
    pub fn get_later<T: CellValue>(&self, later: &Later<T>) -> Option<&T> {
        let cell = later.0.get()?;
        let node = self.nodes.get(cell.id.0)?;
        Some(downcast(&*node.value, node.name))
    }

    /// Id of the running pass; 0 while the graph is being declared.
    pub fn pass_id(&self) -> u64 {
        self.pass
    }
}

fn downcast<'v, T: CellValue>(slot: &'v dyn Slot, name: &str) -> &'v T {
    slot.as_any()
        .downcast_ref::<T>()
        .unwrap_or_else(|| panic!("cell `{name}` read with the wrong type"))
}

/// Forward reference to a cell that is declared later.
///
/// Lets a derivation read (never trigger on) a downstream cell, such as the
/// page counter reading the total page count computed from its own fetch.
pub struct Later<T>(Arc<OnceLock<Cell<T>>>);

impl<T> Later<T> {
    pub fn new() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    pub fn bind(&self, cell: Cell<T>) -> Result<(), GraphError> {
        self.0
            .set(cell)
            .map_err(|cell| GraphError::AlreadyBound(cell.id))
    }
}

impl<T> Default for Later<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Later<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// A batch of root writes applied in a single pass.
#[derive(Default)]
pub struct Writes {
    entries: Vec<(CellId, Box<dyn Slot>)>,
}

impl Writes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: CellValue>(mut self, cell: Cell<T>, value: T) -> Self {
        self.entries.push((cell.id, Box::new(value)));
        self
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pass {
    pub id: u64,
    pub recomputed: Vec<CellId>,
    pub changed: Vec<CellId>,
}

impl Pass {
    /// True when every write matched the current value and nothing ran.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn has_changed<T>(&self, cell: Cell<T>) -> bool {
        self.changed.contains(&cell.id)
    }

    pub fn was_recomputed<T>(&self, cell: Cell<T>) -> bool {
        self.recomputed.contains(&cell.id)
    }
}

#[derive(Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    pass: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root<T: CellValue>(&mut self, name: &'static str, initial: T) -> Cell<T> {
        self.push(name, Box::new(initial), None)
    }

    /// Declares a derived cell triggered by `deps`. The derivation runs once
    /// immediately to produce the initial value.
    pub fn define<T, F>(
        &mut self,
        name: &'static str,
        deps: &[CellId],
        derive: F,
    ) -> Result<Cell<T>, GraphError>
    where
        T: CellValue,
        F: Fn(&PassContext<'_>) -> T + Send + Sync + 'static,
    {
        if let Some(&dependency) = deps.iter().find(|dep| dep.0 >= self.nodes.len()) {
            return Err(GraphError::UnknownDependency {
                cell: name,
                dependency,
            });
        }

        let id = CellId(self.nodes.len());
        let erased: Derive =
            Arc::new(move |ctx: &PassContext<'_>| -> Box<dyn Slot> { Box::new(derive(ctx)) });
        let initial = {
            let ctx = PassContext {
                nodes: &self.nodes,
                staged: &[],
                current: id,
                pass: 0,
            };
            erased(&ctx)
        };

        for dep in deps {
            let dependents = &mut self.nodes[dep.0].dependents;
            if !dependents.contains(&id) {
                dependents.push(id);
            }
        }
        Ok(self.push(name, initial, Some(erased)))
    }

    fn push<T>(&mut self, name: &'static str, value: Box<dyn Slot>, derive: Option<Derive>) -> Cell<T> {
        let id = CellId(self.nodes.len());
        self.nodes.push(Node {
            name,
            value,
            version: 0,
            dependents: Vec::new(),
            derive,
        });
        Cell {
            id,
            _ty: PhantomData,
        }
    }

    /// Committed value of `cell`.
    ///
    /// # Panics
    /// Panics if `cell` belongs to another graph with a different layout.
    pub fn get<T: CellValue>(&self, cell: Cell<T>) -> &T {
        let node = &self.nodes[cell.id.0];
        downcast(&*node.value, node.name)
    }

    /// Id of the pass that last changed `cell`; 0 if it never changed.
    pub fn version<T>(&self, cell: Cell<T>) -> u64 {
        self.nodes[cell.id.0].version
    }

    pub fn name(&self, id: CellId) -> Option<&'static str> {
        self.nodes.get(id.0).map(|node| node.name)
    }

    /// Id of the last pass that ran.
    pub fn last_pass(&self) -> u64 {
        self.pass
    }

    pub fn update<T: CellValue>(&mut self, root: Cell<T>, value: T) -> Result<Pass, GraphError> {
        self.update_many(Writes::new().set(root, value))
    }

    pub fn update_many(&mut self, writes: Writes) -> Result<Pass, GraphError> {
        let mut staged: Vec<Option<Box<dyn Slot>>> = (0..self.nodes.len()).map(|_| None).collect();
        let mut roots = Vec::new();

        for (id, value) in writes.entries {
            let node = self.nodes.get(id.0).ok_or(GraphError::UnknownCell(id))?;
            if node.derive.is_some() {
                return Err(GraphError::NotARoot(node.name));
            }
            if node.value.as_any().type_id() != value.as_any().type_id() {
                return Err(GraphError::TypeMismatch(node.name));
            }
            if node.value.eq_slot(&*value) {
                continue;
            }
            roots.push(id);
            staged[id.0] = Some(value);
        }

        if roots.is_empty() {
            return Ok(Pass {
                id: self.pass,
                ..Pass::default()
            });
        }

        self.pass += 1;
        let pass = self.pass;
        engine_logging::set_pass(pass);

        let mut dirty = vec![false; self.nodes.len()];
        let mut stack: Vec<CellId> = roots
            .iter()
            .flat_map(|root| self.nodes[root.0].dependents.iter().copied())
            .collect();
        while let Some(id) = stack.pop() {
            if !dirty[id.0] {
                dirty[id.0] = true;
                stack.extend(self.nodes[id.0].dependents.iter().copied());
            }
        }

        let mut recomputed = Vec::new();
        for idx in 0..self.nodes.len() {
            if !dirty[idx] {
                continue;
            }
            let Some(derive) = self.nodes[idx].derive.as_ref() else {
                continue;
            };
            let value = {
                let ctx = PassContext {
                    nodes: &self.nodes,
                    staged: &staged,
                    current: CellId(idx),
                    pass,
                };
                derive(&ctx)
            };
            engine_trace!("recomputed `{}`", self.nodes[idx].name);
            staged[idx] = Some(value);
            recomputed.push(CellId(idx));
        }

        let mut changed = Vec::new();
        for (idx, slot) in staged.into_iter().enumerate() {
            let Some(value) = slot else {
                continue;
            };
            let node = &mut self.nodes[idx];
            if !node.value.eq_slot(&*value) {
                node.value = value;
                node.version = pass;
                changed.push(CellId(idx));
            }
        }

        Ok(Pass {
            id: pass,
            recomputed,
            changed,
        })
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct ValueFmt<'a>(&'a dyn Slot);
        impl fmt::Debug for ValueFmt<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt_slot(f)
            }
        }

        let mut map = f.debug_map();
        for node in &self.nodes {
            map.entry(&node.name, &ValueFmt(&*node.value));
        }
        map.finish()
    }
}

/// Two graphs are equal when they hold the same cells with the same values
/// and versions; derivations are not compared.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.pass == other.pass
            && self.nodes.len() == other.nodes.len()
            && self.nodes.iter().zip(&other.nodes).all(|(a, b)| {
                a.name == b.name && a.version == b.version && a.value.eq_slot(&*b.value)
            })
    }
}
