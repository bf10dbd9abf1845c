//! Deferred coordinates
//!
//! A [`RealLine`] owns a set of coordinates along one axis whose values are only
//! known once every constraint has been registered. Registration is the first
//! pass; [`RealLine::compile`] is the second, resolving every value in dependency
//! order. Dependency cycles are engine defects and fail the solve.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, span, trace, Level};

use super::error::{DiagramError, DiagramResult};

/// Handle to a deferred value of one [`RealLine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RealId(usize);

impl fmt::Display for RealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RealKind {
    Origin,
    Fixed(f64),
    /// Always exactly `base + delta`
    Anchored { base: RealId, delta: f64 },
    /// At least `base + delta`; lower bounds may push it further
    Movable { base: RealId, delta: f64 },
    Max(Vec<RealId>),
    Min(Vec<RealId>),
}

#[derive(Debug, Clone, PartialEq)]
struct RealNode {
    name: String,
    kind: RealKind,
    /// `value >= source + gap`
    lower_bounds: Vec<(RealId, f64)>,
}

impl RealNode {
    fn dependencies(&self) -> Vec<RealId> {
        let mut deps = match &self.kind {
            RealKind::Origin | RealKind::Fixed(_) => Vec::new(),
            RealKind::Anchored { base, .. } | RealKind::Movable { base, .. } => vec![*base],
            RealKind::Max(ids) | RealKind::Min(ids) => ids.clone(),
        };
        deps.extend(self.lower_bounds.iter().map(|(source, _)| *source));
        deps
    }
}

/// Registry of deferred values along one axis
#[derive(Debug, Clone, PartialEq)]
pub struct RealLine {
    nodes: Vec<RealNode>,
}

impl Default for RealLine {
    fn default() -> Self {
        Self::new()
    }
}

impl RealLine {
    pub fn new() -> Self {
        Self {
            nodes: vec![RealNode {
                name: "origin".to_string(),
                kind: RealKind::Origin,
                lower_bounds: Vec::new(),
            }],
        }
    }

    fn push(&mut self, name: impl Into<String>, kind: RealKind) -> RealId {
        let id = RealId(self.nodes.len());
        self.nodes.push(RealNode {
            name: name.into(),
            kind,
            lower_bounds: Vec::new(),
        });
        id
    }

    /// The zero point every other value hangs from
    pub fn origin(&self) -> RealId {
        RealId(0)
    }

    pub fn fixed(&mut self, name: impl Into<String>, value: f64) -> RealId {
        self.push(name, RealKind::Fixed(value))
    }

    /// A value rigidly attached to `base`
    pub fn anchored(&mut self, name: impl Into<String>, base: RealId, delta: f64) -> RealId {
        self.push(name, RealKind::Anchored { base, delta })
    }

    /// A value that starts at `base + delta` and can be pushed further
    pub fn movable(&mut self, name: impl Into<String>, base: RealId, delta: f64) -> RealId {
        self.push(name, RealKind::Movable { base, delta })
    }

    pub fn max(&mut self, name: impl Into<String>, ids: Vec<RealId>) -> RealId {
        self.push(name, RealKind::Max(ids))
    }

    pub fn min(&mut self, name: impl Into<String>, ids: Vec<RealId>) -> RealId {
        self.push(name, RealKind::Min(ids))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Require `target >= source + gap`
    ///
    /// Anchored targets forward the constraint to the value they hang from, less
    /// the accumulated offset. Only movable values can be pushed; a constraint
    /// ending on any other kind is a layout error.
    pub fn ensure_bigger_than(
        &mut self,
        target: RealId,
        source: RealId,
        gap: f64,
    ) -> DiagramResult<()> {
        self.check(target)?;
        self.check(source)?;

        let mut root = target;
        let mut offset = 0.0;
        let mut hops = 0;
        while let RealKind::Anchored { base, delta } = self.nodes[root.0].kind {
            offset += delta;
            root = base;
            hops += 1;
            if hops > self.nodes.len() {
                return Err(DiagramError::layout_error(format!(
                    "anchor cycle through {}",
                    self.nodes[target.0].name
                )));
            }
        }

        match self.nodes[root.0].kind {
            RealKind::Movable { .. } => {
                trace!(
                    target = %self.nodes[target.0].name,
                    root = %self.nodes[root.0].name,
                    source = %self.nodes[source.0].name,
                    gap = gap - offset,
                    "Constraint"
                );
                self.nodes[root.0].lower_bounds.push((source, gap - offset));
            }
            _ => {
                return Err(DiagramError::layout_error(format!(
                    "constraint on immovable value {} (needs {} + {})",
                    self.nodes[target.0].name, self.nodes[source.0].name, gap
                )));
            }
        }
        Ok(())
    }

    fn check(&self, id: RealId) -> DiagramResult<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(DiagramError::layout_error(format!(
                "unknown deferred value {}",
                id
            )))
        }
    }

    /// Resolve every value in dependency order
    ///
    /// Pure: compiling the same line twice yields identical values.
    pub fn compile(&self) -> DiagramResult<ResolvedReals> {
        let solve_span = span!(Level::DEBUG, "solve_reals", values = self.nodes.len());
        let _enter = solve_span.enter();

        let count = self.nodes.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (index, node) in self.nodes.iter().enumerate() {
            for dep in node.dependencies() {
                self.check(dep)?;
                in_degree[index] += 1;
                dependents[dep.0].push(index);
            }
        }

        // Kahn's algorithm
        let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut values: Vec<Option<f64>> = vec![None; count];
        let mut resolved = 0;

        while let Some(index) = queue.pop_front() {
            let value = self.evaluate(index, &values)?;
            values[index] = Some(value);
            resolved += 1;
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if resolved < count {
            let stuck: Vec<&str> = (0..count)
                .filter(|&i| values[i].is_none())
                .map(|i| self.nodes[i].name.as_str())
                .collect();
            return Err(DiagramError::layout_error(format!(
                "cyclic dependency between {}",
                stuck.join(", ")
            )));
        }

        debug!(resolved, "Resolved deferred values");
        Ok(ResolvedReals {
            values: values.into_iter().map(|v| v.unwrap_or_default()).collect(),
        })
    }

    fn evaluate(&self, index: usize, values: &[Option<f64>]) -> DiagramResult<f64> {
        let get = |id: RealId| {
            values[id.0].ok_or_else(|| {
                DiagramError::layout_error(format!(
                    "{} read before it was resolved",
                    self.nodes[id.0].name
                ))
            })
        };
        let node = &self.nodes[index];
        let formula = match &node.kind {
            RealKind::Origin => 0.0,
            RealKind::Fixed(value) => *value,
            RealKind::Anchored { base, delta } | RealKind::Movable { base, delta } => {
                get(*base)? + delta
            }
            RealKind::Max(ids) | RealKind::Min(ids) => {
                if ids.is_empty() {
                    return Err(DiagramError::layout_error(format!(
                        "{} has no members",
                        node.name
                    )));
                }
                let mut members = Vec::with_capacity(ids.len());
                for id in ids {
                    members.push(get(*id)?);
                }
                let fold: fn(f64, f64) -> f64 = if matches!(node.kind, RealKind::Max(_)) {
                    f64::max
                } else {
                    f64::min
                };
                members.into_iter().reduce(fold).unwrap_or_default()
            }
        };

        let mut value = formula;
        for (source, gap) in &node.lower_bounds {
            value = value.max(get(*source)? + gap);
        }
        Ok(value)
    }
}

/// Values of a compiled [`RealLine`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReals {
    values: Vec<f64>,
}

impl ResolvedReals {
    pub fn get(&self, id: RealId) -> DiagramResult<f64> {
        self.values
            .get(id.0)
            .copied()
            .ok_or_else(|| DiagramError::layout_error(format!("unknown deferred value {}", id)))
    }

    /// Value rounded to a character cell
    pub fn cell(&self, id: RealId) -> DiagramResult<usize> {
        Ok(self.get(id)?.round().max(0.0) as usize)
    }
}
