use std::fmt;

use crate::space::{VarId, VarSpace};

/// Model column: decision variables first, then auxiliaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Col(pub u32);

impl Col {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<VarId> for Col {
    fn from(v: VarId) -> Self {
        Col(v.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxKind {
    Binary,
    NonNegative,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinExpr {
    pub terms: Vec<(Col, i64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sum<I, C>(cols: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Col>,
    {
        Self {
            terms: cols.into_iter().map(|c| (c.into(), 1)).collect(),
        }
    }

    pub fn add(mut self, col: impl Into<Col>, coef: i64) -> Self {
        self.terms.push((col.into(), coef));
        self
    }

    pub fn push(&mut self, col: impl Into<Col>, coef: i64) {
        self.terms.push((col.into(), coef));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates against a full column assignment.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(c, k)| k as f64 * values.get(c.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Le,
    Eq,
    Ge,
}

/// Hard rule categories, one compiler unit each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Load,
    SlotExclusivity,
    JointSync,
    TeacherNonOverlap,
    Implication,
    Sync,
    OverlapCardinality,
    RequiresAny,
    PinnedSlot,
    SameDayAdjacency,
    DailyCap,
    DoubleDays,
    MutualExclusion,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Load,
        Category::SlotExclusivity,
        Category::JointSync,
        Category::TeacherNonOverlap,
        Category::Implication,
        Category::Sync,
        Category::OverlapCardinality,
        Category::RequiresAny,
        Category::PinnedSlot,
        Category::SameDayAdjacency,
        Category::DailyCap,
        Category::DoubleDays,
        Category::MutualExclusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Load => "load",
            Category::SlotExclusivity => "slot_exclusivity",
            Category::JointSync => "joint_sync",
            Category::TeacherNonOverlap => "teacher_non_overlap",
            Category::Implication => "implication",
            Category::Sync => "sync",
            Category::OverlapCardinality => "overlap_cardinality",
            Category::RequiresAny => "requires_any",
            Category::PinnedSlot => "pinned_slot",
            Category::SameDayAdjacency => "same_day_adjacency",
            Category::DailyCap => "daily_cap",
            Category::DoubleDays => "double_days",
            Category::MutualExclusion => "mutual_exclusion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Objective term families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Consecutive,
    BundleDay,
    BundleExcess,
    TeacherDaily,
    TeacherFirstPeriod,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Consecutive => "consecutive",
            Family::BundleDay => "bundle_day",
            Family::BundleExcess => "bundle_excess",
            Family::TeacherDaily => "teacher_daily",
            Family::TeacherFirstPeriod => "teacher_first_period",
        }
    }
}

/// Where a row came from. Soft rows only link an objective auxiliary to `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Hard(Category),
    Soft(Family),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub origin: Origin,
    pub expr: LinExpr,
    pub cmp: Cmp,
    pub rhs: i64,
}

impl Constraint {
    pub fn holds(&self, values: &[f64]) -> bool {
        let lhs = self.expr.eval(values);
        let rhs = self.rhs as f64;
        match self.cmp {
            Cmp::Le => lhs <= rhs + 1e-6,
            Cmp::Eq => (lhs - rhs).abs() <= 1e-6,
            Cmp::Ge => lhs >= rhs - 1e-6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectiveTerm {
    pub col: Col,
    pub weight: i64,
    pub family: Family,
}

/// Solver-independent linear model: boolean decision columns, auxiliary
/// columns, rows, and a maximised objective of weighted columns.
#[derive(Clone, Debug)]
pub struct Model {
    pub space: VarSpace,
    pub aux: Vec<AuxKind>,
    pub constraints: Vec<Constraint>,
    pub objective: Vec<ObjectiveTerm>,
}

impl Model {
    pub fn columns(&self) -> usize {
        self.space.len() + self.aux.len()
    }

    pub fn kind(&self, col: Col) -> AuxKind {
        match col.index().checked_sub(self.space.len()) {
            Some(a) => self.aux[a],
            None => AuxKind::Binary,
        }
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .map(|t| t.weight as f64 * values.get(t.col.index()).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn rows(&self, origin: Origin) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(move |c| c.origin == origin)
    }
}

/// Accumulates rows and auxiliary columns while the compiler units run.
#[derive(Debug)]
pub struct ModelBuilder {
    first_aux: u32,
    aux: Vec<AuxKind>,
    constraints: Vec<Constraint>,
    objective: Vec<ObjectiveTerm>,
}

impl ModelBuilder {
    pub fn new(space: &VarSpace) -> Self {
        Self {
            first_aux: space.len() as u32,
            aux: Vec::new(),
            constraints: Vec::new(),
            objective: Vec::new(),
        }
    }

    pub fn add_aux(&mut self, kind: AuxKind) -> Col {
        let col = Col(self.first_aux + self.aux.len() as u32);
        self.aux.push(kind);
        col
    }

    pub fn push(&mut self, origin: Origin, expr: LinExpr, cmp: Cmp, rhs: i64) {
        self.constraints.push(Constraint {
            origin,
            expr,
            cmp,
            rhs,
        });
    }

    pub fn hard(&mut self, category: Category, expr: LinExpr, cmp: Cmp, rhs: i64) {
        self.push(Origin::Hard(category), expr, cmp, rhs);
    }

    /// The single registration point for objective terms.
    pub fn reward(&mut self, family: Family, col: Col, weight: i64) {
        if weight != 0 {
            self.objective.push(ObjectiveTerm {
                col,
                weight,
                family,
            });
        }
    }

    pub fn row_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn finish(self, space: VarSpace) -> Model {
        Model {
            space,
            aux: self.aux,
            constraints: self.constraints,
            objective: self.objective,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_tolerates_float_noise() {
        let c = Constraint {
            origin: Origin::Hard(Category::Load),
            expr: LinExpr::sum([Col(0), Col(1)]),
            cmp: Cmp::Eq,
            rhs: 2,
        };
        assert!(c.holds(&[1.0, 0.9999999]));
        assert!(!c.holds(&[1.0, 0.0]));
    }

    #[test]
    fn category_names_are_unique() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }
}
