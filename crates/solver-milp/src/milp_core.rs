use good_lp::{variable, Expression, ProblemVariables, Solution, SolverModel, Variable};
use timetable_core::model::{AuxKind, Cmp, Col, Constraint, LinExpr, Model};

/// One good_lp variable per model column, in column order.
pub(crate) struct Columns {
    pub vars: Vec<Variable>,
}

impl Columns {
    pub fn get(&self, col: Col) -> Variable {
        self.vars[col.index()]
    }
}

pub(crate) fn declare_columns(model: &Model, pvars: &mut ProblemVariables) -> Columns {
    let mut vars = Vec::with_capacity(model.columns());
    for c in 0..model.columns() {
        let var = match model.kind(Col(c as u32)) {
            AuxKind::Binary => pvars.add(variable().binary()),
            AuxKind::NonNegative => pvars.add(variable().min(0)),
        };
        vars.push(var);
    }
    Columns { vars }
}

pub(crate) fn to_expression(expr: &LinExpr, cols: &Columns) -> Expression {
    let mut out = Expression::from(0.0);
    for &(c, k) in &expr.terms {
        out += (k as f64) * cols.get(c);
    }
    out
}

pub(crate) fn build_objective(model: &Model, cols: &Columns) -> Expression {
    let mut out = Expression::from(0.0);
    for term in &model.objective {
        out += (term.weight as f64) * cols.get(term.col);
    }
    out
}

/// Rows without terms are constants; returns false when one of them cannot hold.
pub(crate) fn trivial_rows_hold(model: &Model) -> bool {
    model
        .constraints
        .iter()
        .filter(|c| c.expr.is_empty())
        .all(|c| c.holds(&[]))
}

pub(crate) fn add_rows<M: SolverModel>(mut m: M, model: &Model, cols: &Columns) -> M {
    for row in model.constraints.iter().filter(|c| !c.expr.is_empty()) {
        m = m.with(to_constraint(row, cols));
    }
    m
}

fn to_constraint(row: &Constraint, cols: &Columns) -> good_lp::Constraint {
    let lhs = to_expression(&row.expr, cols);
    let rhs = row.rhs as f64;
    match row.cmp {
        Cmp::Le => lhs.leq(rhs),
        Cmp::Eq => lhs.eq(rhs),
        Cmp::Ge => lhs.geq(rhs),
    }
}

pub(crate) fn extract_values<S: Solution>(sol: &S, cols: &Columns) -> Vec<f64> {
    cols.vars.iter().map(|&v| sol.value(v)).collect()
}

/// True when every row holds for `values`; an incumbent read after a time
/// limit is only trusted if it does.
pub(crate) fn satisfies(model: &Model, values: &[f64]) -> bool {
    model.constraints.iter().all(|c| c.holds(values))
}
