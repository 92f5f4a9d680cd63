use super::ast::ExprRef;

/// Ordered conjunction of boolean expressions. Cloning is cheap: the
/// expressions themselves are shared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstraintSet {
    items: Vec<ExprRef>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        ConstraintSet { items: Vec::new() }
    }

    pub fn push(&mut self, constraint: ExprRef) {
        self.items.push(constraint);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExprRef> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<ExprRef>> for ConstraintSet {
    fn from(items: Vec<ExprRef>) -> Self {
        ConstraintSet { items }
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a ExprRef;
    type IntoIter = std::slice::Iter<'a, ExprRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A solver query: path constraints plus a goal expression. The
/// rewriter only ever appends to a copy of the constraint set; the
/// goal passes through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub constraints: ConstraintSet,
    pub expr: ExprRef,
}

impl Query {
    pub fn new(constraints: ConstraintSet, expr: ExprRef) -> Self {
        Query { constraints, expr }
    }

    /// Same goal under a different constraint set.
    pub fn with_constraints(&self, constraints: ConstraintSet) -> Query {
        Query {
            constraints,
            expr: self.expr.clone(),
        }
    }
}
