use super::ast::{Expr, ExprRef};

/// Pre-order visitor over an expression tree. `walk` calls `visit` on
/// every node and then descends into all subexpressions, including
/// `Read` indexes.
pub trait ExprVisitor {
    fn visit(&mut self, expr: &ExprRef);
}

pub fn walk<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &ExprRef) {
    visitor.visit(expr);
    match expr.as_ref() {
        Expr::Const { .. } => {}
        Expr::Read { index, .. } => walk(visitor, index),
        Expr::Eq(l, r)
        | Expr::Ne(l, r)
        | Expr::Ult(l, r)
        | Expr::And(l, r)
        | Expr::Or(l, r)
        | Expr::Add(l, r)
        | Expr::Shl(l, r) => {
            walk(visitor, l);
            walk(visitor, r);
        }
        Expr::Not(e) | Expr::ZExt { expr: e, .. } => walk(visitor, e),
    }
}
