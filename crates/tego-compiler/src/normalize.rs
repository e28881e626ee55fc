//! A-normal form
//!
//! [`Normalizer::normalize`] lifts every nested computation into a `let`
//! binding with a fresh name, so that all operands become variables or
//! constants. Bindings are collected in a context in evaluation order and
//! folded back into nested lets, the first binding outermost.

use crate::error::{CompileError, CompileResult};
use crate::ir::{Exp, ExpKind};
use tracing::trace;

/// Bindings in evaluation order
type Context = Vec<(String, Exp)>;

/// Rewrites expressions into ANF
///
/// Fresh names (`var_0`, `var_1`, ...) are unique per normalizer; use one
/// normalizer per compilation unit.
#[derive(Debug, Default)]
pub struct Normalizer {
    counter: usize,
}

impl Normalizer {
    /// Create a normalizer whose first fresh name is `var_0`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fresh names handed out so far
    pub fn fresh_count(&self) -> usize {
        self.counter
    }

    /// Rewrite `exp` into ANF
    pub fn normalize(&mut self, exp: Exp) -> CompileResult<Exp> {
        let mut ctx = Context::new();
        let answer = self.to_comp(exp, &mut ctx)?;
        let result = ctx
            .into_iter()
            .rev()
            .fold(answer, |body, (var, bound)| Exp::let_in(var, bound, body));
        debug_assert!(result.is_anf());
        Ok(result)
    }

    /// Reduce to a compound, pushing the bindings it needs onto `ctx`
    fn to_comp(&mut self, mut exp: Exp, ctx: &mut Context) -> CompileResult<Exp> {
        loop {
            match exp.kind {
                ExpKind::Let { var, bound, body } => {
                    let bound = self.to_comp(*bound, ctx)?;
                    trace!(var = %var, "let binding kept");
                    ctx.push((var, bound));
                    exp = *body;
                }
                ExpKind::Apply { function, args } => {
                    let function = self.to_imm(*function, ctx)?;
                    let args = args
                        .into_iter()
                        .map(|arg| self.to_imm(arg, ctx))
                        .collect::<CompileResult<Vec<_>>>()?;
                    return Ok(Exp::apply(function, args, exp.ty));
                }
                ExpKind::Eval { strategy, input } => {
                    let strategy = self.to_imm(*strategy, ctx)?;
                    let input = self.to_imm(*input, ctx)?;
                    return Ok(Exp::eval(strategy, input, exp.ty));
                }
                ExpKind::Seq { .. } => {
                    return Err(CompileError::unsupported(
                        "sequential composition (Seq) cannot be normalized",
                    ));
                }
                kind @ (ExpKind::Var { .. } | ExpKind::Int(_) | ExpKind::Str(_) | ExpKind::AnyInst) => {
                    return Ok(Exp::new(kind, exp.ty));
                }
            }
        }
    }

    /// Reduce to an immediate, binding anything else to a fresh name
    fn to_imm(&mut self, exp: Exp, ctx: &mut Context) -> CompileResult<Exp> {
        if exp.is_imm() {
            return Ok(exp);
        }
        let ty = exp.ty.clone();
        let comp = self.to_comp(exp, ctx)?;
        let name = self.fresh();
        trace!(var = %name, "lifted {}", comp);
        ctx.push((name.clone(), comp));
        Ok(Exp::var(name, ty))
    }

    fn fresh(&mut self) -> String {
        let name = format!("var_{}", self.counter);
        self.counter += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{StrategyType, Type};

    fn strategy(arity: usize) -> Type {
        Type::Strategy(StrategyType::new(vec![Type::Any; arity], Type::Any, Type::Any))
    }

    fn var(name: &str, ty: Type) -> Exp {
        Exp::var(name, ty)
    }

    fn eval(s: Exp, input: Exp) -> Exp {
        Exp::eval(s, input, Type::Any)
    }

    /// The let chain as `(var, bound)` pairs plus the final compound
    fn bindings(exp: &Exp) -> (Vec<(String, String)>, String) {
        let mut out = Vec::new();
        let mut exp = exp;
        while let ExpKind::Let { var, bound, body } = &exp.kind {
            out.push((var.clone(), bound.to_string()));
            exp = body;
        }
        (out, exp.to_string())
    }

    #[test]
    fn test_immediate_unchanged() {
        let mut n = Normalizer::new();
        let result = n.normalize(Exp::int(4, Type::Int)).unwrap();
        assert_eq!(result, Exp::int(4, Type::Int));
        assert_eq!(n.fresh_count(), 0);
    }

    #[test]
    fn test_compound_unchanged() {
        let mut n = Normalizer::new();
        let exp = eval(var("s", strategy(0)), var("x", Type::Any));
        assert_eq!(n.normalize(exp.clone()).unwrap(), exp);
    }

    #[test]
    fn test_arguments_lifted_left_to_right() {
        let mut n = Normalizer::new();
        let exp = Exp::apply(
            var("f", strategy(2)),
            vec![
                eval(var("a", strategy(0)), Exp::int(1, Type::Int)),
                eval(var("b", strategy(0)), Exp::int(2, Type::Int)),
            ],
            strategy(0),
        );
        let result = n.normalize(exp).unwrap();
        assert!(result.is_anf());
        let (lets, tail) = bindings(&result);
        assert_eq!(
            lets,
            vec![
                ("var_0".to_string(), "eval(a, 1)".to_string()),
                ("var_1".to_string(), "eval(b, 2)".to_string()),
            ]
        );
        assert_eq!(tail, "f(var_0, var_1)");
    }

    #[test]
    fn test_nested_inside_out() {
        let mut n = Normalizer::new();
        let inner = eval(var("g", strategy(0)), var("x", Type::Any));
        let callee = Exp::apply(var("f", strategy(1)), vec![inner], strategy(0));
        let exp = eval(callee, eval(var("h", strategy(0)), var("y", Type::Any)));
        let result = n.normalize(exp).unwrap();

        let (lets, tail) = bindings(&result);
        let names: Vec<_> = lets.iter().map(|(v, e)| format!("{} = {}", v, e)).collect();
        assert_eq!(
            names,
            vec!["var_0 = eval(g, x)", "var_1 = f(var_0)", "var_2 = eval(h, y)"]
        );
        assert_eq!(tail, "eval(var_1, var_2)");
    }

    #[test]
    fn test_let_binding_follows_its_lifted_operands() {
        let mut n = Normalizer::new();
        let bound = eval(Exp::apply(var("f", strategy(1)), vec![var("v", Type::Any)], strategy(0)), var("i", Type::Any));
        let body = eval(var("s", strategy(0)), var("x", Type::Any));
        let result = n.normalize(Exp::let_in("x", bound, body)).unwrap();

        let (lets, tail) = bindings(&result);
        let names: Vec<_> = lets.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(names, vec!["var_0", "x"]);
        assert_eq!(lets[1].1, "eval(var_0, i)");
        assert_eq!(tail, "eval(s, x)");
    }

    #[test]
    fn test_body_bindings_after_let_variable() {
        let mut n = Normalizer::new();
        let bound = eval(var("s", strategy(0)), var("i", Type::Any));
        let body = eval(var("t", strategy(0)), eval(var("u", strategy(0)), var("x", Type::Any)));
        let result = n.normalize(Exp::let_in("x", bound, body)).unwrap();

        let (lets, tail) = bindings(&result);
        let names: Vec<_> = lets.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(names, vec!["x", "var_0"]);
        assert_eq!(lets[1].1, "eval(u, x)");
        assert_eq!(tail, "eval(t, var_0)");
    }

    #[test]
    fn test_let_in_operand_position() {
        let mut n = Normalizer::new();
        let inner = Exp::let_in("y", eval(var("a", strategy(0)), var("x", Type::Any)), eval(var("b", strategy(0)), var("y", Type::Any)));
        let result = n.normalize(eval(var("c", strategy(0)), inner)).unwrap();
        assert!(result.is_anf());
        let (lets, tail) = bindings(&result);
        let names: Vec<_> = lets.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(names, vec!["y", "var_0"]);
        assert_eq!(tail, "eval(c, var_0)");
    }

    #[test]
    fn test_fresh_names_continue_per_normalizer() {
        let mut n = Normalizer::new();
        let exp = eval(var("s", strategy(0)), eval(var("t", strategy(0)), var("x", Type::Any)));
        n.normalize(exp.clone()).unwrap();
        let second = n.normalize(exp.clone()).unwrap();
        assert_eq!(bindings(&second).0[0].0, "var_1");

        let fresh = Normalizer::new().normalize(exp).unwrap();
        assert_eq!(bindings(&fresh).0[0].0, "var_0");
    }

    #[test]
    fn test_seq_is_unsupported() {
        let mut n = Normalizer::new();
        let exp = Exp::seq(var("a", Type::Any), var("b", Type::Any), Type::Any);
        let err = n.normalize(exp).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedConstruct { .. }));
    }

    #[test]
    fn test_long_let_chain() {
        let mut n = Normalizer::new();
        let mut exp = eval(var("s", strategy(0)), var("x_0", Type::Any));
        for i in 1..2000 {
            let bound = eval(var("s", strategy(0)), var(&format!("x_{}", i - 1), Type::Any));
            exp = Exp::let_in(format!("x_{}", i), bound, exp);
        }
        let result = n.normalize(exp).unwrap();
        assert!(result.is_anf());
        assert_eq!(n.fresh_count(), 0);
    }
}
