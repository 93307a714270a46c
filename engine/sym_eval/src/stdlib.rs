//! The standard identifier set.
//!
//! Registered through the same declaration mechanism user code uses; the
//! engine only hard-codes the numeric short paths, everything else is a
//! definition. The set is deliberately compact: arithmetic, structure,
//! the trig trio and the named constants - the definitions the engine,
//! the simplifier and the solver rely on.

use crate::engine::Engine;
use crate::eval::numeric_approx;
use crate::registry::{Definition, FunctionDef, FunctionFlags, HoldPolicy, Signature, SymbolDef};
use std::rc::Rc;
use sym_ir::{known, DomainKind, Expr, Name, NumericValue};

/// Register every standard identifier into the root scope.
pub(crate) fn register(engine: &mut Engine) {
    register_arithmetic(engine);
    register_structural(engine);
    register_trig(engine);
    register_calculus(engine);
    register_constants(engine);
}

fn func(engine: &mut Engine, def: FunctionDef) {
    let name = def.name();
    engine.define_builtin(name, Definition::Function(Rc::new(def)));
}

fn numeric_sig(arity: usize) -> Signature {
    Signature::new(vec![DomainKind::Numbers; arity], DomainKind::Numbers)
}

/// Unary kernel fold at machine precision, for numeric handlers.
fn machine_unary(
    kernel: fn(&NumericValue) -> NumericValue,
) -> impl Fn(&mut Engine, &[Expr]) -> sym_ir::EngineResult<Option<Expr>> {
    move |_engine, ops| {
        Ok(ops
            .first()
            .and_then(Expr::numeric_value)
            .map(|v| Expr::number(kernel(&v.clone().to_machine()))))
    }
}

fn register_arithmetic(engine: &mut Engine) {
    let nary = FunctionFlags::PURE
        | FunctionFlags::ASSOCIATIVE
        | FunctionFlags::COMMUTATIVE
        | FunctionFlags::THREADABLE;
    func(
        engine,
        FunctionDef::new(known::ADD)
            .with_flags(nary)
            .with_complexity(2)
            .with_signature(numeric_sig(0).with_variadic(DomainKind::Numbers))
            .on_simplify(crate::eval::simplify::collect_like_terms),
    );
    func(
        engine,
        FunctionDef::new(known::MULTIPLY)
            .with_flags(nary)
            .with_complexity(3)
            .with_signature(numeric_sig(0).with_variadic(DomainKind::Numbers)),
    );
    func(
        engine,
        FunctionDef::new(known::NEGATE)
            .with_flags(
                FunctionFlags::PURE | FunctionFlags::INVOLUTION | FunctionFlags::THREADABLE,
            )
            .with_complexity(1)
            .with_signature(numeric_sig(1)),
    );
    // Subtraction folds into the additive form.
    func(
        engine,
        FunctionDef::new(known::SUBTRACT)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(1)
            .with_signature(numeric_sig(2))
            .on_canonical(|engine, ops| {
                if ops.len() != 2 {
                    return Ok(None);
                }
                let negated = Expr::apply_symbol(known::NEGATE, vec![ops[1].clone()]);
                let sum = Expr::apply_symbol(known::ADD, vec![ops[0].clone(), negated]);
                engine.canonical(&sum).map(Some)
            }),
    );
    func(
        engine,
        FunctionDef::new(known::DIVIDE)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(3)
            .with_signature(numeric_sig(2)),
    );
    func(
        engine,
        FunctionDef::new(known::POWER)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(2)
            .with_signature(numeric_sig(2))
            .on_numeric(|_engine, ops| {
                if let (Some(b), Some(e)) = (
                    ops.first().and_then(Expr::numeric_value),
                    ops.get(1).and_then(Expr::numeric_value),
                ) {
                    return Ok(Some(Expr::number(b.pow(e))));
                }
                Ok(None)
            }),
    );
    func(
        engine,
        FunctionDef::new(known::SQUARE)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(2)
            .with_signature(numeric_sig(1)),
    );
    func(
        engine,
        FunctionDef::new(known::SQRT)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(3)
            .with_signature(numeric_sig(1))
            .on_numeric(machine_unary(NumericValue::sqrt)),
    );
    func(
        engine,
        FunctionDef::new(known::EXP)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(4)
            .with_signature(numeric_sig(1))
            .on_numeric(machine_unary(NumericValue::exp)),
    );
    func(
        engine,
        FunctionDef::new(known::LN)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(4)
            .with_signature(numeric_sig(1))
            .on_numeric(machine_unary(NumericValue::ln)),
    );
    func(
        engine,
        FunctionDef::new(known::ABS)
            .with_flags(
                FunctionFlags::PURE | FunctionFlags::IDEMPOTENT | FunctionFlags::THREADABLE,
            )
            .with_complexity(2)
            .with_signature(numeric_sig(1))
            .on_evaluate(|_engine, ops| {
                Ok(ops
                    .first()
                    .and_then(Expr::numeric_value)
                    .map(|v| Expr::number(v.abs())))
            }),
    );
}

fn register_structural(engine: &mut Engine) {
    let any_variadic =
        Signature::new(Vec::new(), DomainKind::Values).with_variadic(DomainKind::Anything);
    func(
        engine,
        FunctionDef::new(known::LIST)
            .with_complexity(1)
            .with_signature(any_variadic.clone()),
    );
    func(
        engine,
        FunctionDef::new(known::SEQUENCE)
            .with_flags(FunctionFlags::PURE | FunctionFlags::ASSOCIATIVE)
            .with_complexity(1)
            .with_signature(any_variadic.clone()),
    );
    func(
        engine,
        FunctionDef::new(known::SET)
            .with_flags(FunctionFlags::PURE | FunctionFlags::COMMUTATIVE)
            .with_complexity(1)
            .with_signature(any_variadic.clone()),
    );
    func(
        engine,
        FunctionDef::new(known::RANGE)
            .with_complexity(1)
            .with_signature(
                Signature::new(vec![DomainKind::Numbers], DomainKind::Values)
                    .with_variadic(DomainKind::Numbers),
            ),
    );
    func(
        engine,
        FunctionDef::new(known::HOLD)
            .with_hold(HoldPolicy::All)
            .with_signature(Signature::new(vec![DomainKind::Anything], DomainKind::Anything)),
    );
    func(
        engine,
        FunctionDef::new(known::RELEASE_HOLD)
            .with_signature(Signature::new(vec![DomainKind::Anything], DomainKind::Anything)),
    );
    func(
        engine,
        FunctionDef::new(known::FUNCTION)
            .with_hold(HoldPolicy::All)
            .with_signature(
                Signature::new(vec![DomainKind::Anything], DomainKind::Functions)
                    .with_variadic(DomainKind::Anything),
            ),
    );
    func(
        engine,
        FunctionDef::new(known::EQUAL)
            .with_complexity(1)
            .with_signature(Signature::new(
                vec![DomainKind::Anything, DomainKind::Anything],
                DomainKind::Booleans,
            )),
    );
    // Numeric approximation as an expression head.
    func(
        engine,
        FunctionDef::new(known::N)
            .with_hold(HoldPolicy::All)
            .with_signature(Signature::new(vec![DomainKind::Anything], DomainKind::Anything))
            .on_evaluate(|engine, ops| match ops.first() {
                Some(op) => numeric_approx(engine, op).map(Some),
                None => Ok(None),
            }),
    );
}

fn trig(engine: &mut Engine, name: Name, zero_value: Expr, kernel: fn(&NumericValue) -> NumericValue) {
    func(
        engine,
        FunctionDef::new(name)
            .with_flags(FunctionFlags::PURE | FunctionFlags::THREADABLE)
            .with_complexity(4)
            .with_signature(numeric_sig(1))
            .on_evaluate(move |_engine, ops| {
                Ok(ops
                    .first()
                    .and_then(Expr::numeric_value)
                    .filter(|v| v.is_zero())
                    .map(|_| zero_value.clone()))
            })
            .on_numeric(machine_unary(kernel)),
    );
}

fn register_trig(engine: &mut Engine) {
    trig(engine, known::SIN, Expr::int(0), NumericValue::sin);
    trig(engine, known::COS, Expr::int(1), NumericValue::cos);
    trig(engine, known::TAN, Expr::int(0), NumericValue::tan);
}

fn register_calculus(engine: &mut Engine) {
    for name in [known::INTEGRATE, known::LIMIT, known::NINTEGRATE, known::NLIMIT] {
        func(
            engine,
            FunctionDef::new(name)
                .with_hold(HoldPolicy::All)
                .with_signature(
                    Signature::new(vec![DomainKind::Anything], DomainKind::Anything)
                        .with_variadic(DomainKind::Anything),
                ),
        );
    }
}

fn register_constants(engine: &mut Engine) {
    let constants: [(Name, DomainKind, Option<NumericValue>); 9] = [
        (
            known::PI,
            DomainKind::RealNumbers,
            Some(NumericValue::float(std::f64::consts::PI)),
        ),
        (
            known::EXPONENTIAL_E,
            DomainKind::RealNumbers,
            Some(NumericValue::float(std::f64::consts::E)),
        ),
        (
            known::IMAGINARY_UNIT,
            DomainKind::ImaginaryNumbers,
            Some(NumericValue::complex(0.0, 1.0)),
        ),
        (
            known::POSITIVE_INFINITY,
            DomainKind::ExtendedRealNumbers,
            Some(NumericValue::float(f64::INFINITY)),
        ),
        (
            known::NEGATIVE_INFINITY,
            DomainKind::ExtendedRealNumbers,
            Some(NumericValue::float(f64::NEG_INFINITY)),
        ),
        (
            known::NAN,
            DomainKind::ExtendedComplexNumbers,
            Some(NumericValue::nan()),
        ),
        (known::TRUE, DomainKind::Booleans, None),
        (known::FALSE, DomainKind::Booleans, None),
        (known::NOTHING, DomainKind::Anything, None),
    ];
    for (name, domain, numeric) in constants {
        let def = match numeric {
            Some(v) => SymbolDef::constant(domain, v),
            None => SymbolDef {
                domain,
                constant: true,
                ..SymbolDef::default()
            },
        };
        engine.define_builtin(name, Definition::Symbol(def));
    }
}
