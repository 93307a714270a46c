//! The root rule library and the harmonisation rule set.
//!
//! Patterns are written against canonical forms: sums carry their literal
//! first, products their numeric coefficient first, and the commutative
//! matcher fallback absorbs the orderings that depend on subject content.
//! Because canonicalisation folds unit coefficients away, each abstract
//! rule contributes one pattern per surviving shape (with and without an
//! explicit coefficient).

use crate::conditions::{NonZeroExponent, PositiveLogArgument, UnknownAndFree};
use sym_ir::{known, Expr, Name, StringInterner};
use sym_rules::{Rule, RuleSet};

/// Capture names used by the root rules.
pub(crate) struct Captures {
    pub a: Name,
    pub b: Name,
    pub c: Name,
    pub n: Name,
}

impl Captures {
    pub(crate) fn intern(interner: &StringInterner) -> Self {
        Captures {
            a: interner.intern("__a"),
            b: interner.intern("__b"),
            c: interner.intern("__c"),
            n: interner.intern("__n"),
        }
    }
}

fn f1(head: Name, x: Expr) -> Expr {
    Expr::apply_symbol(head, vec![x])
}

fn f2(head: Name, x: Expr, y: Expr) -> Expr {
    Expr::apply_symbol(head, vec![x, y])
}

fn f3(head: Name, x: Expr, y: Expr, z: Expr) -> Expr {
    Expr::apply_symbol(head, vec![x, y, z])
}

fn unknown_and_free(placeholder: Name, free: &[Name]) -> UnknownAndFree {
    UnknownAndFree {
        placeholder,
        free: free.to_vec(),
    }
}

/// Quadratic-formula root: `(-b ± sqrt(b² - 4ac)) / (2a)`.
fn quadratic_root(a: Expr, b: Expr, c: Expr, plus: bool) -> Expr {
    let discriminant = f2(
        known::ADD,
        f2(known::POWER, b.clone(), Expr::int(2)),
        f1(
            known::NEGATE,
            f3(known::MULTIPLY, Expr::int(4), a.clone(), c),
        ),
    );
    let radical = f1(known::SQRT, discriminant);
    let signed = if plus {
        radical
    } else {
        f1(known::NEGATE, radical)
    };
    f2(
        known::DIVIDE,
        f2(known::ADD, f1(known::NEGATE, b), signed),
        f2(known::MULTIPLY, Expr::int(2), a),
    )
}

/// Build the ordered root rule set for one reserved placeholder.
pub(crate) fn root_rules(interner: &StringInterner, placeholder: Name) -> RuleSet {
    let caps = Captures::intern(interner);
    let (a, b, c, n) = (caps.a, caps.b, caps.c, caps.n);
    let x = Expr::symbol(placeholder);
    let (ca, cb, cc, cn) = (
        Expr::symbol(a),
        Expr::symbol(b),
        Expr::symbol(c),
        Expr::symbol(n),
    );
    let mut rules = RuleSet::new();

    // 1. a·x = 0  =>  0
    rules.push(
        Rule::new(f2(known::MULTIPLY, ca.clone(), x.clone()), Expr::int(0))
            .when(unknown_and_free(placeholder, &[a]))
            .with_id("root-scaled-unknown"),
    );
    rules.push(
        Rule::new(x.clone(), Expr::int(0))
            .when(unknown_and_free(placeholder, &[]))
            .with_id("root-bare-unknown"),
    );

    // 2. a/x + b = 0  =>  ∞
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cb.clone(),
                f2(
                    known::MULTIPLY,
                    ca.clone(),
                    f2(known::POWER, x.clone(), Expr::int(-1)),
                ),
            ),
            Expr::symbol(known::POSITIVE_INFINITY),
        )
        .when(unknown_and_free(placeholder, &[a, b]))
        .with_id("root-reciprocal"),
    );
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cb.clone(),
                f2(known::POWER, x.clone(), Expr::int(-1)),
            ),
            Expr::symbol(known::POSITIVE_INFINITY),
        )
        .when(unknown_and_free(placeholder, &[b]))
        .with_id("root-reciprocal-unit"),
    );

    // 3. a·x + b = 0  =>  -b/a
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cb.clone(),
                f2(known::MULTIPLY, ca.clone(), x.clone()),
            ),
            f2(known::DIVIDE, f1(known::NEGATE, cb.clone()), ca.clone()),
        )
        .when(unknown_and_free(placeholder, &[a, b]))
        .with_id("root-linear"),
    );
    rules.push(
        Rule::new(
            f2(known::ADD, cb.clone(), x.clone()),
            f1(known::NEGATE, cb.clone()),
        )
        .when(unknown_and_free(placeholder, &[b]))
        .with_id("root-linear-unit"),
    );
    rules.push(
        Rule::new(
            f2(known::ADD, cb.clone(), f1(known::NEGATE, x.clone())),
            cb.clone(),
        )
        .when(unknown_and_free(placeholder, &[b]))
        .with_id("root-linear-negated"),
    );

    // 4. a·x^n + b = 0  =>  (-b/a)^(1/n)
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cb.clone(),
                f2(
                    known::MULTIPLY,
                    ca.clone(),
                    f2(known::POWER, x.clone(), cn.clone()),
                ),
            ),
            f2(
                known::POWER,
                f2(known::DIVIDE, f1(known::NEGATE, cb.clone()), ca.clone()),
                f2(known::DIVIDE, Expr::int(1), cn.clone()),
            ),
        )
        .when(NonZeroExponent {
            base: unknown_and_free(placeholder, &[a, b]),
            exponent: n,
        })
        .with_id("root-power"),
    );
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cb.clone(),
                f2(known::POWER, x.clone(), cn.clone()),
            ),
            f2(
                known::POWER,
                f1(known::NEGATE, cb.clone()),
                f2(known::DIVIDE, Expr::int(1), cn.clone()),
            ),
        )
        .when(NonZeroExponent {
            base: unknown_and_free(placeholder, &[b]),
            exponent: n,
        })
        .with_id("root-power-unit"),
    );

    // 5. a·x² + b·x + c = 0  =>  (-b ± sqrt(b² - 4ac)) / (2a)
    let quadratic_shapes: [(Expr, Expr, Expr, &str); 4] = [
        (
            f3(
                known::ADD,
                cc.clone(),
                f2(known::MULTIPLY, cb.clone(), x.clone()),
                f2(
                    known::MULTIPLY,
                    ca.clone(),
                    f2(known::POWER, x.clone(), Expr::int(2)),
                ),
            ),
            ca.clone(),
            cb.clone(),
            "root-quadratic",
        ),
        (
            f3(
                known::ADD,
                cc.clone(),
                f2(known::MULTIPLY, cb.clone(), x.clone()),
                f2(known::POWER, x.clone(), Expr::int(2)),
            ),
            Expr::int(1),
            cb.clone(),
            "root-quadratic-monic",
        ),
        (
            f3(
                known::ADD,
                cc.clone(),
                x.clone(),
                f2(
                    known::MULTIPLY,
                    ca.clone(),
                    f2(known::POWER, x.clone(), Expr::int(2)),
                ),
            ),
            ca.clone(),
            Expr::int(1),
            "root-quadratic-unit-linear",
        ),
        (
            f3(
                known::ADD,
                cc.clone(),
                x.clone(),
                f2(known::POWER, x.clone(), Expr::int(2)),
            ),
            Expr::int(1),
            Expr::int(1),
            "root-quadratic-monic-unit",
        ),
    ];
    for (pattern, qa, qb, id) in quadratic_shapes {
        for plus in [true, false] {
            rules.push(
                Rule::new(
                    pattern.clone(),
                    quadratic_root(qa.clone(), qb.clone(), cc.clone(), plus),
                )
                .when(unknown_and_free(placeholder, &[a, b, c]))
                .with_id(id),
            );
        }
    }

    // 6. a·e^(b·x) + c = 0  =>  ln(-c/a)/b
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cc.clone(),
                f2(
                    known::MULTIPLY,
                    ca.clone(),
                    f1(
                        known::EXP,
                        f2(known::MULTIPLY, cb.clone(), x.clone()),
                    ),
                ),
            ),
            f2(
                known::DIVIDE,
                f1(
                    known::LN,
                    f2(known::DIVIDE, f1(known::NEGATE, cc.clone()), ca.clone()),
                ),
                cb.clone(),
            ),
        )
        .when(PositiveLogArgument {
            base: unknown_and_free(placeholder, &[a, b, c]),
            a: Some(a),
            c,
        })
        .with_id("root-exp-scaled"),
    );
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cc.clone(),
                f1(
                    known::EXP,
                    f2(known::MULTIPLY, cb.clone(), x.clone()),
                ),
            ),
            f2(
                known::DIVIDE,
                f1(known::LN, f1(known::NEGATE, cc.clone())),
                cb.clone(),
            ),
        )
        .when(PositiveLogArgument {
            base: unknown_and_free(placeholder, &[b, c]),
            a: None,
            c,
        })
        .with_id("root-exp-scaled-unit"),
    );

    // 7. a·e^x + c = 0  =>  ln(-c/a)
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cc.clone(),
                f2(known::MULTIPLY, ca.clone(), f1(known::EXP, x.clone())),
            ),
            f1(
                known::LN,
                f2(known::DIVIDE, f1(known::NEGATE, cc.clone()), ca.clone()),
            ),
        )
        .when(PositiveLogArgument {
            base: unknown_and_free(placeholder, &[a, c]),
            a: Some(a),
            c,
        })
        .with_id("root-exp"),
    );
    rules.push(
        Rule::new(
            f2(known::ADD, cc.clone(), f1(known::EXP, x.clone())),
            f1(known::LN, f1(known::NEGATE, cc.clone())),
        )
        .when(PositiveLogArgument {
            base: unknown_and_free(placeholder, &[c]),
            a: None,
            c,
        })
        .with_id("root-exp-unit"),
    );

    rules
}

/// Harmonisation: exact rewrites producing equivalent forms that the root
/// rules may recognise. The absolute-value split yields both branches;
/// exponential products merge their arguments.
pub(crate) fn harmonization_rules(interner: &StringInterner) -> RuleSet {
    let u = interner.intern("_u");
    let v = interner.intern("_v");
    let k = interner.intern("__k");
    let (cu, cv, ck) = (Expr::symbol(u), Expr::symbol(v), Expr::symbol(k));
    let mut rules = RuleSet::new();

    // |u| + k = 0  =>  u + k = 0  and  -u + k = 0
    rules.push(
        Rule::new(
            f2(known::ADD, ck.clone(), f1(known::ABS, cu.clone())),
            f2(known::ADD, ck.clone(), cu.clone()),
        )
        .with_id("harmonize-abs-plus"),
    );
    rules.push(
        Rule::new(
            f2(known::ADD, ck.clone(), f1(known::ABS, cu.clone())),
            f2(known::ADD, ck.clone(), f1(known::NEGATE, cu.clone())),
        )
        .with_id("harmonize-abs-minus"),
    );

    // k + e^u · e^v = 0  =>  k + e^(u+v) = 0
    let w = interner.intern("__w");
    let cw = Expr::symbol(w);
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                cw.clone(),
                f2(
                    known::MULTIPLY,
                    f1(known::EXP, cu.clone()),
                    f1(known::EXP, cv.clone()),
                ),
            ),
            f2(
                known::ADD,
                cw,
                f1(known::EXP, f2(known::ADD, cu.clone(), cv.clone())),
            ),
        )
        .with_id("harmonize-exp-product-sum"),
    );

    // e^u · e^v  =>  e^(u+v)
    rules.push(
        Rule::new(
            f2(known::MULTIPLY, f1(known::EXP, cu.clone()), f1(known::EXP, cv.clone())),
            f1(known::EXP, f2(known::ADD, cu.clone(), cv.clone())),
        )
        .with_id("harmonize-exp-product"),
    );
    rules.push(
        Rule::new(
            f3(
                known::MULTIPLY,
                ck.clone(),
                f1(known::EXP, cu.clone()),
                f1(known::EXP, cv.clone()),
            ),
            f2(
                known::MULTIPLY,
                ck,
                f1(known::EXP, f2(known::ADD, cu, cv)),
            ),
        )
        .with_id("harmonize-exp-product-scaled"),
    );

    rules
}
