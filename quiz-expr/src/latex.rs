//! Rendering expressions to LaTeX.
//!
//! The renderer is a precedence climber: [`tex_prec`] receives the precedence of the
//! surrounding operator and wraps its own output in `\left( \right)` only when that
//! precedence exceeds the current node's. The ladder, low to high: 20 sums, 30
//! products, 35 slash fractions, 40 display fractions, 50 powers, 60 subscripts.
//!
//! The `small` flag marks a compact context (inside an exponent or subscript) where
//! a rational renders as `a/b` instead of `\tfrac{a}{b}`.

use crate::expr::{num_is_minus_one, num_is_negative, Expr, Head};
use crate::matrix::is_vector;
use crate::policy::PolicyStack;

/// The LaTeX form of an expression, under default rendering policy.
pub fn latex(e: &Expr) -> String {
    latex_with(e, &PolicyStack::new())
}

/// The LaTeX form of an expression, consulting the given policy stack for
/// vector-as-tuple and derivative-prime rendering.
pub fn latex_with(e: &Expr, policy: &PolicyStack) -> String {
    tex_prec(0, e, false, policy)
}

fn parens(par_prec: u32, prec: u32, text: String) -> String {
    if par_prec > prec {
        format!("\\left({}\\right)", text)
    } else {
        text
    }
}

fn tex_prec(prec: u32, e: &Expr, small: bool, policy: &PolicyStack) -> String {
    match e {
        Expr::Integer(n) => n.to_string(),
        Expr::Rational(r) => {
            let (n, d) = (r.numer(), r.denom());
            if small {
                parens(prec, 25, format!("{}/{}", n, d))
            } else {
                parens(prec, 40, format!("\\tfrac{{{}}}{{{}}}", n, d))
            }
        },
        Expr::Float(f) => format!("{}", f.to_f64()),
        Expr::Str(s) => s.clone(),
        Expr::List(elts) => {
            let inner: Vec<String> = elts
                .iter()
                .map(|x| tex_prec(0, x, small, policy))
                .collect();
            format!("\\left[{}\\right]", inner.join(","))
        },
        Expr::Node(_, args) => match e.head() {
            Head::Tag("Plus") => tex_sum(prec, args, small, policy),
            Head::Tag("Times") => tex_product(prec, args, small, policy),
            Head::Tag("MatTimes") => {
                let text: String = args
                    .iter()
                    .map(|a| tex_prec(30, a, small, policy))
                    .collect();
                parens(prec, 30, text)
            },
            Head::Tag("Pow") => {
                let text = format!(
                    "{}^{{{}}}",
                    tex_prec(50, &args[0], small, policy),
                    tex_prec(0, &args[1], true, policy),
                );
                parens(prec, 49, text)
            },
            Head::Tag("Part") => {
                let indices: Vec<String> = args[1..]
                    .iter()
                    .map(|x| tex_prec(0, x, true, policy))
                    .collect();
                let text = format!(
                    "{}_{{{}}}",
                    tex_prec(60, &args[0], small, policy),
                    indices.join(","),
                );
                parens(prec, 60, text)
            },
            Head::Tag("var") | Head::Tag("const") => match args[0].as_str() {
                Some(name) => format!("{{{}}}", name),
                None => tex_prec(prec, &args[0], small, policy),
            },
            Head::Tag("matrix") => tex_matrix(e, args, small, policy),
            Head::Tag("block") => tex_block(args, policy),
            Head::Tag("Deriv") => tex_deriv(prec, args, small, policy),
            Head::Tag(tag) => {
                let inner: Vec<String> = args
                    .iter()
                    .map(|x| tex_prec(0, x, small, policy))
                    .collect();
                format!("\\operatorname{{{}}}({})", tag, inner.join(", "))
            },
            _ => {
                let (head, _) = match e.as_node() {
                    Some(pair) => pair,
                    None => return String::new(),
                };
                let inner: Vec<String> = args
                    .iter()
                    .map(|x| tex_prec(0, x, small, policy))
                    .collect();
                format!(
                    "{}({})",
                    tex_prec(1000, head, small, policy),
                    inner.join(", "),
                )
            },
        },
    }
}

/// Sums alternate `+`/`-` from each term's sign, with a bare `-` for a leading
/// negative term. The output never contains a `+ -` sequence.
fn tex_sum(prec: u32, terms: &[Expr], small: bool, policy: &PolicyStack) -> String {
    let one = Expr::from(1);
    let mut text = String::new();
    for (i, a) in terms.iter().enumerate() {
        // peel a leading numeric coefficient off the term
        let (mut coeff, b): (Expr, Expr) = match a.args_of("Times") {
            Some(factors) if factors.len() >= 2 && factors[0].is_number() => {
                let rest = if factors.len() == 2 {
                    factors[1].clone()
                } else {
                    Expr::node("Times", factors[1..].to_vec())
                };
                (factors[0].clone(), rest)
            },
            _ if a.is_number() => (a.clone(), one.clone()),
            _ => (one.clone(), a.clone()),
        };
        let mut op = " + ";
        if num_is_minus_one(&coeff) {
            op = if i == 0 { "-" } else { " - " };
            coeff = one.clone();
        } else if i == 0 {
            op = "";
        } else if num_is_negative(&coeff) {
            op = " - ";
            coeff = -coeff;
        }
        if b.is_one() {
            text.push_str(op);
            text.push_str(&tex_prec(20, &coeff, small, policy));
        } else if coeff.is_one() {
            text.push_str(op);
            text.push_str(&tex_prec(20, &b, small, policy));
        } else {
            text.push_str(op);
            text.push_str(&tex_prec(30, &coeff, small, policy));
            text.push_str(&tex_prec(30, &b, small, policy));
        }
    }
    if text.is_empty() {
        text.push('0');
    }
    parens(prec, 20, text)
}

/// Products are split into numerator and denominator factors by exponent sign, with
/// an overall minus sign collapsed out, then laid out inline or as a `\frac`.
fn tex_product(prec: u32, factors: &[Expr], small: bool, policy: &PolicyStack) -> String {
    let one = Expr::from(1);
    let mut numer: Vec<(Expr, Expr)> = Vec::new();
    let mut denom: Vec<(Expr, Expr)> = Vec::new();
    let mut is_neg = false;
    for a in factors {
        let (b, exp) = match a.args_of("Pow") {
            Some([base, exp]) => (base.clone(), exp.clone()),
            _ => (a.clone(), one.clone()),
        };
        if exp.is_number() && (exp.is_zero() || num_is_negative(&exp)) {
            denom.push((b, -exp));
        } else if exp.is_one() && b.is_number() && num_is_negative(&b) {
            is_neg = true;
            if !num_is_minus_one(&b) {
                numer.push((-b, exp));
            }
        } else {
            numer.push((b, exp));
        }
    }

    let render = |side: &[(Expr, Expr)], base_prec: u32| -> String {
        let mut text = String::new();
        for (i, (b, exp)) in side.iter().enumerate() {
            let mut prec2 = if side.len() > 1 { 30 } else { base_prec };
            if i > 0 && b.is_number() {
                // forces parentheses between adjacent numeric factors
                prec2 = 1000;
            }
            if exp.is_one() {
                text.push_str(&tex_prec(prec2, b, small, policy));
            } else {
                let p = Expr::node("Pow", vec![b.clone(), exp.clone()]);
                text.push_str(&tex_prec(prec2, &p, small, policy));
            }
        }
        text
    };

    let snumer = render(&numer, if denom.is_empty() { prec } else { 0 });
    let sdenom = render(&denom, 0);

    if numer.is_empty() && !denom.is_empty() {
        if is_neg {
            parens(prec, 20, format!("-\\frac{{1}}{{{}}}", sdenom))
        } else {
            parens(prec, 40, format!("\\frac{{1}}{{{}}}", sdenom))
        }
    } else if denom.is_empty() {
        if is_neg {
            parens(prec, 20, format!("-{}", snumer))
        } else {
            snumer
        }
    } else if is_neg {
        parens(prec, 20, format!("-\\frac{{{}}}{{{}}}", snumer, sdenom))
    } else {
        parens(prec, 40, format!("\\frac{{{}}}{{{}}}", snumer, sdenom))
    }
}

fn tex_matrix(e: &Expr, rows: &[Expr], small: bool, policy: &PolicyStack) -> String {
    if policy.vector_as_tuple() && is_vector(e) {
        let entries: Vec<String> = rows
            .iter()
            .filter_map(|row| row.as_list())
            .map(|row| tex_prec(0, &row[0], small, policy))
            .collect();
        return format!("\\left({}\\right)", entries.join(","));
    }
    let body: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .as_list()
                .unwrap_or(&[])
                .iter()
                .map(|x| tex_prec(0, x, true, policy))
                .collect();
            cells.join("&")
        })
        .collect();
    format!("\\begin{{bmatrix}}{}\\end{{bmatrix}}", body.join("\\\\"))
}

/// A block matrix renders as one `array` with dividing rules between block columns
/// and rows. Each block's span is inferred from whichever sibling blocks are already
/// concrete matrices (one row/column otherwise), and a still-symbolic block is
/// centered within its span.
fn tex_block(block_rows: &[Expr], policy: &PolicyStack) -> String {
    let grid: Vec<&[Expr]> = block_rows
        .iter()
        .map(|row| row.as_list().unwrap_or(&[]))
        .collect();
    let n_block_cols = grid.first().map_or(0, |row| row.len());

    let dims = |b: &Expr| -> Option<(usize, usize)> { crate::matrix::shape(b).ok() };
    let row_spans: Vec<usize> = grid
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| dims(b).map(|(r, _)| r))
                .max()
                .unwrap_or(1)
        })
        .collect();
    let col_spans: Vec<usize> = (0..n_block_cols)
        .map(|j| {
            grid.iter()
                .filter_map(|row| row.get(j).and_then(dims).map(|(_, c)| c))
                .max()
                .unwrap_or(1)
        })
        .collect();

    let colspec: Vec<String> = col_spans.iter().map(|&w| "c".repeat(w)).collect();
    let mut groups: Vec<String> = Vec::with_capacity(grid.len());
    for (i, row) in grid.iter().enumerate() {
        let mut lines: Vec<Vec<String>> = vec![Vec::new(); row_spans[i]];
        for (j, b) in row.iter().enumerate() {
            match crate::matrix::entry_rows(b) {
                Some(entries) => {
                    for (li, line) in lines.iter_mut().enumerate() {
                        for lj in 0..col_spans[j] {
                            let cell = entries
                                .get(li)
                                .and_then(|r| r.get(lj))
                                .map(|x| tex_prec(0, x, true, policy))
                                .unwrap_or_default();
                            line.push(cell);
                        }
                    }
                },
                None => {
                    let (ci, cj) = ((row_spans[i] - 1) / 2, (col_spans[j] - 1) / 2);
                    for (li, line) in lines.iter_mut().enumerate() {
                        for lj in 0..col_spans[j] {
                            if (li, lj) == (ci, cj) {
                                line.push(tex_prec(0, b, true, policy));
                            } else {
                                line.push(String::new());
                            }
                        }
                    }
                },
            }
        }
        let joined: Vec<String> = lines.into_iter().map(|line| line.join("&")).collect();
        groups.push(joined.join("\\\\"));
    }
    format!(
        "\\left[\\begin{{array}}{{{}}}{}\\end{{array}}\\right]",
        colspec.join("|"),
        groups.join("\\\\\\hline "),
    )
}

fn tex_deriv(prec: u32, args: &[Expr], small: bool, policy: &PolicyStack) -> String {
    let target = &args[0];
    let spec: Vec<(&Expr, &Expr)> = args[1]
        .as_list()
        .unwrap_or(&[])
        .iter()
        .filter_map(|entry| match entry.as_list() {
            Some([v, n]) => Some((v, n)),
            _ => None,
        })
        .collect();

    if policy.deriv_use_primes() && spec.len() == 1 && *spec[0].0 == policy.deriv_indep_var() {
        let n = spec[0].1;
        let limit = policy.deriv_primes_limit() as i64;
        let exp = match n.as_index() {
            Some(k) if 1 <= k && k <= limit => "\\prime".repeat(k as usize),
            _ => format!("({})", tex_prec(0, n, true, policy)),
        };
        let text = format!("{}^{{{}}}", tex_prec(50, target, small, policy), exp);
        return parens(prec, 49, text);
    }

    let d = if spec.len() == 1 { "d" } else { "\\partial" };
    let mut bottom: Vec<String> = Vec::new();
    let mut orders: Vec<Expr> = Vec::new();
    for (v, n) in &spec {
        if n.is_zero() {
            continue;
        }
        orders.push((*n).clone());
        if n.is_one() {
            bottom.push(format!("{} {}", d, tex_prec(30, v, small, policy)));
        } else {
            bottom.push(format!(
                "{} {}^{{{}}}",
                d,
                tex_prec(30, v, small, policy),
                tex_prec(0, n, true, policy),
            ));
        }
    }
    // the total order, shown as a superscript on the top `d` unless it is 1
    let total: Option<i64> = orders
        .iter()
        .map(Expr::as_index)
        .sum::<Option<i64>>();
    let p = match total {
        Some(1) => String::new(),
        Some(s) => format!("^{{{}}}", s),
        None => {
            let sum = Expr::node("Plus", orders);
            format!("^{{{}}}", tex_prec(0, &sum, true, policy))
        },
    };
    let top = format!("{}{} {}", d, p, tex_prec(30, target, small, policy));
    parens(prec, 40, format!("\\frac{{{}}}{{{}}}", top, bottom.join("\\,")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deriv::deriv;
    use crate::eval::Engine;
    use crate::expr::{frac, pow, var};
    use crate::matrix::{block_matrix, identity_matrix, vector};
    use crate::primitive::rat;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaves() {
        assert_eq!(latex(&Expr::from(42)), "42");
        assert_eq!(latex(&var("x")), "{x}");
        assert_eq!(latex(&Expr::Rational(rat((1, 2)))), "\\tfrac{1}{2}");
    }

    #[test]
    fn rational_in_exponent_uses_slash_form() {
        let e = pow(var("x"), Expr::Rational(rat((1, 2))));
        assert_eq!(latex(&e), "{x}^{1/2}");
    }

    #[test]
    fn subtraction_renders_with_a_minus() {
        let ngin = Engine::new();
        let e = ngin.eval(var("x") + Expr::from(-1) * var("y")).unwrap();
        let s = latex(&e);
        assert_eq!(s, "{x} - {y}");
        assert!(!s.contains("+ -"));
    }

    #[test]
    fn leading_negative_term_is_unary_minus() {
        let e = Expr::node(
            "Plus",
            vec![Expr::from(-1) * var("x"), var("y")],
        );
        assert_eq!(latex(&e), "-{x} + {y}");
    }

    #[test]
    fn polynomial_layout() {
        let e = Expr::node(
            "Plus",
            vec![
                pow(var("x"), Expr::from(2)),
                Expr::from(2) * var("x"),
                Expr::from(1),
            ],
        );
        assert_eq!(latex(&e), "{x}^{2} + 2{x} + 1");
    }

    #[test]
    fn quotient_renders_as_frac() {
        assert_eq!(latex(&frac(var("x"), var("y"))), "\\frac{{x}}{{y}}");
    }

    #[test]
    fn reciprocal_renders_with_unit_numerator() {
        let e = pow(var("y"), Expr::from(-2));
        assert_eq!(
            latex(&Expr::node("Times", vec![e])),
            "\\frac{1}{{y}^{2}}",
        );
    }

    #[test]
    fn sum_parenthesized_inside_product() {
        let e = Expr::from(2) * (var("x") + Expr::from(1));
        assert_eq!(latex(&e), "2\\left({x} + 1\\right)");
    }

    #[test]
    fn matrix_renders_as_bmatrix() {
        let v = vector(vec![Expr::from(1), Expr::from(2)]).unwrap();
        assert_eq!(latex(&v), "\\begin{bmatrix}1\\\\2\\end{bmatrix}");
    }

    #[test]
    fn vector_as_tuple_policy() {
        let v = vector(vec![Expr::from(1), Expr::from(2)]).unwrap();
        let mut policy = PolicyStack::new();
        {
            let mut scope = policy.scope();
            scope.set_vector_as_tuple(true);
            assert_eq!(latex_with(&v, &scope), "\\left(1,2\\right)");
        }
        assert_eq!(latex_with(&v, &policy), "\\begin{bmatrix}1\\\\2\\end{bmatrix}");
    }

    #[test]
    fn indexing_renders_as_subscript() {
        let e = Expr::node("Part", vec![var("A"), Expr::from(1), Expr::from(2)]);
        assert_eq!(latex(&e), "{A}_{1,2}");
    }

    #[test]
    fn matrix_product_is_juxtaposition() {
        let e = var("A").matmul(var("B"));
        assert_eq!(latex(&e), "{A}{B}");
    }

    #[test]
    fn function_heads_use_operatorname() {
        let e = Expr::node("ln", vec![var("x")]);
        assert_eq!(latex(&e), "\\operatorname{ln}({x})");
    }

    #[test]
    fn derivative_in_indep_var_uses_primes() {
        let t = var("t");
        let e = deriv(var("y"), vec![(t.clone(), Expr::from(2))], vec![]);
        assert_eq!(latex(&e), "{y}^{\\prime\\prime}");
        // above the prime limit, parenthesized order notation
        let e4 = deriv(var("y"), vec![(t, Expr::from(4))], vec![]);
        assert_eq!(latex(&e4), "{y}^{(4)}");
    }

    #[test]
    fn derivative_in_other_var_uses_leibniz() {
        let e = deriv(var("y"), vec![(var("x"), Expr::from(1))], vec![]);
        assert_eq!(latex(&e), "\\frac{d {y}}{d {x}}");
    }

    #[test]
    fn mixed_partials_use_partial_signs() {
        let e = deriv(
            var("f"),
            vec![(var("x"), Expr::from(1)), (var("y"), Expr::from(2))],
            vec![],
        );
        assert_eq!(
            latex(&e),
            "\\frac{\\partial^{3} {f}}{\\partial {x}\\,\\partial {y}^{2}}",
        );
    }

    #[test]
    fn block_matrix_grid_with_dividers() {
        let b = block_matrix(vec![vec![var("A"), identity_matrix(2).unwrap()]]).unwrap();
        assert_eq!(
            latex(&b),
            "\\left[\\begin{array}{c|cc}{A}&1&0\\\\&0&1\\end{array}\\right]",
        );
    }
}
