use crate::curve::{get_irreducible_poly, CurveId};
use crate::field_element::FieldElement;
use crate::polynomial::Polynomial;

/// `nondeterministic_extf_mul_divmod(Ps, curve_id, d)`.
///
/// Multiplies every factor in `ps` as a dense polynomial, then reduces
/// modulo `Φ_d` to recover `(Q, R)` with `Π ps = Q*Φ_d + R`. Nothing here is
/// actually nondeterministic in this synchronous core — the name is kept
/// because the emitted circuit still treats `R` as a prover-supplied
/// commitment whose correctness is checked, not assumed.
pub fn nondeterministic_extf_mul_divmod(
    ps: &[Vec<FieldElement>],
    curve_id: CurveId,
    d: usize,
) -> (Polynomial, Vec<FieldElement>) {
    assert!(!ps.is_empty(), "extf_mul_divmod requires at least one factor");
    let modulus = ps[0][0].modulus().clone();
    let phi = get_irreducible_poly(curve_id, d);

    let mut product = Polynomial::new(vec![FieldElement::one(&modulus)]);
    for p in ps {
        product = product.mul(&Polynomial::new(p.clone()));
    }
    let (q, r) = product.div_rem(&phi);
    (q, r.coeffs_padded(d))
}

/// `nondeterministic_extf_div(X, Y, curve_id, d)`.
///
/// Computes `Y^{-1} mod Φ_d` via `Polynomial::extended_gcd`, then
/// `W = X * Y^{-1} mod Φ_d`. Returns `None` if `Y` shares a factor with
/// `Φ_d` and so has no inverse — callers map this to
/// `CircuitError::DivideByZero`.
pub fn nondeterministic_extf_div(
    x: &[FieldElement],
    y: &[FieldElement],
    curve_id: CurveId,
    d: usize,
) -> Option<Vec<FieldElement>> {
    let phi = get_irreducible_poly(curve_id, d);
    let y_poly = Polynomial::new(y.to_vec());

    let (g, s, _t) = y_poly.extended_gcd(&phi);
    if g.degree_plus_one() != 1 {
        return None;
    }
    let g_inv = g.coeffs()[0]
        .inverse()
        .expect("gcd of an invertible element is a nonzero scalar");
    let y_inv = s.scalar_mul(&g_inv).div_rem(&phi).1;

    let x_poly = Polynomial::new(x.to_vec());
    let (_q, w) = x_poly.mul(&y_inv).div_rem(&phi);
    Some(w.coeffs_padded(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::field;

    fn felt(v: u64, modulus: &std::rc::Rc<num_bigint::BigUint>) -> FieldElement {
        FieldElement::from_u64(v, modulus)
    }

    #[test]
    fn mul_divmod_reconstructs_product() {
        let m = field(CurveId::Bn254);
        let a: Vec<_> = (0..6).map(|i| felt(i + 1, &m)).collect();
        let b: Vec<_> = (0..6).map(|i| felt(2 * i + 1, &m)).collect();
        let (q, r) = nondeterministic_extf_mul_divmod(&[a.clone(), b.clone()], CurveId::Bn254, 6);
        let phi = get_irreducible_poly(CurveId::Bn254, 6);
        let product = Polynomial::new(a).mul(&Polynomial::new(b));
        let reconstructed = q.mul(&phi).add(&Polynomial::new(r));
        assert_eq!(reconstructed.trimmed().coeffs(), product.trimmed().coeffs());
    }

    #[test]
    fn div_then_mul_recovers_numerator() {
        let m = field(CurveId::Bn254);
        let x: Vec<_> = (0..6).map(|i| felt(i + 3, &m)).collect();
        let y: Vec<_> = (0..6).map(|i| felt(2 * i + 5, &m)).collect();
        let w = nondeterministic_extf_div(&x, &y, CurveId::Bn254, 6).unwrap();
        let (_q, r) = nondeterministic_extf_mul_divmod(&[w, y], CurveId::Bn254, 6);
        assert_eq!(r, x);
    }
}
