use crate::field_element::FieldElement;

/// A polynomial in coefficient form over `FieldElement`, lowest degree
/// first. Supports dense add/sub/scalar-mul/mul (convolution) and
/// Euclidean division by an arbitrary divisor.
#[derive(Clone, Debug)]
pub struct Polynomial {
    coeffs: Vec<FieldElement>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<FieldElement>) -> Self {
        Polynomial { coeffs }
    }

    pub fn zero(len: usize, modulus: &std::rc::Rc<num_bigint::BigUint>) -> Self {
        Polynomial::new(vec![FieldElement::zero(modulus); len.max(1)])
    }

    pub fn coeffs(&self) -> &[FieldElement] {
        &self.coeffs
    }

    pub fn into_coeffs(self) -> Vec<FieldElement> {
        self.coeffs
    }

    /// Coefficients, zero-padded (or truncated, which callers must avoid) to
    /// exactly `len` entries.
    pub fn coeffs_padded(&self, len: usize) -> Vec<FieldElement> {
        let modulus = self.modulus();
        let mut out = self.coeffs.clone();
        out.resize(len, FieldElement::zero(&modulus));
        out
    }

    fn modulus(&self) -> std::rc::Rc<num_bigint::BigUint> {
        self.coeffs
            .first()
            .map(|c| c.modulus().clone())
            .expect("polynomial must have at least one coefficient to infer its field")
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(FieldElement::is_zero)
    }

    /// Index one past the highest nonzero coefficient; 0 for the zero
    /// polynomial.
    pub fn degree_plus_one(&self) -> usize {
        self.coeffs
            .iter()
            .rposition(|c| !c.is_zero())
            .map_or(0, |i| i + 1)
    }

    pub fn trim(&mut self) {
        let len = self.degree_plus_one().max(1);
        self.coeffs.truncate(len);
    }

    pub fn trimmed(&self) -> Self {
        let mut p = self.clone();
        p.trim();
        p
    }

    fn lead(&self) -> &FieldElement {
        &self.coeffs[self.degree_plus_one() - 1]
    }

    /// Horner evaluation.
    pub fn eval(&self, x: &FieldElement) -> FieldElement {
        let modulus = self.modulus();
        self.coeffs
            .iter()
            .rev()
            .fold(FieldElement::zero(&modulus), |acc, c| &(&acc * x) + c)
    }

    /// Evaluate given precomputed powers `[x, x^2, x^3, ...]`; `powers.len()`
    /// must be at least `coeffs.len() - 1`.
    pub fn eval_with_powers(&self, powers: &[FieldElement]) -> FieldElement {
        assert!(
            self.coeffs.len() <= powers.len() + 1,
            "not enough precomputed powers for this polynomial's degree"
        );
        let mut acc = self.coeffs[0].clone();
        for (c, p) in self.coeffs[1..].iter().zip(powers) {
            acc = &acc + &(c * p);
        }
        acc
    }

    pub fn scalar_mul(&self, c: &FieldElement) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|x| x * c).collect())
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let modulus = self.modulus();
        let len = self.coeffs.len().max(other.coeffs.len());
        let zero = FieldElement::zero(&modulus);
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let a = self.coeffs.get(i).unwrap_or(&zero);
            let b = other.coeffs.get(i).unwrap_or(&zero);
            out.push(a + b);
        }
        Polynomial::new(out)
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.scalar_mul(&(-FieldElement::one(&self.modulus()))))
    }

    /// Dense convolution.
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        let modulus = self.modulus();
        let mut out = vec![FieldElement::zero(&modulus); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] = &out[i + j] + &(a * b);
            }
        }
        Polynomial::new(out)
    }

    /// Euclidean division: returns `(q, r)` with `self = q*divisor + r` and
    /// `deg(r) < deg(divisor)`.
    pub fn div_rem(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        let modulus = self.modulus();
        let divisor = divisor.trimmed();
        let (a_deg1, b_deg1) = (self.degree_plus_one(), divisor.degree_plus_one());
        assert!(b_deg1 > 0, "division by the zero polynomial");

        if a_deg1 < b_deg1 {
            return (Polynomial::zero(1, &modulus), self.trimmed());
        }

        let mut quotient = vec![FieldElement::zero(&modulus); a_deg1 - b_deg1 + 1];
        let mut remainder = self.trimmed();
        let lead_inv = divisor.lead().inverse().expect("irreducible divisor has nonzero leading coefficient");

        while !remainder.is_zero() && remainder.degree_plus_one() >= b_deg1 {
            let cur_deg = remainder.degree_plus_one() - b_deg1;
            let cur_coeff = remainder.lead() * &lead_inv;
            quotient[cur_deg] = cur_coeff.clone();
            for (i, d) in divisor.coeffs.iter().enumerate() {
                let idx = cur_deg + i;
                remainder.coeffs[idx] = &remainder.coeffs[idx] - &(&cur_coeff * d);
            }
            remainder.trim();
        }
        (Polynomial::new(quotient), remainder)
    }

    /// Extended Euclidean algorithm: returns `(g, s, t)` with
    /// `s*self + t*other = g`. Used by `nondeterministic_extf_div` to find
    /// `Y^{-1} mod Φ`.
    pub fn extended_gcd(&self, other: &Polynomial) -> (Polynomial, Polynomial, Polynomial) {
        let modulus = self.modulus();
        let (mut old_r, mut r) = (self.trimmed(), other.trimmed());
        let (mut old_s, mut s) = (
            Polynomial::new(vec![FieldElement::one(&modulus)]),
            Polynomial::zero(1, &modulus),
        );
        let (mut old_t, mut t) = (
            Polynomial::zero(1, &modulus),
            Polynomial::new(vec![FieldElement::one(&modulus)]),
        );

        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(&r);
            old_r = std::mem::replace(&mut r, rem);
            let new_s = old_s.sub(&q.mul(&s));
            old_s = std::mem::replace(&mut s, new_s);
            let new_t = old_t.sub(&q.mul(&t));
            old_t = std::mem::replace(&mut t, new_t);
        }
        (old_r, old_s, old_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{field, get_irreducible_poly, CurveId};

    fn felt(v: u64, modulus: &std::rc::Rc<num_bigint::BigUint>) -> FieldElement {
        FieldElement::from_u64(v, modulus)
    }

    #[test]
    fn div_rem_exact_reconstructs_dividend() {
        let m = field(CurveId::Bn254);
        let phi = get_irreducible_poly(CurveId::Bn254, 6);
        let a = Polynomial::new((0..6).map(|i| felt(i + 1, &m)).collect());
        let b = Polynomial::new((0..6).map(|i| felt(2 * i + 1, &m)).collect());
        let product = a.mul(&b);
        let (q, r) = product.div_rem(&phi);
        let reconstructed = q.mul(&phi).add(&r);
        assert_eq!(reconstructed.trimmed().coeffs(), product.trimmed().coeffs());
    }

    #[test]
    fn extended_gcd_with_irreducible_is_unit() {
        let m = field(CurveId::Bn254);
        let phi = get_irreducible_poly(CurveId::Bn254, 6);
        let y = Polynomial::new(vec![felt(3, &m), felt(1, &m), felt(0, &m), felt(0, &m), felt(0, &m), felt(0, &m)]);
        let (g, s, _t) = y.extended_gcd(&phi);
        assert_eq!(g.degree_plus_one(), 1);
        let check = s.mul(&y).div_rem(&phi).1;
        let expected_unit = g.coeffs()[0].clone();
        assert_eq!(check.coeffs()[0], expected_unit);
    }
}
