use std::rc::Rc;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::field_element::FieldElement;
use crate::polynomial::Polynomial;

/// Fixed limb count used for transcript absorption and back-end
/// serialization of field elements.
pub const N_LIMBS: usize = 4;

/// Width, in bits, of each of the `N_LIMBS` limbs.
pub const LIMB_BITS: u32 = 96;

/// Curves whose base-field tower this builder supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CurveId {
    Bn254,
    Bls12_381,
}

impl CurveId {
    fn modulus_str(&self) -> &'static str {
        match self {
            // BN254 base field modulus.
            CurveId::Bn254 => {
                "21888242871839275222246405745257275088696311157297823662689037894645226208583"
            }
            // BLS12-381 base field modulus.
            CurveId::Bls12_381 => "4002409555221667393417789825735904156556882819939007885332058136124031650490837864442687629129015664037894272559787",
        }
    }

    /// Low Hamming-weight non-residue used to build `Φ_d(x) = x^d - non_residue`
    /// for this curve's tower. Real tower constructions derive this from the
    /// curve's sextic/quadratic twist; picking a fixed small non-residue here
    /// keeps the irreducible-polynomial table a lookup.
    fn non_residue(&self) -> u64 {
        match self {
            CurveId::Bn254 => 21,
            CurveId::Bls12_381 => 11,
        }
    }
}

/// `field(curve_id)`: the base-field modulus.
pub fn field(curve_id: CurveId) -> Rc<BigUint> {
    Rc::new(BigUint::from_str(curve_id.modulus_str()).expect("hardcoded modulus is valid"))
}

/// `get_irreducible_poly(curve_id, degree)`: yields `Φ(x) = x^degree - non_residue`,
/// a binomial (Hamming weight 2).
pub fn get_irreducible_poly(curve_id: CurveId, degree: usize) -> Polynomial {
    assert!(degree > 0 && degree % 2 == 0, "degree must be even, got {degree}");
    let p = field(curve_id);
    let mut coeffs = vec![FieldElement::zero(&p); degree + 1];
    coeffs[0] = -FieldElement::from_u64(curve_id.non_residue(), &p);
    coeffs[degree] = FieldElement::one(&p);
    Polynomial::new(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irreducible_poly_is_binomial() {
        let phi = get_irreducible_poly(CurveId::Bn254, 6);
        assert_eq!(phi.coeffs().len(), 7);
        assert!(phi.coeffs()[1].is_zero());
        assert!(phi.coeffs()[6].is_one());
    }
}
