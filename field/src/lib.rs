#![allow(clippy::needless_range_loop)]

//! Big-integer field elements, curve lookup tables, dense polynomial
//! arithmetic and the nondeterministic extension-field hint functions
//! that a tower-field circuit builder treats as external collaborators.

mod curve;
mod field_element;
mod hints;
mod polynomial;

pub use curve::{field, get_irreducible_poly, CurveId, LIMB_BITS, N_LIMBS};
pub use field_element::FieldElement;
pub use hints::{nondeterministic_extf_div, nondeterministic_extf_mul_divmod};
pub use polynomial::Polynomial;
