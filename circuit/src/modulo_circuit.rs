use std::rc::Rc;

use num_bigint::BigUint;
use tower_field::{CurveId, FieldElement};

use crate::error::{CircuitError, Result};
use crate::segment::{Cell, Provenance, ValueSegment};
use crate::value::ModuloCircuitElement;

/// The value segment plus the field/curve context every writer needs. The
/// single owner of the underlying log (`ValueSegment`) that every
/// higher-level op goes through.
pub struct ModuloCircuit {
    name: String,
    curve_id: CurveId,
    modulus: Rc<BigUint>,
    segment: ValueSegment,
    zero_cell: Cell,
    one_cell: Cell,
}

impl ModuloCircuit {
    pub fn new(name: impl Into<String>, curve_id: CurveId) -> Self {
        let modulus = tower_field::field(curve_id);
        let mut segment = ValueSegment::new();
        let zero_cell = segment.write_constant(FieldElement::zero(&modulus));
        let one_cell = segment.write_constant(FieldElement::one(&modulus));
        ModuloCircuit {
            name: name.into(),
            curve_id,
            modulus,
            segment,
            zero_cell,
            one_cell,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curve_id(&self) -> CurveId {
        self.curve_id
    }

    pub fn modulus(&self) -> &Rc<BigUint> {
        &self.modulus
    }

    pub fn segment(&self) -> &ValueSegment {
        &self.segment
    }

    pub fn segment_mut(&mut self) -> &mut ValueSegment {
        &mut self.segment
    }

    pub fn zero(&self) -> ModuloCircuitElement {
        ModuloCircuitElement::from_cell(FieldElement::zero(&self.modulus), self.zero_cell)
    }

    pub fn one(&self) -> ModuloCircuitElement {
        ModuloCircuitElement::from_cell(FieldElement::one(&self.modulus), self.one_cell)
    }

    fn wrap(&self, cell: Cell) -> ModuloCircuitElement {
        ModuloCircuitElement::from_cell(self.segment.value(cell).clone(), cell)
    }

    /// Writes a symbolic element to a real cell if it isn't backed by one
    /// already. Every arithmetic op below goes through this, so a caller can
    /// freely combine sparsity-skipped symbolic coefficients with ordinary
    /// circuit values without special-casing each op.
    fn materialize(&mut self, e: &ModuloCircuitElement) -> Cell {
        match e.offset() {
            Some(cell) => cell,
            None => self.segment.write_constant(e.value.clone()),
        }
    }

    pub fn write_constant(&mut self, value: FieldElement) -> ModuloCircuitElement {
        let cell = self.segment.write_constant(value);
        self.wrap(cell)
    }

    pub fn write_input(&mut self, value: FieldElement) -> ModuloCircuitElement {
        let cell = self.segment.write_input(value);
        self.wrap(cell)
    }

    pub fn write_commit(&mut self, value: FieldElement) -> ModuloCircuitElement {
        let cell = self.segment.write_commit(value);
        self.wrap(cell)
    }

    pub fn write_witness(&mut self, value: FieldElement) -> ModuloCircuitElement {
        let cell = self.segment.write_witness(value);
        self.wrap(cell)
    }

    pub fn write_cairo_native_felt(&mut self, value: FieldElement) -> ModuloCircuitElement {
        let cell = self.segment.write_cairo_native_felt(value);
        self.wrap(cell)
    }

    fn write_one(&mut self, value: FieldElement, provenance: Provenance) -> ModuloCircuitElement {
        match provenance {
            Provenance::Constant => self.write_constant(value),
            Provenance::Input => self.write_input(value),
            Provenance::Commit => self.write_commit(value),
            Provenance::Witness => self.write_witness(value),
            Provenance::Felt => self.write_cairo_native_felt(value),
            Provenance::Builtin => unreachable!("write_one never takes a builtin provenance"),
        }
    }

    pub fn write_elements(
        &mut self,
        values: &[FieldElement],
        provenance: Provenance,
    ) -> Vec<ModuloCircuitElement> {
        values
            .iter()
            .cloned()
            .map(|v| self.write_one(v, provenance))
            .collect()
    }

    /// Writes only the nonzero coefficients of `coeffs`: zero entries stay
    /// symbolic rather than taking a segment cell. Returns
    /// the dense element list (symbolic where skipped) and the matching
    /// sparsity tag per index (`0` = zero, `1` = generic).
    pub fn write_sparse_elements(
        &mut self,
        coeffs: &[FieldElement],
        provenance: Provenance,
    ) -> (Vec<ModuloCircuitElement>, Vec<u8>) {
        let mut elements = Vec::with_capacity(coeffs.len());
        let mut sparsity = Vec::with_capacity(coeffs.len());
        for c in coeffs {
            if c.is_zero() {
                elements.push(ModuloCircuitElement::symbolic(c.clone()));
                sparsity.push(0u8);
            } else {
                elements.push(self.write_one(c.clone(), provenance));
                sparsity.push(1u8);
            }
        }
        (elements, sparsity)
    }

    pub fn add(&mut self, a: &ModuloCircuitElement, b: &ModuloCircuitElement) -> ModuloCircuitElement {
        let (ca, cb) = (self.materialize(a), self.materialize(b));
        self.wrap(self.segment.add(ca, cb))
    }

    pub fn mul(&mut self, a: &ModuloCircuitElement, b: &ModuloCircuitElement) -> ModuloCircuitElement {
        let (ca, cb) = (self.materialize(a), self.materialize(b));
        self.wrap(self.segment.mul(ca, cb))
    }

    /// `a - b`. `ValueSegment::sub(left, right)` returns `right - left`, so
    /// this swaps the operand order to present the usual subtraction shape.
    pub fn sub(&mut self, a: &ModuloCircuitElement, b: &ModuloCircuitElement) -> ModuloCircuitElement {
        let (ca, cb) = (self.materialize(a), self.materialize(b));
        self.wrap(self.segment.sub(cb, ca))
    }

    pub fn neg(&mut self, a: &ModuloCircuitElement) -> ModuloCircuitElement {
        let zero = self.zero();
        self.sub(&zero, a)
    }

    pub fn inv(&mut self, a: &ModuloCircuitElement) -> Result<ModuloCircuitElement> {
        if a.value.is_zero() {
            return Err(CircuitError::DivideByZero);
        }
        let ca = self.materialize(a);
        let inverse = a.value.inverse().expect("checked nonzero above");
        Ok(self.wrap(self.segment.inv(ca, inverse)))
    }

    /// Bookkeeping-only equality assertion: records the pair without forcing
    /// it through a builtin cell. Used where the back-end is trusted to
    /// re-check the pair itself.
    pub fn assert_eq(&mut self, a: &ModuloCircuitElement, b: &ModuloCircuitElement) {
        let (ca, cb) = (self.materialize(a), self.materialize(b));
        self.segment.assert_eq(ca, cb);
    }

    /// Forces `a == b` in-circuit via the sub-form builtin on the zero cell.
    pub fn sub_and_assert(&mut self, a: &ModuloCircuitElement, b: &ModuloCircuitElement) {
        let (ca, cb) = (self.materialize(a), self.materialize(b));
        self.segment.sub_and_assert(ca, cb, self.zero_cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_mul_sub_round_trip() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let m = mc.modulus().clone();
        let a = mc.write_input(FieldElement::from_u64(7, &m));
        let b = mc.write_input(FieldElement::from_u64(5, &m));
        let sum = mc.add(&a, &b);
        assert_eq!(sum.value, FieldElement::from_u64(12, &m));
        let prod = mc.mul(&a, &b);
        assert_eq!(prod.value, FieldElement::from_u64(35, &m));
        let diff = mc.sub(&a, &b);
        assert_eq!(diff.value, FieldElement::from_u64(2, &m));
    }

    #[test]
    fn neg_matches_sub_from_zero() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let m = mc.modulus().clone();
        let a = mc.write_input(FieldElement::from_u64(9, &m));
        let n = mc.neg(&a);
        assert_eq!(&n.value + &a.value, FieldElement::zero(&m));
    }

    #[test]
    fn inv_rejects_zero() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let zero = mc.zero();
        assert!(matches!(mc.inv(&zero), Err(CircuitError::DivideByZero)));
    }

    #[test]
    fn sparse_write_skips_zero_coefficients() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let m = mc.modulus().clone();
        let coeffs = vec![
            FieldElement::one(&m),
            FieldElement::zero(&m),
            FieldElement::from_u64(3, &m),
        ];
        let before = mc.segment().len();
        let (elements, sparsity) = mc.write_sparse_elements(&coeffs, Provenance::Witness);
        assert_eq!(sparsity, vec![1, 0, 1]);
        assert!(elements[1].is_symbolic());
        assert_eq!(mc.segment().len(), before + 2);
    }
}
