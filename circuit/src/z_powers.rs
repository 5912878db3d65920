use crate::modulo_circuit::ModuloCircuit;
use crate::value::ModuloCircuitElement;

/// Builds `[z, z^2, ..., z^max_degree]` — `z^0` is implicit and handled
/// separately by `eval_poly`/`eval_sparse`.
///
/// In normal mode `z` is written as a native felt and every subsequent power
/// is produced by an in-circuit `mul`, so `finalize_circuit`'s identity
/// check is anchored to the same `z` the transcript committed to. In `mock`
/// mode (used to unit-test the sparse evaluator without a transcript) every
/// power after the first is witnessed directly from its native value
/// instead of multiplied in-circuit; the final identity check never runs in
/// that mode, so there is nothing to anchor.
pub fn create_powers_of_z(
    circuit: &mut ModuloCircuit,
    z: &ModuloCircuitElement,
    max_degree: usize,
    mock: bool,
) -> Vec<ModuloCircuitElement> {
    let mut powers = Vec::with_capacity(max_degree);
    if max_degree == 0 {
        return powers;
    }
    powers.push(z.clone());
    for i in 1..max_degree {
        if mock {
            let value = powers[i - 1].value.clone() * z.value.clone();
            powers.push(circuit.write_witness(value));
        } else {
            let prev = powers[i - 1].clone();
            powers.push(circuit.mul(&prev, z));
        }
    }
    powers
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_field::{CurveId, FieldElement};

    #[test]
    fn powers_match_repeated_multiplication() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(3, &m));
        let powers = create_powers_of_z(&mut mc, &z, 4, false);
        let expected: Vec<u64> = vec![3, 9, 27, 81];
        for (power, exp) in powers.iter().zip(expected) {
            assert_eq!(power.value, FieldElement::from_u64(exp, &m));
        }
    }

    #[test]
    fn mock_mode_matches_non_mock_values() {
        let mut mc = ModuloCircuit::new("test", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(5, &m));
        let powers = create_powers_of_z(&mut mc, &z, 3, true);
        assert_eq!(powers[2].value, FieldElement::from_u64(125, &m));
    }
}
