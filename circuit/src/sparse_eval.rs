use crate::error::{CircuitError, Result};
use crate::modulo_circuit::ModuloCircuit;
use crate::value::ModuloCircuitElement;

fn check_degree(len: usize, powers: &[ModuloCircuitElement]) -> Result<()> {
    if len > 0 && len - 1 > powers.len() {
        return Err(CircuitError::DegreeOverflow {
            degree: len - 1,
            available: powers.len(),
        });
    }
    Ok(())
}

/// Dense evaluation: `Σᵢ coeffs[i] · (i == 0 ? 1 : powers[i-1])`.
/// `powers` is `[z, z^2, ..., z^max_degree]` (see `z_powers`).
pub fn eval_poly(
    circuit: &mut ModuloCircuit,
    coeffs: &[ModuloCircuitElement],
    powers: &[ModuloCircuitElement],
) -> Result<ModuloCircuitElement> {
    check_degree(coeffs.len(), powers)?;
    let mut acc = circuit.zero();
    for (i, c) in coeffs.iter().enumerate() {
        let term = if i == 0 {
            c.clone()
        } else {
            circuit.mul(c, &powers[i - 1])
        };
        acc = circuit.add(&acc, &term);
    }
    Ok(acc)
}

fn check_sparsity_tag(value: &ModuloCircuitElement, tag: u8, index: usize) -> Result<()> {
    match tag {
        0 => {
            if !value.value.is_zero() {
                return Err(CircuitError::SparsityViolation {
                    index,
                    expected_zero: true,
                });
            }
        }
        2 => {
            if !value.value.is_one() {
                return Err(CircuitError::SparsityViolation {
                    index,
                    expected_zero: false,
                });
            }
        }
        1 => {}
        _ => return Err(CircuitError::UnknownInstruction),
    }
    Ok(())
}

/// `eval_sparse(X, sparsity)`. `0` = skip, `1` = generic coefficient, `2` =
/// coefficient known to be one (the term contributes a bare power of `z`,
/// no multiplication needed). `sparsity = None` delegates to dense
/// `eval_poly`.
pub fn eval_sparse(
    circuit: &mut ModuloCircuit,
    x: &[ModuloCircuitElement],
    sparsity: Option<&[u8]>,
    powers: &[ModuloCircuitElement],
) -> Result<ModuloCircuitElement> {
    let sparsity = match sparsity {
        Some(s) => s,
        None => return eval_poly(circuit, x, powers),
    };
    if sparsity.len() != x.len() {
        return Err(CircuitError::ShapeMismatch {
            context: "eval_sparse sparsity vector",
            expected: x.len(),
            found: sparsity.len(),
        });
    }
    check_degree(x.len(), powers)?;
    for (i, (xi, &tag)) in x.iter().zip(sparsity.iter()).enumerate() {
        check_sparsity_tag(xi, tag, i)?;
    }

    let k = match sparsity.iter().position(|&s| s != 0) {
        Some(k) => k,
        None => return Ok(circuit.zero()),
    };

    let mut acc = if k == 0 {
        x[k].clone()
    } else if sparsity[k] == 2 {
        powers[k - 1].clone()
    } else {
        circuit.mul(&x[k], &powers[k - 1])
    };

    for i in (k + 1)..x.len() {
        match sparsity[i] {
            0 => continue,
            1 => {
                let term = circuit.mul(&x[i], &powers[i - 1]);
                acc = circuit.add(&acc, &term);
            }
            2 => acc = circuit.add(&acc, &powers[i - 1]),
            _ => return Err(CircuitError::UnknownInstruction),
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::z_powers::create_powers_of_z;
    use tower_field::{CurveId, FieldElement};

    /// S1: six INPUT ones evaluated densely at `z=2`.
    #[test]
    fn dense_eval_of_six_ones() {
        let mut mc = ModuloCircuit::new("s1", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(2, &m));
        let powers = create_powers_of_z(&mut mc, &z, 5, true);
        let ones: Vec<_> = (0..6)
            .map(|_| mc.write_input(FieldElement::one(&m)))
            .collect();
        let result = eval_poly(&mut mc, &ones, &powers).unwrap();
        assert_eq!(result.value, FieldElement::from_u64(63, &m));
    }

    /// S2: `[1, 0, 1]` with `sparsity = [1, 0, 1]` evaluates to `1 + 4 = 5`,
    /// with the zero term skipped (exactly one ADD emitted).
    #[test]
    fn sparse_eval_skips_zero_term() {
        let mut mc = ModuloCircuit::new("s2", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(2, &m));
        let powers = create_powers_of_z(&mut mc, &z, 2, true);
        let x = vec![
            mc.write_input(FieldElement::one(&m)),
            ModuloCircuitElement::symbolic(FieldElement::zero(&m)),
            mc.write_input(FieldElement::one(&m)),
        ];
        let adds_before = mc.segment().add_offsets().len();
        let result = eval_sparse(&mut mc, &x, Some(&[1, 0, 1]), &powers).unwrap();
        assert_eq!(result.value, FieldElement::from_u64(5, &m));
        assert_eq!(mc.segment().add_offsets().len() - adds_before, 1);
    }

    #[test]
    fn sparsity_tag_two_skips_multiplication() {
        let mut mc = ModuloCircuit::new("tag2", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(3, &m));
        let powers = create_powers_of_z(&mut mc, &z, 1, true);
        let x = vec![
            ModuloCircuitElement::symbolic(FieldElement::zero(&m)),
            ModuloCircuitElement::symbolic(FieldElement::one(&m)),
        ];
        let result = eval_sparse(&mut mc, &x, Some(&[0, 2]), &powers).unwrap();
        assert_eq!(result.value, FieldElement::from_u64(3, &m));
    }

    #[test]
    fn sparsity_violation_is_rejected() {
        let mut mc = ModuloCircuit::new("violation", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(2, &m));
        let powers = create_powers_of_z(&mut mc, &z, 1, true);
        let x = vec![mc.write_input(FieldElement::from_u64(9, &m))];
        let err = eval_sparse(&mut mc, &x, Some(&[0]), &powers).unwrap_err();
        assert!(matches!(err, CircuitError::SparsityViolation { .. }));
    }

    #[test]
    fn round_trips_with_natural_sparsity() {
        let mut mc = ModuloCircuit::new("roundtrip", CurveId::Bn254);
        let m = mc.modulus().clone();
        let z = mc.write_witness(FieldElement::from_u64(7, &m));
        let powers = create_powers_of_z(&mut mc, &z, 3, true);
        let values = vec![
            FieldElement::from_u64(4, &m),
            FieldElement::zero(&m),
            FieldElement::from_u64(2, &m),
            FieldElement::zero(&m),
        ];
        let sparsity: Vec<u8> = values.iter().map(|v| if v.is_zero() { 0 } else { 1 }).collect();
        let x: Vec<_> = values
            .iter()
            .cloned()
            .map(|v| {
                if v.is_zero() {
                    ModuloCircuitElement::symbolic(v)
                } else {
                    mc.write_input(v)
                }
            })
            .collect();
        let dense = eval_poly(&mut mc, &x, &powers).unwrap();
        let sparse = eval_sparse(&mut mc, &x, Some(&sparsity), &powers).unwrap();
        assert_eq!(dense.value, sparse.value);
    }
}
