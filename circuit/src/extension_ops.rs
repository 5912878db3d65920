use tower_field::FieldElement;

use crate::accumulator::{AccPolyInstructionKind, AccumulatePolyInstruction};
use crate::circuit::Circuit;
use crate::error::{CircuitError, Result};
use crate::modulo_circuit::ModuloCircuit;
use crate::segment::Provenance;
use crate::value::ModuloCircuitElement;

fn require_equal_len(a: usize, b: usize, context: &'static str) -> Result<()> {
    if a != b {
        return Err(CircuitError::ShapeMismatch {
            context,
            expected: a,
            found: b,
        });
    }
    Ok(())
}

/// Coefficient-wise add; no deferral, no accumulator involvement.
pub fn extf_add(
    circuit: &mut Circuit,
    a: &[ModuloCircuitElement],
    b: &[ModuloCircuitElement],
) -> Result<Vec<ModuloCircuitElement>> {
    require_equal_len(a.len(), b.len(), "extf_add operand degree")?;
    let mc = circuit.modulo_circuit_mut();
    Ok(a.iter().zip(b).map(|(x, y)| mc.add(x, y)).collect())
}

pub fn extf_sub(
    circuit: &mut Circuit,
    a: &[ModuloCircuitElement],
    b: &[ModuloCircuitElement],
) -> Result<Vec<ModuloCircuitElement>> {
    require_equal_len(a.len(), b.len(), "extf_sub operand degree")?;
    let mc = circuit.modulo_circuit_mut();
    Ok(a.iter().zip(b).map(|(x, y)| mc.sub(x, y)).collect())
}

pub fn extf_neg(circuit: &mut Circuit, a: &[ModuloCircuitElement]) -> Vec<ModuloCircuitElement> {
    let mc = circuit.modulo_circuit_mut();
    a.iter().map(|x| mc.neg(x)).collect()
}

pub fn extf_scalar_mul(
    circuit: &mut Circuit,
    a: &[ModuloCircuitElement],
    scalar: &ModuloCircuitElement,
) -> Vec<ModuloCircuitElement> {
    let mc = circuit.modulo_circuit_mut();
    a.iter().map(|x| mc.mul(x, scalar)).collect()
}

/// Writes `R` respecting `r_sparsity`: a `0` entry is never committed
/// (stays symbolic), a `2` entry is materialized as the constant `1`
/// rather than a fresh COMMIT cell, and everything else is committed as a
/// genuine off-circuit hint result.
fn write_commit_with_sparsity(
    mc: &mut ModuloCircuit,
    values: &[FieldElement],
    sparsity: Option<&[u8]>,
) -> Result<Vec<ModuloCircuitElement>> {
    match sparsity {
        None => Ok(mc.write_elements(values, Provenance::Commit)),
        Some(tags) => {
            require_equal_len(values.len(), tags.len(), "r_sparsity length")?;
            values
                .iter()
                .zip(tags)
                .enumerate()
                .map(|(i, (v, &tag))| match tag {
                    0 => {
                        if !v.is_zero() {
                            return Err(CircuitError::SparsityViolation {
                                index: i,
                                expected_zero: true,
                            });
                        }
                        Ok(ModuloCircuitElement::symbolic(v.clone()))
                    }
                    2 => {
                        if !v.is_one() {
                            return Err(CircuitError::SparsityViolation {
                                index: i,
                                expected_zero: false,
                            });
                        }
                        Ok(mc.write_constant(v.clone()))
                    }
                    _ => Ok(mc.write_commit(v.clone())),
                })
                .collect()
        }
    }
}

fn values_of(elements: &[ModuloCircuitElement]) -> Vec<FieldElement> {
    elements.iter().map(|e| e.value.clone()).collect()
}

/// `extf_mul(Ps, d, ...)`. Requires `d > 2` — degree-2 extensions are
/// squared directly elsewhere and never defer through the accumulator.
pub fn extf_mul(
    circuit: &mut Circuit,
    ps: &[Vec<ModuloCircuitElement>],
    d: usize,
    ps_sparsities: Option<Vec<Vec<u8>>>,
    r_sparsity: Option<Vec<u8>>,
    acc_index: usize,
) -> Result<Vec<ModuloCircuitElement>> {
    if d <= 2 {
        return Err(CircuitError::ShapeMismatch {
            context: "extf_mul requires an extension degree greater than 2",
            expected: 3,
            found: d,
        });
    }
    for p in ps {
        require_equal_len(d, p.len(), "extf_mul factor degree")?;
    }

    let curve_id = circuit.curve_id();
    let native_ps: Vec<Vec<FieldElement>> = ps.iter().map(|p| values_of(p)).collect();
    let (q, r_values) = tower_field::nondeterministic_extf_mul_divmod(&native_ps, curve_id, d);

    let squared = ps.windows(2).any(|pair| {
        pair[0].len() == pair[1].len()
            && pair[0]
                .iter()
                .zip(&pair[1])
                .all(|(a, b)| a.offset() == b.offset() && a.offset().is_some())
    });

    let mc = circuit.modulo_circuit_mut();
    let r_elements = write_commit_with_sparsity(mc, &r_values, r_sparsity.as_deref())?;

    let is_dense = ps_sparsities.is_none() || r_sparsity.is_none();

    circuit.instructions_mut(acc_index).push(AccumulatePolyInstruction {
        kind: AccPolyInstructionKind::Mul,
        ps: ps.to_vec(),
        ps_sparsities,
        q,
        r: r_elements.clone(),
        r_sparsity,
    });
    if is_dense {
        circuit.note_extf_mul_dense();
    }
    if squared {
        circuit.note_extf_square();
    }
    Ok(r_elements)
}

fn extf_div_impl(
    circuit: &mut Circuit,
    x: &[ModuloCircuitElement],
    y: &[ModuloCircuitElement],
    d: usize,
    acc_index: usize,
    r_sparsity: Option<Vec<u8>>,
) -> Result<Vec<ModuloCircuitElement>> {
    require_equal_len(d, x.len(), "extf_div numerator degree")?;
    require_equal_len(d, y.len(), "extf_div denominator degree")?;

    let curve_id = circuit.curve_id();
    let x_values = values_of(x);
    let y_values = values_of(y);
    let w_values = tower_field::nondeterministic_extf_div(&x_values, &y_values, curve_id, d)
        .ok_or(CircuitError::DivideByZero)?;

    let mc = circuit.modulo_circuit_mut();
    let w_elements = mc.write_elements(&w_values, Provenance::Commit);

    let (q, _) = tower_field::nondeterministic_extf_mul_divmod(&[w_values, y_values], curve_id, d);

    circuit.instructions_mut(acc_index).push(AccumulatePolyInstruction {
        kind: AccPolyInstructionKind::Div,
        ps: vec![w_elements.clone(), y.to_vec()],
        ps_sparsities: None,
        q,
        r: x.to_vec(),
        r_sparsity,
    });
    Ok(w_elements)
}

/// `extf_div(X, Y, d, acc_index)`: proves `W·Y ≡ X (mod Φ_d)` at the
/// finalization point, returning the committed `W = X/Y`.
pub fn extf_div(
    circuit: &mut Circuit,
    x: &[ModuloCircuitElement],
    y: &[ModuloCircuitElement],
    d: usize,
    acc_index: usize,
) -> Result<Vec<ModuloCircuitElement>> {
    extf_div_impl(circuit, x, y, d, acc_index, None)
}

/// `extf_inv(Y, d, acc_index)`: same as `extf_div` with `X = (1, 0, ..., 0)`
/// supplied symbolically — no cell is written for the implicit numerator,
/// since its sparsity tag already pins its value.
pub fn extf_inv(
    circuit: &mut Circuit,
    y: &[ModuloCircuitElement],
    d: usize,
    acc_index: usize,
) -> Result<Vec<ModuloCircuitElement>> {
    let modulus = circuit.modulo_circuit().modulus().clone();
    let mut x = Vec::with_capacity(d);
    x.push(ModuloCircuitElement::symbolic(FieldElement::one(&modulus)));
    for _ in 1..d {
        x.push(ModuloCircuitElement::symbolic(FieldElement::zero(&modulus)));
    }
    let mut r_sparsity = vec![0u8; d];
    r_sparsity[0] = 2;
    extf_div_impl(circuit, &x, y, d, acc_index, Some(r_sparsity))
}
