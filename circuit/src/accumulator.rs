use tower_field::Polynomial;

use crate::error::Result;
use crate::modulo_circuit::ModuloCircuit;
use crate::sparse_eval::eval_sparse;
use crate::value::ModuloCircuitElement;

/// Tagged variant over the three deferred extension-field operations.
/// `SquareTorus` is consumer-only here: nothing in this crate produces it,
/// but the finalizer handles it correctly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccPolyInstructionKind {
    Mul,
    Div,
    SquareTorus,
}

/// One deferred extension-field identity. `ps`, `r` are the dense
/// (sparsity-aware) circuit-element views of the factors/remainder, kept
/// alongside the native `Polynomial` quotient `q` that only the
/// off-circuit aggregation step needs.
pub struct AccumulatePolyInstruction {
    pub kind: AccPolyInstructionKind,
    pub ps: Vec<Vec<ModuloCircuitElement>>,
    pub ps_sparsities: Option<Vec<Vec<u8>>>,
    pub q: Polynomial,
    pub r: Vec<ModuloCircuitElement>,
    pub r_sparsity: Option<Vec<u8>>,
}

/// Per-tower-level running state. `lhs` and `r_evaluated` are built
/// directly out of real circuit gates (`circuit.add`/`circuit.mul`) rather
/// than tracked natively and reified later — there is no value here that
/// the final identity check needs that wasn't already a circuit element
/// the moment it was produced.
pub struct EuclideanPolyAccumulator {
    pub lhs: ModuloCircuitElement,
    pub r: Vec<ModuloCircuitElement>,
    pub r_evaluated: ModuloCircuitElement,
    /// Tracks which `r[k]` positions were ever touched by the RHS pass, so
    /// the final `eval_sparse(acc.R)` can skip the untouched (still zero)
    /// ones instead of treating `acc.R` as fully dense.
    pub r_touched: Vec<bool>,
}

impl EuclideanPolyAccumulator {
    pub fn new(circuit: &mut ModuloCircuit, d: usize) -> Self {
        EuclideanPolyAccumulator {
            lhs: circuit.zero(),
            r: (0..d).map(|_| circuit.zero()).collect(),
            r_evaluated: circuit.zero(),
            r_touched: vec![false; d],
        }
    }

    /// The sparsity tag handed to `eval_sparse` for `acc.R` at finalization.
    pub fn r_sparsity(&self) -> Vec<u8> {
        self.r_touched.iter().map(|&t| if t { 1 } else { 0 }).collect()
    }
}

/// Stable-handle comparison for the "is this the same coefficient sequence"
/// optimizations: two lists match only if every position agrees on its
/// *segment cell*, not on value, and at least one position is actually
/// backed by a cell (otherwise there is nothing to identify).
fn same_handle(a: &[ModuloCircuitElement], b: &[ModuloCircuitElement]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut any_concrete = false;
    for (x, y) in a.iter().zip(b) {
        if x.offset() != y.offset() {
            return false;
        }
        any_concrete |= x.offset().is_some();
    }
    any_concrete
}

/// LHS pass: evaluates every `Pᵢⱼ(z)`, memoizing per-instruction so
/// a squared factor (`Pᵢⱼ == Pᵢ,ⱼ₋₁`) is evaluated once, and folds
/// `cᵢ · Πⱼ Pᵢⱼ(z)` into `acc.lhs`. Returns the memo table for the RHS pass.
pub fn update_lhs_state(
    circuit: &mut ModuloCircuit,
    acc: &mut EuclideanPolyAccumulator,
    instructions: &[AccumulatePolyInstruction],
    coeffs: &[ModuloCircuitElement],
    z_powers: &[ModuloCircuitElement],
) -> Result<Vec<Vec<ModuloCircuitElement>>> {
    let mut pis_of_z = Vec::with_capacity(instructions.len());
    for (i, instr) in instructions.iter().enumerate() {
        let mut evaluated: Vec<ModuloCircuitElement> = Vec::with_capacity(instr.ps.len());
        let mut lhs_i: Option<ModuloCircuitElement> = None;
        for (j, factor) in instr.ps.iter().enumerate() {
            let val = if j > 0 && same_handle(factor, &instr.ps[j - 1]) {
                evaluated[j - 1].clone()
            } else {
                let sparsity = instr.ps_sparsities.as_ref().map(|s| s[j].as_slice());
                eval_sparse(circuit, factor, sparsity, z_powers)?
            };
            lhs_i = Some(match lhs_i {
                None => val.clone(),
                Some(prev) => circuit.mul(&prev, &val),
            });
            evaluated.push(val);
        }
        let lhs_i = lhs_i.expect("AccumulatePolyInstruction::ps always has at least one factor");
        let term = circuit.mul(&coeffs[i], &lhs_i);
        acc.lhs = circuit.add(&acc.lhs, &term);
        pis_of_z.push(evaluated);
    }
    Ok(pis_of_z)
}

fn accumulate_r_coefficients(
    circuit: &mut ModuloCircuit,
    acc: &mut EuclideanPolyAccumulator,
    instr: &AccumulatePolyInstruction,
    c_i: &ModuloCircuitElement,
) {
    for k in 0..acc.r.len() {
        let tag = instr.r_sparsity.as_ref().map(|s| s[k]).unwrap_or(1);
        match tag {
            1 => {
                let term = circuit.mul(c_i, &instr.r[k]);
                acc.r[k] = circuit.add(&acc.r[k], &term);
                acc.r_touched[k] = true;
            }
            2 => {
                acc.r[k] = circuit.add(&acc.r[k], c_i);
                acc.r_touched[k] = true;
            }
            _ => {}
        }
    }
}

/// RHS pass: for `kind != SquareTorus`, checks whether the next
/// instruction's `P₀` is literally this instruction's committed `R` — if
/// so, its evaluation is already memoized and folds into `acc.r_evaluated`
/// instead of being aggregated coefficient-wise. `SquareTorus` never takes
/// this shortcut, always densely accumulating `R`.
pub fn update_rhs_state(
    circuit: &mut ModuloCircuit,
    acc: &mut EuclideanPolyAccumulator,
    instructions: &[AccumulatePolyInstruction],
    coeffs: &[ModuloCircuitElement],
    pis_of_z: &[Vec<ModuloCircuitElement>],
) {
    for (i, instr) in instructions.iter().enumerate() {
        if instr.kind == AccPolyInstructionKind::SquareTorus {
            accumulate_r_coefficients(circuit, acc, instr, &coeffs[i]);
            continue;
        }
        let reuse = match instructions.get(i + 1) {
            Some(next) => same_handle(&next.ps[0], &instr.r),
            None => false,
        };
        if reuse {
            let next_p0_z = pis_of_z[i + 1][0].clone();
            let term = circuit.mul(&coeffs[i], &next_p0_z);
            acc.r_evaluated = circuit.add(&acc.r_evaluated, &term);
        } else {
            accumulate_r_coefficients(circuit, acc, instr, &coeffs[i]);
        }
    }
}
