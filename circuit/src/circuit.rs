use tower_field::{CurveId, FieldElement, Polynomial};

use crate::accumulator::{
    update_lhs_state, update_rhs_state, AccPolyInstructionKind, AccumulatePolyInstruction,
    EuclideanPolyAccumulator,
};
use crate::config::TowerCircuitConfig;
use crate::error::{CircuitError, Result};
use crate::modulo_circuit::ModuloCircuit;
use crate::segment::Provenance;
use crate::sparse_eval::{eval_poly, eval_sparse};
use crate::transcript::{PoseidonTranscript, ReferencePoseidonPermutation};
use crate::value::ModuloCircuitElement;
use crate::z_powers::create_powers_of_z;

/// Budget-tracking counters, including `EXTF_MUL_DENSE`/`EXTF_SQUARE` for
/// the extension-field multiplication layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpsCounter {
    pub mulmod: usize,
    pub addmod: usize,
    pub assert_eq: usize,
    pub poseidon: usize,
    pub rlc: usize,
    pub extf_mul_dense: usize,
    pub extf_square: usize,
}

/// Summary returned by `finalize_circuit`: the op counters plus the
/// per-level evaluation point, useful for tests and example drivers without
/// reaching back into the circuit's internals.
#[derive(Debug, Clone)]
pub struct FinalizationReport {
    pub counters: OpsCounter,
    pub z_per_level: Vec<FieldElement>,
    pub permutations_count: usize,
}

/// Top-level circuit object. Owns the value segment
/// (via `ModuloCircuit`), the transcript, the two deferred-instruction
/// buffers (tower level 1 and the optional double-extension level 2), and
/// the running op counters.
pub struct Circuit {
    name: String,
    curve_id: CurveId,
    extension_degree: usize,
    hash_input: bool,
    modulo_circuit: ModuloCircuit,
    transcript: PoseidonTranscript<ReferencePoseidonPermutation>,
    instructions: [Vec<AccumulatePolyInstruction>; 2],
    z_powers: Vec<ModuloCircuitElement>,
    finalized: bool,
    extf_mul_dense: usize,
    extf_square: usize,
}

impl Circuit {
    pub fn new(name: impl Into<String>, curve_id: CurveId, extension_degree: usize, hash_input: bool) -> Self {
        Circuit {
            name: name.into(),
            curve_id,
            extension_degree,
            hash_input,
            modulo_circuit: ModuloCircuit::new("modulo_circuit", curve_id),
            transcript: PoseidonTranscript::new(curve_id),
            instructions: [Vec::new(), Vec::new()],
            z_powers: Vec::new(),
            finalized: false,
            extf_mul_dense: 0,
            extf_square: 0,
        }
    }

    /// Builds a `Circuit` from a `TowerCircuitConfig`, the canonical entry
    /// point for callers that don't need to set fields individually.
    pub fn from_config(name: impl Into<String>, config: &TowerCircuitConfig) -> Self {
        Circuit::new(name, config.curve_id, config.extension_degree, config.hash_input)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curve_id(&self) -> CurveId {
        self.curve_id
    }

    pub fn extension_degree(&self) -> usize {
        self.extension_degree
    }

    pub fn modulo_circuit(&self) -> &ModuloCircuit {
        &self.modulo_circuit
    }

    pub(crate) fn modulo_circuit_mut(&mut self) -> &mut ModuloCircuit {
        &mut self.modulo_circuit
    }

    pub(crate) fn instructions_mut(&mut self, acc_index: usize) -> &mut Vec<AccumulatePolyInstruction> {
        &mut self.instructions[acc_index]
    }

    pub(crate) fn note_extf_mul_dense(&mut self) {
        self.extf_mul_dense += 1;
    }

    pub(crate) fn note_extf_square(&mut self) {
        self.extf_square += 1;
    }

    pub fn write_input(&mut self, value: FieldElement) -> ModuloCircuitElement {
        self.modulo_circuit.write_input(value)
    }

    pub fn write_witness(&mut self, value: FieldElement) -> ModuloCircuitElement {
        self.modulo_circuit.write_witness(value)
    }

    pub fn write_constant(&mut self, value: FieldElement) -> ModuloCircuitElement {
        self.modulo_circuit.write_constant(value)
    }

    pub fn z_powers(&self) -> &[ModuloCircuitElement] {
        &self.z_powers
    }

    fn counters(&self) -> OpsCounter {
        let (addmod, mulmod, assert_eq) = self.modulo_circuit.segment().summarize();
        OpsCounter {
            mulmod,
            addmod,
            assert_eq,
            poseidon: self.transcript.permutations_count(),
            rlc: self.transcript.rlc_ptr_indexes().len(),
            extf_mul_dense: self.extf_mul_dense,
            extf_square: self.extf_square,
        }
    }

    pub fn summarize(&self) -> OpsCounter {
        self.counters()
    }

    /// Runs the finalization protocol. Must be called exactly once; the
    /// value segment is treated as immutable afterwards (no further
    /// writers are exposed once this returns).
    /// Convenience wrapper over `finalize_circuit` that reads `mock` off a
    /// `TowerCircuitConfig` instead of taking it as a bare bool.
    pub fn finalize(&mut self, config: &TowerCircuitConfig) -> Result<FinalizationReport> {
        self.finalize_circuit(config.mock)
    }

    pub fn finalize_circuit(&mut self, mock: bool) -> Result<FinalizationReport> {
        debug_assert!(!self.finalized, "finalize_circuit must run exactly once");
        self.finalized = true;

        let d = self.extension_degree;

        // Step 1 — absorb inputs.
        if self.hash_input {
            let inputs = self.modulo_circuit.segment().values_with_provenance(Provenance::Input);
            self.transcript.hash_limbs_multi(&inputs, None)?;
        }

        let double_extension = !self.instructions[1].is_empty();
        let active_levels: Vec<usize> = if double_extension { vec![0, 1] } else { vec![0] };

        // Step 2 — derive RLC coefficients, absorbing each instruction's
        // committed values before drawing its coefficient.
        let mut coeffs: [Vec<ModuloCircuitElement>; 2] = [Vec::new(), Vec::new()];
        for &level in &active_levels {
            for i in 0..self.instructions[level].len() {
                let instr = &self.instructions[level][i];
                match instr.kind {
                    AccPolyInstructionKind::Mul => {
                        let values: Vec<FieldElement> = instr.r.iter().map(|e| e.value.clone()).collect();
                        self.transcript.hash_limbs_multi(&values, instr.r_sparsity.as_deref())?;
                    }
                    AccPolyInstructionKind::SquareTorus => {
                        let values: Vec<FieldElement> = instr.r.iter().map(|e| e.value.clone()).collect();
                        self.transcript.hash_limbs_multi(&values, None)?;
                    }
                    AccPolyInstructionKind::Div => {
                        let p0: Vec<FieldElement> = instr.ps[0].iter().map(|e| e.value.clone()).collect();
                        self.transcript.hash_limbs_multi(&p0, None)?;
                    }
                }
                let c = self.transcript.rlc_coeff();
                let c_cell = self.modulo_circuit.write_cairo_native_felt(c);
                coeffs[level].push(c_cell);
            }
        }

        // Step 3 — aggregate Q off-circuit per active level.
        let mut q_levels: Vec<Polynomial> = Vec::new();
        for &level in &active_levels {
            let target_len = (level + 1) * d - 1;
            let mut acc_q = Polynomial::zero(target_len, self.modulo_circuit.modulus());
            for (instr, c) in self.instructions[level].iter().zip(&coeffs[level]) {
                acc_q = acc_q.add(&instr.q.scalar_mul(&c.value));
            }
            q_levels.push(Polynomial::new(acc_q.coeffs_padded(target_len)));
        }

        // Step 4 — absorb Q, unless mock.
        if !mock {
            for q in &q_levels {
                self.transcript.hash_limbs_multi(q.coeffs(), None)?;
            }
        }

        // Step 5 — evaluation point.
        let z_value = self.transcript.continuable_hash();
        let z = self.modulo_circuit.write_cairo_native_felt(z_value.clone());

        // Step 6 — commit Q in-circuit.
        let q_elements: Vec<Vec<ModuloCircuitElement>> = q_levels
            .iter()
            .map(|q| self.modulo_circuit.write_elements(q.coeffs(), Provenance::Commit))
            .collect();

        // Step 7 — z powers, up to max(|Q_0|, |Q_1|) - 1, floored at d (2d
        // if double extension) so Phi's degree is always reachable.
        let max_len = q_levels.iter().map(|q| q.coeffs().len()).max().unwrap_or(0);
        let floor = if double_extension { 2 * d } else { d };
        let max_degree = max_len.saturating_sub(1).max(floor);
        self.z_powers = create_powers_of_z(&mut self.modulo_circuit, &z, max_degree, mock);

        // Step 8 — replay each instruction at z, per active level.
        let mut accs: Vec<EuclideanPolyAccumulator> = Vec::new();
        for &level in &active_levels {
            let mut acc = EuclideanPolyAccumulator::new(&mut self.modulo_circuit, (level + 1) * d);
            let pis = update_lhs_state(
                &mut self.modulo_circuit,
                &mut acc,
                &self.instructions[level],
                &coeffs[level],
                &self.z_powers,
            )?;
            update_rhs_state(
                &mut self.modulo_circuit,
                &mut acc,
                &self.instructions[level],
                &coeffs[level],
                &pis,
            );
            accs.push(acc);
        }

        // Step 9 — final identity, unless mock.
        let mut z_per_level = Vec::with_capacity(active_levels.len());
        for (idx, &level) in active_levels.iter().enumerate() {
            z_per_level.push(z_value.clone());
            if mock {
                continue;
            }
            let q_z = eval_poly(&mut self.modulo_circuit, &q_elements[idx], &self.z_powers)?;
            let phi_degree = (level + 1) * d;
            let phi = tower_field::get_irreducible_poly(self.curve_id, phi_degree);
            let (phi_elements, phi_sparsity) =
                self.modulo_circuit.write_sparse_elements(phi.coeffs(), Provenance::Constant);
            let p_z = eval_sparse(&mut self.modulo_circuit, &phi_elements, Some(&phi_sparsity), &self.z_powers)?;
            let r_sparsity = accs[idx].r_sparsity();
            let r_z = eval_sparse(&mut self.modulo_circuit, &accs[idx].r, Some(&r_sparsity), &self.z_powers)?;
            let q_p = self.modulo_circuit.mul(&q_z, &p_z);
            let qp_r = self.modulo_circuit.add(&q_p, &r_z);
            let rhs = self.modulo_circuit.add(&qp_r, &accs[idx].r_evaluated);
            if accs[idx].lhs.value != rhs.value {
                return Err(CircuitError::IdentityFailure { level });
            }
            self.modulo_circuit.sub_and_assert(&accs[idx].lhs, &rhs);
        }

        Ok(FinalizationReport {
            counters: self.counters(),
            z_per_level,
            permutations_count: self.transcript.permutations_count(),
        })
    }
}
