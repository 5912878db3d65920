//! Deferred-multiplication extension-field circuit builder.
//!
//! Client code writes inputs, calls `extf_mul`/`extf_div`/`extf_inv`
//! repeatedly (each appends one record to an `EuclideanPolyAccumulator`
//! instead of proving the identity immediately), then calls
//! `Circuit::finalize_circuit` exactly once to compress every deferred
//! identity into a single Schwartz-Zippel check at a Fiat-Shamir-sampled
//! point `z`.

mod accumulator;
mod circuit;
mod config;
mod error;
mod extension_ops;
mod modulo_circuit;
mod segment;
mod sparse_eval;
mod transcript;
mod value;
mod z_powers;

pub use accumulator::{AccPolyInstructionKind, AccumulatePolyInstruction, EuclideanPolyAccumulator};
pub use circuit::{Circuit, FinalizationReport, OpsCounter};
pub use config::TowerCircuitConfig;
pub use error::{CircuitError, Result};
pub use extension_ops::{extf_add, extf_div, extf_inv, extf_mul, extf_neg, extf_scalar_mul, extf_sub};
pub use modulo_circuit::ModuloCircuit;
pub use segment::{BuiltinInstruction, BuiltinOp, Cell, CircuitValue, Provenance, ValueSegment};
pub use sparse_eval::{eval_poly, eval_sparse};
pub use transcript::{PoseidonPermutation, PoseidonTranscript, ReferencePoseidonPermutation};
pub use value::ModuloCircuitElement;
pub use z_powers::create_powers_of_z;

#[cfg(test)]
mod end_to_end_tests {
    use super::*;
    use tower_field::{CurveId, FieldElement};

    /// S5: `R0 = extf_mul(A,B); R1 = extf_mul(R0,C)` — finalization must
    /// fold `R0`'s evaluation into `R_evaluated` rather than also
    /// aggregating it coefficient-wise.
    #[test]
    fn chained_extf_mul_uses_r_evaluated_shortcut() {
        let mut circuit = Circuit::new("s5", CurveId::Bn254, 6, true);
        let m = circuit.modulo_circuit().modulus().clone();
        let a: Vec<_> = (1..=6u64).map(|v| FieldElement::from_u64(v, &m)).collect();
        let b: Vec<_> = (1..=6u64).map(|v| FieldElement::from_u64(v + 1, &m)).collect();
        let c: Vec<_> = (1..=6u64).map(|v| FieldElement::from_u64(v + 2, &m)).collect();
        let a = a
            .into_iter()
            .map(|v| circuit.write_input(v))
            .collect::<Vec<_>>();
        let b = b
            .into_iter()
            .map(|v| circuit.write_input(v))
            .collect::<Vec<_>>();
        let c = c
            .into_iter()
            .map(|v| circuit.write_input(v))
            .collect::<Vec<_>>();

        let r0 = extf_mul(&mut circuit, &[a, b], 6, None, None, 0).unwrap();
        extf_mul(&mut circuit, &[r0, c], 6, None, None, 0).unwrap();

        let report = circuit.finalize_circuit(false).unwrap();
        assert_eq!(report.counters.extf_mul_dense, 2);
    }

    /// S6: corrupting a committed `R` limb must make finalization fail
    /// with `IdentityFailure` instead of silently succeeding.
    #[test]
    fn corrupted_commitment_fails_finalization() {
        let mut circuit = Circuit::new("s6", CurveId::Bn254, 6, true);
        let m = circuit.modulo_circuit().modulus().clone();
        let a: Vec<_> = (1..=6u64)
            .map(|v| circuit.write_input(FieldElement::from_u64(v, &m)))
            .collect();
        let b: Vec<_> = (1..=6u64)
            .map(|v| circuit.write_input(FieldElement::from_u64(v * 3, &m)))
            .collect();
        extf_mul(&mut circuit, &[a, b], 6, None, None, 0).unwrap();

        // Corrupt the committed R cell itself, not just its cached struct
        // value — every downstream `circuit.mul`/`circuit.add` re-reads the
        // segment by cell offset, so this is the only way to simulate a
        // faulty hint that the replay during finalization actually observes.
        let corrupt_offset = circuit.instructions_mut(0)[0].r[0].cell();
        circuit
            .modulo_circuit_mut()
            .segment_mut()
            .corrupt_for_test(corrupt_offset, FieldElement::from_u64(999, &m));

        let err = circuit.finalize_circuit(false).unwrap_err();
        assert!(matches!(err, CircuitError::IdentityFailure { .. }));
    }
}
