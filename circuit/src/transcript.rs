use std::rc::Rc;

use num_bigint::BigUint;
use tower_field::{CurveId, FieldElement, LIMB_BITS, N_LIMBS};

use crate::error::{CircuitError, Result};

/// The absorbing/squeezing interface a duplex-sponge permutation must
/// provide. The transcript only ever touches a permutation through this
/// contract, so swapping in a production Poseidon instance is a matter of
/// implementing this trait. `ReferencePoseidonPermutation` below is a
/// deterministic stand-in, not a cryptographic one.
pub trait PoseidonPermutation {
    const WIDTH: usize;
    const RATE: usize;

    fn new(modulus: &Rc<BigUint>) -> Self;
    fn set_elt(&mut self, value: FieldElement, index: usize);
    fn get_elt(&self, index: usize) -> FieldElement;
    fn permute(&mut self);
}

/// Deterministic placeholder permutation: a handful of cube-Sbox rounds with
/// a fixed linear mix. Reproducible across runs, but makes no security
/// claim — this crate's contract with Poseidon is limited to the absorbing
/// interface above.
#[derive(Clone)]
pub struct ReferencePoseidonPermutation {
    state: [FieldElement; 3],
}

const REFERENCE_ROUNDS: usize = 8;

impl PoseidonPermutation for ReferencePoseidonPermutation {
    const WIDTH: usize = 3;
    const RATE: usize = 2;

    fn new(modulus: &Rc<BigUint>) -> Self {
        ReferencePoseidonPermutation {
            state: [
                FieldElement::zero(modulus),
                FieldElement::zero(modulus),
                FieldElement::zero(modulus),
            ],
        }
    }

    fn set_elt(&mut self, value: FieldElement, index: usize) {
        self.state[index] = value;
    }

    fn get_elt(&self, index: usize) -> FieldElement {
        self.state[index].clone()
    }

    fn permute(&mut self) {
        let modulus = self.state[0].modulus().clone();
        for round in 0..REFERENCE_ROUNDS {
            for i in 0..3 {
                let rc = FieldElement::from_u64((round * 3 + i) as u64 + 1, &modulus);
                let x = &self.state[i] + &rc;
                self.state[i] = &(&x * &x) * &x;
            }
            let (s0, s1, s2) = (
                self.state[0].clone(),
                self.state[1].clone(),
                self.state[2].clone(),
            );
            self.state[0] = &(&s0 + &s1) + &s2;
            self.state[1] = &s0 + &s1;
            self.state[2] = &s1 + &s2;
        }
    }
}

/// Fiat-Shamir transcript: an `input_buffer` of not-yet-absorbed elements,
/// an `output_buffer` of squeezed-but-not-yet-consumed elements, and a
/// permutation-round counter for the summary statistics.
pub struct PoseidonTranscript<P: PoseidonPermutation> {
    modulus: Rc<BigUint>,
    sponge_state: P,
    input_buffer: Vec<FieldElement>,
    output_buffer: Vec<FieldElement>,
    permutations_count: usize,
    next_output_index: usize,
    rlc_ptr_indexes: Vec<usize>,
}

impl<P: PoseidonPermutation> PoseidonTranscript<P> {
    pub fn new(curve_id: CurveId) -> Self {
        let modulus = tower_field::field(curve_id);
        PoseidonTranscript {
            sponge_state: P::new(&modulus),
            modulus,
            input_buffer: Vec::new(),
            output_buffer: Vec::new(),
            permutations_count: 0,
            next_output_index: 0,
            rlc_ptr_indexes: Vec::new(),
        }
    }

    pub fn observe_element(&mut self, value: FieldElement) {
        self.output_buffer.clear();
        self.input_buffer.push(value);
    }

    /// Runs the permutation over the buffered inputs in `RATE`-sized
    /// blocks, refreshing `output_buffer` from the final state.
    fn absorb_buffered_inputs(&mut self) {
        while !self.input_buffer.is_empty() {
            let take = self.input_buffer.len().min(P::RATE);
            for (i, v) in self.input_buffer.drain(0..take).enumerate() {
                self.sponge_state.set_elt(v, i);
            }
            self.sponge_state.permute();
            self.permutations_count += 1;
        }
        self.output_buffer = (0..P::RATE).map(|i| self.sponge_state.get_elt(i)).collect();
    }

    fn ensure_output_available(&mut self) {
        if self.output_buffer.is_empty() {
            self.absorb_buffered_inputs();
        }
    }

    /// Absorbs each value's `N_LIMBS`-limb decomposition in order, skipping
    /// positions where `sparsity[i] == 0`. Flushes the sponge immediately so
    /// a fresh `continuable_hash`/`rlc_coeff` is ready right after the call
    /// returns.
    pub fn hash_limbs_multi(&mut self, values: &[FieldElement], sparsity: Option<&[u8]>) -> Result<()> {
        if let Some(s) = sparsity {
            if s.len() != values.len() {
                return Err(CircuitError::ShapeMismatch {
                    context: "hash_limbs_multi sparsity vector",
                    expected: values.len(),
                    found: s.len(),
                });
            }
        }
        for (i, value) in values.iter().enumerate() {
            if let Some(s) = sparsity {
                if s[i] == 0 {
                    continue;
                }
            }
            for limb in value.to_limbs(N_LIMBS, LIMB_BITS) {
                self.observe_element(FieldElement::from_u64(limb, &self.modulus));
            }
        }
        self.absorb_buffered_inputs();
        Ok(())
    }

    /// Current squeezed digest, reduced into `F_p`. Does not consume it —
    /// repeated calls with no intervening absorption return the same value.
    pub fn continuable_hash(&mut self) -> FieldElement {
        self.ensure_output_available();
        self.output_buffer
            .last()
            .cloned()
            .expect("ensure_output_available guarantees a nonempty buffer")
    }

    /// A fresh RLC scalar: pops one squeezed element, re-permuting if the
    /// output buffer is exhausted, and records the global output index it
    /// was drawn from.
    pub fn rlc_coeff(&mut self) -> FieldElement {
        self.ensure_output_available();
        self.rlc_ptr_indexes.push(self.next_output_index);
        self.next_output_index += 1;
        self.output_buffer
            .pop()
            .expect("ensure_output_available guarantees a nonempty buffer")
    }

    pub fn permutations_count(&self) -> usize {
        self.permutations_count
    }

    pub fn rlc_ptr_indexes(&self) -> &[usize] {
        &self.rlc_ptr_indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> PoseidonTranscript<ReferencePoseidonPermutation> {
        PoseidonTranscript::new(CurveId::Bn254)
    }

    #[test]
    fn determinism_across_independent_runs() {
        let m = tower_field::field(CurveId::Bn254);
        let mut a = transcript();
        let mut b = transcript();
        for t in [&mut a, &mut b] {
            t.hash_limbs_multi(&[FieldElement::from_u64(7, &m)], None).unwrap();
        }
        assert_eq!(a.continuable_hash(), b.continuable_hash());
        assert_eq!(a.rlc_coeff(), b.rlc_coeff());
    }

    #[test]
    fn absorbing_changes_the_digest() {
        let m = tower_field::field(CurveId::Bn254);
        let mut t = transcript();
        t.hash_limbs_multi(&[FieldElement::from_u64(1, &m)], None).unwrap();
        let first = t.continuable_hash();
        t.hash_limbs_multi(&[FieldElement::from_u64(2, &m)], None).unwrap();
        let second = t.continuable_hash();
        assert_ne!(first, second);
    }

    #[test]
    fn sparsity_skips_absorption() {
        let m = tower_field::field(CurveId::Bn254);
        let mut with_skip = transcript();
        let mut without = transcript();
        let values = [FieldElement::from_u64(5, &m), FieldElement::from_u64(9, &m)];
        with_skip.hash_limbs_multi(&values, Some(&[1, 0])).unwrap();
        without.hash_limbs_multi(&values[..1], None).unwrap();
        assert_eq!(with_skip.continuable_hash(), without.continuable_hash());
    }

    #[test]
    fn rlc_ptr_indexes_track_draws() {
        let mut t = transcript();
        let m = tower_field::field(CurveId::Bn254);
        t.hash_limbs_multi(&[FieldElement::from_u64(3, &m)], None).unwrap();
        t.rlc_coeff();
        t.rlc_coeff();
        assert_eq!(t.rlc_ptr_indexes(), &[0, 1]);
    }
}
