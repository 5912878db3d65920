use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// An element of `Z/pZ` for a modulus `p` chosen at construction time.
///
/// The modulus is a runtime value rather than a type parameter: a single
/// circuit must serve whichever curve its caller picks, so `p` travels
/// alongside the residue.
#[derive(Clone)]
pub struct FieldElement {
    value: BigUint,
    modulus: Rc<BigUint>,
}

impl FieldElement {
    pub fn new(value: BigUint, modulus: Rc<BigUint>) -> Self {
        let value = value % modulus.as_ref();
        FieldElement { value, modulus }
    }

    pub fn zero(modulus: &Rc<BigUint>) -> Self {
        FieldElement {
            value: BigUint::zero(),
            modulus: modulus.clone(),
        }
    }

    pub fn one(modulus: &Rc<BigUint>) -> Self {
        FieldElement {
            value: BigUint::one(),
            modulus: modulus.clone(),
        }
    }

    pub fn from_u64(v: u64, modulus: &Rc<BigUint>) -> Self {
        Self::new(BigUint::from(v), modulus.clone())
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn modulus(&self) -> &Rc<BigUint> {
        &self.modulus
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    fn assert_same_field(&self, other: &Self) {
        debug_assert_eq!(
            self.modulus, other.modulus,
            "operands belong to different fields"
        );
    }

    /// Extended-Euclidean inverse. Returns `None` for zero (callers map this
    /// to `CircuitError::DivideByZero`).
    pub fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        use num_bigint::BigInt;

        let p = BigInt::from(self.modulus.as_ref().clone());
        let (mut old_r, mut r) = (BigInt::from(self.value.clone()), p.clone());
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
        while !r.is_zero() {
            let q = &old_r / &r;
            let new_r = &old_r - &q * &r;
            old_r = std::mem::replace(&mut r, new_r);
            let new_s = &old_s - &q * &s;
            old_s = std::mem::replace(&mut s, new_s);
        }
        // old_r is gcd(value, p); for prime p and nonzero value it is 1.
        debug_assert!(old_r.is_one(), "modulus is not prime or value shares a factor");

        let mut inv = old_s % &p;
        if inv.sign() == num_bigint::Sign::Minus {
            inv += &p;
        }
        let inv = inv.to_biguint().expect("reduced mod p is non-negative");
        Some(FieldElement::new(inv, self.modulus.clone()))
    }

    /// Fixed-width little-endian limb decomposition, `limb_bits`-wide limbs.
    pub fn to_limbs(&self, n_limbs: usize, limb_bits: u32) -> Vec<u64> {
        let mask = (BigUint::one() << limb_bits) - BigUint::one();
        let mut v = self.value.clone();
        let mut limbs = Vec::with_capacity(n_limbs);
        for _ in 0..n_limbs {
            let limb = &v & &mask;
            limbs.push(
                limb.to_u64_digits()
                    .first()
                    .copied()
                    .unwrap_or(0),
            );
            v >>= limb_bits;
        }
        limbs
    }

    pub fn from_limbs(limbs: &[u64], limb_bits: u32, modulus: &Rc<BigUint>) -> Self {
        let mut value = BigUint::zero();
        for (i, &limb) in limbs.iter().enumerate() {
            value += BigUint::from(limb) << (limb_bits * i as u32);
        }
        Self::new(value, modulus.clone())
    }

    /// Uniform random element, for tests and example circuits.
    pub fn rand(modulus: &Rc<BigUint>) -> Self {
        Self::rand_with(&mut rand::thread_rng(), modulus)
    }

    /// Same as `rand`, but draws from a caller-supplied RNG, letting tests
    /// seed a reproducible generator instead of `thread_rng`.
    pub fn rand_with<R: rand::RngCore>(rng: &mut R, modulus: &Rc<BigUint>) -> Self {
        use num_bigint::RandBigInt;
        let value = rng.gen_biguint_below(modulus.as_ref());
        FieldElement::new(value, modulus.clone())
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus && self.value == other.value
    }
}

impl Eq for FieldElement {}

impl Hash for FieldElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.modulus.as_ref().hash(state);
    }
}

impl Debug for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.value)
    }
}

impl Display for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Add for &FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: Self) -> FieldElement {
        self.assert_same_field(rhs);
        FieldElement::new(&self.value + &rhs.value, self.modulus.clone())
    }
}

impl Sub for &FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: Self) -> FieldElement {
        self.assert_same_field(rhs);
        let p = self.modulus.as_ref();
        let lhs = &self.value + p;
        FieldElement::new(lhs - &rhs.value, self.modulus.clone())
    }
}

impl Mul for &FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: Self) -> FieldElement {
        self.assert_same_field(rhs);
        FieldElement::new(&self.value * &rhs.value, self.modulus.clone())
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        if self.is_zero() {
            return self.clone();
        }
        FieldElement::new(self.modulus.as_ref() - &self.value, self.modulus.clone())
    }
}

impl Add for FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: Self) -> FieldElement {
        &self + &rhs
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: Self) -> FieldElement {
        &self - &rhs
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: Self) -> FieldElement {
        &self * &rhs
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modulus() -> Rc<BigUint> {
        Rc::new(BigUint::from(17u32))
    }

    #[test]
    fn add_wraps_mod_p() {
        let m = modulus();
        let a = FieldElement::from_u64(10, &m);
        let b = FieldElement::from_u64(10, &m);
        assert_eq!((&a + &b).value(), &BigUint::from(3u32));
    }

    #[test]
    fn inverse_round_trips() {
        let m = modulus();
        let a = FieldElement::from_u64(5, &m);
        let inv = a.inverse().unwrap();
        assert!((&a * &inv).is_one());
    }

    #[test]
    fn zero_has_no_inverse() {
        let m = modulus();
        assert!(FieldElement::zero(&m).inverse().is_none());
    }

    #[test]
    fn limb_round_trip() {
        let m = Rc::new(BigUint::from(1u32) << 200);
        let a = FieldElement::new(BigUint::from(0x1234_5678_9abc_def0u64) << 96, m.clone());
        let limbs = a.to_limbs(4, 48);
        let back = FieldElement::from_limbs(&limbs, 48, &m);
        assert_eq!(a, back);
    }

    #[test]
    fn seeded_rand_is_reproducible() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let m = Rc::new(BigUint::from(1u32) << 200);
        let mut rng_a = ChaCha8Rng::seed_from_u64(0x6feb51b7ec230f25);
        let mut rng_b = ChaCha8Rng::seed_from_u64(0x6feb51b7ec230f25);
        let a = FieldElement::rand_with(&mut rng_a, &m);
        let b = FieldElement::rand_with(&mut rng_b, &m);
        assert_eq!(a, b);

        let mut rng_c = ChaCha8Rng::seed_from_u64(1);
        let c = FieldElement::rand_with(&mut rng_c, &m);
        assert_ne!(a, c);
    }
}
