use std::fmt::{self, Display, Formatter};

/// Every error kind this crate can raise. All are fatal to circuit
/// construction: the transcript state cannot be rewound without losing
/// soundness, so there is no partial-recovery path. Plain enum +
/// `Result<T, CircuitError>`, no `thiserror`.
#[derive(Debug)]
pub enum CircuitError {
    /// Operand lengths disagree, or a sparsity vector's length doesn't match
    /// its operand.
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    /// A polynomial's degree exceeds the precomputed `z_powers` table.
    DegreeOverflow { degree: usize, available: usize },
    /// `inv(0)`, or a division hint reporting a zero denominator.
    DivideByZero,
    /// A sparsity tag asserts zero or one but the value disagrees.
    SparsityViolation { index: usize, expected_zero: bool },
    /// Step 9's `lhs != rhs` — a faulty hint, transcript desync, or a caller
    /// bug in circuit construction.
    IdentityFailure { level: usize },
    /// The transcript's instruction dispatch saw a kind it doesn't handle.
    UnknownInstruction,
}

impl Display for CircuitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "shape mismatch in {context}: expected {expected}, found {found}"
            ),
            CircuitError::DegreeOverflow { degree, available } => write!(
                f,
                "polynomial degree {degree} exceeds {available} precomputed powers of z"
            ),
            CircuitError::DivideByZero => write!(f, "division by zero"),
            CircuitError::SparsityViolation {
                index,
                expected_zero,
            } => write!(
                f,
                "sparsity violation at index {index}: value should be {}",
                if *expected_zero { "zero" } else { "one" }
            ),
            CircuitError::IdentityFailure { level } => {
                write!(f, "Euclidean identity check failed for accumulator level {level}")
            }
            CircuitError::UnknownInstruction => write!(f, "unknown accumulator instruction kind"),
        }
    }
}

impl std::error::Error for CircuitError {}

pub type Result<T> = std::result::Result<T, CircuitError>;
