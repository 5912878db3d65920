use tower_field::FieldElement;

use crate::segment::Cell;

/// A circuit value together with the segment cell it lives in, or `None` if
/// it is purely symbolic (e.g. the implicit `1`/`0` coefficients of the
/// numerator in `extf_inv`, which are never written to the segment because
/// their sparsity tag already pins their value).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuloCircuitElement {
    pub value: FieldElement,
    offset: Option<Cell>,
}

impl ModuloCircuitElement {
    pub fn from_cell(value: FieldElement, offset: Cell) -> Self {
        ModuloCircuitElement {
            value,
            offset: Some(offset),
        }
    }

    pub fn symbolic(value: FieldElement) -> Self {
        ModuloCircuitElement {
            value,
            offset: None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        self.offset.is_none()
    }

    /// The segment offset backing this value. Panics if called on a
    /// symbolic element — callers only reach here along code paths already
    /// gated by sparsity, so a panic here indicates a builder bug rather
    /// than a malformed circuit input.
    pub fn cell(&self) -> Cell {
        self.offset
            .expect("symbolic ModuloCircuitElement used where a circuit cell was required")
    }

    pub fn offset(&self) -> Option<Cell> {
        self.offset
    }
}
