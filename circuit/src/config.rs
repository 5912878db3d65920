use tower_field::CurveId;

/// Configuration for a `Circuit`: a plain struct of knobs plus a couple of
/// named presets, rather than a builder pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TowerCircuitConfig {
    pub curve_id: CurveId,
    pub extension_degree: usize,
    /// Whether `finalize_circuit` absorbs the INPUT cells into the
    /// transcript.
    pub hash_input: bool,
    /// Whether `finalize_circuit` skips Q absorption and the final identity
    /// check, to unit-test the rest of the pipeline without an honest Q/R
    /// pair.
    pub mock: bool,
}

impl TowerCircuitConfig {
    pub fn new(curve_id: CurveId, extension_degree: usize, hash_input: bool, mock: bool) -> Self {
        TowerCircuitConfig {
            curve_id,
            extension_degree,
            hash_input,
            mock,
        }
    }

    /// A typical non-mock config for a degree-6 tower extension, absorbing
    /// inputs into the transcript.
    pub fn standard(curve_id: CurveId, extension_degree: usize) -> Self {
        TowerCircuitConfig {
            curve_id,
            extension_degree,
            hash_input: true,
            mock: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_is_not_mock() {
        let config = TowerCircuitConfig::standard(CurveId::Bn254, 6);
        assert!(!config.mock);
        assert!(config.hash_input);
    }
}
