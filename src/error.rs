// Error types for the layer tree.
// Paint contract violations surface here when checked painting is enabled.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("{layer_type} #{id} painted without a preroll for frame {frame}")]
    NotPrerolled {
        layer_type: &'static str,
        id: u64,
        frame: u64,
    },
    #[error("{layer_type} #{id} painted with empty paint bounds")]
    EmptyPaintBounds { layer_type: &'static str, id: u64 },
    #[error("unbalanced canvas state after paint: expected save count {expected}, found {found}")]
    UnbalancedSaveCount { expected: usize, found: usize },
    #[error("raster thread is no longer running")]
    RasterThreadGone,
}

impl LayerError {
    /// True for the violations raised by the paint precondition checks.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            LayerError::NotPrerolled { .. } | LayerError::EmptyPaintBounds { .. }
        )
    }
}

pub type LayerResult<T = ()> = Result<T, LayerError>;
