// src/error.rs

use thiserror::Error;

use crate::period::{ParseError, SelectionError};
use crate::region::UnknownRegion;
use crate::render::RenderError;
use crate::validate::ValidationError;

/// Anything that stops one submission from rendering. The dataset is
/// untouched; the user may correct the input and submit again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("expected \"<start>, <end>, <region>[; <region>, ...]\", got {0:?}")]
    Input(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Region(#[from] UnknownRegion),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl DashboardError {
    /// True for mistakes in the submitted values; false when the dataset
    /// itself broke an invariant.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, DashboardError::Render(_))
    }

    /// Inline message shown instead of the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(v) => v.user_message().to_string(),
            DashboardError::Selection(_) => {
                "No data available. Check your quarter and year selection".to_string()
            }
            other => other.to_string(),
        }
    }
}
