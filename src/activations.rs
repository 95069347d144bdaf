//! Elementwise activation functions.

use crate::error::{Error, Result};
use crate::mat::MatViewMut;

/// The activations the model format can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Sigmoid,
}

impl Activation {
    /// Resolves an activation by its model-data name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Tanh" => Ok(Self::Tanh),
            "Sigmoid" => Ok(Self::Sigmoid),
            _ => Err(Error::Config(format!("unsupported activation {name:?}"))),
        }
    }

    /// Applies the activation in place.
    pub fn apply(self, matrix: &mut MatViewMut<'_>) {
        match self {
            Self::Tanh => matrix.tanh_in_place(),
            Self::Sigmoid => matrix.sigmoid_in_place(),
        }
    }
}
