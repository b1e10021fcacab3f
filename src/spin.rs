//! # Spin
//!
//! The spin configuration of a calculation decides how eigenvector coefficients are laid out. Collinear
//! calculations hold one coefficient per orbital, non-collinear and spin-orbit calculations hold a two component
//! spinor per orbital, interleaved as `(up, down)` pairs.
//!
//! The configuration is resolved once by [`classify`] and then threaded through the engines, which only ever
//! ask [`Spin::is_noncollinear`].

use crate::{ElectronError, Overlap};
use nalgebra::DVector;
use num_complex::Complex;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Spin configurations, ordered by kind so that non-collinear variants compare greater than `Polarized`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Spin {
    /// No spin degree of freedom
    #[default]
    Unpolarized,
    /// Independent up and down channels
    Polarized,
    /// Spinors with an arbitrary quantisation axis
    NonCollinear,
    /// Non-collinear spinors coupled by spin-orbit interaction
    SpinOrbit,
}

impl Spin {
    /// Whether each orbital carries a two component spinor
    pub fn is_noncollinear(&self) -> bool {
        *self > Self::Polarized
    }

    /// Coefficients per orbital in an eigenvector
    pub fn spinor_width(&self) -> usize {
        if self.is_noncollinear() {
            2
        } else {
            1
        }
    }
}

impl FromStr for Spin {
    type Err = ElectronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpolarized" | "unpolarised" | "" => Ok(Self::Unpolarized),
            "polarized" | "polarised" | "p" => Ok(Self::Polarized),
            "non-collinear" | "noncollinear" | "nc" => Ok(Self::NonCollinear),
            "spin-orbit" | "spinorbit" | "so" => Ok(Self::SpinOrbit),
            _ => Err(ElectronError::MissingSpinContext(format!(
                "unknown spin configuration `{s}`"
            ))),
        }
    }
}

impl TryFrom<String> for Spin {
    type Error = ElectronError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Unpolarized => "unpolarized",
            Self::Polarized => "polarized",
            Self::NonCollinear => "non-collinear",
            Self::SpinOrbit => "spin-orbit",
        };
        write!(f, "{}", name)
    }
}

/// Resolve the spin configuration of eigenvectors with `width` coefficients
///
/// An explicit configuration always wins. Without one an overlap of half the eigenvector width can only act
/// on spinor components, so the states are taken to be non-collinear.
pub fn classify(spin: Option<Spin>, overlap: &Overlap, width: usize) -> Spin {
    if let Some(spin) = spin {
        return spin;
    }
    match overlap.ncols() {
        Some(columns) if width % 2 == 0 && 2 * columns == width => {
            info!(
                width,
                "overlap is half the eigenvector width, treating the states as non-collinear"
            );
            Spin::NonCollinear
        }
        _ => Spin::Unpolarized,
    }
}

/// The overlap acting on a single spinor component (non-collinear) or on the full state (collinear)
///
/// A full non-collinear overlap is reduced to its spin-diagonal block.
pub fn effective_overlap(
    spin: Spin,
    overlap: &Overlap,
    width: usize,
) -> Result<Cow<'_, Overlap>, ElectronError> {
    if spin.is_noncollinear() && width % 2 != 0 {
        return Err(ElectronError::InconsistentDimensions(format!(
            "non-collinear states need an even number of coefficients, got {width}"
        )));
    }
    let orbitals = width / spin.spinor_width();
    match overlap.ncols() {
        None => Ok(Cow::Borrowed(overlap)),
        Some(columns) if columns == orbitals => Ok(Cow::Borrowed(overlap)),
        Some(columns) if spin.is_noncollinear() && columns == width => {
            Ok(Cow::Owned(overlap.spin_diagonal()))
        }
        Some(columns) => Err(ElectronError::InvalidOverlapShape { columns, orbitals }),
    }
}

/// The product `S psi` for a full state, applying an orbital sized overlap to each spinor component
pub(crate) fn overlap_product(
    overlap: &Overlap,
    state: &DVector<Complex<f64>>,
    spin: Spin,
) -> Result<DVector<Complex<f64>>, ElectronError> {
    let width = state.len();
    match overlap.ncols() {
        None => Ok(state.clone()),
        Some(columns) if columns == width => Ok(overlap.apply(state).into_owned()),
        Some(columns) if spin.is_noncollinear() && 2 * columns == width => {
            let (up, down) = split_spinor(state);
            let (up, down) = (overlap.apply(&up), overlap.apply(&down));
            Ok(DVector::from_fn(width, |i, _| {
                if i % 2 == 0 {
                    up[i / 2]
                } else {
                    down[i / 2]
                }
            }))
        }
        Some(columns) => Err(ElectronError::InvalidOverlapShape {
            columns,
            orbitals: width,
        }),
    }
}

/// Split an interleaved spinor state into its up and down components
pub(crate) fn split_spinor(
    state: &DVector<Complex<f64>>,
) -> (DVector<Complex<f64>>, DVector<Complex<f64>>) {
    let orbitals = state.len() / 2;
    (
        DVector::from_fn(orbitals, |i, _| state[2 * i]),
        DVector::from_fn(orbitals, |i, _| state[2 * i + 1]),
    )
}
