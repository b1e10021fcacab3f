use super::{State, StateC, StateInfo};
use crate::{ElectronError, OperatorSource};
use nalgebra::DMatrix;
use num_complex::Complex;

/// Typestate builder binding eigenvectors to their parent
///
/// ```ignore
/// let state = StateBuilder::new()
///     .with_states(vectors)
///     .with_parent(&model)
///     .with_info(StateInfo { k, gauge })
///     .with_eigenvalues(eigenvalues)
///     .build()?;
/// ```
///
/// Without eigenvalues the builder produces a `State`, with them a `StateC`.
pub struct StateBuilder<States, RefParent, Energies> {
    states: States,
    parent: RefParent,
    info: StateInfo,
    eigenvalues: Energies,
}

impl Default for StateBuilder<(), (), ()> {
    fn default() -> Self {
        Self {
            states: (),
            parent: (),
            info: StateInfo::default(),
            eigenvalues: (),
        }
    }
}

impl StateBuilder<(), (), ()> {
    /// An empty builder
    pub fn new() -> Self {
        Self::default()
    }
}

impl<States, RefParent, Energies> StateBuilder<States, RefParent, Energies> {
    /// Attach the eigenvectors, one state per row
    pub fn with_states(
        self,
        states: DMatrix<Complex<f64>>,
    ) -> StateBuilder<DMatrix<Complex<f64>>, RefParent, Energies> {
        StateBuilder {
            states,
            parent: self.parent,
            info: self.info,
            eigenvalues: self.eigenvalues,
        }
    }

    /// Attach the operator source the states were computed from
    pub fn with_parent<Parent: ?Sized>(
        self,
        parent: &Parent,
    ) -> StateBuilder<States, &Parent, Energies> {
        StateBuilder {
            states: self.states,
            parent,
            info: self.info,
            eigenvalues: self.eigenvalues,
        }
    }

    /// Attach the reciprocal point and gauge, defaulting to Gamma in the cell gauge
    pub fn with_info(mut self, info: StateInfo) -> Self {
        self.info = info;
        self
    }

    /// Attach the eigenvalue of each state
    pub fn with_eigenvalues(
        self,
        eigenvalues: Vec<f64>,
    ) -> StateBuilder<States, RefParent, Vec<f64>> {
        StateBuilder {
            states: self.states,
            parent: self.parent,
            info: self.info,
            eigenvalues,
        }
    }
}

fn validate_width<P: OperatorSource + ?Sized>(
    states: &DMatrix<Complex<f64>>,
    parent: &P,
) -> Result<(), ElectronError> {
    if let Some(geometry) = parent.geometry() {
        let width = states.ncols();
        if width != geometry.no() && width != 2 * geometry.no() {
            return Err(ElectronError::InconsistentDimensions(format!(
                "states with {width} coefficients cannot belong to a geometry with {} orbitals",
                geometry.no()
            )));
        }
    }
    Ok(())
}

impl<'a, P: OperatorSource + ?Sized> StateBuilder<DMatrix<Complex<f64>>, &'a P, ()> {
    /// Build a `State` carrying eigenvectors only
    pub fn build(self) -> Result<State<'a, P>, ElectronError> {
        validate_width(&self.states, self.parent)?;
        Ok(State {
            states: self.states,
            parent: self.parent,
            info: self.info,
        })
    }
}

impl<'a, P: OperatorSource + ?Sized> StateBuilder<DMatrix<Complex<f64>>, &'a P, Vec<f64>> {
    /// Build a `StateC` carrying eigenvectors and eigenvalues
    pub fn build(self) -> Result<StateC<'a, P>, ElectronError> {
        validate_width(&self.states, self.parent)?;
        if self.eigenvalues.len() != self.states.nrows() {
            return Err(ElectronError::InconsistentDimensions(format!(
                "{} eigenvalues were passed for {} states",
                self.eigenvalues.len(),
                self.states.nrows()
            )));
        }
        Ok(StateC {
            state: State {
                states: self.states,
                parent: self.parent,
                info: self.info,
            },
            eigenvalues: self.eigenvalues,
        })
    }
}
