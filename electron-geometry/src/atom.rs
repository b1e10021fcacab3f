use crate::Orbital;

/// A chemical species together with the orbitals centred on it
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    symbol: String,
    orbitals: Vec<Orbital>,
}

impl Atom {
    /// Construct an atom from its chemical symbol and orbitals
    pub fn new(symbol: impl Into<String>, orbitals: Vec<Orbital>) -> Self {
        Self {
            symbol: symbol.into(),
            orbitals,
        }
    }

    /// Chemical symbol of the species
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The orbitals centred on the atom, in basis order
    pub fn orbitals(&self) -> &[Orbital] {
        &self.orbitals
    }

    /// Number of orbitals on the atom
    pub fn no(&self) -> usize {
        self.orbitals.len()
    }

    /// The largest orbital cutoff on the atom, zero for an atom without orbitals
    pub fn max_radius(&self) -> f64 {
        self.orbitals
            .iter()
            .map(Orbital::radius)
            .fold(0., f64::max)
    }
}
