//! # Model
//!
//! Reference operator sources: a parameterised tight-binding model assembled in sparse form, and a helper building
//! the linear chains driven by the command line application.
//!
//! A model is constructed through the `TightBindingBuilder` as
//!
//! ```ignore
//! TightBindingBuilder::new()
//!     .with_geometry(geometry)
//!     .with_onsite(vec![0.; geometry.no()])
//!     .with_hoppings(hoppings)
//!     .with_spin(Spin::NonCollinear)
//!     .build()?;
//! ```

mod chain;
mod tight_binding;

pub use chain::ChainParameters;
pub use tight_binding::{Hopping, TightBinding, TightBindingBuilder};
