// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! # fesboot: Block-bootstrap errors of free energies from metadynamics
//!
//! Crate for estimating the statistical errors of free energy differences between conformational
//! substates obtained by reweighting a biased (metadynamics) simulation.
//!
//! The time series of two collective variables and of the bias potential is read from a PLUMED
//! COLVAR file. The trajectory is divided into contiguous blocks which are repeatedly resampled
//! with replacement. For each resample, the frames are reweighted by `exp(bias / kT)` and the free
//! energies of four substates (opened, closed, intermediate I, intermediate II) are calculated.
//! The standard deviations of the free energies relative to the opened state are reported.
//!
//! ## Usage
//!
//! Import the crate in your Rust code:
//!
//! ```rust
//! use fesboot::prelude::*;
//! ```
//!
//! `fesboot` is also available as a command line tool:
//! ```bash
//! $ fesboot 10 10 h12 h34 COLVAR
//! ```
//!
//! ## Examples
//!
//! Basic block bootstrap.
//! ```no_run
//! use fesboot::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // construct the bootstrap
//!     let bootstrap = Bootstrap::new()
//!             .colvar("COLVAR")                          // input COLVAR file
//!             .cv1("h12")                                // name of the first CV
//!             .cv2("h34")                                // name of the second CV
//!             .n_blocks(10)                              // number of blocks
//!             .n_picks(10)                               // number of blocks picked per iteration
//!             .build()?;                                 // constructing the bootstrap
//!
//!     // activate colog if you want logging (requires the `colog` crate)
//!     colog::init();
//!
//!     // run the bootstrap and write the output into 'boot.dat'
//!     let results = bootstrap.run()?;
//!     println!("{}", results.closed().std());
//!
//!     Ok(())
//! }
//! ```
//!
//! ***
//!
//! The `Bootstrap` structure has other, optional fields.
//!
//! ```no_run
//! use fesboot::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let bootstrap = Bootstrap::new()
//!             .colvar("COLVAR")
//!             .cv1("h13")
//!             .cv2("h24")
//!             .n_blocks(20)
//!             .n_picks(20)
//!             .bias("metad.bias")                        // name of the bias column
//!             .output("boot.dat")                        // output file with standard deviations
//!             .output_yaml("boot.yaml")                  // output yaml file with a summary
//!             .iterations(500)                           // number of bootstrap iterations
//!             .kbt(2.494339)                             // kT in the units of the bias
//!             .boundaries(Boundaries::new(5.0, 50.0)?)   // CV thresholds of the substates
//!             .singularity(SingularityPolicy::Exclude)   // drop infinite free energies
//!             .seed(42)                                  // seed for the random number generator
//!             .backup()                                  // back up existing output files
//!             .build()?;
//!
//!     bootstrap.run()?;
//!     Ok(())
//! }
//! ```

/// Version of the `fesboot` crate.
pub const FESBOOT_VERSION: &str = env!("CARGO_PKG_VERSION");

mod analysis;
pub mod colvar;
pub mod errors;
pub mod input;
pub mod presentation;

pub use input::{Bootstrap, Boundaries, SingularityPolicy};

/// This module contains re-exported public structures of the `fesboot` crate.
pub mod prelude {
    pub use super::input::{
        bootstrap::BootstrapBuilder, Bootstrap, Boundaries, SingularityPolicy,
    };

    pub use super::analysis::reweight::{FreeEnergyDifferences, Substate};

    pub use super::colvar::{Colvar, Frame};

    pub use super::presentation::{BootstrapResults, DifferenceStatistics};
}
