// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Reweighting of biased frames and calculation of free energies of the substates.

use getset::CopyGetters;
use serde::Serialize;
use strum_macros::Display;

use crate::colvar::{Colvar, Frame};
use crate::input::Boundaries;

/// Conformational substate defined by the values of the two CVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Substate {
    /// Both CVs are high.
    #[strum(serialize = "opened")]
    Opened,
    /// Both CVs are low.
    #[strum(serialize = "closed")]
    Closed,
    /// First CV is high, second CV is low.
    #[strum(serialize = "intermediate I")]
    InterI,
    /// First CV is low, second CV is high.
    #[strum(serialize = "intermediate II")]
    InterII,
}

impl Substate {
    /// Assign a frame to a substate. Returns `None` if the frame belongs to no substate.
    pub fn classify(frame: &Frame, boundaries: &Boundaries) -> Option<Substate> {
        let (cv1, cv2) = (frame.cv1(), frame.cv2());

        match (
            boundaries.is_low(cv1),
            boundaries.is_high(cv1),
            boundaries.is_low(cv2),
            boundaries.is_high(cv2),
        ) {
            (_, true, _, true) => Some(Substate::Opened),
            (true, _, true, _) => Some(Substate::Closed),
            (_, true, true, _) => Some(Substate::InterI),
            (true, _, _, true) => Some(Substate::InterII),
            _ => None,
        }
    }
}

/// Sums of the statistical weights of the sampled frames.
#[derive(Debug, Clone, Default, PartialEq)]
struct Weights {
    total: f64,
    opened: f64,
    closed: f64,
    interi: f64,
    interii: f64,
}

impl Weights {
    #[inline(always)]
    fn add(&mut self, substate: Option<Substate>, weight: f64) {
        self.total += weight;
        match substate {
            Some(Substate::Opened) => self.opened += weight,
            Some(Substate::Closed) => self.closed += weight,
            Some(Substate::InterI) => self.interi += weight,
            Some(Substate::InterII) => self.interii += weight,
            None => (),
        }
    }

    /// Free energy of a state with the given weight.
    /// Infinite if the weight is zero.
    #[inline(always)]
    fn free_energy(&self, weight: f64, kbt: f64) -> f64 {
        -kbt * (weight / self.total).ln()
    }
}

/// Free energies of the closed and the intermediate substates relative to the opened substate.
/// Can be infinite or NaN if some substate has not been sampled.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters, Serialize)]
pub struct FreeEnergyDifferences {
    #[getset(get_copy = "pub")]
    closed: f64,
    #[getset(get_copy = "pub")]
    interi: f64,
    #[getset(get_copy = "pub")]
    interii: f64,
}

impl FreeEnergyDifferences {
    /// Returns `true` if all the differences are finite numbers.
    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.closed.is_finite() && self.interi.is_finite() && self.interii.is_finite()
    }
}

/// Calculate free energy differences between the substates from the frames with the given indices.
/// Every occurrence of an index contributes to the weights.
/// Weights are calculated relative to the highest bias among the frames so that they can not overflow.
pub(crate) fn estimate(
    colvar: &Colvar,
    indices: &[usize],
    boundaries: &Boundaries,
    kbt: f64,
) -> FreeEnergyDifferences {
    let max_bias = indices
        .iter()
        .map(|&index| colvar.frames()[index].bias())
        .fold(f64::NEG_INFINITY, f64::max);

    let mut weights = Weights::default();

    for &index in indices {
        let frame = &colvar.frames()[index];
        let weight = ((frame.bias() - max_bias) / kbt).exp();
        weights.add(Substate::classify(frame, boundaries), weight);
    }

    let opened = weights.free_energy(weights.opened, kbt);

    FreeEnergyDifferences {
        closed: weights.free_energy(weights.closed, kbt) - opened,
        interi: weights.free_energy(weights.interi, kbt) - opened,
        interii: weights.free_energy(weights.interii, kbt) - opened,
    }
}
