// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains the implementation of the bootstrap logic.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::colvar::Colvar;
use crate::errors::BootstrapError;
use crate::presentation::BootstrapResults;
use crate::Bootstrap;

pub(crate) mod reweight;
pub(crate) mod sampler;

use reweight::FreeEnergyDifferences;
use sampler::BlockPartition;

impl Bootstrap {
    /// Read the COLVAR file, perform the block bootstrap and write out the results.
    pub fn run(&self) -> Result<BootstrapResults, BootstrapError> {
        if !self.silent() {
            self.info();
        }

        let colvar = Colvar::from_file(self.colvar(), self.cv1(), self.cv2(), self.bias())?;
        if !self.silent() {
            colvar.info();
        }

        let mut rng = match self.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let results = self.resample(&colvar, &mut rng);
        if !self.silent() {
            results.info();
            log::info!("Writing the standard deviations into '{}'...", self.output());
        }

        results.write_dat(self.output(), self.backup())?;

        if let Some(output_yaml) = self.output_yaml() {
            if !self.silent() {
                log::info!("Writing the summary into '{}'...", output_yaml);
            }
            results.write_yaml(output_yaml, self.backup())?;
        }

        Ok(results)
    }

    /// Perform the block bootstrap on an already loaded time series using the provided random number generator.
    /// No files are read or written.
    pub fn resample(&self, colvar: &Colvar, rng: &mut impl Rng) -> BootstrapResults {
        let partition = BlockPartition::new(colvar.n_frames(), self.n_blocks());
        if !self.silent() {
            partition.info();
        }

        let samples: Vec<FreeEnergyDifferences> = (0..self.iterations())
            .map(|_| {
                let indices = partition.sample(self.n_picks(), rng);
                reweight::estimate(colvar, &indices, &self.boundaries(), self.kbt())
            })
            .collect();

        BootstrapResults::new(self, &partition, samples)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::colvar::Frame;
    use crate::input::SingularityPolicy;

    fn bootstrap(n_blocks: usize, n_picks: usize) -> Bootstrap {
        Bootstrap::new()
            .colvar("COLVAR")
            .cv1("h12")
            .cv2("h34")
            .n_blocks(n_blocks)
            .n_picks(n_picks)
            .build()
            .unwrap()
    }

    /// Trajectory alternating between the four substates every `period` frames.
    fn alternating(n_frames: usize, period: usize) -> Colvar {
        let states = [
            (80.0, 80.0),
            (1.0, 1.0),
            (80.0, 1.0),
            (1.0, 80.0),
            (20.0, 30.0),
        ];

        (0..n_frames)
            .map(|i| {
                let (cv1, cv2) = states[(i / period) % states.len()];
                Frame::new(cv1, cv2, (i % 7) as f64)
            })
            .collect::<Vec<Frame>>()
            .into()
    }

    #[test]
    fn resample_single_block() {
        let colvar = alternating(100, 3);
        let mut rng = StdRng::seed_from_u64(11);

        let results = bootstrap(1, 1).resample(&colvar, &mut rng);

        assert_eq!(results.samples().len(), 200);
        assert!(results.samples().iter().all(|s| *s == results.samples()[0]));

        assert_relative_eq!(results.closed().std(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(results.interi().std(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(results.interii().std(), 0.0, epsilon = 1e-10);
        assert_eq!(results.singular(), 0);
    }

    #[test]
    fn resample_reproducible() {
        let colvar = alternating(1000, 13);
        let bootstrap = bootstrap(10, 10);

        let results1 = bootstrap.resample(&colvar, &mut StdRng::seed_from_u64(5));
        let results2 = bootstrap.resample(&colvar, &mut StdRng::seed_from_u64(5));

        assert_eq!(results1.samples(), results2.samples());
        assert_eq!(results1.closed().std(), results2.closed().std());
        assert_eq!(results1.interi().std(), results2.interi().std());
        assert_eq!(results1.interii().std(), results2.interii().std());
    }

    #[test]
    fn resample_nonzero_spread() {
        let colvar = alternating(1000, 13);

        let results = bootstrap(10, 10).resample(&colvar, &mut StdRng::seed_from_u64(8));

        assert_eq!(results.singular(), 0);
        assert!(results.closed().std() > 0.0 && results.closed().std().is_finite());
        assert!(results.interi().std() > 0.0 && results.interi().std().is_finite());
        assert!(results.interii().std() > 0.0 && results.interii().std().is_finite());
    }

    #[test]
    fn resample_iterations() {
        let colvar = alternating(100, 3);
        let bootstrap = Bootstrap::new()
            .colvar("COLVAR")
            .cv1("h12")
            .cv2("h34")
            .n_blocks(5)
            .n_picks(5)
            .iterations(17)
            .build()
            .unwrap();

        let results = bootstrap.resample(&colvar, &mut StdRng::seed_from_u64(1));
        assert_eq!(results.samples().len(), 17);
        assert_eq!(results.iterations(), 17);
    }

    #[test]
    fn resample_singular_propagated() {
        let frames = vec![Frame::new(100.0, 100.0, 0.0); 10];
        let colvar = Colvar::from(frames);

        let results = bootstrap(2, 2).resample(&colvar, &mut StdRng::seed_from_u64(2));

        for sample in results.samples() {
            assert!(sample.closed().is_infinite() && sample.closed() > 0.0);
            assert!(sample.interi().is_infinite() && sample.interi() > 0.0);
            assert!(sample.interii().is_infinite() && sample.interii() > 0.0);
        }

        assert_eq!(results.singular(), 200);
        assert!(results.closed().std().is_nan());
        assert!(results.interi().std().is_nan());
        assert!(results.interii().std().is_nan());
    }

    #[test]
    fn resample_singular_excluded() {
        // closed and intermediate I are only visited in the first block
        let mut frames = vec![Frame::new(100.0, 100.0, 0.0); 40];
        frames[0] = Frame::new(1.0, 1.0, 0.0);
        frames[1] = Frame::new(100.0, 1.0, 0.0);
        // intermediate II is visited in every block
        for i in (5..40).step_by(10) {
            frames[i] = Frame::new(1.0, 100.0, 0.0);
        }
        let colvar = Colvar::from(frames);

        let bootstrap = Bootstrap::new()
            .colvar("COLVAR")
            .cv1("h12")
            .cv2("h34")
            .n_blocks(4)
            .n_picks(1)
            .singularity(SingularityPolicy::Exclude)
            .build()
            .unwrap();

        let results = bootstrap.resample(&colvar, &mut StdRng::seed_from_u64(21));

        assert!(results.singular() > 0);
        assert!(results.singular() < 200);

        assert_eq!(results.closed().n_samples(), 200 - results.singular());
        assert_eq!(results.interi().n_samples(), 200 - results.singular());
        assert_eq!(results.interii().n_samples(), 200);

        // only the first block contains the closed state, so all finite samples are identical
        assert_relative_eq!(results.closed().std(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(results.interi().std(), 0.0, epsilon = 1e-10);
        assert!(results.interii().std() > 0.0 && results.interii().std().is_finite());
    }
}
