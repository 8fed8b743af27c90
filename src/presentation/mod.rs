// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains structures and methods for presenting the results of the bootstrap.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use getset::{CopyGetters, Getters};
use serde::Serialize;

use crate::{
    analysis::{
        reweight::{FreeEnergyDifferences, Substate},
        sampler::BlockPartition,
    },
    errors::WriteError,
    input::SingularityPolicy,
    Bootstrap,
};

/// Header of the output file with standard deviations.
const DAT_HEADER: &str = "# Closed interi interii";

/// Statistics of a single free energy difference collected over all bootstrap iterations.
#[derive(Debug, Clone, Copy, CopyGetters, Serialize)]
pub struct DifferenceStatistics {
    /// Mean of the free energy difference.
    #[getset(get_copy = "pub")]
    mean: f64,
    /// Population standard deviation of the free energy difference.
    #[getset(get_copy = "pub")]
    std: f64,
    /// Number of values the statistics were calculated from.
    #[getset(get_copy = "pub")]
    n_samples: usize,
}

impl DifferenceStatistics {
    /// Calculate the statistics. Non-finite values are dropped if requested by the policy.
    /// Returns NaN statistics if there are no values to use.
    /// The standard deviation is NaN if any of the used values is not finite.
    fn new(values: impl Iterator<Item = f64>, policy: SingularityPolicy) -> Self {
        let values: Vec<f64> = match policy {
            SingularityPolicy::Propagate => values.collect(),
            SingularityPolicy::Exclude => values.filter(|x| x.is_finite()).collect(),
        };

        if values.is_empty() {
            return DifferenceStatistics {
                mean: f64::NAN,
                std: f64::NAN,
                n_samples: 0,
            };
        }

        let mean = statistical::mean(&values);
        // `statistical` cannot handle non-finite deviations
        let std = if values.iter().all(|x| x.is_finite()) {
            statistical::population_standard_deviation(&values, Some(mean))
        } else {
            f64::NAN
        };

        DifferenceStatistics {
            mean,
            std,
            n_samples: values.len(),
        }
    }
}

/// Results of the block bootstrap.
#[derive(Debug, Clone, Getters, CopyGetters, Serialize)]
pub struct BootstrapResults {
    /// COLVAR file that was analyzed.
    #[getset(get = "pub")]
    colvar: String,
    /// Number of frames in the COLVAR file.
    #[getset(get_copy = "pub")]
    n_frames: usize,
    /// Number of blocks the trajectory was divided into.
    #[getset(get_copy = "pub")]
    n_blocks: usize,
    /// Size of the blocks (except for the last one).
    #[getset(get_copy = "pub")]
    block_size: usize,
    /// Number of blocks picked in each iteration.
    #[getset(get_copy = "pub")]
    n_picks: usize,
    /// Number of bootstrap iterations.
    #[getset(get_copy = "pub")]
    iterations: usize,
    /// Thermal energy used for the reweighting.
    #[getset(get_copy = "pub")]
    kbt: f64,
    /// Treatment of non-finite free energy differences.
    #[getset(get_copy = "pub")]
    singularity: SingularityPolicy,
    /// Number of iterations in which at least one free energy difference is not finite.
    #[getset(get_copy = "pub")]
    singular: usize,
    /// Free energy of the closed state relative to the opened state.
    #[getset(get_copy = "pub")]
    closed: DifferenceStatistics,
    /// Free energy of the intermediate I state relative to the opened state.
    #[getset(get_copy = "pub")]
    interi: DifferenceStatistics,
    /// Free energy of the intermediate II state relative to the opened state.
    #[getset(get_copy = "pub")]
    interii: DifferenceStatistics,
    /// Free energy differences obtained in the individual iterations.
    #[getset(get = "pub")]
    #[serde(skip)]
    samples: Vec<FreeEnergyDifferences>,
}

impl BootstrapResults {
    pub(crate) fn new(
        bootstrap: &Bootstrap,
        partition: &BlockPartition,
        samples: Vec<FreeEnergyDifferences>,
    ) -> Self {
        let policy = bootstrap.singularity();
        let singular = samples.iter().filter(|s| !s.is_finite()).count();

        BootstrapResults {
            colvar: bootstrap.colvar().to_owned(),
            n_frames: partition.n_frames(),
            n_blocks: partition.n_blocks(),
            block_size: partition.block_size(),
            n_picks: bootstrap.n_picks(),
            iterations: samples.len(),
            kbt: bootstrap.kbt(),
            singularity: policy,
            singular,
            closed: DifferenceStatistics::new(samples.iter().map(|s| s.closed()), policy),
            interi: DifferenceStatistics::new(samples.iter().map(|s| s.interi()), policy),
            interii: DifferenceStatistics::new(samples.iter().map(|s| s.interii()), policy),
            samples,
        }
    }

    /// Log the results of the bootstrap.
    pub(crate) fn info(&self) {
        if self.singular > 0 {
            log::warn!(
                "In {} out of {} iterations, some substate obtained no weight and its free energy is infinite.",
                self.singular,
                self.iterations
            );

            match self.singularity {
                SingularityPolicy::Propagate => log::warn!(
                    "Non-finite free energy differences are propagated into the standard deviations. Consider using larger blocks."
                ),
                SingularityPolicy::Exclude => log::warn!(
                    "Non-finite free energy differences are excluded from the standard deviations."
                ),
            }
        }

        for (substate, stats) in [
            (Substate::Closed, &self.closed),
            (Substate::InterI, &self.interi),
            (Substate::InterII, &self.interii),
        ] {
            log::info!(
                "dG({} - {}): mean {:.4}, std {:.4} (from {} values)",
                substate,
                Substate::Opened,
                stats.mean,
                stats.std,
                stats.n_samples
            );
        }
    }

    /// Write the standard deviations into a tab-separated file.
    pub fn write_dat(&self, filename: impl AsRef<Path>, backup: bool) -> Result<(), WriteError> {
        let mut writer = prepare_file(&filename, "dat", backup)?;

        let write = |writer: &mut BufWriter<File>| -> std::io::Result<()> {
            writeln!(writer, "{}", DAT_HEADER)?;
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                format_value(self.closed.std),
                format_value(self.interi.std),
                format_value(self.interii.std),
                self.colvar
            )?;
            writer.flush()
        };

        write(&mut writer)
            .map_err(|_| WriteError::CouldNotWriteResults(Box::from(filename.as_ref())))
    }

    /// Write the summary of the bootstrap into a yaml file.
    pub fn write_yaml(&self, filename: impl AsRef<Path>, backup: bool) -> Result<(), WriteError> {
        let mut writer = prepare_file(&filename, "yaml", backup)?;

        writeln!(
            writer,
            "# Block bootstrap performed with 'fesboot v{}'.",
            crate::FESBOOT_VERSION
        )
        .map_err(|_| WriteError::CouldNotWriteYaml(Box::from(filename.as_ref())))?;

        serde_yaml::to_writer(&mut writer, self)
            .map_err(|_| WriteError::CouldNotWriteYaml(Box::from(filename.as_ref())))?;

        writer
            .flush()
            .map_err(|_| WriteError::CouldNotWriteYaml(Box::from(filename.as_ref())))
    }
}

/// Format a value for the output file. Non-finite values are written as `nan`, `inf` or `-inf`.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::from("nan")
    } else if value == f64::INFINITY {
        String::from("inf")
    } else if value == f64::NEG_INFINITY {
        String::from("-inf")
    } else {
        value.to_string()
    }
}

/// Back up the file if requested, then create it and open it for buffered writing.
fn prepare_file(
    filename: &impl AsRef<Path>,
    file_type: &str,
    backup: bool,
) -> Result<BufWriter<File>, WriteError> {
    try_backup_file(filename, file_type, backup)?;

    let file = File::create(filename.as_ref())
        .map_err(|_| WriteError::CouldNotCreateFile(Box::from(filename.as_ref())))?;

    Ok(BufWriter::new(file))
}

/// Back up an output file, if it exists and if it is requested.
fn try_backup_file(
    filename: &impl AsRef<Path>,
    file_type: &str,
    backup: bool,
) -> Result<(), WriteError> {
    let path = filename.as_ref();
    if path.exists() {
        if backup {
            log::warn!(
                "Output {} file '{}' already exists. Backing it up.",
                file_type,
                path.to_string_lossy()
            );
            backitup::backup(path).map_err(|_| WriteError::CouldNotBackupFile(Box::from(path)))?;
        } else {
            log::info!(
                "Output {} file '{}' already exists. It will be overwritten.",
                file_type,
                path.to_string_lossy()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use approx::assert_relative_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::colvar::{Colvar, Frame};
    use rand::{rngs::StdRng, SeedableRng};

    fn results(frames: Vec<Frame>, policy: SingularityPolicy) -> BootstrapResults {
        let bootstrap = Bootstrap::new()
            .colvar("COLVAR_test")
            .cv1("h12")
            .cv2("h34")
            .n_blocks(2)
            .n_picks(2)
            .iterations(20)
            .singularity(policy)
            .build()
            .unwrap();

        bootstrap.resample(&Colvar::from(frames), &mut StdRng::seed_from_u64(0))
    }

    fn mixed_frames() -> Vec<Frame> {
        (0..40)
            .map(|i| match i % 4 {
                0 => Frame::new(80.0, 80.0, (i % 3) as f64),
                1 => Frame::new(1.0, 1.0, 0.0),
                2 => Frame::new(80.0, 1.0, (i % 5) as f64),
                _ => Frame::new(1.0, 80.0, 1.0),
            })
            .collect()
    }

    #[test]
    fn statistics_population() {
        let stats = DifferenceStatistics::new(
            [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter(),
            SingularityPolicy::Propagate,
        );

        assert_relative_eq!(stats.mean(), 5.0);
        assert_relative_eq!(stats.std(), 2.0);
        assert_eq!(stats.n_samples(), 8);
    }

    #[test]
    fn statistics_propagate_infinite() {
        let stats = DifferenceStatistics::new(
            [1.0, f64::INFINITY, 3.0].into_iter(),
            SingularityPolicy::Propagate,
        );

        assert!(stats.mean().is_infinite());
        assert!(stats.std().is_nan());
        assert_eq!(stats.n_samples(), 3);
    }

    #[test]
    fn statistics_propagate_mixed_infinities() {
        let stats = DifferenceStatistics::new(
            [f64::INFINITY, 2.0, f64::NEG_INFINITY, 2.0].into_iter(),
            SingularityPolicy::Propagate,
        );

        assert!(stats.mean().is_nan());
        assert!(stats.std().is_nan());
        assert_eq!(stats.n_samples(), 4);
    }

    #[test]
    fn statistics_propagate_all_infinite() {
        let stats = DifferenceStatistics::new(
            [f64::INFINITY; 5].into_iter(),
            SingularityPolicy::Propagate,
        );

        assert_eq!(stats.mean(), f64::INFINITY);
        assert!(stats.std().is_nan());
        assert_eq!(stats.n_samples(), 5);
    }

    #[test]
    fn format_value_non_finite() {
        assert_eq!(format_value(f64::NAN), "nan");
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!("-inf".parse::<f64>().unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn statistics_exclude_infinite() {
        let stats = DifferenceStatistics::new(
            [1.0, f64::INFINITY, 3.0, f64::NAN, f64::NEG_INFINITY].into_iter(),
            SingularityPolicy::Exclude,
        );

        assert_relative_eq!(stats.mean(), 2.0);
        assert_relative_eq!(stats.std(), 1.0);
        assert_eq!(stats.n_samples(), 2);
    }

    #[test]
    fn statistics_exclude_all() {
        let stats = DifferenceStatistics::new(
            [f64::INFINITY, f64::NAN].into_iter(),
            SingularityPolicy::Exclude,
        );

        assert!(stats.mean().is_nan());
        assert!(stats.std().is_nan());
        assert_eq!(stats.n_samples(), 0);
    }

    #[test]
    fn write_dat_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.dat");

        let results = results(mixed_frames(), SingularityPolicy::Propagate);
        results.write_dat(&path, false).unwrap();

        let content = read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "# Closed interi interii");

        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].parse::<f64>().unwrap(), results.closed().std());
        assert_eq!(fields[1].parse::<f64>().unwrap(), results.interi().std());
        assert_eq!(fields[2].parse::<f64>().unwrap(), results.interii().std());
        assert_eq!(fields[3], "COLVAR_test");
    }

    #[test]
    fn write_dat_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.dat");
        std::fs::write(&path, "old content\n").unwrap();

        let results = results(mixed_frames(), SingularityPolicy::Propagate);
        results.write_dat(&path, false).unwrap();

        let content = read_to_string(&path).unwrap();
        assert!(content.starts_with("# Closed interi interii\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_dat_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.dat");
        std::fs::write(&path, "old content\n").unwrap();

        let results = results(mixed_frames(), SingularityPolicy::Propagate);
        results.write_dat(&path, true).unwrap();

        let content = read_to_string(&path).unwrap();
        assert!(content.starts_with("# Closed interi interii\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn write_dat_singular() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.dat");

        let results = results(
            vec![Frame::new(100.0, 100.0, 0.0); 10],
            SingularityPolicy::Propagate,
        );
        results.write_dat(&path, false).unwrap();

        let content = read_to_string(&path).unwrap();
        let line = content.lines().nth(1).unwrap();
        assert_eq!(line, "nan\tnan\tnan\tCOLVAR_test");
    }

    #[test]
    fn write_yaml_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.yaml");

        let results = results(mixed_frames(), SingularityPolicy::Exclude);
        results.write_yaml(&path, false).unwrap();

        let content = read_to_string(&path).unwrap();
        assert!(content.starts_with("# Block bootstrap performed with 'fesboot v"));

        let yaml: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(yaml["colvar"].as_str(), Some("COLVAR_test"));
        assert_eq!(yaml["n_frames"].as_u64(), Some(40));
        assert_eq!(yaml["n_blocks"].as_u64(), Some(2));
        assert_eq!(yaml["block_size"].as_u64(), Some(20));
        assert_eq!(yaml["iterations"].as_u64(), Some(20));
        assert_eq!(yaml["singularity"].as_str(), Some("exclude"));
        assert_eq!(yaml["singular"].as_u64(), Some(0));
        assert_eq!(yaml["closed"]["n_samples"].as_u64(), Some(20));
        assert_relative_eq!(
            yaml["closed"]["std"].as_f64().unwrap(),
            results.closed().std()
        );
        assert!(yaml.get("samples").is_none());
    }

    #[test]
    fn write_fail_directory() {
        let results = results(mixed_frames(), SingularityPolicy::Propagate);

        match results.write_dat("nonexistent_directory/boot.dat", false) {
            Err(WriteError::CouldNotCreateFile(_)) => (),
            Ok(_) => panic!("Function should have failed."),
            Err(e) => panic!("Incorrect error returned. {}", e),
        }
    }
}
