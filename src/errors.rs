// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains error types that can be returned by the `fesboot` crate.

use std::path::Path;

use colored::{ColoredString, Colorize};
use thiserror::Error;

fn path_to_yellow(path: &Path) -> ColoredString {
    path.to_string_lossy().yellow()
}

/// Errors that can occur when reading a COLVAR file.
#[derive(Error, Debug)]
pub enum ColvarError {
    #[error("{} COLVAR file '{}' does not exist", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),

    #[error("{} could not read COLVAR file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotRead(Box<Path>),

    #[error("{} COLVAR file '{}' does not start with a header line ('#! FIELDS ...')", "error:".red().bold(), path_to_yellow(.0))]
    MissingHeader(Box<Path>),

    #[error("{} column '{}' was not found in the header of COLVAR file '{}'", "error:".red().bold(), .0.yellow(), path_to_yellow(.1))]
    ColumnNotFound(String, Box<Path>),

    #[error("{} could not parse line '{}' of COLVAR file '{}' ('{}' is not a number)", "error:".red().bold(), .0.to_string().yellow(), path_to_yellow(.1), .2.yellow())]
    CouldNotParseLine(usize, Box<Path>, String),

    #[error("{} line '{}' of COLVAR file '{}' contains '{}' values but the header declares '{}' columns", "error:".red().bold(), .0.to_string().yellow(), path_to_yellow(.1), .2.to_string().yellow(), .3.to_string().yellow())]
    InconsistentColumns(usize, Box<Path>, usize, usize),

    #[error("{} COLVAR file '{}' contains no data", "error:".red().bold(), path_to_yellow(.0))]
    NoData(Box<Path>),
}

/// Errors that can occur when specifying the parameters of the bootstrap.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} could not open the configuration file '{}'", "error:".red().bold(), .0.yellow())]
    CouldNotOpenConfig(String),

    #[error("{} could not understand the contents of the configuration file '{}' ({})", "error:".red().bold(), .0.yellow(), .1)]
    CouldNotParseConfig(String, serde_yaml::Error),

    #[error("{} the number of blocks must be at least 1", "error:".red().bold())]
    InvalidNBlocks,

    #[error("{} the number of picked blocks must be at least 1", "error:".red().bold())]
    InvalidNPicks,

    #[error("{} the number of bootstrap iterations must be at least 1", "error:".red().bold())]
    InvalidIterations,

    #[error("{} kbt must be a positive finite number (got '{}')", "error:".red().bold(), .0.to_string().yellow())]
    InvalidKbt(f64),

    #[error("{} the lower CV boundary ('{}') is higher than the upper CV boundary ('{}')", "error:".red().bold(), .0.to_string().yellow(), .1.to_string().yellow())]
    InvalidBoundaries(f64, f64),
}

/// Errors that can occur while writing the results.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{} could not create file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreateFile(Box<Path>),

    #[error("{} could not create a backup for file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotBackupFile(Box<Path>),

    #[error("{} could not write results into '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotWriteResults(Box<Path>),

    #[error("{} could not write results in yaml format into '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotWriteYaml(Box<Path>),
}

/// Errors that can occur when running the bootstrap analysis.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("{}", .0)]
    Colvar(#[from] ColvarError),

    #[error("{}", .0)]
    Config(#[from] ConfigError),

    #[error("{}", .0)]
    Write(#[from] WriteError),
}
