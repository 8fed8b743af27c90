// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Reading of PLUMED COLVAR files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;

use crate::errors::ColvarError;

/// Token introducing the list of fields in the header of a COLVAR file.
const FIELDS_PREFIX: &str = "#! FIELDS";

/// Values of the two collective variables and of the bias potential in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
pub struct Frame {
    #[getset(get_copy = "pub")]
    cv1: f64,
    #[getset(get_copy = "pub")]
    cv2: f64,
    #[getset(get_copy = "pub")]
    bias: f64,
}

impl Frame {
    #[inline(always)]
    pub fn new(cv1: f64, cv2: f64, bias: f64) -> Self {
        Frame { cv1, cv2, bias }
    }
}

/// Time series of the collective variables and of the bias potential.
#[derive(Debug, Clone, Getters)]
pub struct Colvar {
    /// Frames in the order in which they appear in the COLVAR file.
    #[getset(get = "pub")]
    frames: Vec<Frame>,
}

impl From<Vec<Frame>> for Colvar {
    fn from(frames: Vec<Frame>) -> Self {
        Colvar { frames }
    }
}

/// Parse the header line of a COLVAR file into a map of column names and column indices.
/// Returns `None` if the line is not a comment.
pub(crate) fn parse_header(line: &str) -> Option<IndexMap<String, usize>> {
    if !line.starts_with('#') {
        return None;
    }

    let fields = line.strip_prefix(FIELDS_PREFIX).unwrap_or(line);
    Some(
        fields
            .split_whitespace()
            .enumerate()
            .map(|(i, name)| (name.to_owned(), i))
            .collect(),
    )
}

/// Parse a single data line. Returns `Ok(None)` for lines that contain no data.
fn parse_line(line: &str) -> Result<Option<Vec<f64>>, String> {
    let data = match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    };

    if data.trim().is_empty() {
        return Ok(None);
    }

    data.split_whitespace()
        .map(|value| value.parse::<f64>().map_err(|_| value.to_owned()))
        .collect::<Result<Vec<f64>, String>>()
        .map(Some)
}

impl Colvar {
    /// Read a COLVAR file and extract the two collective variables and the bias.
    pub fn from_file(
        filename: impl AsRef<Path>,
        cv1: &str,
        cv2: &str,
        bias: &str,
    ) -> Result<Colvar, ColvarError> {
        let path = filename.as_ref();
        if !path.is_file() {
            return Err(ColvarError::FileNotFound(Box::from(path)));
        }

        let file = File::open(path).map_err(|_| ColvarError::CouldNotRead(Box::from(path)))?;
        let mut lines = BufReader::new(file).lines();

        let header = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(_)) => return Err(ColvarError::CouldNotRead(Box::from(path))),
            None => return Err(ColvarError::NoData(Box::from(path))),
        };

        let fields =
            parse_header(&header).ok_or_else(|| ColvarError::MissingHeader(Box::from(path)))?;

        let column = |name: &str| {
            fields
                .get(name)
                .copied()
                .ok_or_else(|| ColvarError::ColumnNotFound(name.to_owned(), Box::from(path)))
        };

        let columns = [column(cv1)?, column(cv2)?, column(bias)?];

        let mut frames = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line.map_err(|_| ColvarError::CouldNotRead(Box::from(path)))?;
            // the header is line 1
            let line_number = i + 2;

            let values = match parse_line(&line) {
                Ok(Some(values)) => values,
                Ok(None) => continue,
                Err(value) => {
                    return Err(ColvarError::CouldNotParseLine(
                        line_number,
                        Box::from(path),
                        value,
                    ))
                }
            };

            if values.len() != fields.len() {
                return Err(ColvarError::InconsistentColumns(
                    line_number,
                    Box::from(path),
                    values.len(),
                    fields.len(),
                ));
            }

            frames.push(Frame::new(
                values[columns[0]],
                values[columns[1]],
                values[columns[2]],
            ));
        }

        if frames.is_empty() {
            return Err(ColvarError::NoData(Box::from(path)));
        }

        Ok(Colvar { frames })
    }

    /// Get the number of frames.
    #[inline(always)]
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Log basic info about the time series.
    pub(crate) fn info(&self) {
        log::info!("Read {} frames from the COLVAR file.", self.n_frames());
    }
}
