//! Property databases that feed mappings.
//!
//! [`Hwdb`] reads udev hwdb *source* files. A record is one or more unindented match
//! lines followed by indented `KEY=VALUE` property lines; blank lines end records and
//! lines starting with `#` are comments.
//!
//! ```text
//! # Logitech receiver with a misreported Bluetooth key
//! evdev:input:b0003v046Dp*
//!  INMAP_MAP_KEY_UNKNOWN=BLUETOOTH
//! ```

use crate::err::HwdbError;

use glob::Pattern;
use log::{debug, trace, warn};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A single key/value pair attached to a device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Property {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Source of device properties, queried by modalias.
pub trait PropertyDatabase {
    /// Every property that applies to `modalias`, without duplicate names.
    /// An empty result means the device is unknown to the database.
    fn properties(&self, modalias: &str) -> Vec<Property>;
}

#[derive(Debug, Clone)]
struct Record {
    patterns: Vec<Pattern>,
    properties: Vec<Property>,
}

impl Record {
    fn matches(&self, modalias: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(modalias))
    }
}

/// An in-memory hwdb built from source files.
///
/// When several records match a modalias, all of their properties apply; a record that
/// appears later overrides the values of earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Hwdb {
    records: Vec<Record>,
}

enum State {
    None,
    Match { line: usize, patterns: Vec<Pattern> },
    Data(Record),
}

impl Hwdb {
    pub fn new() -> Self {
        Hwdb::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HwdbError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HwdbError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let hwdb = text.parse::<Hwdb>().map_err(|source| HwdbError::InFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        debug!(
            "loaded {} hwdb records from `{}`",
            hwdb.records.len(),
            path.display()
        );

        Ok(hwdb)
    }

    /// Loads every `*.hwdb` file of `dir` in lexical order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, HwdbError> {
        let pattern = format!(
            "{}/*.hwdb",
            Pattern::escape(&dir.as_ref().to_string_lossy())
        );

        let paths = glob::glob(&pattern).map_err(|source| HwdbError::InvalidDirectoryGlob {
            pattern: pattern.clone(),
            source,
        })?;

        let mut hwdb = Hwdb::new();
        for entry in paths {
            let path: PathBuf = entry.map_err(|e| HwdbError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;

            hwdb.extend(Hwdb::from_path(&path)?);
        }

        Ok(hwdb)
    }

    /// Appends the records of `other`, which take precedence over the existing ones.
    pub fn extend(&mut self, other: Hwdb) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn finish(state: State, records: &mut Vec<Record>) {
        match state {
            State::None => {}
            State::Match { line, patterns } => {
                warn!(
                    "line {}: ignoring hwdb record `{}` without properties",
                    line,
                    patterns.first().map(Pattern::as_str).unwrap_or_default()
                );
            }
            State::Data(record) => records.push(record),
        }
    }
}

impl FromStr for Hwdb {
    type Err = HwdbError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut records = Vec::new();
        let mut state = State::None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end();

            if line.starts_with('#') {
                continue;
            }

            if line.is_empty() {
                Hwdb::finish(std::mem::replace(&mut state, State::None), &mut records);
                continue;
            }

            if !line.starts_with(' ') && !line.starts_with('\t') {
                let pattern = Pattern::new(line).map_err(|source| HwdbError::InvalidMatch {
                    line: line_no,
                    pattern: line.to_owned(),
                    source,
                })?;

                state = match state {
                    State::Match { line, mut patterns } => {
                        patterns.push(pattern);
                        State::Match { line, patterns }
                    }
                    // A match right after properties starts the next record.
                    previous => {
                        Hwdb::finish(previous, &mut records);
                        State::Match {
                            line: line_no,
                            patterns: vec![pattern],
                        }
                    }
                };
                continue;
            }

            let text = line.trim_start();
            let (name, value) = text
                .split_once('=')
                .ok_or_else(|| HwdbError::MissingAssignment {
                    line: line_no,
                    text: text.to_owned(),
                })?;

            if name.is_empty() {
                return Err(HwdbError::EmptyKey { line: line_no });
            }

            let property = Property::new(name, value);
            trace!("line {}: property {:?}", line_no, property);

            state = match state {
                State::None => return Err(HwdbError::PropertyWithoutMatch { line: line_no }),
                State::Match { patterns, .. } => State::Data(Record {
                    patterns,
                    properties: vec![property],
                }),
                State::Data(mut record) => {
                    record.properties.push(property);
                    State::Data(record)
                }
            };
        }

        Hwdb::finish(state, &mut records);

        Ok(Hwdb { records })
    }
}

impl PropertyDatabase for Hwdb {
    fn properties(&self, modalias: &str) -> Vec<Property> {
        let mut merged = BTreeMap::new();

        for record in self.records.iter().filter(|r| r.matches(modalias)) {
            for property in &record.properties {
                merged.insert(property.name.as_str(), property.value.as_str());
            }
        }

        merged
            .into_iter()
            .map(|(name, value)| Property::new(name, value))
            .collect()
    }
}
