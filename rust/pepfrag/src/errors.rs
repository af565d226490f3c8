use std::path::PathBuf;

/// Problems with the declarative sources (modification definitions,
/// importance overrides, element formulas).
///
/// These are raised while building a registry and are never
/// recoverable at calculation time.
#[derive(Debug)]
pub enum ConfigurationError {
    MissingSiteSeparator {
        key: String,
    },
    InvalidFormula {
        formula: String,
        context: &'static str,
    },
    UnknownElement {
        element: String,
        formula: String,
    },
    InvalidImportance {
        name: String,
        value: f64,
    },
    SourceParsingError {
        source: serde_json::Error,
        context: &'static str,
    },
    SourceReadingError {
        source: std::io::Error,
        path: PathBuf,
    },
}

#[derive(Debug)]
pub enum LookupError {
    UnknownModification { name: String },
    UnknownAminoAcid { residue: char, sequence: String },
    UnknownColumn { column: String },
}

#[derive(Debug)]
pub enum ShapeError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    PeptideTooShort {
        peplen: usize,
    },
    ModificationSiteOutOfRange {
        site: i32,
        peplen: usize,
    },
    MissingReferenceTable,
    MissingFragmentRange {
        sequence: String,
    },
    FragmentRangeMismatch {
        start: usize,
        end: usize,
        peplen: usize,
    },
    FragmentRangeOutOfBounds {
        end: usize,
        nrows: usize,
    },
    MissingCharge {
        sequence: String,
    },
    ColumnMismatch {
        context: String,
    },
    DuplicateColumn {
        column: String,
    },
    OverlappingFragmentRanges {
        end: usize,
        next_start: usize,
    },
    EmptyBatchList,
    ZeroBatchSize,
}

#[derive(Debug)]
pub enum IonParsingError {
    UnsupportedIonType { ion_type: String },
    InvalidCharge { token: String },
    MissingChargeSuffix { token: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for IonParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub enum PepFragError {
    Configuration(ConfigurationError),
    Lookup(LookupError),
    Shape(ShapeError),
    IonParsing(IonParsingError),
}

impl std::fmt::Display for PepFragError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for PepFragError {}

pub type Result<T> = std::result::Result<T, PepFragError>;

impl From<ConfigurationError> for PepFragError {
    fn from(x: ConfigurationError) -> Self {
        Self::Configuration(x)
    }
}

impl From<LookupError> for PepFragError {
    fn from(x: LookupError) -> Self {
        Self::Lookup(x)
    }
}

impl From<ShapeError> for PepFragError {
    fn from(x: ShapeError) -> Self {
        Self::Shape(x)
    }
}

impl From<IonParsingError> for PepFragError {
    fn from(x: IonParsingError) -> Self {
        Self::IonParsing(x)
    }
}
