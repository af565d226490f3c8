use pepfrag::{
    ConfigurationError,
    IonParsingError,
    PepFragError,
};

#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    Calculation {
        source: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing input: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error accessing file {}: {}", path, source)
                } else {
                    write!(f, "Error accessing file: {}", source)
                }
            }
            CliError::Calculation { source } => {
                write!(f, "Error calculating fragment m/z values: {}", source)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn io_at(e: impl std::fmt::Display, path: &std::path::Path) -> Self {
        CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io {
            source: e.to_string(),
            path: None,
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::ParseError { msg: e.to_string() }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::ParseError { msg: e.to_string() }
    }
}

impl From<ConfigurationError> for CliError {
    fn from(e: ConfigurationError) -> Self {
        CliError::Config {
            source: format!("{:?}", e),
        }
    }
}

impl From<IonParsingError> for CliError {
    fn from(e: IonParsingError) -> Self {
        CliError::Config {
            source: format!("{:?}", e),
        }
    }
}

impl From<PepFragError> for CliError {
    fn from(e: PepFragError) -> Self {
        match e {
            PepFragError::Configuration(e) => e.into(),
            PepFragError::IonParsing(e) => e.into(),
            e => CliError::Calculation {
                source: format!("{:?}", e),
            },
        }
    }
}
