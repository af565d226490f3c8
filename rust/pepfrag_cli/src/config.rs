use pepfrag::DEFAULT_BATCH_SIZE;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::BuildArgs;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub modifications: ModificationConfig,
    #[serde(default)]
    pub fragments: FragmentConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    /// Tab separated precursor list.
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ModificationConfig {
    /// Replaces the built-in modification definitions.
    #[serde(default)]
    pub definitions: Option<PathBuf>,
    /// Added on top of the (built-in or replaced) definitions.
    #[serde(default)]
    pub extra_definitions: Option<PathBuf>,
    /// Modloss importance overrides, applied last.
    #[serde(default)]
    pub importance: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FragmentConfig {
    pub frag_types: Vec<String>,
    pub max_frag_charge: u8,
    pub batch_size: usize,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            frag_types: vec![
                "b".to_string(),
                "y".to_string(),
                "b_modloss".to_string(),
                "y_modloss".to_string(),
            ],
            max_frag_charge: 2,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Number of fragment rows per written chunk.
    #[serde(default = "default_write_chunk_size")]
    pub write_chunk_size: usize,
}

fn default_write_chunk_size() -> usize {
    100_000
}

impl Config {
    pub fn template() -> Self {
        Self {
            input: Some(InputConfig {
                path: PathBuf::from("precursors_template.tsv"),
            }),
            modifications: ModificationConfig::default(),
            fragments: FragmentConfig::default(),
            output: Some(OutputConfig {
                directory: PathBuf::from("pepfrag_output"),
                write_chunk_size: default_write_chunk_size(),
            }),
        }
    }

    /// Command line arguments take precedence over the config file.
    pub fn with_cli_args(mut self, args: &BuildArgs) -> Result<Self, CliError> {
        if let Some(input) = &args.input {
            self.input = Some(InputConfig {
                path: input.clone(),
            });
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(match self.output {
                Some(out) => OutputConfig {
                    directory: output_dir.clone(),
                    ..out
                },
                None => OutputConfig {
                    directory: output_dir.clone(),
                    write_chunk_size: default_write_chunk_size(),
                },
            });
        }
        if let Some(modifications) = &args.modifications {
            self.modifications.definitions = Some(modifications.clone());
        }
        if let Some(importance) = &args.importance {
            self.modifications.importance = Some(importance.clone());
        }

        if self.input.is_none() {
            return Err(CliError::Config {
                source: "No input provided, please provide one in either the config file or with the --input flag".to_string(),
            });
        }
        if self.output.is_none() {
            return Err(CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
        if self.fragments.batch_size == 0 {
            return Err(CliError::Config {
                source: "fragments.batch_size has to be larger than 0".to_string(),
            });
        }
        if self.output.as_ref().is_some_and(|x| x.write_chunk_size == 0) {
            return Err(CliError::Config {
                source: "output.write_chunk_size has to be larger than 0".to_string(),
            });
        }
        Ok(self)
    }
}
