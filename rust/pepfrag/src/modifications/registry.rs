use super::definition::{
    ModificationDefinition,
    ModificationSource,
    lower_case_site,
};
use crate::errors::{
    ConfigurationError,
    LookupError,
};
use std::collections::{
    BTreeMap,
    HashMap,
};
use std::io::Read;
use std::path::Path;
use tracing::{
    debug,
    info,
    warn,
};

const BUILTIN_MODIFICATIONS: &str = include_str!("../../data/modifications.json");
const BUILTIN_MODLOSS_IMPORTANCE: &str = include_str!("../../data/modloss_importance.json");

/// Immutable lookup of modification definitions by `name@site`.
///
/// Built once (definitions first, importance overrides second) and then
/// shared by reference with every calculator. Applying importance
/// overrides consumes the registry and returns a new one.
#[derive(Debug, Clone, Default)]
pub struct ModificationRegistry {
    definitions: HashMap<String, ModificationDefinition>,
}

impl ModificationRegistry {
    /// Registry over the embedded default definitions and modloss importance.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUILTIN_MODIFICATIONS)?
            .with_importance_overrides_str(BUILTIN_MODLOSS_IMPORTANCE)
    }

    pub fn from_sources(sources: &BTreeMap<String, ModificationSource>) -> Result<Self, ConfigurationError> {
        let mut definitions = HashMap::with_capacity(sources.len() * 2);
        for (key, source) in sources.iter() {
            let def = ModificationDefinition::from_source(key, source)?;
            definitions.insert(key.clone(), def);
        }

        // Lower case variants never shadow an explicit definition.
        let mut num_aux = 0;
        for key in sources.keys() {
            let def = &definitions[key];
            let Some(site) = lower_case_site(&def.site) else {
                continue;
            };
            let aux = def.with_site(site);
            if sources.contains_key(&aux.name) {
                continue;
            }
            definitions.insert(aux.name.clone(), aux);
            num_aux += 1;
        }
        debug!(
            "Loaded {} modification definitions ({} lower case variants)",
            definitions.len(),
            num_aux
        );

        Ok(Self { definitions })
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigurationError> {
        let sources: BTreeMap<String, ModificationSource> = serde_json::from_str(source)
            .map_err(|e| ConfigurationError::SourceParsingError {
                source: e,
                context: "Modification definitions",
            })?;
        Self::from_sources(&sources)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigurationError> {
        let sources: BTreeMap<String, ModificationSource> = serde_json::from_reader(reader)
            .map_err(|e| ConfigurationError::SourceParsingError {
                source: e,
                context: "Modification definitions",
            })?;
        Self::from_sources(&sources)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        info!("Reading modification definitions from {}", path.display());
        let content = read_source(path)?;
        Self::from_json_str(&content)
    }

    /// Adds (or replaces) definitions on top of the current ones.
    ///
    /// Importance of replaced entries is reset to 0, the lower case
    /// variants of the new keys are synthesized like at load time.
    pub fn with_definitions(
        self,
        sources: &BTreeMap<String, ModificationSource>,
    ) -> Result<Self, ConfigurationError> {
        let added = Self::from_sources(sources)?;
        let mut definitions = self.definitions;
        for (key, def) in added.definitions {
            // An auxiliary variant from `sources` must not shadow an
            // explicit entry that already exists.
            if !def.upper_case_aa
                && definitions.get(&key).is_some_and(|x| x.upper_case_aa)
            {
                continue;
            }
            definitions.insert(key, def);
        }
        Ok(Self { definitions })
    }

    /// Returns a registry where the importance of every named modification
    /// is replaced. Entries not named keep their current importance.
    ///
    /// Names are matched exactly, so an override of `Phospho@S` does not
    /// touch `Phospho@s`. Names absent from the registry are skipped.
    pub fn with_importance_overrides(
        self,
        overrides: &HashMap<String, f64>,
    ) -> Result<Self, ConfigurationError> {
        let mut definitions = self.definitions;
        let mut num_applied = 0;
        for (name, &value) in overrides.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidImportance {
                    name: name.clone(),
                    value,
                });
            }
            match definitions.get_mut(name) {
                Some(def) => {
                    def.importance = value;
                    num_applied += 1;
                }
                None => warn!(
                    "Modloss importance given for unknown modification {}, ignoring it",
                    name
                ),
            }
        }
        debug!("Applied {} modloss importance overrides", num_applied);
        Ok(Self { definitions })
    }

    pub fn with_importance_overrides_str(self, source: &str) -> Result<Self, ConfigurationError> {
        let overrides: HashMap<String, f64> = serde_json::from_str(source).map_err(|e| {
            ConfigurationError::SourceParsingError {
                source: e,
                context: "Modloss importance",
            }
        })?;
        self.with_importance_overrides(&overrides)
    }

    pub fn with_importance_overrides_path(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        info!("Reading modloss importance from {}", path.display());
        let content = read_source(path)?;
        self.with_importance_overrides_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<&ModificationDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModificationDefinition> {
        self.definitions.values()
    }

    fn lookup(&self, name: &str) -> Result<&ModificationDefinition, LookupError> {
        self.definitions
            .get(name)
            .ok_or_else(|| LookupError::UnknownModification {
                name: name.to_string(),
            })
    }

    pub fn mass(&self, name: &str) -> Result<f64, LookupError> {
        Ok(self.lookup(name)?.mass)
    }

    pub fn loss_mass(&self, name: &str) -> Result<f64, LookupError> {
        Ok(self.lookup(name)?.modloss_mass)
    }

    pub fn composition(&self, name: &str) -> Result<&str, LookupError> {
        Ok(&self.lookup(name)?.composition)
    }

    /// Modloss importance, 0 for names that are not registered.
    pub fn importance(&self, name: &str) -> f64 {
        self.definitions
            .get(name)
            .map(|x| x.importance)
            .unwrap_or(0.0)
    }
}

fn read_source(path: &Path) -> Result<String, ConfigurationError> {
    let mut content = String::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_string(&mut content))
        .map_err(|e| ConfigurationError::SourceReadingError {
            source: e,
            path: path.to_path_buf(),
        })?;
    Ok(content)
}
