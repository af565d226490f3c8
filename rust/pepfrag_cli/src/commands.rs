use pepfrag::modifications::ModificationSource;
use pepfrag::{
    ModificationRegistry,
    create_fragment_mz_table,
    get_charged_frag_types,
    update_precursor_mz,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;
use tracing::{
    info,
    instrument,
    warn,
};

use crate::cli::{
    BuildArgs,
    WriteTemplateArgs,
};
use crate::config::{
    Config,
    ModificationConfig,
};
use crate::errors::CliError;
use crate::io::{
    read_precursors,
    write_fragment_table,
    write_precursors,
};

const PRECURSOR_TEMPLATE: &str = "sequence\tmods\tmod_sites\tcharge\tmod_deltas\tmod_delta_sites
PEPTIDEK\t\t\t2\t\t
AMSK\tOxidation@M;Phospho@S\t2;3\t2\t\t
QPEPTMSK\tGln->pyro-Glu@Q^Any N-term;Oxidation@M\t1;6\t3\t0.984\t-1
";

const IMPORTANCE_TEMPLATE: &str = r#"{
    "Phospho@S": 1e8,
    "Phospho@T": 1e8,
    "Oxidation@M": 1.0
}
"#;

fn read_config(path: &std::path::Path) -> Result<Config, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::io_at(e, path))?;
    serde_json::from_str(&content).map_err(|e| CliError::ParseError { msg: e.to_string() })
}

/// Built-in (or replaced) definitions, then extra definitions, then
/// importance overrides.
pub fn load_registry(config: &ModificationConfig) -> Result<ModificationRegistry, CliError> {
    let mut registry = match &config.definitions {
        Some(path) => ModificationRegistry::from_path(path)?,
        None => ModificationRegistry::builtin()?,
    };
    if let Some(path) = &config.extra_definitions {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io_at(e, path))?;
        let extra: BTreeMap<String, ModificationSource> = serde_json::from_str(&content)?;
        info!("Adding {} modification definitions from {}", extra.len(), path.display());
        registry = registry.with_definitions(&extra)?;
    }
    if let Some(path) = &config.importance {
        registry = registry.with_importance_overrides_path(path)?;
    }
    info!("Modification registry has {} entries", registry.len());
    Ok(registry)
}

/// Main function for the 'build' subcommand.
#[instrument]
pub fn main_build(args: BuildArgs) -> Result<(), CliError> {
    let start = Instant::now();
    let config = read_config(&args.config)?.with_cli_args(&args)?;
    info!("Parsed configuration: {:#?}", config);

    let (Some(input), Some(output)) = (&config.input, &config.output) else {
        return Err(CliError::Config {
            source: "Input and output have to be set".to_string(),
        });
    };

    let registry = load_registry(&config.modifications)?;
    let frag_types = get_charged_frag_types(
        &config.fragments.frag_types,
        config.fragments.max_frag_charge,
    )?;
    let mut precursors = read_precursors(&input.path)?;

    let table = create_fragment_mz_table(
        &registry,
        &mut precursors,
        &frag_types,
        None,
        Some(config.fragments.batch_size),
    )?;

    if precursors.iter().all(|x| x.charge.is_some_and(|c| c > 0)) {
        update_precursor_mz(&registry, &mut precursors, config.fragments.batch_size)?;
    } else {
        warn!("Some precursors have no charge, skipping the precursor m/z calculation");
    }

    std::fs::create_dir_all(&output.directory)
        .map_err(|e| CliError::io_at(e, &output.directory))?;

    let precursor_path = output.directory.join("precursors.tsv");
    let file = File::create(&precursor_path).map_err(|e| CliError::io_at(e, &precursor_path))?;
    write_precursors(BufWriter::new(file), &precursors)?;
    info!("Wrote precursors to {}", precursor_path.display());

    let fragment_path = output.directory.join("fragment_mz.tsv");
    let file = File::create(&fragment_path).map_err(|e| CliError::io_at(e, &fragment_path))?;
    write_fragment_table(BufWriter::new(file), &table, output.write_chunk_size)?;
    info!("Wrote fragment m/z table to {}", fragment_path.display());

    println!(
        "Processed {} precursors into {} fragment rows in {:?}",
        precursors.len(),
        table.nrows(),
        start.elapsed()
    );
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_path;
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("config_template.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&Config::template())?)?;
    let precursor_path = target_dir.join("precursors_template.tsv");
    std::fs::write(&precursor_path, PRECURSOR_TEMPLATE)?;
    let importance_path = target_dir.join("modloss_importance_template.json");
    std::fs::write(&importance_path, IMPORTANCE_TEMPLATE)?;
    println!(
        "Wrote templates to:\n- {}\n- {}\n- {}",
        config_path.display(),
        precursor_path.display(),
        importance_path.display()
    );
    Ok(())
}
