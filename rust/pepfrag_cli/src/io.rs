use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use pepfrag::{
    FragmentTable,
    Precursor,
    PrecursorTable,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    Read,
    Write,
};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::errors::CliError;

const LIST_SEPARATOR: char = ';';

/// One line of the precursor TSV, list columns are `;` separated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrecursorRow {
    sequence: String,
    #[serde(default)]
    mods: String,
    #[serde(default)]
    mod_sites: String,
    #[serde(default)]
    charge: Option<u8>,
    #[serde(default)]
    mod_deltas: String,
    #[serde(default)]
    mod_delta_sites: String,
    #[serde(default)]
    precursor_mz: Option<f64>,
    #[serde(default)]
    frag_start_idx: Option<usize>,
    #[serde(default)]
    frag_end_idx: Option<usize>,
}

fn split_list<T: FromStr>(field: &str, column: &str) -> Result<Vec<T>, CliError>
where
    T::Err: std::fmt::Display,
{
    field
        .split(LIST_SEPARATOR)
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| {
            x.parse::<T>().map_err(|e| CliError::ParseError {
                msg: format!("Invalid value {:?} in column {}: {}", x, column, e),
            })
        })
        .collect()
}

fn join_list<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

impl PrecursorRow {
    fn into_precursor(self) -> Result<Precursor, CliError> {
        let mods: Vec<String> = split_list(&self.mods, "mods")?;
        let mod_sites: Vec<i32> = split_list(&self.mod_sites, "mod_sites")?;
        let mod_deltas: Vec<f64> = split_list(&self.mod_deltas, "mod_deltas")?;
        let mod_delta_sites: Vec<i32> = split_list(&self.mod_delta_sites, "mod_delta_sites")?;
        let mut prec = Precursor::new(self.sequence, mods, mod_sites)?
            .with_mod_deltas(mod_deltas, mod_delta_sites)?;
        prec.charge = self.charge;
        Ok(prec)
    }

    fn from_precursor(prec: &Precursor) -> Self {
        Self {
            sequence: prec.sequence.clone(),
            mods: join_list(&prec.mods),
            mod_sites: join_list(&prec.mod_sites),
            charge: prec.charge,
            mod_deltas: join_list(&prec.mod_deltas),
            mod_delta_sites: join_list(&prec.mod_delta_sites),
            precursor_mz: prec.precursor_mz,
            frag_start_idx: prec.frag_range.map(|x| x.start),
            frag_end_idx: prec.frag_range.map(|x| x.end),
        }
    }
}

/// Reads precursors from a tab separated reader with a header line.
///
/// Fragment ranges in the input are ignored, they only mean something
/// next to the table they were built with.
pub fn read_precursors_from_reader<R: Read>(reader: R) -> Result<PrecursorTable, CliError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let mut precursors = Vec::new();
    for row in rdr.deserialize::<PrecursorRow>() {
        precursors.push(row?.into_precursor()?);
    }
    Ok(PrecursorTable::new(precursors)?)
}

pub fn read_precursors(path: &Path) -> Result<PrecursorTable, CliError> {
    info!("Reading precursors from {}", path.display());
    let file = std::fs::File::open(path).map_err(|e| CliError::io_at(e, path))?;
    let out = read_precursors_from_reader(file)?;
    info!("Read {} precursors", out.len());
    Ok(out)
}

pub fn write_precursors<W: Write>(writer: W, precursors: &PrecursorTable) -> Result<(), CliError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    for prec in precursors.iter() {
        wtr.serialize(PrecursorRow::from_precursor(prec))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the table with one header column per charged fragment type,
/// in chunks of `chunk_size` rows.
pub fn write_fragment_table<W: Write>(
    writer: W,
    table: &FragmentTable,
    chunk_size: usize,
) -> Result<(), CliError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    wtr.write_record(table.columns().iter().map(|x| x.to_string()))?;

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| CliError::Config {
        source: e.to_string(),
    })?;
    let nrows = table.nrows();
    let nchunks = nrows.div_ceil(chunk_size);
    for chunk_idx in (0..nchunks).progress_with_style(style) {
        let end = ((chunk_idx + 1) * chunk_size).min(nrows);
        for row in (chunk_idx * chunk_size)..end {
            if let Some(values) = table.row(row) {
                wtr.write_record(values.iter().map(|x| x.to_string()))?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "sequence\tmods\tmod_sites\tcharge\n\
        PEPTIDEK\t\t\t2\n\
        AMSK\tOxidation@M;Phospho@S\t2;3\t1\n\
        GGG\t\t\t\n";

    #[test]
    fn test_read_precursors() {
        let precursors = read_precursors_from_reader(INPUT.as_bytes()).unwrap();
        assert_eq!(precursors.len(), 3);
        let amsk = precursors.get(1).unwrap();
        assert_eq!(amsk.mods, vec!["Oxidation@M", "Phospho@S"]);
        assert_eq!(amsk.mod_sites, vec![2, 3]);
        assert_eq!(amsk.charge, Some(1));
        assert!(amsk.mod_deltas.is_empty());
        assert_eq!(precursors.get(2).unwrap().charge, None);
        assert!(!precursors.has_frag_indices());
    }

    #[test]
    fn test_bad_lists() {
        let input = "sequence\tmods\tmod_sites\nAMSK\tOxidation@M\ttwo\n";
        assert!(matches!(
            read_precursors_from_reader(input.as_bytes()),
            Err(CliError::ParseError { .. })
        ));
        let input = "sequence\tmods\tmod_sites\nAMSK\tOxidation@M\t2;3\n";
        assert!(read_precursors_from_reader(input.as_bytes()).is_err());
    }

    #[test]
    fn test_write_precursors() {
        let mut precursors = read_precursors_from_reader(INPUT.as_bytes()).unwrap();
        precursors.reset_frag_indices();
        let mut out = Vec::new();
        write_precursors(&mut out, &precursors).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "sequence\tmods\tmod_sites\tcharge\tmod_deltas\tmod_delta_sites\tprecursor_mz\tfrag_start_idx\tfrag_end_idx"
        );
        assert_eq!(lines.next().unwrap(), "PEPTIDEK\t\t\t2\t\t\t\t0\t7");
        assert_eq!(lines.next().unwrap(), "AMSK\tOxidation@M;Phospho@S\t2;3\t1\t\t\t\t7\t10");
    }

    #[test]
    fn test_write_fragment_table() {
        let types = pepfrag::get_charged_frag_types(&["b", "y"], 1).unwrap();
        let (table, _) = FragmentTable::allocate(&[3, 2], &types).unwrap();
        let mut out = Vec::new();
        write_fragment_table(&mut out, &table, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 3);
        assert_eq!(lines[0], "b_z1\ty_z1");
        assert_eq!(lines[1], "0\t0");
    }
}
