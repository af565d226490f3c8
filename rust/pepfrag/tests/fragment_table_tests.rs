use pepfrag::chemistry::MASS_PROTON;
use pepfrag::fragments::{
    calc_b_y_and_peptide_mass,
    calc_fragment_mz_values_for_same_peplen,
};
use pepfrag::{
    ChargedFragType,
    FragmentMzBuilder,
    ModificationRegistry,
    Precursor,
    PrecursorTable,
    concat_precursor_fragment_tables,
    create_fragment_mz_table,
    get_charged_frag_types,
    update_precursor_mz,
};

fn registry() -> ModificationRegistry {
    ModificationRegistry::builtin().unwrap()
}

fn sample_precursors() -> Vec<Precursor> {
    vec![
        Precursor::new(
            "PEPTMSDEK",
            vec!["Oxidation@M".into(), "Phospho@S".into()],
            vec![5, 6],
        )
        .unwrap()
        .with_charge(2),
        Precursor::unmodified("AMS").with_charge(1),
        Precursor::new("CAMSK", vec!["Carbamidomethyl@C".into()], vec![1])
            .unwrap()
            .with_charge(2),
        Precursor::new("QPEPTIDEK", vec!["Gln->pyro-Glu@Q^Any N-term".into()], vec![1])
            .unwrap()
            .with_charge(3),
        Precursor::new("AMSK", vec!["Oxidation@M".into()], vec![2])
            .unwrap()
            .with_charge(2)
            .with_mod_deltas(vec![0.984], vec![-1])
            .unwrap(),
        Precursor::unmodified("K").with_charge(1),
    ]
}

fn all_frag_types() -> Vec<ChargedFragType> {
    get_charged_frag_types(
        &[
            "b",
            "y",
            "b_modloss",
            "y_modloss",
            "b_H2O",
            "y_H2O",
            "b_NH3",
            "y_NH3",
            "c",
            "z",
        ],
        2,
    )
    .unwrap()
}

fn assert_close_slices(got: &[f64], expected: &[f64]) {
    assert_eq!(got.len(), expected.len());
    for (g, e) in got.iter().zip(expected.iter()) {
        assert!((g - e).abs() < 1e-9, "{} != {}", g, e);
    }
}

#[test]
fn test_ranges_partition_the_table() {
    let reg = registry();
    let types = all_frag_types();
    let mut precursors = PrecursorTable::new(sample_precursors()).unwrap();

    let table = create_fragment_mz_table(&reg, &mut precursors, &types, None, Some(2)).unwrap();

    assert!(precursors.is_sorted_by_peplen());
    let ranges = precursors.frag_ranges().unwrap();
    assert_eq!(ranges[0].start, 0);
    for (prec, range) in precursors.iter().zip(ranges.iter()) {
        assert_eq!(range.len(), prec.peplen() - 1);
    }
    for w in ranges.windows(2) {
        assert_eq!(w[0].end, w[1].start);
    }
    assert_eq!(ranges.last().unwrap().end, table.nrows());
    assert_eq!(table.columns(), &types[..]);
}

#[test]
fn test_batch_size_does_not_change_values() {
    let reg = registry();
    let types = all_frag_types();

    let mut first = PrecursorTable::new(sample_precursors()).unwrap();
    let table_first = create_fragment_mz_table(&reg, &mut first, &types, None, Some(1)).unwrap();

    let mut second = PrecursorTable::new(sample_precursors()).unwrap();
    let table_second = create_fragment_mz_table(&reg, &mut second, &types, None, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(table_first, table_second);
}

#[test]
fn test_rows_match_single_precursor_values() {
    let reg = registry();
    let types = all_frag_types();
    let mut precursors = PrecursorTable::new(sample_precursors()).unwrap();
    let table = create_fragment_mz_table(&reg, &mut precursors, &types, None, None).unwrap();

    for prec in precursors.iter() {
        let range = prec.frag_range.unwrap();
        let expected = calc_fragment_mz_values_for_same_peplen(&reg, &[prec], &types).unwrap();
        let got = table.read_slice(&[range], None).unwrap();
        assert_close_slices(got.values(), expected.values());
    }
}

#[test]
fn test_regenerate_against_reference() {
    let reg = registry();
    let by_types = get_charged_frag_types(&["b", "y"], 1).unwrap();
    let mut precursors = PrecursorTable::new(sample_precursors()).unwrap();
    let reference = create_fragment_mz_table(&reg, &mut precursors, &by_types, None, None).unwrap();

    // Re-order the collection while keeping its ranges
    let mut reversed = precursors.clone().into_inner();
    reversed.reverse();
    let mut reversed = PrecursorTable::new(reversed).unwrap();
    let ranges_before = reversed.frag_ranges().unwrap();

    let loss_types = get_charged_frag_types(&["b_modloss", "y_modloss", "b"], 1).unwrap();
    let table = FragmentMzBuilder::new(&reg, &loss_types)
        .with_batch_size(1)
        .build(&mut reversed, Some(&reference))
        .unwrap();

    assert_eq!(table.nrows(), reference.nrows());
    assert_eq!(table.columns(), &loss_types[..]);
    assert_eq!(reversed.frag_ranges().unwrap(), ranges_before);
    assert_eq!(reversed.get(0).unwrap().sequence, precursors.iter().last().unwrap().sequence);

    // The b column lands exactly where the reference has it
    let b_col: ChargedFragType = "b_z1".parse().unwrap();
    assert_close_slices(
        &table.column_values(&b_col).unwrap(),
        &reference.column_values(&b_col).unwrap(),
    );
}

#[test]
fn test_concat_shifts_ranges() {
    let reg = registry();
    let types = get_charged_frag_types(&["b", "y"], 1).unwrap();
    let samples = sample_precursors();

    let mut batch_a = PrecursorTable::new(samples[..3].to_vec()).unwrap();
    let table_a = create_fragment_mz_table(&reg, &mut batch_a, &types, None, None).unwrap();
    let mut batch_b = PrecursorTable::new(samples[3..].to_vec()).unwrap();
    let table_b = create_fragment_mz_table(&reg, &mut batch_b, &types, None, None).unwrap();

    // A companion table sharing the layout, e.g. intensities
    let intensity_a = pepfrag::FragmentTable::allocate_like(&table_a, &types[..1]).unwrap();
    let intensity_b = pepfrag::FragmentTable::allocate_like(&table_b, &types[..1]).unwrap();

    let rows_a = table_a.nrows();
    let ranges_a = batch_a.frag_ranges().unwrap();
    let ranges_b = batch_b.frag_ranges().unwrap();

    let (merged, merged_table, others) = concat_precursor_fragment_tables(
        vec![batch_a.clone(), batch_b.clone()],
        vec![table_a.clone(), table_b.clone()],
        vec![vec![intensity_a, intensity_b]],
    )
    .unwrap();

    assert_eq!(merged.len(), batch_a.len() + batch_b.len());
    assert_eq!(merged_table.nrows(), rows_a + table_b.nrows());
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].nrows(), merged_table.nrows());

    let merged_ranges = merged.frag_ranges().unwrap();
    assert_eq!(&merged_ranges[..ranges_a.len()], &ranges_a[..]);
    for (merged_range, range) in merged_ranges[ranges_a.len()..].iter().zip(ranges_b.iter()) {
        assert_eq!(*merged_range, range.shifted(rows_a));
        assert_eq!(
            merged_table.read_slice(&[*merged_range], None).unwrap(),
            table_b.read_slice(&[*range], None).unwrap()
        );
    }

    // Mismatched batch counts are rejected
    assert!(
        concat_precursor_fragment_tables(vec![batch_a], vec![table_a, table_b], vec![]).is_err()
    );
}

#[test]
fn test_ams_modloss_end_to_end() {
    let reg = registry()
        .with_importance_overrides_str(r#"{"Phospho@S": 1e8, "Oxidation@M": 1.0}"#)
        .unwrap();
    let types = get_charged_frag_types(&["b_modloss", "y_modloss"], 1).unwrap();
    let mut precursors = PrecursorTable::new(vec![
        Precursor::new(
            "AMS",
            vec!["Oxidation@M".into(), "Phospho@S".into()],
            vec![2, 3],
        )
        .unwrap(),
    ])
    .unwrap();
    let table = create_fragment_mz_table(&reg, &mut precursors, &types, None, None).unwrap();

    let prec = precursors.get(0).unwrap();
    let (b, y, _) = calc_b_y_and_peptide_mass(&reg, prec).unwrap();
    let ox_loss = reg.loss_mass("Oxidation@M").unwrap();
    let ph_loss = reg.loss_mass("Phospho@S").unwrap();

    let b_modloss = table.column_values(&types[0]).unwrap();
    let y_modloss = table.column_values(&types[1]).unwrap();
    assert_close_slices(&b_modloss, &[0.0, b[1] - ox_loss + MASS_PROTON]);
    assert_close_slices(
        &y_modloss,
        &[y[0] - ph_loss + MASS_PROTON, y[1] - ph_loss + MASS_PROTON],
    );
}

#[test]
fn test_precursor_mz_after_table_build() {
    let reg = registry();
    let types = get_charged_frag_types(&["b", "y"], 2).unwrap();
    let mut precursors = PrecursorTable::new(sample_precursors()).unwrap();
    create_fragment_mz_table(&reg, &mut precursors, &types, None, None).unwrap();
    let ranges = precursors.frag_ranges().unwrap();

    update_precursor_mz(&reg, &mut precursors, 2).unwrap();

    assert_eq!(precursors.frag_ranges().unwrap(), ranges);
    for prec in precursors.iter() {
        let (_, _, pepmass) = calc_b_y_and_peptide_mass(&reg, prec).unwrap();
        let charge = prec.charge.unwrap() as f64;
        let expected = pepmass / charge + MASS_PROTON;
        assert!((prec.precursor_mz.unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_empty_collection() {
    let reg = registry();
    let types = get_charged_frag_types(&["b"], 1).unwrap();
    let mut precursors = PrecursorTable::default();
    let table = create_fragment_mz_table(&reg, &mut precursors, &types, None, None).unwrap();
    assert_eq!(table.nrows(), 0);
    assert_eq!(table.ncols(), 1);
    assert!(precursors.is_empty());
}
