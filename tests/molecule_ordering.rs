use std::fs;

use tempfile::TempDir;

use permeafig::data::loader::load_molecules;

fn molecules_file(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("molecules.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn molecules_come_out_in_ascending_weight_order() {
    let dir = TempDir::new().unwrap();
    let path = molecules_file(
        &dir,
        "# Type,Name,MolWeight\nco2,CarbonDioxide,44\nh2o,Water,18\n",
    );

    let set = load_molecules(&path).unwrap();
    let codes: Vec<String> = set.iter().map(|m| m.code.clone()).collect();
    assert_eq!(codes, ["h2o", "co2"]);

    let weights: Vec<f64> = set.iter().map(|m| m.weight).collect();
    assert!(weights.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn equal_weights_keep_their_file_order() {
    let dir = TempDir::new().unwrap();
    let path = molecules_file(
        &dir,
        "Type,Name,MolWeight\nc3h8,Propane,44.1\nco2,CarbonDioxide,44.1\nh2o,Water,18\n",
    );

    let set = load_molecules(&path).unwrap();
    let codes: Vec<String> = set.iter().map(|m| m.code.clone()).collect();
    assert_eq!(codes, ["h2o", "c3h8", "co2"]);
}

#[test]
fn loading_twice_reproduces_the_same_order() {
    let dir = TempDir::new().unwrap();
    let path = molecules_file(
        &dir,
        "# Type,Name,MolWeight\nnh3,Ammonia,17.03\nh2o,Water,18.02\nco2,CarbonDioxide,44.01\n",
    );

    let first: Vec<String> = load_molecules(&path)
        .unwrap()
        .iter()
        .map(|m| m.code.clone())
        .collect();
    let second: Vec<String> = load_molecules(&path)
        .unwrap()
        .iter()
        .map(|m| m.code.clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first, ["nh3", "h2o", "co2"]);
}

#[test]
fn a_molecule_table_without_weights_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = molecules_file(&dir, "Type,Name\nh2o,Water\n");
    assert!(load_molecules(&path).is_err());
}
