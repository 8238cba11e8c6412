//! End-to-end CLI test following the teacher's `tests/integration.rs`
//! pattern: build the binary with `escargot`, drive it through a temp
//! directory with `assert_cmd`/`assert_fs`, and assert on the written
//! tables with `predicates`.

use std::error::Error;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::process::Command;

use assert_cmd::prelude::OutputAssertExt;
use assert_fs::{fixture::PathChild, TempDir};
use flate2::read::MultiGzDecoder;

fn read_maybe_gz(path: &std::path::Path) -> String {
    let mut raw = Vec::new();
    File::open(path).unwrap().read_to_end(&mut raw).unwrap();
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut out = String::new();
        MultiGzDecoder::new(raw.as_slice()).read_to_string(&mut out).unwrap();
        out
    } else {
        String::from_utf8(raw).unwrap()
    }
}

#[test]
fn build_catalog_then_profile_coverage() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;

    let run = escargot::CargoBuild::new().bin("kmcp").run()?;
    let kmcp = run.path().as_os_str().to_owned();

    let definitions_path = temp_dir.child("definitions.tsv");
    writeln!(File::create(definitions_path.path())?, "M00001\tK00001 K00002\nM00002\tK00003,K00004")?;

    let names_path = temp_dir.child("names.tsv");
    writeln!(File::create(names_path.path())?, "M00001\tFirst module\nM00002\tSecond module")?;

    let classes_path = temp_dir.child("classes.tsv");
    writeln!(File::create(classes_path.path())?, "M00001\tPathway modules")?;

    let database_path = temp_dir.child("db.kmcp.gz");
    Command::new(&kmcp)
        .arg("build-catalog")
        .arg("--definitions")
        .arg(definitions_path.path())
        .arg("--names")
        .arg(names_path.path())
        .arg("--classes")
        .arg(classes_path.path())
        .arg("--output")
        .arg(database_path.path())
        .arg("--version-tag")
        .arg("2026-01-01")
        .assert()
        .success();

    assert!(database_path.path().exists());
    let version_tag = fs::read_to_string(format!("{}.version", database_path.path().display()))?;
    assert_eq!(version_tag, "2026-01-01");

    let kos_path = temp_dir.child("genome.kos");
    writeln!(File::create(kos_path.path())?, "K00001\nK00002\nK00003")?;

    let output_dir = temp_dir.child("out");
    Command::new(&kmcp)
        .arg("profile-coverage")
        .arg("--kos")
        .arg(kos_path.path())
        .arg("--name")
        .arg("sample1")
        .arg("--database")
        .arg(database_path.path())
        .arg("--output-dir")
        .arg(output_dir.path())
        .assert()
        .success();

    let coverage = read_maybe_gz(&output_dir.path().join("coverage.tsv.gz"));
    let mut lines = coverage.lines();
    assert_eq!(lines.next().unwrap(), "id_genome\tM00001\tM00002");
    let row: Vec<&str> = lines.next().unwrap().split('\t').collect();
    assert_eq!(row[0], "sample1");
    assert_eq!(row[1], "1");
    assert_eq!(row[2], "1");

    Ok(())
}

#[test]
fn enrich_reports_lower_p_value_for_matching_module() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let run = escargot::CargoBuild::new().bin("kmcp").run()?;
    let kmcp = run.path().as_os_str().to_owned();

    let definitions_path = temp_dir.child("definitions.tsv");
    writeln!(
        File::create(definitions_path.path())?,
        "M00001\tK00001 K00002\nM99999\tK09000 K09001"
    )?;
    let names_path = temp_dir.child("names.tsv");
    File::create(names_path.path())?;
    let classes_path = temp_dir.child("classes.tsv");
    File::create(classes_path.path())?;

    let database_path = temp_dir.child("db.kmcp.gz");
    Command::new(&kmcp)
        .arg("build-catalog")
        .arg("--definitions")
        .arg(definitions_path.path())
        .arg("--names")
        .arg(names_path.path())
        .arg("--classes")
        .arg(classes_path.path())
        .arg("--output")
        .arg(database_path.path())
        .assert()
        .success();

    let kos_path = temp_dir.child("query.kos");
    writeln!(File::create(kos_path.path())?, "K00001\nK00002")?;

    let output_path = temp_dir.child("enrichment.tsv");
    Command::new(&kmcp)
        .arg("enrich")
        .arg("--kos")
        .arg(kos_path.path())
        .arg("--database")
        .arg(database_path.path())
        .arg("--output")
        .arg(output_path.path())
        .assert()
        .success();

    let contents = fs::read_to_string(output_path.path())?;
    let mut rows: Vec<&str> = contents.lines().skip(1).collect();
    rows.sort();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.starts_with("M00001")));

    Ok(())
}
