use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("verdure"));
    cmd.arg("tests/fixtures/scenario.csv")
        .arg("--catalog")
        .arg("tests/fixtures/catalog.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "order,user,status,total,shipping,items",
        ))
        // Order 1: one Monstera, paid then advanced to preparing by the admin.
        .stdout(predicate::str::contains(",1,preparing,15000,3000,1"))
        // Order 2: two Hoya, exactly at the free-shipping threshold.
        .stdout(predicate::str::contains(",2,paid,50000,0,1"))
        // Order 3: one Ficus at sale price, cancelled by its owner.
        .stdout(predicate::str::contains(",1,cancelled,32000,3000,1"))
        // The malformed last row is reported, not fatal.
        .stderr(predicate::str::contains("Error reading event"));

    Ok(())
}

#[test]
fn test_cli_rejects_missing_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("verdure"));
    cmd.arg("tests/fixtures/scenario.csv")
        .arg("--catalog")
        .arg("tests/fixtures/no_such_file.csv");

    cmd.assert().failure();

    Ok(())
}
