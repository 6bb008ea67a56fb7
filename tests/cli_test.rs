use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

type StdResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn missing_shuffledir_fails() -> StdResult {
    let mut cmd = Command::cargo_bin("puzzlelayers")?;
    cmd.assert().failure();
    Ok(())
}

#[test]
fn help_mentions_flags() -> StdResult {
    let mut cmd = Command::cargo_bin("puzzlelayers")?;
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shuffledir"))
        .stdout(predicate::str::contains("--limit"));
    Ok(())
}

#[test]
fn reports_first_two_layers() -> StdResult {
    let tmp = tempdir()?;
    let prefix = tmp.path().join("shuffle");

    let mut cmd = Command::cargo_bin("puzzlelayers")?;
    let output = cmd
        .arg("-l")
        .arg("2")
        .arg(prefix.to_str().unwrap())
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout)?;
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("7755605021665492992000000"));
    assert_eq!(lines.next(), Some(""));
    assert!(lines.next().unwrap().trim_start().starts_with("0:"));
    assert!(lines.next().unwrap().trim_start().starts_with("1:"));
    assert!(lines.next().unwrap().trim_start().starts_with("2:"));
    assert!(lines.next().is_none());
    Ok(())
}

#[test]
fn sampling_writes_a_sample_file() -> StdResult {
    let tmp = tempdir()?;
    let prefix = tmp.path().join("shuffle");
    let samples = tmp.path().join("samples.bin");

    let mut cmd = Command::cargo_bin("puzzlelayers")?;
    cmd.arg("-l")
        .arg("1")
        .arg("-f")
        .arg(samples.to_str().unwrap())
        .arg("-n")
        .arg("10")
        .arg("-s")
        .arg("1")
        .arg(prefix.to_str().unwrap())
        .assert()
        .success();

    assert!(samples.exists());
    Ok(())
}
