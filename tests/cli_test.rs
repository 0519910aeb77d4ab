use assert_cmd::Command;
use indoc::indoc;
use std::fs;
use tempfile::TempDir;

fn sample_crate() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("Cargo.toml"),
        "[package]\nname = \"optics\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(
        temp.path().join("src").join("lib.rs"),
        indoc! {r#"
            /// Focal length of a thin lens.
            pub fn focal_length(
                object: Annotated<f64, meta!(unit = "mm")>,
                image: Annotated<f64, meta!(unit = "mm")>,
            ) -> Annotated<f64, meta!(label = "f", unit = "mm")> {
                1.0 / (1.0 / object + 1.0 / image)
            }

            pub fn clash() -> (
                Annotated<u8, meta!(label = "v")>,
                Annotated<u8, meta!(label = "v")>,
            ) {
                todo!()
            }
        "#},
    )
    .unwrap();
    temp
}

fn nodemeta(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nodemeta"));
    cmd.current_dir(dir.path()).env_remove("NODEMETA_BACKEND");
    cmd
}

#[test]
fn test_inspect_prints_json_metadata() {
    let temp = sample_crate();
    let output = nodemeta(&temp)
        .args(["inspect", "src", "--item", "focal_length", "--author-name", "Ada"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let meta = &parsed[0];
    assert_eq!(meta["author_name"], "Ada");
    assert_eq!(meta["origin"]["module"], "optics");
    assert_eq!(meta["origin"]["version"], "0.1.0");
    assert_eq!(meta["docstring"], "Focal length of a thin lens.");
    assert_eq!(meta["inputs"]["object"]["unit"], "mm");
    assert_eq!(meta["outputs"]["f"]["datatype"], "f64");
}

#[test]
fn test_inspect_yaml_to_file() {
    let temp = sample_crate();
    nodemeta(&temp)
        .args(["inspect", "src/lib.rs", "--format", "yaml", "--output", "meta.yaml"])
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join("meta.yaml")).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
    assert_eq!(parsed.as_sequence().map(Vec::len), Some(2));
}

#[test]
fn test_bare_backend_prints_nothing() {
    let temp = sample_crate();
    let output = nodemeta(&temp)
        .args(["inspect", "src", "--backend", "bare"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn test_duplicate_labels_can_be_rejected_from_config() {
    let temp = sample_crate();
    fs::write(
        temp.path().join(".nodemeta.toml"),
        "duplicate_labels = \"reject\"\n",
    )
    .unwrap();

    let output = nodemeta(&temp).args(["inspect", "src"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"v\"") || stderr.contains("`v`"), "{stderr}");
}

#[test]
fn test_init_writes_config_once() {
    let temp = TempDir::new().unwrap();
    nodemeta(&temp).arg("init").assert().success();
    assert!(temp.path().join(".nodemeta.toml").exists());
    nodemeta(&temp).arg("init").assert().failure();
    nodemeta(&temp).args(["init", "--force"]).assert().success();
}
