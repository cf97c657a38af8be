use kitcov::analysis::{builtin_catalog, linearize, AnalysisDescriptor, ExecModes};
use kitcov::error::KitcovError;

const fn node(name: &'static str, requires: &'static [&'static str]) -> AnalysisDescriptor {
    AnalysisDescriptor {
        name,
        label: "",
        description: "",
        verbosity: 1,
        modes: ExecModes::GLOBAL,
        requires,
        exit_bit: 1,
        internal: false,
    }
}

#[test]
fn builtin_catalog_linearizes_completely() {
    let ordered = linearize(builtin_catalog()).unwrap();
    assert_eq!(ordered.len(), builtin_catalog().len());

    // Every analysis exactly once.
    let mut names: Vec<&str> = ordered.iter().map(|d| d.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), builtin_catalog().len());
}

#[test]
fn requirements_come_strictly_earlier() {
    let ordered = linearize(builtin_catalog()).unwrap();
    let position = |name: &str| ordered.iter().position(|d| d.name == name).unwrap();
    for desc in &ordered {
        for req in desc.requires {
            assert!(
                position(req) < position(desc.name),
                "{} must run before {}",
                req,
                desc.name
            );
        }
    }
}

#[test]
fn shared_dependency_precedes_all_dependents_regardless_of_order() {
    // The shared dependency is registered last.
    static CATALOG: [AnalysisDescriptor; 3] = [
        node("alpha", &["shared"]),
        node("beta", &["shared"]),
        node("shared", &[]),
    ];
    let ordered = linearize(&CATALOG).unwrap();
    let names: Vec<&str> = ordered.iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["shared", "alpha", "beta"]);
}

#[test]
fn unknown_requirement_is_a_config_error() {
    static CATALOG: [AnalysisDescriptor; 1] = [node("lonely", &["missing"])];
    let err = linearize(&CATALOG).unwrap_err();
    match err {
        KitcovError::Config(message) => {
            assert!(message.contains("lonely"));
            assert!(message.contains("missing"));
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn dependency_cycle_is_detected_and_named() {
    static CATALOG: [AnalysisDescriptor; 3] = [
        node("a", &["b"]),
        node("b", &["c"]),
        node("c", &["a"]),
    ];
    let err = linearize(&CATALOG).unwrap_err();
    match err {
        KitcovError::Config(message) => {
            assert!(message.contains("cycle"), "{message}");
            for name in ["a", "b", "c"] {
                assert!(message.contains(name), "{message}");
            }
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn self_requirement_is_a_cycle() {
    static CATALOG: [AnalysisDescriptor; 1] = [node("ouroboros", &["ouroboros"])];
    assert!(matches!(
        linearize(&CATALOG),
        Err(KitcovError::Config(_))
    ));
}

#[test]
fn duplicate_registration_is_rejected() {
    static CATALOG: [AnalysisDescriptor; 2] = [node("twin", &[]), node("twin", &[])];
    assert!(matches!(
        linearize(&CATALOG),
        Err(KitcovError::Config(_))
    ));
}
