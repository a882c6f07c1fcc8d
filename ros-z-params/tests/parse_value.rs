use std::path::PathBuf;

use ros_z_params::{ErrorKind, ParameterTable, ParameterValue, parse_file, parse_value};

#[test]
fn test_parse_yaml_value() {
    let mut table = ParameterTable::new();

    for (node, param, value) in [("", "param", "true"), ("node", "", "true"), ("node", "param", "")] {
        let err = parse_value(&mut table, node, param, value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    // Values set directly bypass node name checks.
    parse_value(&mut table, "node name", "param name", "true").unwrap();
    assert_eq!(
        table.get("node name", "param name"),
        Some(&ParameterValue::Bool(true))
    );
}

#[test]
fn test_scalar_types() {
    let mut table = ParameterTable::new();
    let cases = [
        ("b", "off", ParameterValue::Bool(false)),
        ("i", "-42", ParameterValue::Integer(-42)),
        ("h", "0x10", ParameterValue::Integer(16)),
        ("d", "1e-3", ParameterValue::Double(0.001)),
        ("s", "hello world", ParameterValue::String("hello world".into())),
        ("q", "'12'", ParameterValue::String("12".into())),
        ("t", "!!str true", ParameterValue::String("true".into())),
    ];
    for (param, yaml, expected) in cases {
        parse_value(&mut table, "/node", param, yaml).unwrap();
        assert_eq!(table.get("/node", param), Some(&expected), "{}", yaml);
    }
}

#[test]
fn test_sequences() {
    let mut table = ParameterTable::new();
    parse_value(&mut table, "/node", "ids", "[1, 2, 3]").unwrap();
    assert_eq!(
        table.get("/node", "ids"),
        Some(&ParameterValue::IntegerArray(vec![1, 2, 3]))
    );

    // A new sequence replaces the previous array.
    parse_value(&mut table, "/node", "ids", "[4]").unwrap();
    assert_eq!(
        table.get("/node", "ids"),
        Some(&ParameterValue::IntegerArray(vec![4]))
    );

    parse_value(&mut table, "/node", "names", "- a\n- b\n").unwrap();
    assert_eq!(
        table.get("/node", "names"),
        Some(&ParameterValue::StringArray(vec!["a".into(), "b".into()]))
    );
}

#[test]
fn test_rejected_values_leave_table_unchanged() {
    let mut table = ParameterTable::new();
    parse_value(&mut table, "/node", "ids", "[1, 2]").unwrap();
    let before = table.clone();

    for yaml in ["[1, two]", "{a: 1}", "[[1]]", "*alias", "[1, 2"] {
        let err = parse_value(&mut table, "/node", "ids", yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "{}", yaml);
        assert_eq!(table, before, "{}", yaml);
    }

    assert!(parse_value(&mut table, "/other", "x", "{a: 1}").is_err());
    assert!(table.node("/other").is_none());
}

#[test]
fn test_override_after_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_yaml")
        .join("correct_config.yaml");
    let mut table = parse_file(path).unwrap();

    parse_value(&mut table, "camera", "loc", "rear").unwrap();
    parse_value(&mut table, "intel", "num_cores", "16").unwrap();
    parse_value(&mut table, "camera", "cam_spec.supported_brands", "[Sony]").unwrap();

    assert_eq!(
        table.get("camera", "loc"),
        Some(&ParameterValue::String("rear".into()))
    );
    assert_eq!(table.get("intel", "num_cores"), Some(&ParameterValue::Integer(16)));
    assert_eq!(
        table.get("camera", "cam_spec.supported_brands"),
        Some(&ParameterValue::StringArray(vec!["Sony".into()]))
    );
}
