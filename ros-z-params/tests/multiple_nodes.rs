use std::path::PathBuf;

use ros_z_params::{Builder, ParamParser, ParameterValue, parse_file, parse_str};

fn test_yaml(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_yaml")
        .join(name)
}

#[test]
fn test_nested_namespaces() {
    let table = parse_file(test_yaml("multi_ns_correct.yaml")).unwrap();
    assert_eq!(
        table.node_names(),
        ["robots/arm/left", "robots/arm/right", "robots/base", "sensors/imu"]
    );
    assert_eq!(
        table.get("robots/arm/right", "gain"),
        Some(&ParameterValue::Double(0.7))
    );
    assert_eq!(
        table.get("robots/base", "max_rpm"),
        Some(&ParameterValue::Integer(3000))
    );
    assert_eq!(table.get("sensors/imu", "rate"), Some(&ParameterValue::Integer(200)));
    assert_eq!(
        table.get("robots/arm/left", "joints").and_then(ParameterValue::as_string_array),
        Some(["shoulder".to_string(), "elbow".to_string(), "wrist".to_string()].as_slice())
    );
}

#[test]
fn test_wildcard_nodes() {
    let table = parse_file(test_yaml("wildcards.yaml")).unwrap();
    assert_eq!(table.node_names(), ["/**", "/my_ns/*", "/my_ns/my_node"]);

    let overrides = table.overrides_for("/my_ns/my_node");
    assert_eq!(overrides["qos_depth"], ParameterValue::Integer(1));
    assert_eq!(overrides["use_sim_time"], ParameterValue::Bool(true));
    assert_eq!(overrides["frame"], ParameterValue::String("base_link".into()));

    let overrides = table.overrides_for("/my_ns/other");
    assert_eq!(overrides["qos_depth"], ParameterValue::Integer(5));

    let overrides = table.overrides_for("/elsewhere");
    assert_eq!(overrides["qos_depth"], ParameterValue::Integer(10));
    assert!(!overrides.contains_key("frame"));
}

#[test]
fn test_same_node_in_two_sections() {
    let yaml = r#"
/robot:
  ros__parameters:
    a: 1
/other:
  ros__parameters:
    b: 2
/robot:
  ros__parameters:
    a: 3
    c: 4
"#;
    // The event stream does not reject repeated keys; later values win.
    let table = parse_str(yaml).unwrap();
    assert_eq!(table.num_nodes(), 2);
    assert_eq!(table.get("/robot", "a"), Some(&ParameterValue::Integer(3)));
    assert_eq!(table.get("/robot", "c"), Some(&ParameterValue::Integer(4)));
}

#[test]
fn test_node_name_validation() {
    let yaml = "/bad-ns/node:\n  ros__parameters:\n    a: 1\n";
    let err = parse_str(yaml).unwrap_err();
    assert!(err.message().starts_with("Invalid node name '/bad-ns/node'"), "{}", err);

    let parser = ParamParser::builder()
        .with_node_name_validation(false)
        .build()
        .unwrap();
    let table = parser.parse_str(yaml).unwrap();
    assert_eq!(table.get("/bad-ns/node", "a"), Some(&ParameterValue::Integer(1)));
}

#[test]
fn test_configured_parameter_cap() {
    let parser = ParamParser::builder()
        .with_max_params_per_node(2)
        .build()
        .unwrap();
    let yaml = "node:\n  ros__parameters:\n    a: 1\n    b: 2\n    a: 3\n";
    // Rewriting an existing parameter does not count against the cap.
    let table = parser.parse_str(yaml).unwrap();
    assert_eq!(table.get("node", "a"), Some(&ParameterValue::Integer(3)));

    let err = parser
        .parse_str("node:\n  ros__parameters:\n    a: 1\n    b: 2\n    c: 3\n")
        .unwrap_err();
    assert_eq!(
        err.message(),
        "Exceeded maximum allowed number of parameters for a node (2)"
    );
}

#[test]
fn test_many_nodes_grow_the_table() {
    let parser = ParamParser::builder()
        .with_node_capacity(1)
        .with_param_capacity(1)
        .build()
        .unwrap();
    let yaml: String = (0..40)
        .map(|i| format!("node_{i}:\n  ros__parameters:\n    id: {i}\n    name: n{i}\n"))
        .collect();
    let table = parser.parse_str(&yaml).unwrap();
    assert_eq!(table.num_nodes(), 40);
    assert_eq!(table.get("node_39", "id"), Some(&ParameterValue::Integer(39)));
    assert_eq!(
        table.get("node_7", "name"),
        Some(&ParameterValue::String("n7".into()))
    );
}

#[test]
fn test_json_output_shape() {
    let table = parse_str("robot:\n  ros__parameters:\n    ids: [1, 2]\n").unwrap();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "robot": { "ids": { "IntegerArray": [1, 2] } } })
    );
}
