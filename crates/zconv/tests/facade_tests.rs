use std::fs;

use zconv::{Converter, ErrorKind, Node};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_file_round_trip_through_all_formats() -> TestResult {
    let dir = tempfile::tempdir()?;
    let xml_in = dir.path().join("in.xml");
    fs::write(
        &xml_in,
        "<people><person><name>Ann</name><age>31</age></person><person><name>Bob</name><age>42</age></person></people>",
    )?;

    let mut conv = Converter::new();
    conv.load_xml(&xml_in)?;
    conv.xml_to_csv()?;
    conv.save_csv(dir.path().join("out.csv"))?;
    assert_eq!(
        fs::read_to_string(dir.path().join("out.csv"))?,
        "name,age\nAnn,31\nBob,42\n"
    );

    conv.node_to_json()?;
    conv.save_json(dir.path().join("out.json"))?;
    let json = fs::read_to_string(dir.path().join("out.json"))?;
    assert!(json.starts_with(r#"{"person":[{"name":"Ann""#));

    conv.json_to_xml(None)?;
    conv.save_xml(dir.path().join("out.xml"))?;
    let xml = fs::read_to_string(dir.path().join("out.xml"))?;
    assert!(xml.contains("<people><person><name>Ann</name>"));
    Ok(())
}

#[test]
fn test_malformed_xml_does_not_fail() -> TestResult {
    let mut conv = Converter::new();
    conv.set_xml("<broken>");
    let node = conv.xml_to_node()?.clone();
    assert_eq!(node, Node::xml_error());
    assert_eq!(conv.root_tag(), None);
    Ok(())
}

#[test]
fn test_unreadable_path_is_io_error() {
    let mut conv = Converter::new();
    let kind = conv
        .load_json("/definitely/not/a/real/path.json")
        .err()
        .map(|e| e.kind().clone());
    assert_eq!(kind, Some(ErrorKind::Io));
}

#[test]
fn test_setters_and_getters() -> TestResult {
    let mut conv = Converter::new();
    assert!(conv.node().is_none());
    conv.set_node(Node::from("x"));
    assert_eq!(conv.node_to_json()?, r#""x""#);
    assert_eq!(conv.json(), Some(r#""x""#));
    assert_eq!(conv.node_to_xml(Some("v"))?.lines().last(), Some("<v>x</v>"));
    Ok(())
}
