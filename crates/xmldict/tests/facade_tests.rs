//! End-to-end conversions through the public entry points.

use pretty_assertions::assert_eq;
use std::io::Write;
use xmldict::{
    AttributeMap, CollisionPolicy, DictOptions, Error, Field, FieldSet, ParseOptions, SourceKind,
    Value, XmlDocument, parse, to_dictionary,
};

const CATALOG: &str = r#"<catalog region="eu">
  <book id="b1" lang="en">
    <title>Dune</title>
    <price currency="EUR">9.99</price>
  </book>
  <book id="b2">
    <title>Solaris</title>
  </book>
  <magazine id="m1"/>
</catalog>"#;

fn string_dict(xml: &str, options: &DictOptions) -> AttributeMap {
    to_dictionary(xml, SourceKind::String, options).unwrap()
}

/// Paths at which two values differ.
fn differences(left: &Value, right: &Value, path: String, out: &mut Vec<String>) {
    match (left, right) {
        (Value::Node(l), Value::Node(r)) => {
            for key in l.keys() {
                if r.contains_key(key) {
                    differences(&l[key], &r[key], format!("{}.{}", path, key), out);
                } else {
                    out.push(format!("{}.{}", path, key));
                }
            }
            for key in r.keys().filter(|k| !l.contains_key(k)) {
                out.push(format!("{}.{}", path, key));
            }
        }
        (Value::Group(l), Value::Group(r)) if l.len() == r.len() => {
            for (i, (a, b)) in l.iter().zip(r).enumerate() {
                differences(a, b, format!("{}[{}]", path, i), out);
            }
        }
        (a, b) if a != b => out.push(path),
        _ => {}
    }
}

#[test]
fn test_root_fields() {
    let data = string_dict(CATALOG, &DictOptions::default());

    assert_eq!(data.tag(), Some("catalog"));
    assert_eq!(data.attrib().and_then(|a| a.get("region")).map(String::as_str), Some("eu"));
    assert_eq!(data.text(), Some("\n  "));
    assert!(data["tail"].is_null());
}

#[test]
fn test_nested_elements_and_groups() {
    let data = string_dict(CATALOG, &DictOptions::default());

    let books = data["book"].as_group().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"]["text"].as_text(), Some("Dune"));
    assert_eq!(books[0]["price"]["text"].as_text(), Some("9.99"));
    assert_eq!(books[1]["title"]["text"].as_text(), Some("Solaris"));
    assert!(books[1]["price"].is_null());

    assert_eq!(data["magazine"]["tail"].as_text(), Some("\n"));
    assert_eq!(data["magazine"]["attrib"].as_attributes().unwrap()["id"], "m1");
}

#[test]
fn test_three_siblings_nest_by_default() {
    let data = string_dict(
        r#"<p><x n="a"/><x n="b"/><x n="c"/></p>"#,
        &DictOptions::default(),
    );

    let n = |v: &Value| v["attrib"].as_attributes().unwrap()["n"].clone();
    let outer = data["x"].as_group().unwrap();
    assert_eq!(outer.len(), 2);
    let inner = outer[0].as_group().unwrap();
    assert_eq!(vec![n(&inner[0]), n(&inner[1]), n(&outer[1])], vec!["a", "b", "c"]);
}

#[test]
fn test_three_siblings_flatten_when_asked() {
    let options = DictOptions::default().with_collision(CollisionPolicy::Flatten);
    let data = string_dict(r#"<p><x n="a"/><x n="b"/><x n="c"/></p>"#, &options);

    let group = data["x"].as_group().unwrap();
    let ns: Vec<&str> = group
        .iter()
        .map(|v| v["attrib"].as_attributes().unwrap()["n"].as_str())
        .collect();
    assert_eq!(ns, vec!["a", "b", "c"]);
}

#[test]
fn test_nodes_walks_either_policy_the_same() {
    let xml = r#"<p><x n="a"/><x n="b"/><x n="c"/><x n="d"/></p>"#;
    for collision in [CollisionPolicy::Nest, CollisionPolicy::Flatten] {
        let data = string_dict(xml, &DictOptions::default().with_collision(collision));
        let ns: Vec<String> = data["x"]
            .nodes()
            .iter()
            .map(|m| m.attrib().unwrap()["n"].clone())
            .collect();
        assert_eq!(ns, vec!["a", "b", "c", "d"], "policy {:?}", collision);
    }
}

#[test]
fn test_field_selection_tag_only() {
    let options = DictOptions::default().with_fields(FieldSet::only(Field::Tag));
    let data = string_dict(CATALOG, &options);

    let scalar_keys: Vec<&str> = data
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Node(_) | Value::Group(_)))
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(scalar_keys, vec!["tag"]);
    assert!(data["attrib"].is_null());
    assert!(data["text"].is_null());
    assert!(data["tail"].is_null());
    assert_eq!(data["magazine"].as_node().map(AttributeMap::len), Some(1));
}

#[test]
fn test_attribute_whitespace_only_changes_attrib_values() {
    let left = r#"<r a="x"><c b="1">t</c><c b="2"/></r>"#;
    let right = r#"<r a=" x "><c b="1">t</c><c b="2 "/></r>"#;

    let l = Value::Node(string_dict(left, &DictOptions::default()));
    let r = Value::Node(string_dict(right, &DictOptions::default()));

    let mut diffs = Vec::new();
    differences(&l, &r, String::new(), &mut diffs);
    assert_eq!(diffs, vec![".attrib", ".c[1].attrib"]);
}

#[test]
fn test_repeated_access_returns_same_map() {
    let doc = parse(CATALOG, SourceKind::String).unwrap();
    let first = doc.dictionary();
    let second = doc.dictionary();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_mismatched_tags_are_malformed() {
    let result = to_dictionary("<a><b></a>", SourceKind::String, &DictOptions::default());
    assert!(
        matches!(result, Err(Error::MalformedDocument(_))),
        "got: {:?}",
        result
    );
}

#[test]
fn test_empty_input_is_malformed() {
    let result = to_dictionary("", "string", &DictOptions::default());
    assert!(matches!(
        result,
        Err(Error::MalformedDocument(xmldict_tree::Error::EmptyDocument))
    ));
}

#[test]
fn test_bogus_source_kind() {
    assert!(matches!(
        parse("<a/>", "bogus"),
        Err(Error::InvalidSourceKind(kind)) if kind == "bogus"
    ));
}

#[test]
fn test_file_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap();

    let from_file = to_dictionary(path, SourceKind::File, &DictOptions::default()).unwrap();
    let from_string = string_dict(CATALOG, &DictOptions::default());
    assert_eq!(from_file, from_string);

    let opened = XmlDocument::open(file.path()).unwrap();
    assert_eq!(opened.dictionary(), &from_string);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.xml");
    let result = parse(path.to_str().unwrap(), "file");
    assert!(matches!(result, Err(Error::Io { .. })), "got: {:?}", result);
}

#[test]
fn test_strip_indentation_removes_layout_whitespace() {
    let options = ParseOptions {
        strip_indentation: true,
        ..ParseOptions::default()
    };
    let doc = XmlDocument::parse_with_options(CATALOG, SourceKind::String, &options).unwrap();
    let data = doc.dictionary();

    assert!(data["text"].is_null());
    assert!(data["magazine"]["tail"].is_null());
    assert_eq!(data["book"][0]["title"]["text"].as_text(), Some("Dune"));
}

#[test]
fn test_too_deep_is_reported() {
    let options = ParseOptions {
        max_depth: 2,
        ..ParseOptions::default()
    };
    let result = XmlDocument::parse_with_options(CATALOG, SourceKind::String, &options);
    assert!(matches!(
        result,
        Err(Error::StructureTooDeep { max_depth: 2, .. })
    ));
}

#[test]
fn test_crlf_line_endings_match_lf() {
    let xml = "<data>\r\n\t<c>x\r\ny</c>\r\n</data>";

    let data = string_dict(xml, &DictOptions::default());
    assert_eq!(data["c"]["text"].as_text(), Some("x\ny"));
    assert_eq!(data["c"]["tail"].as_text(), Some("\n"));

    let normalized = string_dict(xml, &DictOptions::default().with_normalized_text(true));
    assert_eq!(normalized["c"]["text"].as_text(), Some("xy"));
    assert_eq!(normalized.text(), Some(""));
}

#[test]
fn test_deep_document_with_raised_limit() {
    let depth = 200_000;
    let xml = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
    let options = ParseOptions {
        max_depth: usize::MAX,
        ..ParseOptions::default()
    };

    let doc = XmlDocument::parse_with_options(&xml, SourceKind::String, &options).unwrap();
    assert_eq!(doc.root().depth(), depth);

    let data = doc.into_dictionary(&DictOptions::default());
    assert_eq!(data["n"]["n"]["tag"].as_text(), Some("n"));
    drop(data);
}

#[test]
fn test_json_output() {
    let data = string_dict(
        r#"<data><item id="1">one</item><item id="2"/></data>"#,
        &DictOptions::default(),
    );
    let json = serde_json::to_string(&data).unwrap();
    insta::assert_snapshot!(json, @r#"{"attrib":{},"tag":"data","text":null,"tail":null,"item":[{"attrib":{"id":"1"},"tag":"item","text":"one","tail":null},{"attrib":{"id":"2"},"tag":"item","text":null,"tail":null}]}"#);
}
