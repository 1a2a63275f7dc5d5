//! End-to-end tests for splitting documents into files.
//!
//! Uses the product catalog and sitemap fixtures and small inline documents,
//! with every run writing into its own temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use xml_splitter::xml::Element;
use xml_splitter::{NamingStrategy, SplitConfig, SplitReport, SplitterError, XmlSplitter};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Write `xml` to a temp file and split it on `tag`.
fn split_inline(
    xml: &str,
    tag: &str,
    naming: NamingStrategy,
) -> (TempDir, Result<SplitReport, SplitterError>) {
    let temp = tempdir().unwrap();
    let source = temp.path().join("input.xml");
    fs::write(&source, xml).unwrap();

    let config = SplitConfig::new(&source, tag)
        .unwrap()
        .with_naming(naming)
        .with_output_dir(temp.path().join("out"));
    let result = XmlSplitter::new(config).split();
    (temp, result)
}

fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_sequential_naming_in_document_order() {
    let xml = "<root><item><id>a</id></item><item><id>b</id></item></root>";
    let (temp, result) = split_inline(xml, "item", NamingStrategy::Sequential);
    let report = result.unwrap();

    let out = temp.path().join("out");
    assert_eq!(report.files, vec![out.join("1.xml"), out.join("2.xml")]);
    assert_eq!(
        fs::read_to_string(out.join("1.xml")).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<item><id>a</id></item>\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("2.xml")).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<item><id>b</id></item>\n"
    );
}

#[test]
fn test_name_by_child_tag() {
    let xml = "<root><item><id>a</id></item><item><id>b</id></item></root>";
    let (temp, result) = split_inline(xml, "item", NamingStrategy::ByChildText("id".into()));
    result.unwrap();

    let out = temp.path().join("out");
    assert_eq!(sorted_file_names(&out), vec!["a.xml", "b.xml"]);
    assert!(fs::read_to_string(out.join("a.xml"))
        .unwrap()
        .contains("<item><id>a</id></item>"));
    assert!(fs::read_to_string(out.join("b.xml"))
        .unwrap()
        .contains("<item><id>b</id></item>"));
}

#[test]
fn test_duplicate_child_text_keeps_later_match() {
    let xml = "<root><item><id>x</id><v>1</v></item><item><id>x</id><v>2</v></item></root>";
    let (temp, result) = split_inline(xml, "item", NamingStrategy::ByChildText("id".into()));
    let report = result.unwrap();

    let out = temp.path().join("out");
    assert_eq!(sorted_file_names(&out), vec!["x.xml"]);
    assert_eq!(report.matches(), 2);
    assert_eq!(report.overwritten, 1);
    assert!(fs::read_to_string(out.join("x.xml"))
        .unwrap()
        .contains("<v>2</v>"));
}

#[test]
fn test_catalog_by_attribute() {
    let temp = tempdir().unwrap();
    let config = SplitConfig::new(fixture("catalog.xml"), "product")
        .unwrap()
        .with_naming(NamingStrategy::ByAttribute("sku".into()))
        .with_output_dir(temp.path());

    let report = XmlSplitter::new(config).split().unwrap();

    assert_eq!(report.matches(), 3);
    assert_eq!(
        sorted_file_names(temp.path()),
        vec!["P-100.xml", "P-200.xml", "P-300.xml"]
    );

    let chair = Element::parse_str(&fs::read_to_string(temp.path().join("P-200.xml")).unwrap())
        .unwrap();
    assert_eq!(chair.attribute("sku"), Some("P-200"));
    assert_eq!(chair.child_named("name").unwrap().text(), "Chair <oak>");
}

#[test]
fn test_catalog_by_child_attribute() {
    let temp = tempdir().unwrap();
    let config = SplitConfig::new(fixture("catalog.xml"), "product")
        .unwrap()
        .with_naming(NamingStrategy::ByChildAttribute(
            "supplier".into(),
            "code".into(),
        ))
        .with_output_dir(temp.path());

    let report = XmlSplitter::new(config).split().unwrap();

    // Two products share supplier S-2: the later one wins.
    assert_eq!(report.matches(), 3);
    assert_eq!(sorted_file_names(temp.path()), vec!["S-1.xml", "S-2.xml"]);
    let s2 = fs::read_to_string(temp.path().join("S-2.xml")).unwrap();
    assert!(s2.contains("<id>table</id>"));
}

#[test]
fn test_outputs_are_well_formed_and_reserialize_identically() {
    for (name, tag) in [("catalog.xml", "product"), ("sitemap.xml", "url")] {
        let temp = tempdir().unwrap();
        let config = SplitConfig::new(fixture(name), tag)
            .unwrap()
            .with_output_dir(temp.path());

        let report = XmlSplitter::new(config).split().unwrap();
        assert!(report.matches() > 0, "{name} has no <{tag}>");

        for path in &report.files {
            let content = fs::read_to_string(path).unwrap();

            let doc = roxmltree::Document::parse(&content)
                .unwrap_or_else(|e| panic!("{} is not well-formed: {e}", path.display()));
            assert_eq!(doc.root_element().tag_name().name(), tag);

            let reserialized = Element::parse_str(&content).unwrap().to_document().unwrap();
            assert_eq!(String::from_utf8(reserialized).unwrap(), content);
        }
    }
}

#[test]
fn test_sitemap_outputs_keep_namespaces() {
    const SITEMAP: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
    const IMAGE: &str = "http://www.google.com/schemas/sitemap-image/1.1";
    const VIDEO: &str = "http://www.google.com/schemas/sitemap-video/1.1";

    let temp = tempdir().unwrap();
    let config = SplitConfig::new(fixture("sitemap.xml"), "url")
        .unwrap()
        .with_output_dir(temp.path());

    let report = XmlSplitter::new(config).split().unwrap();
    assert_eq!(report.matches(), 2);

    let lamp = fs::read_to_string(&report.files[0]).unwrap();
    let doc = roxmltree::Document::parse(&lamp).unwrap();
    assert_eq!(doc.root_element().tag_name().namespace(), Some(SITEMAP));
    let image_loc = doc
        .descendants()
        .find(|n| n.has_tag_name((IMAGE, "loc")))
        .unwrap();
    assert_eq!(image_loc.text(), Some("https://example.org/lamp.jpg"));

    let chair = fs::read_to_string(&report.files[1]).unwrap();
    let doc = roxmltree::Document::parse(&chair).unwrap();
    assert_eq!(doc.root_element().tag_name().namespace(), Some(SITEMAP));
    assert!(doc.descendants().any(|n| n.has_tag_name((VIDEO, "title"))));
}

#[test]
fn test_source_in_declared_encoding_is_written_as_utf8() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("latin1.xml");
    fs::write(
        &source,
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<menu><dish><name>Cr\xe8me br\xfbl\xe9e</name></dish></menu>",
    )
    .unwrap();

    let config = SplitConfig::new(&source, "dish")
        .unwrap()
        .with_naming(NamingStrategy::ByChildText("name".into()))
        .with_output_dir(temp.path().join("out"));
    let report = XmlSplitter::new(config).split().unwrap();

    let expected = temp.path().join("out").join("Cr\u{e8}me br\u{fb}l\u{e9}e.xml");
    assert_eq!(report.files, vec![expected.clone()]);
    assert_eq!(
        fs::read_to_string(expected).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<dish><name>Cr\u{e8}me br\u{fb}l\u{e9}e</name></dish>\n"
    );
}

#[test]
fn test_whitespace_and_entities_are_preserved() {
    let temp = tempdir().unwrap();
    let config = SplitConfig::new(fixture("catalog.xml"), "product")
        .unwrap()
        .with_naming(NamingStrategy::ByChildText("id".into()))
        .with_output_dir(temp.path());

    XmlSplitter::new(config).split().unwrap();

    let lamp = fs::read_to_string(temp.path().join("lamp.xml")).unwrap();
    assert!(lamp.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<product sku=\"P-100\">\n      <id>lamp</id>"));
    assert!(lamp.contains("<supplier code=\"S-1\">Lumen &amp; Co</supplier>"));
    assert!(lamp.ends_with("</product>\n"));
}

#[test]
fn test_self_closing_matches() {
    let xml = r#"<root><row id="r1"/><row id="r2"></row></root>"#;
    let (temp, result) = split_inline(xml, "row", NamingStrategy::ByAttribute("id".into()));
    result.unwrap();

    let out = temp.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("r1.xml")).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<row id=\"r1\"/>\n"
    );
    assert!(out.join("r2.xml").exists());
}

#[test]
fn test_zero_occurrences() {
    let (temp, result) = split_inline("<root><a/></root>", "item", NamingStrategy::Sequential);
    let report = result.unwrap();

    assert!(report.files.is_empty());
    assert!(sorted_file_names(&temp.path().join("out")).is_empty());
}

#[test]
fn test_missing_source() {
    let temp = tempdir().unwrap();
    let out = temp.path().join("out");
    let config = SplitConfig::new(temp.path().join("nope.xml"), "item")
        .unwrap()
        .with_output_dir(&out);

    let err = XmlSplitter::new(config).split().unwrap_err();

    assert!(matches!(err, SplitterError::SourceNotFound(_)));
    assert!(!out.exists());
}

#[test]
fn test_malformed_input_keeps_files_written_so_far() {
    let xml = "<root><item>1</item><item>2</item><item>3</oops></root>";
    let (temp, result) = split_inline(xml, "item", NamingStrategy::Sequential);

    let err = result.unwrap_err();
    assert!(err.is_malformed_input());
    assert_eq!(
        sorted_file_names(&temp.path().join("out")),
        vec!["1.xml", "2.xml"]
    );
}

#[test]
fn test_missing_naming_attribute_fails_run() {
    let xml = r#"<root><item code="a"/><item/></root>"#;
    let (temp, result) = split_inline(xml, "item", NamingStrategy::ByAttribute("code".into()));

    let err = result.unwrap_err();
    assert!(matches!(err, SplitterError::NameResolution { match_index: 2, .. }));
    assert_eq!(sorted_file_names(&temp.path().join("out")), vec!["a.xml"]);
}

#[test]
fn test_absolute_derived_name_stays_in_output_directory() {
    let temp = tempdir().unwrap();
    let escaped = temp.path().join("escaped");
    let xml = format!(r#"<root><item code="{}"/></root>"#, escaped.display());

    let (run_dir, result) = split_inline(&xml, "item", NamingStrategy::ByAttribute("code".into()));
    let report = result.unwrap();

    let out = run_dir.path().join("out");
    assert!(report.files[0].starts_with(&out));
    assert!(report.files[0].is_file());
    assert!(!temp.path().join("escaped.xml").exists());
}

#[test]
fn test_empty_attribute_value_names_file_by_extension_only() {
    let xml = r#"<root><item code=""/></root>"#;
    let (temp, result) = split_inline(xml, "item", NamingStrategy::ByAttribute("code".into()));
    result.unwrap();

    assert_eq!(sorted_file_names(&temp.path().join("out")), vec![".xml"]);
}

#[test]
fn test_nested_occurrences_are_split_too() {
    let xml = "<root><item><id>outer</id><item><id>inner</id></item></item><item><id>last</id></item></root>";
    let (_temp, result) = split_inline(xml, "item", NamingStrategy::Sequential);
    let report = result.unwrap();

    let contents: Vec<String> = report
        .files
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    assert_eq!(contents.len(), 3);
    assert!(contents[0].contains("<id>outer</id><item><id>inner</id></item>"));
    assert!(contents[1].contains("\n<item><id>inner</id></item>\n"));
    assert!(contents[2].contains("<id>last</id>"));
}

#[test]
fn test_existing_output_directory_is_reused() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("input.xml");
    fs::write(&source, "<root><item/></root>").unwrap();
    fs::create_dir_all(temp.path().join("out")).unwrap();
    fs::write(temp.path().join("out").join("1.xml"), "stale").unwrap();

    let config = SplitConfig::new(&source, "item")
        .unwrap()
        .with_output_dir(temp.path().join("out"));
    let report = XmlSplitter::new(config).split().unwrap();

    assert_eq!(report.overwritten, 0);
    assert_eq!(
        fs::read_to_string(temp.path().join("out").join("1.xml")).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<item/>\n"
    );
}
