mod common;

use common::*;
use std::io;
use xmltab::core::{EmptyContainerPolicy, EngineError, MultiValueBehaviour};
use xmltab::{
    ConverterBuilder, DocumentError, FileDocument, InMemoryDocument, MemorySink, OutputSink,
    PipelineError, StoreBacking,
};

#[test]
fn test_lazy_family_scenario_uses_frozen_age_columns() -> TestResult {
    init_logging();
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let mut sink = MemorySink::new();
    let summary = converter.convert(&documents(&[FAMILY_SMITH, FAMILY_JONES]), &mut sink)?;

    assert_eq!(sink.group_names(), ["Family", "Members"]);
    assert_eq!(records(&sink, "Family"), [vec!["Name"], vec!["Smith"], vec!["Jones"]]);
    assert_eq!(
        records(&sink, "Members"),
        [
            vec!["Age_1", "Age_2", "Age_3"],
            vec!["10", "12", ""],
            vec!["7", "9", "40"]
        ]
    );
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.rows_for("Members"), Some(2));
    assert!(sink.is_finished());
    Ok(())
}

#[test]
fn test_greedy_family_scenario_multiplies_member_rows() -> TestResult {
    init_logging();
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Greedy))?
        .build()?;
    let mut sink = MemorySink::new();
    let summary = converter.convert(&documents(&[FAMILY_SMITH, FAMILY_JONES]), &mut sink)?;

    let members = records(&sink, "Members");
    assert_eq!(members[0], ["Age"]);
    assert_eq!(&members[1..3], [vec!["10"], vec!["12"]]);
    assert_eq!(&members[3..], [vec!["7"], vec!["9"], vec!["40"]]);
    assert_eq!(summary.rows_for("Members"), Some(5));
    assert_eq!(summary.rows_for("Family"), Some(2));
    Ok(())
}

#[test]
fn test_store_backings_produce_identical_output() -> TestResult {
    let docs = documents(&[FAMILY_JONES, FAMILY_SMITH]);
    let mut outputs = Vec::new();
    for backing in [StoreBacking::Memory, StoreBacking::default()] {
        let converter = ConverterBuilder::new()
            .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
            .with_store_backing(backing)
            .build()?;
        let mut sink = MemorySink::new();
        converter.convert(&docs, &mut sink)?;
        outputs.push(sink);
    }
    assert_eq!(records(&outputs[0], "Members"), records(&outputs[1], "Members"));
    assert_eq!(records(&outputs[0], "Family"), records(&outputs[1], "Family"));
    Ok(())
}

#[test]
fn test_empty_container_policy_branches() -> TestResult {
    init_logging();
    let docs = documents(&[FAMILY_SMITH, FAMILY_SOLO]);

    let blank = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .with_empty_container_policy(EmptyContainerPolicy::BlankRow)
        .build()?;
    let mut sink = MemorySink::new();
    blank.convert(&docs, &mut sink)?;
    assert_eq!(
        records(&sink, "Members"),
        [vec!["Age_1", "Age_2"], vec!["10", "12"], vec!["", ""]]
    );

    let none = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .with_empty_container_policy(EmptyContainerPolicy::NoRow)
        .build()?;
    let mut sink = MemorySink::new();
    let summary = none.convert(&docs, &mut sink)?;
    assert_eq!(records(&sink, "Members"), [vec!["Age_1", "Age_2"], vec!["10", "12"]]);
    assert_eq!(summary.rows_for("Members"), Some(1));
    assert_eq!(records(&sink, "Family")[2], ["Solo"]);
    Ok(())
}

#[test]
fn test_groups_without_rows_still_get_a_header() -> TestResult {
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .with_empty_container_policy(EmptyContainerPolicy::NoRow)
        .build()?;
    let mut sink = MemorySink::new();
    converter.convert(&documents(&[FAMILY_SOLO]), &mut sink)?;

    assert_eq!(sink.group_names(), ["Family", "Members"]);
    assert_eq!(records(&sink, "Members"), [vec!["Age"]]);
    Ok(())
}

#[test]
fn test_whitespace_trimming_is_configurable() -> TestResult {
    let docs = [InMemoryDocument::new("padded.xml", r#"<family surname="  Van  Dyke "/>"#)];
    for (trim, expected) in [(true, "Van  Dyke"), (false, "  Van  Dyke ")] {
        let converter = ConverterBuilder::new()
            .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
            .with_trim_whitespace(trim)
            .build()?;
        let mut sink = MemorySink::new();
        converter.convert(&docs, &mut sink)?;
        assert_eq!(records(&sink, "Family")[1], [expected]);
    }
    Ok(())
}

#[test]
fn test_inline_lines_in_a_default_namespace() -> TestResult {
    let converter = ConverterBuilder::new()
        .with_mapping_builder(orders_mapping(MultiValueBehaviour::Greedy))?
        .build()?;
    let mut sink = MemorySink::new();
    converter.convert(&documents(&[ORDERS]), &mut sink)?;
    assert_eq!(
        records(&sink, "Order"),
        [
            vec!["Id", "Sku", "Qty"],
            vec!["A", "x", "1"],
            vec!["A", "y, z", "2"],
            vec!["B", "", ""]
        ]
    );
    Ok(())
}

#[test]
fn test_single_pass_mode_uses_running_maxima() -> TestResult {
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let mut sink = MemorySink::new();
    let summary = converter.convert_single(&documents(&[FAMILY_SMITH, FAMILY_JONES]), &mut sink)?;

    assert_eq!(records(&sink, "Members"), [vec!["10", "12"], vec!["7", "9", "40"]]);
    assert_eq!(records(&sink, "Family"), [vec!["Smith"], vec!["Jones"]]);
    assert_eq!(summary.documents, 2);
    assert!(sink.is_finished());
    Ok(())
}

#[test]
fn test_unparsable_document_aborts_the_run() -> TestResult {
    let docs = vec![
        InMemoryDocument::new("good.xml", FAMILY_SMITH),
        InMemoryDocument::new("broken.xml", "<family>"),
    ];
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let mut sink = MemorySink::new();
    let err = converter.convert(&docs, &mut sink).unwrap_err();

    match err {
        PipelineError::DocumentLoad { document, source } => {
            assert_eq!(document, "broken.xml");
            assert!(matches!(source, DocumentError::Parse(_)));
        }
        other => panic!("expected a document load error, got {}", other),
    }
    assert!(sink.group_names().is_empty());
    assert!(!sink.is_finished());
    Ok(())
}

#[test]
fn test_missing_file_is_a_load_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = FileDocument::new(dir.path().join("missing.xml"));
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let err = converter.convert([missing], &mut MemorySink::new()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DocumentLoad {
            source: DocumentError::Read(_),
            ..
        }
    ));
    assert!(err.to_string().contains("missing.xml"));
    Ok(())
}

#[test]
fn test_file_documents_are_read_from_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("smith.xml");
    std::fs::write(&path, FAMILY_SMITH)?;
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let mut sink = MemorySink::new();
    converter.convert([FileDocument::new(&path)], &mut sink)?;
    assert_eq!(records(&sink, "Family")[1], ["Smith"]);
    Ok(())
}

#[test]
fn test_evaluation_errors_name_document_and_mapping() -> TestResult {
    use xmltab::core::{ContainerDefinition, MappingConfiguration, ValueDefinition};

    let mapping = MappingConfiguration::builder().with_container(
        ContainerDefinition::new("Family", "/family")
            .with_value(ValueDefinition::new("Broken", "no-such-function(@surname)")),
    );
    let converter = ConverterBuilder::new().with_mapping_builder(mapping)?.build()?;
    let err = converter
        .convert(&documents(&[FAMILY_SMITH]), &mut MemorySink::new())
        .unwrap_err();
    match &err {
        PipelineError::Extraction {
            document,
            source: EngineError::Expression { mapping, expression, .. },
        } => {
            assert_eq!(document, "doc1.xml");
            assert_eq!(mapping, "Broken");
            assert_eq!(expression, "no-such-function(@surname)");
        }
        other => panic!("expected an extraction error, got {}", other),
    }
    Ok(())
}

/// Accepts records until it sees the named group.
struct RejectingSink {
    reject: &'static str,
    inner: MemorySink,
}

impl OutputSink for RejectingSink {
    fn write_record(&mut self, group: &str, row: &[String]) -> io::Result<()> {
        if group == self.reject {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        }
        self.inner.write_record(group, row)
    }
}

#[test]
fn test_sink_failures_name_the_group() -> TestResult {
    let converter = ConverterBuilder::new()
        .with_mapping_builder(family_mapping(MultiValueBehaviour::Lazy))?
        .build()?;
    let mut sink = RejectingSink {
        reject: "Members",
        inner: MemorySink::new(),
    };
    let err = converter
        .convert(&documents(&[FAMILY_SMITH]), &mut sink)
        .unwrap_err();
    assert!(matches!(err, PipelineError::SinkWrite { ref group, .. } if group == "Members"));
    assert!(!sink.inner.is_finished());
    Ok(())
}
