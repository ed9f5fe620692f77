#![allow(dead_code)]

use xmltab::core::{
    ContainerDefinition, MappingConfiguration, MappingConfigurationBuilder, MultiValueBehaviour,
    OutputGrouping, ValueDefinition,
};
use xmltab::{InMemoryDocument, MemorySink};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const FAMILY_SMITH: &str = r#"<family surname="Smith">
    <members>
        <person><name>Ann</name><age>10</age></person>
        <person><name>Bob</name><age>12</age></person>
    </members>
</family>"#;

pub const FAMILY_JONES: &str = r#"<family surname="Jones">
    <members>
        <person><name>Cat</name><age>7</age></person>
        <person><name>Dan</name><age>9</age></person>
        <person><name>Eve</name><age>40</age></person>
    </members>
</family>"#;

pub const FAMILY_SOLO: &str = r#"<family surname="Solo"/>"#;

pub const ORDERS: &str = r#"<orders xmlns="urn:example:orders">
    <order id="A"><line sku="x" qty="1"/><line sku="y, z" qty="2"/></order>
    <order id="B"/>
</orders>"#;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `Family` with a `Name` value and an independent `Members` group whose
/// `Age` mapping uses `age` behaviour.
pub fn family_mapping(age: MultiValueBehaviour) -> MappingConfigurationBuilder {
    MappingConfiguration::builder().with_container(
        ContainerDefinition::new("Family", "/family")
            .with_value(ValueDefinition::new("Name", "@surname"))
            .with_container(
                ContainerDefinition::new("Members", "members")
                    .with_value(ValueDefinition::new("Age", "person/age").with_behaviour(age)),
            ),
    )
}

/// Orders in a default namespace with their lines joined inline.
pub fn orders_mapping(lines: MultiValueBehaviour) -> MappingConfigurationBuilder {
    MappingConfiguration::builder()
        .with_default_element_namespace("urn:example:orders")
        .with_container(
            ContainerDefinition::new("Order", "/orders/order")
                .with_value(ValueDefinition::new("Id", "@id"))
                .with_container(
                    ContainerDefinition::new("Line", "line")
                        .with_grouping(OutputGrouping::Inline)
                        .with_behaviour(lines)
                        .with_value(ValueDefinition::new("Sku", "@sku"))
                        .with_value(ValueDefinition::new("Qty", "@qty")),
                ),
        )
}

pub fn documents(texts: &[&str]) -> Vec<InMemoryDocument> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| InMemoryDocument::new(format!("doc{}.xml", i + 1), *text))
        .collect()
}

/// A group's records as string slices, for terse assertions.
pub fn records<'s>(sink: &'s MemorySink, group: &str) -> Vec<Vec<&'s str>> {
    sink.records(group)
        .unwrap_or_default()
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect()
}
