use std::env;
use std::path::Path;
use xmltab::core::{
    ContainerDefinition, MappingConfiguration, MultiValueBehaviour, OutputGrouping, ValueDefinition,
};
use xmltab::{ConverterBuilder, CsvDirectorySink, InMemoryDocument, PipelineError};

const ORDERS_2024: &str = r#"<orders xmlns="urn:example:orders">
    <order id="A-1"><customer>Acme</customer>
        <line sku="bolt" qty="12"/><line sku="nut, m8" qty="40"/>
    </order>
    <order id="A-2"><customer>Globex</customer>
        <line sku="washer" qty="100"/>
    </order>
</orders>"#;

const ORDERS_2025: &str = r#"<orders xmlns="urn:example:orders">
    <order id="B-1"><customer>Initech</customer>
        <line sku="bolt" qty="3"/><line sku="nut" qty="3"/><line sku="washer" qty="6"/>
    </order>
</orders>"#;

fn main() -> Result<(), PipelineError> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "xmltab=info");
        }
    }
    env_logger::init();

    let output_dir = Path::new("target/xmltab-demo");
    println!("Writing CSV files to {}...", output_dir.display());

    let mapping = MappingConfiguration::builder()
        .with_default_element_namespace("urn:example:orders")
        .with_container(
            ContainerDefinition::new("Order", "/orders/order")
                .with_value(ValueDefinition::new("Id", "@id"))
                .with_value(ValueDefinition::new("Customer", "customer"))
                .with_container(
                    ContainerDefinition::new("Line", "line")
                        .with_grouping(OutputGrouping::Inline)
                        .with_behaviour(MultiValueBehaviour::Lazy)
                        .with_value(ValueDefinition::new("Sku", "@sku"))
                        .with_value(ValueDefinition::new("Qty", "@qty")),
                ),
        );
    let converter = ConverterBuilder::new()
        .with_mapping_builder(mapping)?
        .with_trim_whitespace(true)
        .build()?;
    println!("✓ Converter built");

    let mut sink = CsvDirectorySink::new(output_dir).map_err(PipelineError::SinkFinish)?;
    let documents = [
        InMemoryDocument::new("orders-2024.xml", ORDERS_2024),
        InMemoryDocument::new("orders-2025.xml", ORDERS_2025),
    ];
    let summary = converter.convert(&documents, &mut sink)?;
    println!("✓ Converted {} documents", summary.documents);

    for (group, rows) in &summary.rows {
        println!("✓ {} rows -> {}", rows, sink.path_for(group).display());
    }

    Ok(())
}
