use std::env;
use xmltab::core::{ContainerDefinition, MappingConfiguration, MultiValueBehaviour, ValueDefinition};
use xmltab::{ConverterBuilder, InMemoryDocument, MemorySink, PipelineError};

const SMITH: &str = r#"<family surname="Smith">
    <members>
        <person><name>Ann</name><age>10</age></person>
        <person><name>Bob</name><age>12</age></person>
    </members>
</family>"#;

const JONES: &str = r#"<family surname="Jones">
    <members>
        <person><name>Cat</name><age>7</age></person>
        <person><name>Dan</name><age>9</age></person>
        <person><name>Eve</name><age>40</age></person>
    </members>
</family>"#;

fn main() -> Result<(), PipelineError> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "xmltab=info");
        }
    }
    env_logger::init();

    println!("Converting two family documents...");

    for behaviour in [MultiValueBehaviour::Lazy, MultiValueBehaviour::Greedy] {
        let mapping = MappingConfiguration::builder().with_container(
            ContainerDefinition::new("Family", "/family")
                .with_value(ValueDefinition::new("Name", "@surname"))
                .with_container(
                    ContainerDefinition::new("Members", "members").with_value(
                        ValueDefinition::new("Age", "person/age").with_behaviour(behaviour),
                    ),
                ),
        );
        let converter = ConverterBuilder::new().with_mapping_builder(mapping)?.build()?;
        println!("✓ Converter built ({:?} ages)", behaviour);

        let documents = [
            InMemoryDocument::new("smith.xml", SMITH),
            InMemoryDocument::new("jones.xml", JONES),
        ];
        let mut sink = MemorySink::new();
        let summary = converter.convert(&documents, &mut sink)?;
        println!("✓ Converted {} documents", summary.documents);

        for group in sink.group_names() {
            println!("\n[{}]", group);
            for record in sink.records(group).unwrap_or_default() {
                println!("{}", record.join(" | "));
            }
        }
        println!();
    }

    Ok(())
}
