//! Two-pass conversion of a batch of documents.
//!
//! Pass 1 extracts every document, grows the cardinality table and appends
//! the extraction to the intermediate store. The table is then frozen, which
//! fixes every output group's columns. Pass 2 replays the store and flattens
//! each document against the frozen layout, so every row of a group has the
//! width of its header.

use super::config::ConverterConfig;
use super::store::{ResultStore, StoreError};
use crate::error::PipelineError;
use crate::sink::OutputSink;
use crate::source::{DocumentError, DocumentSource};
use log::{debug, info, warn};
use xmltab_core::{
    CardinalityTable, DocumentExtraction, EngineError, Extractor, GroupHeader, GroupRows,
    MappingConfiguration, flatten_document, headers,
};
use xmltab_xml::XmlDocument;

/// Statistics of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub documents: usize,
    /// Data rows written per output group, excluding headers, in output
    /// group order.
    pub rows: Vec<(String, usize)>,
}

impl ConversionSummary {
    pub fn rows_for(&self, group: &str) -> Option<usize> {
        self.rows.iter().find(|(name, _)| name == group).map(|(_, n)| *n)
    }
}

#[derive(Debug, Clone)]
pub struct Converter {
    mapping: MappingConfiguration,
    config: ConverterConfig,
}

impl Converter {
    pub fn new(mapping: MappingConfiguration, config: ConverterConfig) -> Self {
        Self { mapping, config }
    }

    pub fn mapping(&self) -> &MappingConfiguration {
        &self.mapping
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `documents` in order, writing a header and the rows of each
    /// output group to `sink`, and finishes the sink on success.
    pub fn convert<I, S>(&self, documents: I, sink: &mut S) -> Result<ConversionSummary, PipelineError>
    where
        I: IntoIterator,
        I::Item: DocumentSource,
        S: OutputSink + ?Sized,
    {
        // --- PASS 1: Extraction ---
        info!("[PASS 1] Extracting documents into the intermediate store.");
        let mut table = CardinalityTable::new();
        let mut store = ResultStore::create(self.config.store_backing)?;
        for source in documents {
            let extraction = self.extract(&source, &mut table)?;
            store.append(&extraction)?;
            debug!("[PASS 1] Stored document {} ('{}').", store.len(), source.id());
        }
        table.freeze();
        let headers = headers(&self.mapping, &table);
        info!(
            "[PASS 1] Complete. {} document(s), {} output group(s); column layout frozen.",
            store.len(),
            headers.len()
        );

        // --- PASS 2: Flattening ---
        info!("[PASS 2] Replaying the intermediate store.");
        let mut writer = GroupWriter::new(sink, &headers);
        let mut replayed = 0;
        for (index, entry) in store.replay()?.enumerate() {
            let extraction = entry?;
            let groups = self.flatten(index, &extraction, &table)?;
            writer.write_document(&groups)?;
            replayed += 1;
        }
        writer.write_remaining_headers()?;
        let rows = writer.row_counts;
        sink.finish().map_err(PipelineError::SinkFinish)?;
        info!("[PASS 2] Complete. Wrote {} document(s).", replayed);

        Ok(ConversionSummary {
            documents: replayed,
            rows,
        })
    }

    /// Converts in a single pass: each document is flattened right after
    /// extraction against the maxima seen so far. No store is used and no
    /// headers are written, so rows of later documents may be wider than
    /// those of earlier ones.
    pub fn convert_single<I, S>(
        &self,
        documents: I,
        sink: &mut S,
    ) -> Result<ConversionSummary, PipelineError>
    where
        I: IntoIterator,
        I::Item: DocumentSource,
        S: OutputSink + ?Sized,
    {
        info!("[SINGLE PASS] Converting without an intermediate store.");
        let mut table = CardinalityTable::new();
        let mut summary = ConversionSummary {
            documents: 0,
            rows: self
                .mapping
                .output_groups()
                .iter()
                .map(|g| (g.name().to_string(), 0))
                .collect(),
        };
        for (index, source) in documents.into_iter().enumerate() {
            let extraction = self.extract(&source, &mut table)?;
            let groups = self.flatten(index, &extraction, &table)?;
            for (slot, group) in groups.iter().enumerate() {
                write_rows(sink, group)?;
                summary.rows[slot].1 += group.rows.len();
            }
            summary.documents += 1;
        }
        sink.finish().map_err(PipelineError::SinkFinish)?;
        Ok(summary)
    }

    fn extract<D: DocumentSource>(
        &self,
        source: &D,
        table: &mut CardinalityTable,
    ) -> Result<DocumentExtraction, PipelineError> {
        let id = source.id();
        let load_error = |cause: DocumentError| PipelineError::DocumentLoad {
            document: id.to_string(),
            source: cause,
        };
        let text = source.load().map_err(|e| load_error(e.into()))?;
        let document = XmlDocument::parse(&text).map_err(|e| load_error(e.into()))?;
        Extractor::new(&self.mapping, self.config.trim_whitespace)
            .extract(id, document.root_node(), table)
            .map_err(|source| PipelineError::Extraction {
                document: id.to_string(),
                source,
            })
    }

    /// A result that does not fit the mapping tree can only come from a
    /// damaged store record, so it is reported as a store error.
    fn flatten(
        &self,
        index: usize,
        extraction: &DocumentExtraction,
        table: &CardinalityTable,
    ) -> Result<Vec<GroupRows>, PipelineError> {
        flatten_document(&self.mapping, extraction, table, self.config.empty_container_policy)
            .map_err(|e| match e {
                EngineError::ResultMismatch { .. } => PipelineError::Store(StoreError::Corrupt {
                    index,
                    message: e.to_string(),
                }),
                source => PipelineError::Extraction {
                    document: extraction.document.clone(),
                    source,
                },
            })
    }
}

fn write_rows<S: OutputSink + ?Sized>(sink: &mut S, group: &GroupRows) -> Result<(), PipelineError> {
    for row in &group.rows {
        sink.write_record(&group.group, row)
            .map_err(|source| PipelineError::SinkWrite {
                group: group.group.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Writes each group's header once, just before its first row.
struct GroupWriter<'s, S: OutputSink + ?Sized> {
    sink: &'s mut S,
    headers: &'s [GroupHeader],
    header_written: Vec<bool>,
    row_counts: Vec<(String, usize)>,
}

impl<'s, S: OutputSink + ?Sized> GroupWriter<'s, S> {
    fn new(sink: &'s mut S, headers: &'s [GroupHeader]) -> Self {
        Self {
            sink,
            headers,
            header_written: vec![false; headers.len()],
            row_counts: headers.iter().map(|h| (h.group.clone(), 0)).collect(),
        }
    }

    fn write_header(&mut self, slot: usize) -> Result<(), PipelineError> {
        let header = &self.headers[slot];
        self.sink
            .write_record(&header.group, &header.columns)
            .map_err(|source| PipelineError::SinkWrite {
                group: header.group.clone(),
                source,
            })?;
        self.header_written[slot] = true;
        Ok(())
    }

    fn write_document(&mut self, groups: &[GroupRows]) -> Result<(), PipelineError> {
        for (slot, group) in groups.iter().enumerate() {
            if group.rows.is_empty() {
                continue;
            }
            if !self.header_written[slot] {
                self.write_header(slot)?;
            }
            write_rows(self.sink, group)?;
            self.row_counts[slot].1 += group.rows.len();
        }
        Ok(())
    }

    /// Groups that never received a row still get their header.
    fn write_remaining_headers(&mut self) -> Result<(), PipelineError> {
        for slot in 0..self.headers.len() {
            if !self.header_written[slot] {
                warn!("Output group '{}' received no rows", self.headers[slot].group);
                self.write_header(slot)?;
            }
        }
        Ok(())
    }
}
