use super::OutputSink;
use std::io;
use xmltab_core::Row;

/// Collects every record in memory, grouped by output group in the order
/// groups were first written to.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    groups: Vec<(String, Vec<Row>)>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Default::default()
    }

    /// All records of `group`, header first.
    pub fn records(&self, group: &str) -> Option<&[Row]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl OutputSink for MemorySink {
    fn write_record(&mut self, group: &str, row: &[String]) -> io::Result<()> {
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, rows)) => rows.push(row.to_vec()),
            None => self.groups.push((group.to_string(), vec![row.to_vec()])),
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_groups_keep_first_write_order() {
        let mut sink = MemorySink::new();
        sink.write_record("b", &row(&["1"])).unwrap();
        sink.write_record("a", &row(&["2"])).unwrap();
        sink.write_record("b", &row(&["3"])).unwrap();
        assert_eq!(sink.group_names(), ["b", "a"]);
        assert_eq!(sink.records("b").unwrap(), [row(&["1"]), row(&["3"])]);
        assert!(sink.records("c").is_none());
        assert!(!sink.is_finished());
        sink.finish().unwrap();
        assert!(sink.is_finished());
    }
}
