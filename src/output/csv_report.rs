use std::io::Write;

use csv::Writer;

use crate::{errors::OutputError, models::diff::DiffRecord};

use super::Output;

/// CSV report with a header row.
pub struct CsvOutput<W: Write + Send> {
    writer: Writer<W>,
}

impl<W: Write + Send> CsvOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Writer::from_writer(writer),
        }
    }
}

impl<W: Write + Send> Output for CsvOutput<W> {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diff::{DiffType, Field, RecordScope};

    #[test]
    fn writes_header_and_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let scope = RecordScope::new("db1", "users");

        let mut output = CsvOutput::new(file.reopen().unwrap());
        output
            .write(&scope.record(None, DiffType::TableExistsInComparison, None, None))
            .unwrap();
        output
            .write(&scope.field(
                "email",
                DiffType::ColumnStructure,
                Field::Type,
                Some("db1:users:email:string vs db2:users:email:text".to_string()),
            ))
            .unwrap();
        output.flush().unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "database,table,column,diff_type,field,passed,message"
        );
        assert_eq!(lines[1], "db1,users,,table_exists_in_comparison,,true,");
        assert_eq!(
            lines[2],
            "db1,users,email,column_structure,type,false,db1:users:email:string vs db2:users:email:text"
        );
    }
}
