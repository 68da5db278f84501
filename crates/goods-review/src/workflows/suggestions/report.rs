use serde::Serialize;
use std::io::Write;

use crate::workflows::report_summary::{PrefixId, SubjectId};

pub const SUGGESTION_HEADERS: [&str; 8] = [
    "id",
    "report_summary",
    "suggested_prefix",
    "suggested_prefix_id",
    "suggested_subject",
    "suggested_subject_id",
    "product_name",
    "url",
];

/// One output row; unmatched rows leave the suggestion columns empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionRow {
    pub id: String,
    pub report_summary: String,
    pub suggested_prefix: String,
    pub suggested_prefix_id: Option<PrefixId>,
    pub suggested_subject: String,
    pub suggested_subject_id: Option<SubjectId>,
    pub product_name: String,
    pub url: String,
}

/// Writes the header and rows with every field quoted. The header is written even with no rows.
pub(crate) fn write_rows<W: Write>(writer: W, rows: &[SuggestionRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(SUGGESTION_HEADERS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_every_field() {
        let row = SuggestionRow {
            id: "line-1".to_string(),
            report_summary: "Training for Arts and Crafts (2)".to_string(),
            suggested_prefix: "training for".to_string(),
            suggested_prefix_id: Some(PrefixId(1)),
            suggested_subject: "arts and crafts".to_string(),
            suggested_subject_id: Some(SubjectId(4)),
            product_name: "Easel".to_string(),
            url: String::new(),
        };

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[row]).expect("rows written");
        let output = String::from_utf8(buffer).expect("utf8");

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("\"id\",\"report_summary\",\"suggested_prefix\",\"suggested_prefix_id\",\"suggested_subject\",\"suggested_subject_id\",\"product_name\",\"url\"")
        );
        assert_eq!(
            lines.next(),
            Some("\"line-1\",\"Training for Arts and Crafts (2)\",\"training for\",\"1\",\"arts and crafts\",\"4\",\"Easel\",\"\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_report_still_has_a_header() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[]).expect("header written");
        assert_eq!(String::from_utf8(buffer).expect("utf8").lines().count(), 1);
    }
}
