use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::report_summary::SummaryRemap;

/// Reads an `original,corrected` CSV. Rows missing either column are ignored.
pub(crate) fn parse_remap<R: Read>(reader: R) -> Result<SummaryRemap, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut remap = SummaryRemap::new();

    for record in csv_reader.deserialize::<RemapRow>() {
        let row = record?;
        if let (Some(original), Some(corrected)) = (row.original, row.corrected) {
            remap.insert(original, corrected);
        }
    }

    Ok(remap)
}

#[derive(Debug, Deserialize)]
struct RemapRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    original: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    corrected: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
