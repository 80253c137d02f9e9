// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export of a ranking.

use crate::error::ApiError;
use crate::request_response::RankingEntry;

/// Column headers of the exported ranking, in order.
pub const RANKING_CSV_HEADERS: &[&str] = &[
    "rank",
    "song",
    "album",
    "score",
    "comparisons",
    "wins",
    "losses",
    "ties",
    "candidate_id",
];

/// Renders ranking entries as CSV with a header row.
///
/// Scores are written with one decimal place.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn ranking_to_csv(entries: &[RankingEntry]) -> Result<String, ApiError> {
    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());
    writer.write_record(RANKING_CSV_HEADERS).map_err(csv_error)?;

    for entry in entries {
        writer
            .write_record([
                entry.position.to_string(),
                entry.display_name.clone(),
                entry.group_name.clone(),
                format!("{:.1}", entry.score),
                entry.comparisons.to_string(),
                entry.wins.to_string(),
                entry.losses.to_string(),
                entry.ties.to_string(),
                entry.candidate_id.clone(),
            ])
            .map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer
        .into_inner()
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to finish CSV export: {e}"),
        })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV export is not valid UTF-8: {e}"),
    })
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV export: {err}"),
    }
}
