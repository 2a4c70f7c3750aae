//! OSRM API response types for the Table service.
//!
//! Requests ask for `annotations=distance`, so the matrix of interest is
//! `distances` in metres.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// OSRM Table API response.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM, `"Ok"` on success.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of road distances in metres.
    ///
    /// `distances[i][j]` runs from the i-th to the j-th coordinate. Cells
    /// are `None` when no route exists between a pair.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
