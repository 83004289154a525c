use serde::Deserialize;

/// One raw record as delivered by the device transport. The ESP firmware
/// abbreviates field names on the wire, so the short forms are accepted as
/// aliases.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct RawRecord {
    /// Milliseconds since the device started.
    #[serde(rename = "deviceMs", alias = "T")]
    pub device_ms: u32,
    #[serde(rename = "ir", alias = "IR")]
    pub ir: i32,
    #[serde(rename = "red", alias = "RED")]
    pub red: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Wire {
    // The device wraps the array in {"data": [...]}.
    Wrapped { data: Vec<RawRecord> },
    Bare(Vec<RawRecord>),
}

/// Parses one polling response: either a bare JSON array of records or the
/// device's `{"data": [...]}` envelope.
pub fn parse_batch(json: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    Ok(match serde_json::from_str(json)? {
        Wire::Wrapped { data } => data,
        Wire::Bare(records) => records,
    })
}
