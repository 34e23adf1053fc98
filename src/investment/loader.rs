//! Load investment requests from JSON files

use super::InvestmentRequest;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a request from a JSON file using the same field names as the HTTP API
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<InvestmentRequest, Box<dyn Error>> {
    let file = File::open(path.as_ref())
        .map_err(|e| format!("Unable to open {}: {}", path.as_ref().display(), e))?;
    load_request_from_reader(BufReader::new(file))
}

/// Load a request from any reader (e.g., string buffer, stdin)
pub fn load_request_from_reader<R: std::io::Read>(reader: R) -> Result<InvestmentRequest, Box<dyn Error>> {
    let request: InvestmentRequest = serde_json::from_reader(reader)?;
    Ok(request)
}
