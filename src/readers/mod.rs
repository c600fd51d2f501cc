pub mod nc;
pub mod types;
pub mod utils;

pub use nc::NcReader;
pub use types::{DataReader, IceChart, ReadError};
pub use utils::{IceChartStamp, find_ice_charts};

use std::path::Path;

pub fn create_reader(path: &Path) -> Result<Box<dyn DataReader>, ReadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("nc") => Ok(Box::new(NcReader::new(path))),
        _ => Err(ReadError::UnknownFileType(path.to_path_buf())),
    }
}
