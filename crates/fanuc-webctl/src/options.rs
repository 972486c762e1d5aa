//! Installed software options.

use crate::connection::Connection;
use crate::error::Result;
use crate::parsing::parse_features;
use crate::protocol::get_file_as_string;
use crate::types::Feature;

const VERSION_FILE: &str = "/md:/version.dg";

/// Options listed in the controller's version report. Demo options are not
/// included.
pub fn get_features(conn: &Connection) -> Result<Vec<Feature>> {
    Ok(parse_features(&get_file_as_string(conn, VERSION_FILE)?))
}

/// Whether option `order_no` (e.g. `R632`) is installed.
///
/// Checks `features` when given, otherwise downloads the current list.
pub fn has_feature(
    conn: &Connection,
    order_no: &str,
    features: Option<&[Feature]>,
) -> Result<bool> {
    let fetched;
    let features = match features {
        Some(features) => features,
        None => {
            fetched = get_features(conn)?;
            &fetched
        }
    };
    Ok(features
        .iter()
        .any(|feature| feature.order_no.eq_ignore_ascii_case(order_no)))
}
