//! Device dictionaries written for each board

use crate::config::BoardEntry;
use crate::constants::TEMPLATE_EXTENSION;

/// Device dictionary for one board.
///
/// The output is itself a template consumed by lava-server: it extends the
/// board's device-type template and adds one `{% ... %}` tag per board
/// option, in declaration order.
pub fn device_descriptor(board: &BoardEntry) -> String {
    let mut descriptor = format!(
        "{{% extends '{}.{}' %}}\n",
        board.device_type, TEMPLATE_EXTENSION
    );
    descriptor.extend(
        board
            .options
            .iter()
            .map(|directive| format!("{{% {} %}}\n", directive)),
    );
    descriptor
}
