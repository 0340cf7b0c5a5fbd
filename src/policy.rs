use log::warn;

use crate::{Error, Result};

/// Policy for handling records that cannot be encoded
///
/// Only record-level errors ([`Error::is_record_error`]) are subject to the policy;
/// configuration, header and I/O errors always abort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Return the error and stop writing
    #[default]
    Abort,
    /// Log the error, drop the record and continue with the next one
    Skip,
}
impl Policy {
    /// Decide what to do with an encoding error
    ///
    /// Returns `Ok(false)` if the record should be skipped and the error otherwise.
    pub fn handle(&self, err: Error) -> Result<bool> {
        match self {
            Self::Skip if err.is_record_error() => {
                warn!("Skipping record: {err}");
                Ok(false)
            }
            _ => Err(err),
        }
    }
}
