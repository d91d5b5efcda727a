use crate::Result;

use serde::de::IgnoredAny;

/// Accept a write response once its body is known to be valid JSON.
pub(crate) fn check_response(body: &[u8]) -> Result<()> {
    serde_json::from_slice::<IgnoredAny>(body)?;
    Ok(())
}
