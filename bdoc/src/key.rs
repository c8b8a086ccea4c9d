use crate::error::{Error, Result};

/// Checks a document key against the strict-mode rules.
///
/// Keys beginning with `$` and keys containing `.` are rejected; empty
/// keys pass. The check operates on raw bytes and never inspects UTF-8
/// structure.
pub fn validate_key(key: &[u8]) -> Result<()> {
    if key.first() == Some(&b'$') {
        return Err(Error::InvalidKeyDollar(lossy(key)));
    }
    if key.contains(&b'.') {
        return Err(Error::InvalidKeyDot(lossy(key)));
    }
    Ok(())
}

fn lossy(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
