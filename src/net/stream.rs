use std::io::{self, ErrorKind, Read};

use crate::errors::{ClientError, ProtocolError};

/// Reads until `buf` is full or the source reports end of stream.
///
/// Returns the number of bytes actually placed in `buf`; anything short of
/// `buf.len()` means the peer closed the stream.
pub fn read_fully<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads exactly `len` bytes of one frame section.
pub fn read_section<R: Read + ?Sized>(
    src: &mut R,
    section: &'static str,
    len: usize,
) -> Result<Vec<u8>, ClientError> {
    let mut buf = vec![0u8; len];
    let received = read_fully(src, &mut buf)?;
    if received < len {
        return Err(ProtocolError::TruncatedFrame {
            section,
            expected: len,
            received,
        }
        .into());
    }
    Ok(buf)
}
