//! Low-level byte reading helpers for slice cursors.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{PeelError, Result};

/// Split `len` bytes off the front of the cursor and advance it.
///
/// Fails with a [`PeelError::Truncated`] naming `context` when the cursor
/// holds fewer than `len` bytes.
pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize, context: &'static str) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(PeelError::Truncated {
            context,
            needed: len as u64,
            available: input.len() as u64,
        });
    }
    let (head, rest) = input.split_at(len);
    *input = rest;
    Ok(head)
}

/// Read a 4-byte little-endian number and advance the cursor.
///
/// All size and count fields in Body.data are 32-bit little-endian.
pub(crate) fn read_u32(input: &mut &[u8], context: &'static str) -> Result<u32> {
    let bytes = take(input, 4, context)?;
    Ok(LittleEndian::read_u32(bytes))
}
