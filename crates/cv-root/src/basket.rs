//! TBasket records: the compressed blocks that hold branch data.

use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// A basket key plus the `TBasket` fields that follow the plain key header.
#[derive(Debug, Clone)]
pub struct Basket {
    /// The key in front of the basket.
    pub key: Key,
    /// Entries stored in the basket (`fNevBuf`).
    pub n_entries: u32,
    /// End of the data area, counted from the start of the key (`fLast`).
    pub last: u32,
}

impl Basket {
    /// Parse the basket header at `seek`.
    pub fn read(file: &[u8], seek: u64, file_is_large: bool) -> Result<Self> {
        let pos = seek as usize;
        if pos >= file.len() {
            return Err(RootError::BufferUnderflow { offset: pos, need: 1, have: 0 });
        }
        let mut r = RBuffer::at(file, pos);
        let key = Key::read(&mut r, file_is_large)?;
        let _version = r.read_u16()?;
        let _buffer_size = r.read_i32()?;
        let _nev_buf_size = r.read_i32()?;
        let n_entries = r.read_i32()?.max(0) as u32;
        let last = r.read_i32()?.max(0) as u32;
        let _flag = r.read_u8()?;
        Ok(Self { key, n_entries, last })
    }

    /// Inflated basket contents with any entry-offset table removed.
    pub fn data(&self, file: &[u8]) -> Result<Vec<u8>> {
        let mut payload = self.key.payload(file)?;
        let data_len = (self.last as usize).saturating_sub(usize::from(self.key.key_len));
        if data_len > 0 && data_len < payload.len() {
            payload.truncate(data_len);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket_record(values: &[f64], trailing: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        for v in values {
            body.extend_from_slice(&v.to_be_bytes());
        }
        let data_len = body.len();
        body.extend_from_slice(trailing);

        let mut head = Vec::new();
        let key_len = 4 + 2 + 4 + 4 + 2 + 2 + 4 + 4 + 3 + 3 + 1 + 2 + 4 * 4 + 1;
        let n_bytes = (key_len + body.len()) as u32;
        head.extend_from_slice(&n_bytes.to_be_bytes());
        head.extend_from_slice(&4u16.to_be_bytes());
        head.extend_from_slice(&(body.len() as u32).to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes());
        head.extend_from_slice(&(key_len as u16).to_be_bytes());
        head.extend_from_slice(&1u16.to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes());
        head.extend_from_slice(&0u32.to_be_bytes());
        for s in ["TB", "xs"] {
            head.push(s.len() as u8);
            head.extend_from_slice(s.as_bytes());
        }
        head.push(0); // empty title
        head.extend_from_slice(&3u16.to_be_bytes());
        head.extend_from_slice(&32000i32.to_be_bytes());
        head.extend_from_slice(&0i32.to_be_bytes());
        head.extend_from_slice(&(values.len() as i32).to_be_bytes());
        head.extend_from_slice(&((key_len + data_len) as i32).to_be_bytes());
        head.push(0);
        assert_eq!(head.len(), key_len);
        head.extend_from_slice(&body);
        head
    }

    #[test]
    fn reads_uncompressed_basket() {
        let file = basket_record(&[1.5, -2.0, 8.25], &[]);
        let basket = Basket::read(&file, 0, false).unwrap();
        assert_eq!(basket.n_entries, 3);
        let data = basket.data(&file).unwrap();
        assert_eq!(data.len(), 24);
        assert_eq!(f64::from_be_bytes(data[8..16].try_into().unwrap()), -2.0);
    }

    #[test]
    fn strips_entry_offset_table() {
        let file = basket_record(&[4.0], &[0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0]);
        let basket = Basket::read(&file, 0, false).unwrap();
        assert_eq!(basket.data(&file).unwrap().len(), 8);
    }

    #[test]
    fn seek_past_end_is_an_error() {
        assert!(Basket::read(&[0u8; 10], 100, false).is_err());
    }
}
