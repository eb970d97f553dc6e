use crate::error::{Error, Result};

/// Little-endian cursor over a ROM image or a slice of one
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at an absolute offset into `data`
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        if self.remaining() < 1 {
            return Err(Error::UnexpectedEof);
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0302);
        assert_eq!(reader.read_bytes(3).unwrap(), &[0x04, 0x05, 0x06]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_at_offset() {
        let data = [0xAA, 0xBB, 0xE7, 0x61, 0xCF];
        let mut reader = BinaryReader::at(&data, 2);
        assert_eq!(reader.read_u16_le().unwrap(), 0x61E7);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_eof() {
        let data = [0x01];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(reader.read_u16_le(), Err(Error::UnexpectedEof)));
        // A failed read does not consume anything
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert!(matches!(reader.read_u8(), Err(Error::UnexpectedEof)));
    }
}
