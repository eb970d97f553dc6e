/// Little-endian byte block builder
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::BinaryReader;

    #[test]
    fn test_roundtrip_primitives() {
        let mut writer = BinaryWriter::with_capacity(3);
        writer.write_u8(0x42);
        writer.write_u16_le(0x1234);

        let data = writer.into_vec();
        assert_eq!(data, vec![0x42, 0x34, 0x12]);
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
    }
}
