use bitstream::{with_thread_writer, BitError, BitReader, BufferReaderFactory, BufferWriterFactory};

#[test]
fn factory_writer_roundtrip_bits() {
    let mut factory = BufferWriterFactory::new(8).unwrap();
    let mut writer = factory.make().unwrap();
    writer.write_bits(0b1010, 4).unwrap();
    writer.write_bits(0xAB, 8).unwrap();
    let bytes = writer.to_vec();

    let mut reader = BufferReaderFactory.make(&bytes).unwrap();
    assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
}

#[test]
fn count_prefix_patched_after_payload() {
    let mut factory = BufferWriterFactory::new(64).unwrap();
    let mut writer = factory.make().unwrap();
    writer.write_bit(false).unwrap();
    let count = writer.reserve(32).unwrap();
    let items = [3u8, 1, 4, 1, 5];
    for item in items {
        writer.write_bit(false).unwrap();
        writer.write_byte(item).unwrap();
    }
    writer.patch(count, items.len() as u64).unwrap();
    let bytes = writer.to_vec();

    let mut reader = BitReader::new(&bytes).unwrap();
    assert!(!reader.read_bit().unwrap());
    let len = u32::try_from(reader.read_bits(32).unwrap()).unwrap();
    let mut decoded = Vec::new();
    for _ in 0..len {
        assert!(!reader.read_bit().unwrap());
        decoded.push(reader.read_byte().unwrap());
    }
    assert_eq!(decoded, items);
}

#[test]
fn thread_writer_roundtrip_mixed() {
    let bytes: Result<Vec<u8>, BitError> = with_thread_writer(16, |writer| {
        writer.write_bit(true)?;
        writer.write_bytes(&0xBEEFu16.to_le_bytes())?;
        writer.write_bits(5, 3)?;
        Ok(writer.to_vec())
    });
    let bytes = bytes.unwrap();

    let mut reader = BitReader::new(&bytes).unwrap();
    assert!(reader.read_bit().unwrap());
    assert_eq!(u16::from_le_bytes(reader.read_array().unwrap()), 0xBEEF);
    assert_eq!(reader.read_bits(3).unwrap(), 5);
}
