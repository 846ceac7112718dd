#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut reader) = BitReader::new(data) else {
        return;
    };
    let mut idx = 0usize;

    // Input bytes drive a bounded sequence of reads over the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 5;
        idx += 1;

        let before = reader.bits_remaining();
        let ok = match op {
            0 => reader.read_bit().is_ok(),
            1 => {
                let bits = (data[idx - 1] % 64).saturating_add(1);
                reader.read_bits(bits).is_ok()
            }
            2 => reader.read_byte().is_ok(),
            3 => {
                let len = usize::from(data[idx - 1] % 16);
                reader.read_bytes(len).is_ok()
            }
            _ => reader.read_array::<4>().is_ok(),
        };
        // Failed reads leave the cursor in place.
        if !ok {
            assert_eq!(reader.bits_remaining(), before);
        }
    }
});
