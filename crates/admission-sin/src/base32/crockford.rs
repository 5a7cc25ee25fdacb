use super::Base32Error;

/// Crockford base32 alphabet. Excludes `I`, `L`, `O` and `U` so printed codes
/// survive being read aloud or copied by hand.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 5;
const MASK: u128 = 0x1F;

/// Widest input [`decode_base32`] accepts: 26 characters carry 130 bits, so
/// anything longer cannot fit a `u128`.
pub const MAX_DECODE_LEN: usize = 26;

/// Lookup table for Crockford base32 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i; // lowercase letter
        }
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/// Number of distinct values representable in `width` base32 characters.
///
/// Saturates at `u128::MAX` for widths that would overflow.
pub const fn space_for_width(width: usize) -> u128 {
    if width * BITS_PER_CHAR as usize >= 128 {
        u128::MAX
    } else {
        1_u128 << (width as u32 * BITS_PER_CHAR)
    }
}

/// Encodes the low `5 * buf.len()` bits of `value` into `buf`, most
/// significant character first. Higher bits are discarded.
pub fn encode_base32(value: u128, buf: &mut [u8]) {
    let mut acc = value;
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(acc & MASK) as usize];
        acc >>= BITS_PER_CHAR;
    }
}

/// Encodes `value` into a fixed-width, zero-padded base32 string.
pub fn encode_base32_string(value: u128, width: usize) -> String {
    let mut buf = vec![b'0'; width];
    encode_base32(value, &mut buf);
    // every byte comes from ALPHABET
    buf.into_iter().map(char::from).collect()
}

/// Decodes a Crockford base32 string, accepting lower-case input and the
/// `O`/`I`/`L` aliases.
pub fn decode_base32(encoded: &str) -> Result<u128, Base32Error> {
    let len = encoded.len();
    if len == 0 || len > MAX_DECODE_LEN {
        return Err(Base32Error::DecodeInvalidLen { len });
    }
    let mut acc = 0_u128;
    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(Base32Error::DecodeInvalidAscii { byte, index });
        }
        acc = (acc << BITS_PER_CHAR) | u128::from(val);
    }
    Ok(acc)
}
