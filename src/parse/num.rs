use crate::Byte;

pub(crate) fn ascii_to_u64(bytes: &[Byte]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    bytes.iter().try_fold(0u64, |number, &byte| match byte {
        b'0'..=b'9' => number
            .checked_mul(10)
            .and_then(|number| number.checked_add(u64::from(byte - b'0'))),
        _ => None,
    })
}

pub(crate) fn ascii_to_u16(bytes: &[Byte]) -> Option<u16> {
    ascii_to_u64(bytes).and_then(|number| u16::try_from(number).ok())
}

pub(crate) fn ascii_to_usize(bytes: &[Byte]) -> Option<usize> {
    ascii_to_u64(bytes).and_then(|number| usize::try_from(number).ok())
}

pub(crate) fn ascii_to_i64(bytes: &[Byte]) -> Option<i64> {
    match bytes.split_first() {
        Some((b'-', digits)) => ascii_to_u64(digits)
            .and_then(|number| i64::try_from(number).ok())
            .map(|number| -number),
        Some((b'+', digits)) => ascii_to_u64(digits).and_then(|number| i64::try_from(number).ok()),
        _ => ascii_to_u64(bytes).and_then(|number| i64::try_from(number).ok()),
    }
}

// Exponent notation is not part of the PDF syntax, so `str::parse` is only
// trusted once the characters are known to be digits, a sign and a point.
// Leading or trailing points (".5", "4.") are valid PDF reals.
pub(crate) fn ascii_to_f64(bytes: &[Byte]) -> Option<f64> {
    let digits = bytes.strip_prefix(b"-").or_else(|| bytes.strip_prefix(b"+")).unwrap_or(bytes);
    let points = digits.iter().filter(|&&byte| byte == b'.').count();
    if digits.is_empty()
        || points > 1
        || !digits.iter().all(|&byte| byte.is_ascii_digit() || byte == b'.')
        || digits.iter().all(|&byte| byte == b'.')
    {
        return None;
    }
    ::std::str::from_utf8(bytes).ok()?.parse().ok()
}

pub(crate) fn hex_val(byte: Byte) -> Option<Byte> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}
