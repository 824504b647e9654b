use itertools::Itertools;

/// Lossy conversion for logging sequences and CIGARs.
pub fn seq_to_string(seq: &[u8]) -> String {
    String::from_utf8_lossy(seq).into_owned()
}

/// Formats a duration as its non-zero units, e.g. `1m 5s 12us 3ns`.
pub fn pretty_print_nanos(nanos: u64) -> String {
    const UNITS: [(&str, u64); 7] = [
        ("d", 24 * 60 * 60 * 1_000_000_000),
        ("h", 60 * 60 * 1_000_000_000),
        ("m", 60 * 1_000_000_000),
        ("s", 1_000_000_000),
        ("ms", 1_000_000),
        ("us", 1_000),
        ("ns", 1),
    ];
    if nanos == 0 {
        return "0ns".into();
    }
    let mut rest = nanos;
    UNITS
        .iter()
        .filter_map(|&(unit, size)| {
            let cnt = rest / size;
            rest %= size;
            (cnt > 0).then(|| format!("{cnt}{unit}"))
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_nanos() {
        assert_eq!(pretty_print_nanos(0), "0ns");
        assert_eq!(pretty_print_nanos(999), "999ns");
        assert_eq!(pretty_print_nanos(1_000), "1us");
        assert_eq!(pretty_print_nanos(1_500_042), "1ms 500us 42ns");
        assert_eq!(pretty_print_nanos(65_000_012_003), "1m 5s 12us 3ns");
        assert_eq!(
            pretty_print_nanos(2 * 86_400_000_000_000 + 3_600_000_000_000),
            "2d 1h"
        );
    }

    #[test]
    fn lossy_strings() {
        assert_eq!(seq_to_string(b"ACGT"), "ACGT");
        assert_eq!(seq_to_string(b"A\xffC"), "A\u{fffd}C");
    }
}
