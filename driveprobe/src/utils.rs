// SPDX-License-Identifier: MIT

/// Decodes a fixed-width on-disk label: stops at the first NUL and
/// strips the trailing space padding.
pub fn decode_label(raw: &[u8]) -> String {
    let end = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end])
        .trim_end_matches(' ')
        .to_string()
}

/// Encodes `label` into a space-padded fixed-width field.
pub fn encode_label<const N: usize>(label: &str) -> [u8; N] {
    let mut out = [b' '; N];
    let n = label.len().min(N);
    out[..n].copy_from_slice(&label.as_bytes()[..n]);
    out
}
