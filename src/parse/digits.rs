/// Maps Bangla digit glyphs (U+09E6..U+09EF) to their ASCII equivalents so
/// serial and date handling downstream is script-independent. Total and
/// idempotent: every other character passes through untouched.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|character| match character {
            '০'..='৯' => {
                let value = character as u32 - '০' as u32;
                char::from_u32('0' as u32 + value).unwrap_or(character)
            }
            _ => character,
        })
        .collect()
}
