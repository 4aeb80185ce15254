//! Display formatting for poster values
//!
//! Amounts are shown with Chinese magnitude units (万 / 亿), streak counts as
//! Chinese numerals, and theme colors are classified as light or dark to pick
//! a readable foreground.

use crate::types::{PosterError, Result};

const WAN: f64 = 1e4;
const YI: f64 = 1e8;

/// Format an amount with a Chinese magnitude unit.
///
/// # Examples
/// ```
/// use posterkit::services::format::format_number_with_unit;
///
/// assert_eq!(format_number_with_unit(123456789.0), "1.23亿");
/// assert_eq!(format_number_with_unit(12345.0), "1万");
/// assert_eq!(format_number_with_unit(1234.56), "1,234.56");
/// ```
pub fn format_number_with_unit(num: f64) -> String {
    if num.is_nan() {
        return "0.00".to_string();
    }

    let abs = num.abs();
    if abs >= YI {
        format!("{:.2}亿", num / YI)
    } else if abs >= WAN {
        // 万 carries no decimals; halves round up, so -2.5 becomes -2
        format!("{}万", (num / WAN + 0.5).floor())
    } else {
        format_grouped(num)
    }
}

/// Same as [`format_number_with_unit`] for text input such as `"1.5亿"`
/// or `"12,345"`. Unparseable text formats as `0.00`.
pub fn format_text_with_unit(text: &str) -> String {
    format_number_with_unit(parse_amount(text).unwrap_or(f64::NAN))
}

/// Parse an amount that may carry separators and a 万/亿 unit.
///
/// Only the leading number counts, so `"1.5-2"` reads as 1.5.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = leading_number(&cleaned)?;

    if text.contains('万') {
        Some(value * WAN)
    } else if text.contains('亿') {
        Some(value * YI)
    } else {
        Some(value)
    }
}

/// Longest `-?digits[.digits]` prefix of `s`
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    let mut seen_digit = false;
    let mut seen_dot = false;

    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

/// Two decimals with thousands separators (e.g., -1234.5 -> "-1,234.50")
fn format_grouped(num: f64) -> String {
    let fixed = format!("{:.2}", num.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if num < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Chinese numeral for a limit-up streak: 1 is "首", 2..=100 spelled out
pub fn number_to_chinese(num: u32) -> Result<String> {
    const UNITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    const TENS: [&str; 10] = [
        "", "十", "二十", "三十", "四十", "五十", "六十", "七十", "八十", "九十",
    ];

    match num {
        1 => Ok("首".to_string()),
        2..=9 => Ok(UNITS[num as usize].to_string()),
        10..=99 => Ok(format!("{}{}", TENS[(num / 10) as usize], UNITS[(num % 10) as usize])),
        100 => Ok("一百".to_string()),
        _ => Err(PosterError::Template(format!(
            "number must be between 1 and 100, got {}",
            num
        ))),
    }
}

/// Cut `text` to `limit` characters and append `overflow` when it was longer
pub fn truncate_with_ellipsis(text: &str, limit: usize, overflow: &str) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        head + overflow
    } else {
        text.to_string()
    }
}

/// Whether a CSS color is light (relative luminance above 0.5).
///
/// Accepts `#RGB`, `#RRGGBB`, `rgb(r,g,b)` and `rgba(r,g,b,a)`. Anything else
/// is treated as black.
pub fn is_light_color(color: &str) -> bool {
    let color = color.trim().to_lowercase();
    let [r, g, b] = if let Some(hex) = color.strip_prefix('#') {
        hex_to_rgb(hex)
    } else if color.starts_with("rgb") {
        rgb_fn_to_rgb(&color)
    } else {
        [0, 0, 0]
    };

    let luminance =
        0.2126 * r as f64 / 255.0 + 0.7152 * g as f64 / 255.0 + 0.0722 * b as f64 / 255.0;
    luminance > 0.5
}

fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let expanded: String = if hex.chars().count() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    let n = u32::from_str_radix(&expanded, 16).unwrap_or(0);
    [(n >> 16) as u8, (n >> 8) as u8, n as u8]
}

fn rgb_fn_to_rgb(s: &str) -> [u8; 3] {
    let mut channels = s
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().unwrap_or(0).min(255) as u8);
    [
        channels.next().unwrap_or(0),
        channels.next().unwrap_or(0),
        channels.next().unwrap_or(0),
    ]
}
