//! Stateless helper utilities used by the export pipeline.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{
    C_NUM_FORMAT_INTEGER, N_DECIMAL_PLACES_MAX, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_CURRENCY_SYMBOLS,
    TUP_EDGE_MARKS_KEPT, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecColumnWidthPolicy};

static RE_DATE_DMY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4}").expect("date pattern compiles")
});

static RE_NUMBER_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+\-]?[0-9]+(\.[0-9]*)?$").expect("number pattern compiles"));

////////////////////////////////////////////////////////////////////////////////
// #region TextSanitization

/// Remove invisible/out-of-script characters, collapse whitespace and strip
/// edge punctuation.
///
/// Total and idempotent: `sanitize_text(&sanitize_text(x)) == sanitize_text(x)`.
pub fn sanitize_text(text: &str) -> String {
    let mut c_text = String::with_capacity(text.len());
    let mut if_pending_space = false;

    for chr in text.chars() {
        if !is_char_retained(chr) {
            continue;
        }
        if chr.is_whitespace() {
            if_pending_space = true;
            continue;
        }
        if if_pending_space && !c_text.is_empty() {
            c_text.push(' ');
        }
        if_pending_space = false;
        c_text.push(chr);
    }

    trim_edge_noise(&c_text).to_string()
}

fn is_char_retained(chr: char) -> bool {
    let n_code = chr as u32;
    // C0/C1 controls, zero-width chars, BOM, replacement char
    if n_code <= 0x1F
        || (0x7F..=0x9F).contains(&n_code)
        || (0x200B..=0x200D).contains(&n_code)
        || n_code == 0xFEFF
        || n_code == 0xFFFD
    {
        return false;
    }
    matches!(
        n_code,
        0x20..=0x7E
            | 0xA0..=0x24F
            | 0x370..=0x3FF
            | 0x400..=0x4FF
            | 0x600..=0x6FF
            | 0x900..=0x97F
            | 0x4E00..=0x9FFF
    )
}

fn is_edge_noise(chr: char) -> bool {
    if TUP_EDGE_MARKS_KEPT.contains(&chr) || chr == '_' {
        return false;
    }
    chr.is_whitespace()
        || chr.is_ascii_punctuation()
        || (('\u{00A1}'..='\u{00BF}').contains(&chr) && !chr.is_alphanumeric())
        || matches!(
            chr,
            '\u{00D7}'
                | '\u{00F7}'
                | '\u{037E}'
                | '\u{0387}'
                | '\u{060C}'
                | '\u{061B}'
                | '\u{061F}'
                | '\u{066A}'..='\u{066D}'
                | '\u{06D4}'
                | '\u{0964}'
                | '\u{0965}'
                | '\u{0970}'
        )
}

fn trim_edge_noise(text: &str) -> &str {
    let text = text.trim_end_matches(is_edge_noise);

    let mut iter_chars = text.char_indices().peekable();
    while let Some((n_idx, chr)) = iter_chars.next() {
        if !is_edge_noise(chr) {
            return &text[n_idx..];
        }
        // keep a sign that directly prefixes a digit
        if matches!(chr, '-' | '+')
            && iter_chars
                .peek()
                .is_some_and(|(_, chr_next)| chr_next.is_ascii_digit())
        {
            return &text[n_idx..];
        }
    }
    ""
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueClassification

/// Classify sanitized text as a date, identifier or number and format it.
///
/// Dates and identifiers stay text. Numbers keep the decimal places written in
/// the source, capped at [`N_DECIMAL_PLACES_MAX`]. Anything else stays text.
pub fn classify_and_format(text: &str) -> EnumCellValue {
    if text.is_empty() {
        return EnumCellValue::text("");
    }
    if is_date_like(text) || is_identifier_like(text) {
        return EnumCellValue::text(text);
    }

    let c_clean = strip_numeric_decorations(text);
    if RE_NUMBER_PLAIN.is_match(&c_clean) {
        if let Ok(n_value) = c_clean.trim_end_matches('.').parse::<f64>() {
            if n_value.is_finite() {
                let n_decimal_places = c_clean
                    .split_once('.')
                    .map_or(0, |(_, c_frac)| c_frac.len())
                    .min(N_DECIMAL_PLACES_MAX);
                return EnumCellValue::Number {
                    // fold -0 into 0
                    value: if n_value == 0.0 { 0.0 } else { n_value },
                    decimal_places: n_decimal_places,
                };
            }
        }
    }

    EnumCellValue::text(text)
}

/// Day/month/year with 1-2 digit day and month, 2-4 digit year.
pub fn is_date_like(text: &str) -> bool {
    RE_DATE_DMY.is_match(text)
}

/// Alphanumeric code (hyphens allowed) holding at least one letter.
pub fn is_identifier_like(text: &str) -> bool {
    let c_clean = strip_numeric_decorations(text);
    !c_clean.is_empty()
        && c_clean
            .chars()
            .all(|chr| chr.is_ascii_alphanumeric() || chr == '-')
        && c_clean.chars().any(|chr| chr.is_ascii_alphabetic())
}

fn strip_numeric_decorations(text: &str) -> String {
    text.chars()
        .filter(|chr| !(TUP_CURRENCY_SYMBOLS.contains(chr) || *chr == ',' || chr.is_whitespace()))
        .collect()
}

/// Thousands-grouped display mask with exactly `decimal_places` decimals.
pub fn derive_num_format(decimal_places: usize) -> String {
    let n_decimal_places = decimal_places.min(N_DECIMAL_PLACES_MAX);
    if n_decimal_places == 0 {
        return C_NUM_FORMAT_INTEGER.to_string();
    }
    format!("{C_NUM_FORMAT_INTEGER}.{}", "0".repeat(n_decimal_places))
}

/// Render `value` the way [`derive_num_format`] displays it.
pub fn format_number_display(value: f64, decimal_places: usize) -> String {
    let n_decimal_places = decimal_places.min(N_DECIMAL_PLACES_MAX);
    let c_raw = format!("{:.*}", n_decimal_places, value.abs());
    let (c_int, c_frac) = match c_raw.split_once('.') {
        Some((c_int, c_frac)) => (c_int, Some(c_frac)),
        None => (c_raw.as_str(), None),
    };

    let n_len_int = c_int.len();
    let mut c_out = String::with_capacity(c_raw.len() + n_len_int / 3 + 1);
    if value < 0.0 && c_raw.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        c_out.push('-');
    }
    for (n_idx, chr) in c_int.chars().enumerate() {
        if n_idx > 0 && (n_len_int - n_idx) % 3 == 0 {
            c_out.push(',');
        }
        c_out.push(chr);
    }
    if let Some(c_frac) = c_frac {
        c_out.push('.');
        c_out.push_str(c_frac);
    }
    c_out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Estimate per-column widths for a grid whose row 0 is the header.
///
/// Each cell contributes its longest rendered line plus the header/body
/// padding; absent cells contribute nothing. Results are clamped to the
/// per-column bounds of `policy`, the lower bound winning on conflict.
pub fn estimate_column_widths(
    grid: &[Vec<EnumCellValue>],
    policy: &SpecColumnWidthPolicy,
) -> Vec<usize> {
    let n_cols = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut l_widths = vec![0usize; n_cols];

    for (row_idx, row) in grid.iter().enumerate() {
        let n_padding = if row_idx == 0 {
            policy.width_padding_header
        } else {
            policy.width_padding_body
        };
        for (col_idx, value) in row.iter().enumerate() {
            let n_len_line_max = value
                .to_display_text()
                .lines()
                .map(estimate_unicode_string_width)
                .max()
                .unwrap_or(0);
            l_widths[col_idx] = usize::max(l_widths[col_idx], n_len_line_max + n_padding);
        }
    }

    l_widths
        .into_iter()
        .enumerate()
        .map(|(col_idx, n_width)| {
            usize::max(
                policy.width_min_at(col_idx),
                usize::min(n_width, policy.width_max_at(col_idx)),
            )
        })
        .collect()
}

/// Character-unit width of `s`; non-ASCII glyphs count wider.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNames

/// Replace illegal chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: char) -> String {
    let mut l_chars: Vec<char> = name
        .chars()
        .map(|chr| {
            if TUP_EXCEL_ILLEGAL.contains(&chr) {
                replace_to
            } else {
                chr
            }
        })
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();

    // Excel rejects names that begin or end with an apostrophe
    if l_chars.first() == Some(&'\'') {
        l_chars[0] = replace_to;
    }
    if let Some(chr_last) = l_chars.last_mut()
        && *chr_last == '\''
    {
        *chr_last = replace_to;
    }

    if l_chars.is_empty() {
        return "Sheet".to_string();
    }
    l_chars.into_iter().collect()
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

/// Sheet names reserved during one workbook build.
///
/// Names compare case-insensitively, matching the container format.
#[derive(Debug, Clone, Default)]
pub struct SheetNameRegistry {
    set_sheet_names_existing: BTreeSet<String>,
}

impl SheetNameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is already reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.set_sheet_names_existing
            .contains(&name.to_lowercase())
    }

    /// Number of reserved names.
    pub fn len(&self) -> usize {
        self.set_sheet_names_existing.len()
    }

    /// Whether no name has been reserved yet.
    pub fn is_empty(&self) -> bool {
        self.set_sheet_names_existing.is_empty()
    }

    /// Map `desired_name` to a unique, length-bounded name and reserve it.
    ///
    /// Never fails: the set is finite, so some `_N` suffix is always free.
    pub fn resolve(&mut self, desired_name: &str) -> String {
        let c_name = sanitize_sheet_name(desired_name, '_');
        if self.reserve(&c_name) {
            return c_name;
        }

        let mut n_idx = 1usize;
        loop {
            let candidate = create_sheet_identifier(&c_name, n_idx);
            if self.reserve(&candidate) {
                return candidate;
            }
            n_idx += 1;
        }
    }

    fn reserve(&mut self, name: &str) -> bool {
        self.set_sheet_names_existing.insert(name.to_lowercase())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
