//! String-literal escaping, unescaping and markup text handling.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Named character references accepted in markup text and attribute strings.
    static ref NAMED_ENTITIES: HashMap<&'static str, char> = {
        let mut m = HashMap::new();
        m.insert("amp", '&');
        m.insert("lt", '<');
        m.insert("gt", '>');
        m.insert("quot", '"');
        m.insert("apos", '\'');
        m.insert("nbsp", '\u{00A0}');
        m.insert("copy", '\u{00A9}');
        m.insert("reg", '\u{00AE}');
        m.insert("trade", '\u{2122}');
        m.insert("hellip", '\u{2026}');
        m.insert("mdash", '\u{2014}');
        m.insert("ndash", '\u{2013}');
        m.insert("lsquo", '\u{2018}');
        m.insert("rsquo", '\u{2019}');
        m.insert("ldquo", '\u{201C}');
        m.insert("rdquo", '\u{201D}');
        m.insert("laquo", '\u{00AB}');
        m.insert("raquo", '\u{00BB}');
        m.insert("bull", '\u{2022}');
        m.insert("middot", '\u{00B7}');
        m.insert("times", '\u{00D7}');
        m.insert("divide", '\u{00F7}');
        m.insert("deg", '\u{00B0}');
        m.insert("euro", '\u{20AC}');
        m.insert("pound", '\u{00A3}');
        m.insert("yen", '\u{00A5}');
        m.insert("cent", '\u{00A2}');
        m.insert("sect", '\u{00A7}');
        m.insert("para", '\u{00B6}');
        m.insert("larr", '\u{2190}');
        m.insert("rarr", '\u{2192}');
        m.insert("uarr", '\u{2191}');
        m.insert("darr", '\u{2193}');
        m.insert("hearts", '\u{2665}');
        m.insert("check", '\u{2713}');
        m
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT ESCAPING
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders `value` as a double-quoted string literal.
///
/// Quote, backslash and control characters are escaped, and so is every code
/// unit above U+009F; characters outside the basic plane become a
/// `\uXXXX\uXXXX` surrogate pair. Plain ASCII is left alone.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => push_unit(&mut out, c as u16),
            c if (c as u32) > 0x9F => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    push_unit(&mut out, *unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_unit(out: &mut String, unit: u16) {
    out.push_str(&format!("\\u{:04X}", unit));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE UNESCAPING
// ═══════════════════════════════════════════════════════════════════════════════

/// Decodes the escape sequences of a string literal body (quotes removed).
///
/// `\uXXXX` pairs forming a valid surrogate pair decode to one code point; a
/// lone surrogate becomes U+FFFD. Unknown escapes yield the escaped character.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut pending_high: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        let unit = match next {
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    flush_surrogate(&mut out, &mut pending_high);
                    out.push(u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32).unwrap_or('\u{FFFD}'));
                    continue;
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) => unit,
                    Err(_) => {
                        flush_surrogate(&mut out, &mut pending_high);
                        out.push('u');
                        out.push_str(&hex);
                        continue;
                    }
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) => unit,
                    Err(_) => {
                        flush_surrogate(&mut out, &mut pending_high);
                        out.push('x');
                        out.push_str(&hex);
                        continue;
                    }
                }
            }
            _ => {
                flush_surrogate(&mut out, &mut pending_high);
                match next {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{0008}'),
                    'f' => out.push('\u{000C}'),
                    'v' => out.push('\u{000B}'),
                    '0' => out.push('\0'),
                    '\r' => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                    }
                    '\n' | '\u{2028}' | '\u{2029}' => {}
                    other => out.push(other),
                }
                continue;
            }
        };
        push_utf16_unit(&mut out, &mut pending_high, unit);
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn push_utf16_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    match unit {
        0xD800..=0xDBFF => {
            flush_surrogate(out, pending_high);
            *pending_high = Some(unit);
        }
        0xDC00..=0xDFFF => match pending_high.take() {
            Some(high) => {
                let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            None => out.push('\u{FFFD}'),
        },
        _ => {
            flush_surrogate(out, pending_high);
            out.push(char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}'));
        }
    }
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push('\u{FFFD}');
    }
}

/// Strips the quotes of a string token and decodes its escapes.
pub fn cook_string_literal(lexeme: &str) -> String {
    let inner = lexeme.get(1..lexeme.len().saturating_sub(1)).unwrap_or("");
    unescape(inner)
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Replaces `&name;`, `&#NN;` and `&#xHH;` references. Unknown references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];
        let decoded = candidate.find(';').filter(|end| *end <= 10).and_then(|end| {
            let name = &candidate[..end];
            let c = if let Some(num) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(num, 16).ok().and_then(char::from_u32)
            } else if let Some(num) = name.strip_prefix('#') {
                num.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                NAMED_ENTITIES.get(name).copied()
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Collapses raw markup text the way element literals treat whitespace: lines
/// are trimmed, blank lines dropped and the remaining lines joined with a
/// single space. Text without a line break is kept as written, so a lone
/// space between two children survives. Returns `None` when the text is
/// empty or only whitespace spanning lines.
pub fn normalize_markup_text(raw: &str) -> Option<String> {
    if !raw.contains('\n') {
        return (!raw.is_empty()).then(|| decode_entities(&raw.replace('\t', " ")));
    }
    let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last_non_empty = lines.iter().rposition(|l| !l.trim().is_empty())?;
    let mut out = String::new();
    let count = lines.len();

    for (i, line) in lines.iter().enumerate() {
        let mut piece: &str = line;
        if i != 0 {
            piece = piece.trim_start();
        }
        if i != count - 1 {
            piece = piece.trim_end();
        }
        if piece.is_empty() {
            continue;
        }
        out.push_str(&piece.replace('\t', " "));
        if i != last_non_empty {
            out.push(' ');
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(decode_entities(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_leaves_ascii_alone() {
        assert_eq!(quote("hello world"), "\"hello world\"");
        assert_eq!(quote("say \"hi\"\\"), "\"say \\\"hi\\\"\\\\\"");
        assert_eq!(quote("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn test_quote_escapes_above_latin1_controls() {
        assert_eq!(quote("\u{0085}"), "\"\\u0085\"");
        assert_eq!(quote("é"), "\"\\u00E9\"");
        assert_eq!(quote("\u{00A0}"), "\"\\u00A0\"");
        assert_eq!(quote("\u{0001}"), "\"\\u0001\"");
    }

    #[test]
    fn test_astral_character_round_trips_through_surrogates() {
        let original = "ok \u{1F600}";
        let escaped = quote(original);
        assert_eq!(escaped, "\"ok \\uD83D\\uDE00\"");
        assert_eq!(cook_string_literal(&escaped), original);
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape(r"a\tb\x41\u0042\u{43}"), "a\tbABC");
        assert_eq!(unescape(r"\q"), "q");
        assert_eq!(unescape(r"\uD83D"), "\u{FFFD}");
        assert_eq!(unescape("line\\\ncontinued"), "linecontinued");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;3"), "a & b <3");
        assert_eq!(decode_entities("&#65;&#x42;&copy;"), "AB\u{00A9}");
        assert_eq!(decode_entities("AT&T &bogus;"), "AT&T &bogus;");
    }

    #[test]
    fn test_markup_text_whitespace() {
        assert_eq!(normalize_markup_text("  \n   \n "), None);
        assert_eq!(normalize_markup_text("Hello "), Some("Hello ".to_string()));
        assert_eq!(normalize_markup_text(" "), Some(" ".to_string()));
        assert_eq!(normalize_markup_text(""), None);
        assert_eq!(
            normalize_markup_text("\n    Count is\n    now\n  "),
            Some("Count is now".to_string())
        );
    }
}
