//! JSX text handling: whitespace collapsing, entity decoding, string literals.

/// Collapse a JSX text run the way JSX compilers do.
///
/// Lines are split on line breaks; every line but the first loses leading
/// spaces and every line but the last loses trailing spaces; lines left empty
/// are dropped; the rest are joined with a single space. Tabs count as spaces.
/// Non-breaking spaces are content and are kept.
pub(crate) fn collapse_jsx_whitespace(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let last_non_empty = lines
        .iter()
        .rposition(|l| l.chars().any(|c| c != ' ' && c != '\t'));

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed: &str = line;
        let replaced;
        if trimmed.contains('\t') {
            replaced = trimmed.replace('\t', " ");
            trimmed = &replaced;
        }
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ');
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches(' ');
        }
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            if Some(i) != last_non_empty {
                out.push(' ');
            }
        }
    }
    out
}

/// Decode HTML character references (`&amp;`, `&#960;`, `&#x3C0;`).
/// Unknown references are left verbatim.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi > 1 && semi <= 32)
            .and_then(|semi| decode_reference(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "times" => '×',
        "divide" => '÷',
        "deg" => '°',
        "plusmn" => '±',
        "middot" => '·',
        "bull" => '•',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "larr" => '←',
        "rarr" => '→',
        "uarr" => '↑',
        "darr" => '↓',
        "harr" => '↔',
        "le" => '≤',
        "ge" => '≥',
        "ne" => '≠',
        "asymp" => '≈',
        "infin" => '∞',
        "radic" => '√',
        "sum" => '∑',
        "minus" => '−',
        "sup2" => '²',
        "sup3" => '³',
        "frac12" => '½',
        "frac14" => '¼',
        "frac34" => '¾',
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "delta" => 'δ',
        "Delta" => 'Δ',
        "theta" => 'θ',
        "lambda" => 'λ',
        "mu" => 'μ',
        "pi" => 'π',
        "sigma" => 'σ',
        "Sigma" => 'Σ',
        "omega" => 'ω',
        "Omega" => 'Ω',
        "euro" => '€',
        "pound" => '£',
        "cent" => '¢',
        "sect" => '§',
        "para" => '¶',
        _ => return None,
    };
    Some(c)
}

/// Render `text` as a JavaScript string literal.
pub(crate) fn js_string(text: &str) -> String {
    // A JSON string is a valid JS string literal once the two line
    // separators JSON leaves raw are escaped.
    serde_json::to_string(text)
        .unwrap_or_else(|_| String::from("\"\""))
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Whether `name` can be used as a bare object key.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
