//! String canonicalization for dedup keys and synonym matching

/// Fold text into a dedup key fragment
///
/// Lowercases, drops every character outside `[a-z0-9 \-.&]`, collapses
/// whitespace runs and trims. Idempotent.
pub fn normalize_key(input: &str) -> String {
    let filtered: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | ' ' | '-' | '.' | '&'))
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold a legacy code into its canonical matching form
///
/// Uppercases, removes quote characters, turns every run of
/// non-alphanumeric characters into one space and trims.
pub fn normalize_code(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for c in input.chars().filter(|c| !matches!(c, '\'' | '"' | '`')) {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c.to_ascii_uppercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Render a canonical code for humans: `OFFICE_SHOP_SUPPLIES` -> `Office Shop Supplies`
pub fn title_case_code(code: &str) -> String {
    code.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_folds_case_and_whitespace() {
        assert_eq!(normalize_key("  Acme   Supply\tCo  "), "acme supply co");
        assert_eq!(normalize_key("O'Brien & Sons, Inc."), "obrien & sons inc.");
        assert_eq!(normalize_key("Smith-Jones"), "smith-jones");
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key(" , ; "), "");
    }

    #[test]
    fn test_normalize_key_keeps_dot_drops_comma() {
        assert_eq!(normalize_key("J.R."), "j.r.");
        assert_eq!(normalize_key("Smith, John"), "smith john");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        let samples = [
            "  Acme   Supply Co ",
            "Müller GmbH",
            "A & B, LLC.",
            "123  Main St. #4",
            "\u{00a0}Tab\tSeparated\nLines",
        ];
        for sample in samples {
            let once = normalize_key(sample);
            assert_eq!(normalize_key(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_code_variants_agree() {
        let expected = "OFFICE SHOP SUPPLIES";
        assert_eq!(normalize_code("OFFICE-SHOP SUPPLIES"), expected);
        assert_eq!(normalize_code("office/shop supplies"), expected);
        assert_eq!(normalize_code("OFFICE  SHOP-SUPPLIES"), expected);
        assert_eq!(normalize_code("\"Office Shop Supplies\""), expected);
        assert_eq!(normalize_code("  --  "), "");
    }

    #[test]
    fn test_title_case_code() {
        assert_eq!(title_case_code("OFFICE_SHOP_SUPPLIES"), "Office Shop Supplies");
        assert_eq!(title_case_code("TIRES"), "Tires");
        assert_eq!(title_case_code(""), "");
    }
}
