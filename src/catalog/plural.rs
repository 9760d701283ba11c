//! Plural form selection for numerus messages
//!
//! Each target language maps to a rule that knows how many forms a numerus
//! translation carries and which one applies to a given count.

/// Plural rule families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// One form for every count (Chinese, Japanese, Korean, ...)
    Single,
    /// `n != 1` selects the second form (English, German, ...)
    OneOther,
    /// `n > 1` selects the second form (French, Brazilian Portuguese)
    ZeroOneOther,
    /// Russian, Ukrainian, Belarusian
    EastSlavic,
    Polish,
    /// Czech and Slovak
    CzechSlovak,
}

impl PluralRule {
    /// Rule for a language code such as `zh_CN`, `pt-BR` or `ru`
    pub fn for_language(language: &str) -> Self {
        let normalized = language.replace('-', "_");
        if normalized.eq_ignore_ascii_case("pt_BR") {
            return PluralRule::ZeroOneOther;
        }

        let primary = normalized
            .split('_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" => PluralRule::Single,
            "fr" => PluralRule::ZeroOneOther,
            "ru" | "uk" | "be" => PluralRule::EastSlavic,
            "pl" => PluralRule::Polish,
            "cs" | "sk" => PluralRule::CzechSlovak,
            _ => PluralRule::OneOther,
        }
    }

    /// Number of numerus forms a translation should carry
    pub fn form_count(self) -> usize {
        match self {
            PluralRule::Single => 1,
            PluralRule::OneOther | PluralRule::ZeroOneOther => 2,
            PluralRule::EastSlavic | PluralRule::Polish | PluralRule::CzechSlovak => 3,
        }
    }

    /// Index of the form used for `n`
    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let (mod10, mod100) = (n % 10, n % 100);
        match self {
            PluralRule::Single => 0,
            PluralRule::OneOther => usize::from(n != 1),
            PluralRule::ZeroOneOther => usize::from(n > 1),
            PluralRule::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralRule::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralRule::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
        }
    }
}
