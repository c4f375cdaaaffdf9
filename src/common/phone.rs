// src/common/phone.rs

/// Normaliza um telefone russo para o formato canônico `+7XXXXXXXXXX`.
///
/// Remove tudo que não for dígito; 11 dígitos começando com `8` viram `7...`;
/// exatamente 10 dígitos recebem o `7` na frente. Qualquer outra coisa é inválida.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('8') {
        digits.replace_range(0..1, "7");
    } else if digits.len() == 10 {
        digits.insert(0, '7');
    }

    if digits.len() == 11 && digits.starts_with('7') {
        Some(format!("+{}", digits))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_leading_eight_with_punctuation() {
        assert_eq!(normalize_phone("8(999)123-45-67").as_deref(), Some("+79991234567"));
    }

    #[test]
    fn prepends_country_code_to_ten_digits() {
        assert_eq!(normalize_phone("9991234567").as_deref(), Some("+79991234567"));
    }

    #[test]
    fn keeps_already_canonical_numbers() {
        assert_eq!(normalize_phone("+7 999 123 45 67").as_deref(), Some("+79991234567"));
        assert_eq!(normalize_phone("79991234567").as_deref(), Some("+79991234567"));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(normalize_phone("12345"), None);
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("abc"), None);
        // 11 dígitos, mas não começa com 7 nem 8
        assert_eq!(normalize_phone("19991234567"), None);
        assert_eq!(normalize_phone("899912345678"), None);
    }

    #[test]
    fn equivalent_inputs_share_one_canonical_form() {
        let forms = ["8 999 123 45 67", "+7(999)1234567", "999-123-45-67"];
        for form in forms {
            assert_eq!(normalize_phone(form).as_deref(), Some("+79991234567"), "{form}");
        }
    }
}
