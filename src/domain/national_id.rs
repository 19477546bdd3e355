//! Checksum validators for the two Brazilian taxpayer identifiers:
//! CPF (11 digits, individuals) and CNPJ (14 digits, companies).
//! Both carry two embedded check digits computed by digit weighting.
//!
//! The functions are total: any input that doesn't yield the right
//! number of digits after stripping punctuation is simply invalid.

/// Canonical form of a national identifier: the digits only, with
/// punctuation ("123.456.789-09", "11.222.333/0001-81") stripped.
/// Identifiers are stored and looked up in this form.
pub fn canonical_national_id(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validate a CPF. Non-digit characters (dots, dashes) are stripped first.
pub fn validate_cpf(input: &str) -> bool {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }
    // Sequences like "111.111.111-11" pass the checksum but are reserved as invalid
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    if digits[9] != cpf_check_digit(&digits[..9]) {
        return false;
    }
    digits[10] == cpf_check_digit(&digits[..10])
}

/// Validate a CNPJ. Non-digit characters (dots, slashes, dashes) are stripped first.
pub fn validate_cnpj(input: &str) -> bool {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 14 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    if digits[12] != weighted_check_digit(&digits[..12], &CNPJ_WEIGHTS_FIRST) {
        return false;
    }
    digits[13] == weighted_check_digit(&digits[..13], &CNPJ_WEIGHTS_SECOND)
}

/// CPF check digit: weights descend from `len + 1` down to 2 over the
/// given prefix (10..=2 for the first digit, 11..=2 for the second).
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .zip((2..=top).rev())
        .map(|(&d, w)| d * w)
        .sum();
    check_digit_from_sum(sum)
}

fn weighted_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(&d, &w)| d * w).sum();
    check_digit_from_sum(sum)
}

fn check_digit_from_sum(sum: u32) -> u32 {
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}
