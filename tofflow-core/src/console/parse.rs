//! Argument parsing

use super::ArgError;

/// Unsigned integer argument
pub fn unsigned(arg: &str) -> Result<u32, ArgError> {
    arg.trim().parse::<u32>().map_err(|_| ArgError::Malformed)
}

/// Signed integer argument
pub fn signed(arg: &str) -> Result<i32, ArgError> {
    arg.trim().parse::<i32>().map_err(|_| ArgError::Malformed)
}

/// Floating point argument; NaN is rejected
pub fn float(arg: &str) -> Result<f32, ArgError> {
    let value = arg.trim().parse::<f32>().map_err(|_| ArgError::Malformed)?;
    if value.is_nan() {
        return Err(ArgError::Malformed);
    }
    Ok(value)
}

/// `0` or `1`
pub fn binary(arg: &str) -> Result<u16, ArgError> {
    match arg.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(ArgError::Malformed),
    }
}

/// Code for an exact tag match
pub fn tag(arg: &str, tags: &[(&'static str, u16)]) -> Result<u16, ArgError> {
    let arg = arg.trim();
    tags.iter()
        .find(|(t, _)| *t == arg)
        .map(|(_, code)| *code)
        .ok_or(ArgError::UnknownTag)
}

/// Tag for a code, if the code has one
pub fn tag_of(code: u16, tags: &[(&'static str, u16)]) -> Option<&'static str> {
    tags.iter().find(|(_, c)| *c == code).map(|(t, _)| *t)
}

/// Integer in `min..=max`
pub fn bounded(arg: &str, min: u32, max: u32) -> Result<u32, ArgError> {
    let value = unsigned(arg)?;
    if value < min || value > max {
        return Err(ArgError::OutOfRange);
    }
    Ok(value)
}

/// Split the text after a command name into its argument
///
/// Accepts `name value`, `name=value` and `name = value`.
pub fn argument(rest: &str) -> &str {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS: &[(&str, u16)] = &[("loop", 0xF), ("200", 1)];

    #[test]
    fn test_argument_forms() {
        assert_eq!(argument(" 12"), "12");
        assert_eq!(argument("=12"), "12");
        assert_eq!(argument(" = 12 "), "12");
        assert_eq!(argument(""), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(unsigned("200"), Ok(200));
        assert_eq!(unsigned("2x"), Err(ArgError::Malformed));
        assert_eq!(signed("-5"), Ok(-5));
        assert_eq!(float("2.5"), Ok(2.5));
        assert_eq!(float("NaN"), Err(ArgError::Malformed));
        assert_eq!(bounded("200", 0, 127), Err(ArgError::OutOfRange));
    }

    #[test]
    fn test_binary() {
        assert_eq!(binary("1"), Ok(1));
        assert_eq!(binary("0"), Ok(0));
        assert_eq!(binary("2"), Err(ArgError::Malformed));
        assert_eq!(binary("10"), Err(ArgError::Malformed));
    }

    #[test]
    fn test_tags() {
        assert_eq!(tag("loop", TAGS), Ok(0xF));
        assert_eq!(tag("300", TAGS), Err(ArgError::UnknownTag));
        assert_eq!(tag_of(1, TAGS), Some("200"));
        assert_eq!(tag_of(2, TAGS), None);
    }
}
