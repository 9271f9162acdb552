//! Expansion of dim-template names.
//!
//! A name containing `[%s]` expands into a numbered array, a name
//! containing `%s` into a list driven by `dimIndex`. Fields may not use the
//! array form; peripherals may not use the list form.

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DimKind {
    Peripheral,
    Cluster,
    Register,
    Field,
}

/// Concrete names produced from one template.
#[derive(Debug)]
pub(crate) struct DimExpansion {
    pub(crate) names: Vec<String>,
    pub(crate) display_names: Vec<Option<String>>,
}

/// Expands `name` (and the register's display name) into `dim` concrete
/// instances. A `None` dim yields the single unexpanded name.
pub(crate) fn expand_names(
    name: &str,
    display_name: Option<&str>,
    dim: Option<u32>,
    dim_index: Option<&str>,
    kind: DimKind,
) -> Result<DimExpansion, Error> {
    let Some(dim) = dim else {
        return Ok(DimExpansion {
            names: vec![name.to_string()],
            display_names: vec![display_name.map(str::to_string)],
        });
    };
    if dim < 1 {
        return Err(dim_error(name, "dim value must be greater than 0"));
    }

    if name.contains("[%s]") {
        if kind == DimKind::Field {
            return Err(dim_error(name, "fields cannot use dim arrays"));
        }
        if display_name.is_some_and(|display| display.contains("%s") && !display.contains("[%s]")) {
            return Err(dim_error(name, "display name cannot be a list if the name is an array"));
        }
        let names = (0..dim).map(|i| name.replace("[%s]", &i.to_string())).collect();
        let display_names = (0..dim)
            .map(|i| display_name.map(|display| display.replace("[%s]", &i.to_string())))
            .collect();
        Ok(DimExpansion { names, display_names })
    } else if name.contains("%s") {
        if kind == DimKind::Peripheral {
            return Err(dim_error(name, "peripherals cannot use dim lists"));
        }
        if display_name.is_some_and(|display| display.contains("[%s]")) {
            return Err(dim_error(name, "display name cannot be an array if the name is a list"));
        }
        let tokens = expand_index(name, dim, dim_index)?;
        let names = tokens.iter().map(|token| name.replace("%s", token)).collect();
        let display_names = tokens
            .iter()
            .map(|token| display_name.map(|display| display.replace("%s", token)))
            .collect();
        Ok(DimExpansion { names, display_names })
    } else {
        Err(dim_error(name, "dim is set but the name carries no `%s` or `[%s]` marker"))
    }
}

/// Expands a `dimIndex` into its token list and checks it against `dim`.
pub(crate) fn expand_index(
    name: &str,
    dim: u32,
    dim_index: Option<&str>,
) -> Result<Vec<String>, Error> {
    let tokens = match dim_index {
        None => (0..dim).map(|i| i.to_string()).collect(),
        Some(index) => parse_index(index)
            .ok_or_else(|| dim_error(name, format!("can't resolve dim index `{index}`")))?,
    };
    if tokens.len() != dim as usize {
        return Err(dim_error(
            name,
            format!("dim index yields {} tokens but dim is {dim}", tokens.len()),
        ));
    }
    Ok(tokens)
}

fn parse_index(index: &str) -> Option<Vec<String>> {
    let index = index.trim();
    if let Some((start, end)) = index.split_once('-') {
        if is_number(start) && is_number(end) {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            if start > end {
                return None;
            }
            return Some((start..=end).map(|i| i.to_string()).collect());
        }
        if is_uppercase_letter(start) && is_uppercase_letter(end) {
            let start = start.bytes().next().unwrap();
            let end = end.bytes().next().unwrap();
            if start >= end {
                return None;
            }
            return Some((start..=end).map(|c| (c as char).to_string()).collect());
        }
    }
    if index.contains(',') {
        let stripped: String = index.chars().filter(|c| !c.is_whitespace()).collect();
        let tokens: Vec<String> = stripped.split(',').map(str::to_string).collect();
        if tokens.iter().all(|token| is_token(token)) {
            return Some(tokens);
        }
        return None;
    }
    // A single bare token is accepted; the length check limits it to dim 1.
    if is_token(index) {
        return Some(vec![index.to_string()]);
    }
    None
}

fn is_number(src: &str) -> bool {
    !src.is_empty() && src.bytes().all(|b| b.is_ascii_digit())
}

fn is_uppercase_letter(src: &str) -> bool {
    src.len() == 1 && src.bytes().next().unwrap().is_ascii_uppercase()
}

fn is_token(src: &str) -> bool {
    !src.is_empty() && src.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn dim_error(name: &str, detail: impl Into<String>) -> Error {
    Error::DimTemplate { name: name.to_string(), detail: detail.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_expansion_numbers_from_zero() {
        let expansion =
            expand_names("REG[%s]", None, Some(3), None, DimKind::Register).unwrap();
        assert_eq!(expansion.names, ["REG0", "REG1", "REG2"]);
    }

    #[test]
    fn list_expansion_substitutes_tokens() {
        let expansion =
            expand_names("REG%s", None, Some(3), Some("A,B,C"), DimKind::Register).unwrap();
        assert_eq!(expansion.names, ["REGA", "REGB", "REGC"]);
    }

    #[test]
    fn numeric_range_is_inclusive() {
        let tokens = expand_index("REG%s", 4, Some("3-6")).unwrap();
        assert_eq!(tokens, ["3", "4", "5", "6"]);
    }

    #[test]
    fn letter_range_is_inclusive() {
        let tokens = expand_index("REG%s", 3, Some("A-C")).unwrap();
        assert_eq!(tokens, ["A", "B", "C"]);
    }

    #[test]
    fn whitespace_in_list_is_stripped() {
        let tokens = expand_index("REG%s", 2, Some("ON, OFF")).unwrap();
        assert_eq!(tokens, ["ON", "OFF"]);
    }

    #[test]
    fn single_token_requires_dim_one() {
        assert_eq!(expand_index("REG%s", 1, Some("MAIN")).unwrap(), ["MAIN"]);
        assert!(expand_index("REG%s", 2, Some("MAIN")).is_err());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(expand_index("REG%s", 2, Some("A,B,C")).is_err());
    }

    #[test]
    fn field_array_form_is_rejected() {
        assert!(expand_names("F[%s]", None, Some(2), None, DimKind::Field).is_err());
    }

    #[test]
    fn peripheral_list_form_is_rejected() {
        assert!(expand_names("P%s", None, Some(2), Some("A,B"), DimKind::Peripheral).is_err());
    }

    #[test]
    fn marker_without_dim_passes_through_unexpanded() {
        let expansion = expand_names("REG", None, None, None, DimKind::Register).unwrap();
        assert_eq!(expansion.names, ["REG"]);
    }
}
