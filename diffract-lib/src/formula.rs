//! Chemical formula parsing for formula-defined materials.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{DiffractError, Result};

/// Parse a chemical formula into element symbol → atom count.
///
/// Supports nested parentheses, decimal and scientific-notation counts
/// and `D` as an alias for hydrogen. Symbols are not checked against the
/// element table here; `MaterialSpec::resolve` does that.
///
/// # Examples
/// ```
/// let counts = diffract::formula::parse_formula("Mn(SO4)2(H2O)7").unwrap();
/// assert_eq!(counts["O"], 15.0);
/// assert_eq!(counts["H"], 14.0);
/// ```
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, f64>> {
    let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(DiffractError::InvalidFormula("empty formula".to_string()));
    }

    let mut parser = Parser {
        chars: compact.chars().peekable(),
        depth: 0,
    };
    let mut counts = BTreeMap::new();
    parser.group(1.0, &mut counts)?;
    if let Some(c) = parser.chars.next() {
        return Err(DiffractError::InvalidFormula(format!(
            "unexpected '{c}' in {formula}"
        )));
    }
    Ok(counts)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    /// Parses terms until ')' or end of input, scaling counts by `weight`.
    fn group(&mut self, weight: f64, counts: &mut BTreeMap<String, f64>) -> Result<()> {
        let mut terms = 0;
        while let Some(&c) = self.chars.peek() {
            match c {
                '(' => {
                    self.chars.next();
                    self.depth += 1;
                    let mut inner = BTreeMap::new();
                    self.group(1.0, &mut inner)?;
                    if self.chars.next() != Some(')') {
                        return Err(DiffractError::InvalidFormula(
                            "expected closing parenthesis".to_string(),
                        ));
                    }
                    self.depth -= 1;
                    let n = self.count()?;
                    for (symbol, count) in inner {
                        *counts.entry(symbol).or_insert(0.0) += weight * n * count;
                    }
                }
                ')' if self.depth > 0 => break,
                c if c.is_ascii_uppercase() => {
                    let symbol = self.symbol();
                    let n = self.count()?;
                    *counts.entry(symbol).or_insert(0.0) += weight * n;
                }
                other => {
                    return Err(DiffractError::InvalidFormula(format!(
                        "unexpected character '{other}'"
                    )));
                }
            }
            terms += 1;
        }
        if terms == 0 {
            return Err(DiffractError::InvalidFormula("empty group".to_string()));
        }
        Ok(())
    }

    fn symbol(&mut self) -> String {
        let mut symbol = String::new();
        if let Some(c) = self.chars.next() {
            symbol.push(c);
        }
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_lowercase() {
                break;
            }
            symbol.push(c);
            self.chars.next();
        }
        if symbol == "D" { "H".to_string() } else { symbol }
    }

    /// Optional count after a symbol or group; 1 when absent.
    fn count(&mut self) -> Result<f64> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            let exponent_sign =
                (c == '-' || c == '+') && matches!(text.chars().last(), Some('e' | 'E'));
            let exponent = (c == 'e' || c == 'E') && !text.is_empty() && !text.contains(['e', 'E']);
            if c.is_ascii_digit() || c == '.' || exponent || exponent_sign {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if text.is_empty() {
            return Ok(1.0);
        }
        if text.starts_with('.') {
            text.insert(0, '0');
        }
        text.parse::<f64>()
            .map_err(|_| DiffractError::InvalidFormula(format!("invalid count '{text}'")))
    }
}
