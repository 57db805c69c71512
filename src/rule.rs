//! The `<TYPE>_<CODE>` = `<CODE>` rule syntax used by hwdb properties.
//!
//! The key names the event type and the code to remap, separated by the first underscore;
//! the value is the target code within the same type. Each token is either a `0x`-prefixed
//! hex literal or a name handed to a [`SymbolResolver`]:
//!
//! ```text
//! KEY_UNKNOWN   = BLUETOOTH   KEY_UNKNOWN -> KEY_BLUETOOTH
//! 0x1_UNKNOWN   = 0x160       KEY_UNKNOWN -> KEY_OK
//! 0x1_0x1       = 0x2         code 1 -> code 2 for event type 1
//! ```

use crate::err::RuleError;
use crate::event::EV_MAX;
use crate::symbols::SymbolResolver;

use std::num::IntErrorKind;

/// One parsed remap rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRule {
    pub event_type: u16,
    pub from: u16,
    pub to: u16,
}

impl MappingRule {
    pub fn parse(
        key: &str,
        value: &str,
        symbols: &dyn SymbolResolver,
    ) -> Result<MappingRule, RuleError> {
        let (event_type, from) = parse_event_code(key, symbols)?;
        let to = parse_code(event_type, value, symbols)?;

        Ok(MappingRule {
            event_type,
            from,
            to,
        })
    }
}

/// Parses a `<TYPE>_<CODE>` key into its event type and code.
pub fn parse_event_code(key: &str, symbols: &dyn SymbolResolver) -> Result<(u16, u16), RuleError> {
    let (event_type, code) = key.split_once('_').ok_or_else(|| RuleError::MissingSeparator {
        key: key.to_owned(),
    })?;

    let event_type = parse_event_type(event_type, symbols)?;
    let code = parse_code(event_type, code, symbols)?;

    Ok((event_type, code))
}

/// Parses the digits after `0x`, which must fit into 16 bits.
fn parse_hex(token: &str, digits: &str) -> Result<u16, RuleError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RuleError::InvalidHex {
            token: token.to_owned(),
        });
    }

    let value = match u64::from_str_radix(digits, 16) {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            return Err(RuleError::Overflow {
                token: token.to_owned(),
            });
        }
        Err(_) => {
            return Err(RuleError::InvalidHex {
                token: token.to_owned(),
            });
        }
    };

    u16::try_from(value).map_err(|_| RuleError::Overflow {
        token: token.to_owned(),
    })
}

fn parse_event_type(token: &str, symbols: &dyn SymbolResolver) -> Result<u16, RuleError> {
    if token.is_empty() {
        return Err(RuleError::EmptyType);
    }

    if let Some(digits) = token.strip_prefix("0x") {
        let value = parse_hex(token, digits)?;
        if value > EV_MAX {
            return Err(RuleError::EventTypeTooBig { value, max: EV_MAX });
        }
        return Ok(value);
    }

    symbols
        .event_type(token)
        .ok_or_else(|| RuleError::UnknownEventType {
            name: token.to_owned(),
        })
}

fn parse_code(
    event_type: u16,
    token: &str,
    symbols: &dyn SymbolResolver,
) -> Result<u16, RuleError> {
    if token.is_empty() {
        return Err(RuleError::EmptyCode);
    }

    if let Some(digits) = token.strip_prefix("0x") {
        return parse_hex(token, digits);
    }

    symbols
        .event_code(event_type, token)
        .ok_or_else(|| RuleError::UnknownCode {
            event_type,
            name: token.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EV_KEY;
    use crate::symbols::{EvdevSymbols, NoSymbols};

    fn parse(key: &str, value: &str) -> Result<MappingRule, RuleError> {
        MappingRule::parse(key, value, &NoSymbols)
    }

    #[test]
    fn test_hex_rule() {
        assert_eq!(
            parse("0x1_0x1", "0x2").unwrap(),
            MappingRule {
                event_type: 1,
                from: 1,
                to: 2
            }
        );
    }

    #[test]
    fn test_hex_digits_are_case_insensitive() {
        assert_eq!(parse("0x1F_0xfFfF", "0xA").unwrap().from, 0xffff);
    }

    #[test]
    fn test_symbolic_rule() {
        let rule = MappingRule::parse("KEY_UNKNOWN", "BLUETOOTH", &EvdevSymbols).unwrap();

        assert_eq!(
            rule,
            MappingRule {
                event_type: EV_KEY,
                from: 240,
                to: 237
            }
        );
    }

    #[test]
    fn test_mixed_rule() {
        let rule = MappingRule::parse("0x1_UNKNOWN", "0x160", &EvdevSymbols).unwrap();

        assert_eq!(rule.event_type, EV_KEY);
        assert_eq!(rule.from, 240);
        assert_eq!(rule.to, 0x160);
    }

    #[test]
    fn test_splits_on_first_underscore() {
        let rule = MappingRule::parse("KEY_BTN_LEFT", "BTN_RIGHT", &EvdevSymbols).unwrap();

        assert_eq!(rule.from, 0x110);
        assert_eq!(rule.to, 0x111);
    }

    #[test]
    fn test_parse_event_code() {
        assert_eq!(parse_event_code("ABS_Y", &EvdevSymbols), Ok((0x03, 0x01)));
        assert_eq!(parse_event_code("0x2_0x8", &NoSymbols), Ok((0x02, 0x08)));
    }

    #[test]
    fn test_type_token_ends_at_first_underscore() {
        assert_eq!(
            parse_event_code("EV_KEY_UNKNOWN", &EvdevSymbols),
            Err(RuleError::UnknownEventType {
                name: "EV".to_owned()
            })
        );
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            parse("INVALID", "X"),
            Err(RuleError::MissingSeparator {
                key: "INVALID".to_owned()
            })
        );
    }

    #[test]
    fn test_empty_tokens() {
        assert_eq!(parse("_0x1", "0x2"), Err(RuleError::EmptyType));
        assert_eq!(parse("0x1_", "0x2"), Err(RuleError::EmptyCode));
        assert_eq!(parse("0x1_0x1", ""), Err(RuleError::EmptyCode));
    }

    #[test]
    fn test_malformed_hex() {
        for token in ["0x", "0xg", "0x-1", "0x+1", "0x 1", "0x1 "] {
            assert_eq!(
                parse(&format!("0x1_{token}"), "0x2"),
                Err(RuleError::InvalidHex {
                    token: token.to_owned()
                }),
                "{token}"
            );
        }
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            parse("0x1_0x10000", "0x2"),
            Err(RuleError::Overflow {
                token: "0x10000".to_owned()
            })
        );
        assert_eq!(
            parse("0x1_0x1", "0xffffffffffffffffffff"),
            Err(RuleError::Overflow {
                token: "0xffffffffffffffffffff".to_owned()
            })
        );
        assert_eq!(
            parse("0x10000_0x1", "0x2"),
            Err(RuleError::Overflow {
                token: "0x10000".to_owned()
            })
        );
    }

    #[test]
    fn test_event_type_range() {
        assert!(parse("0x1f_0x1", "0x2").is_ok());
        assert_eq!(
            parse("0x20_0x1", "0x2"),
            Err(RuleError::EventTypeTooBig {
                value: 0x20,
                max: EV_MAX
            })
        );
    }

    #[test]
    fn test_unresolved_names() {
        assert_eq!(
            parse("KEY_0x1", "0x2"),
            Err(RuleError::UnknownEventType {
                name: "KEY".to_owned()
            })
        );
        assert_eq!(
            parse("0x1_UNKNOWN", "0x2"),
            Err(RuleError::UnknownCode {
                event_type: 1,
                name: "UNKNOWN".to_owned()
            })
        );
        // Only a lowercase prefix selects hex.
        assert_eq!(
            parse("0X1_0x1", "0x2"),
            Err(RuleError::UnknownEventType {
                name: "0X1".to_owned()
            })
        );
    }
}
