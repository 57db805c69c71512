//! Resolution of symbolic event type and code names used in mapping rules.

mod tables;

use crate::event::{EV_ABS, EV_KEY, EV_LED, EV_MSC, EV_REL, EV_REP, EV_SND, EV_SW, EV_SYN};

use self::tables::{
    ABS_CODES, EVENT_TYPES, KEY_CODES, LED_CODES, MSC_CODES, REL_CODES, REP_CODES, SND_CODES,
    SW_CODES, SYN_CODES,
};

/// Turns names from hwdb keys and values into numeric event types and codes.
///
/// A resolver that does not know a name returns `None`; the rule carrying it is then
/// skipped. Hex literals never reach the resolver.
pub trait SymbolResolver {
    /// Resolves a type token such as `KEY` (the part before the first `_` of a key).
    fn event_type(&self, name: &str) -> Option<u16>;

    /// Resolves a code token such as `UNKNOWN` within `event_type`.
    fn event_code(&self, event_type: u16, name: &str) -> Option<u16>;
}

/// Resolves nothing, so only `0x` literals are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn event_type(&self, _name: &str) -> Option<u16> {
        None
    }

    fn event_code(&self, _event_type: u16, _name: &str) -> Option<u16> {
        None
    }
}

/// The Linux evdev names.
///
/// Type tokens are the name without its `EV_` prefix (`KEY`). Rule keys split on the
/// first `_`, so `EV_KEY` only resolves when [`SymbolResolver::event_type`] is called
/// directly. Code tokens are accepted by suffix within the namespaces of the type (`UNKNOWN` resolves to
/// `KEY_UNKNOWN`, `MIDDLE` to `BTN_MIDDLE`) or by full name (`BTN_LEFT`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevSymbols;

impl EvdevSymbols {
    /// The `EV_*` name of `event_type`, if it has one.
    pub fn event_type_name(event_type: u16) -> Option<&'static str> {
        EVENT_TYPES
            .iter()
            .find(|&&(_, value)| value == event_type)
            .map(|&(name, _)| name)
    }

    fn codes_of(event_type: u16) -> Option<CodeNamespace> {
        let namespace = match event_type {
            EV_SYN => CodeNamespace::new(SYN_CODES, &["SYN"]),
            EV_KEY => CodeNamespace::new(KEY_CODES, &["KEY", "BTN"]),
            EV_REL => CodeNamespace::new(REL_CODES, &["REL"]),
            EV_ABS => CodeNamespace::new(ABS_CODES, &["ABS"]),
            EV_MSC => CodeNamespace::new(MSC_CODES, &["MSC"]),
            EV_SW => CodeNamespace::new(SW_CODES, &["SW"]),
            EV_LED => CodeNamespace::new(LED_CODES, &["LED"]),
            EV_SND => CodeNamespace::new(SND_CODES, &["SND"]),
            EV_REP => CodeNamespace::new(REP_CODES, &["REP"]),
            _ => return None,
        };

        Some(namespace)
    }
}

/// The code names of one event type and the prefixes they carry.
struct CodeNamespace {
    table: &'static [(&'static str, u16)],
    prefixes: &'static [&'static str],
}

impl CodeNamespace {
    fn new(table: &'static [(&'static str, u16)], prefixes: &'static [&'static str]) -> Self {
        CodeNamespace { table, prefixes }
    }
}

fn find(table: &[(&str, u16)], name: &str) -> Option<u16> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, value)| value)
}

/// Matches `full` against `<prefix>_<suffix>` without allocating.
fn is_prefixed(full: &str, prefix: &str, suffix: &str) -> bool {
    full.len() == prefix.len() + 1 + suffix.len()
        && full.starts_with(prefix)
        && full.as_bytes()[prefix.len()] == b'_'
        && full.ends_with(suffix)
}

impl SymbolResolver for EvdevSymbols {
    fn event_type(&self, name: &str) -> Option<u16> {
        find(EVENT_TYPES, name).or_else(|| {
            EVENT_TYPES
                .iter()
                .find(|(candidate, _)| is_prefixed(candidate, "EV", name))
                .map(|&(_, value)| value)
        })
    }

    fn event_code(&self, event_type: u16, name: &str) -> Option<u16> {
        let namespace = Self::codes_of(event_type)?;

        // Suffix matches win over full names; `LEFT` is KEY_LEFT, not BTN_LEFT.
        for prefix in namespace.prefixes {
            if let Some(&(_, value)) = namespace
                .table
                .iter()
                .find(|(candidate, _)| is_prefixed(candidate, prefix, name))
            {
                return Some(value);
            }
        }

        find(namespace.table, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let symbols = EvdevSymbols;

        assert_eq!(symbols.event_type("KEY"), Some(EV_KEY));
        assert_eq!(symbols.event_type("EV_ABS"), Some(EV_ABS));
        assert_eq!(symbols.event_type("FF_STATUS"), Some(0x17));
        assert_eq!(symbols.event_type("key"), None);
        assert_eq!(symbols.event_type("BTN"), None);

        assert_eq!(EvdevSymbols::event_type_name(EV_KEY), Some("EV_KEY"));
        assert_eq!(EvdevSymbols::event_type_name(0x1f), None);
    }

    #[test]
    fn test_key_codes_by_suffix_and_full_name() {
        let symbols = EvdevSymbols;

        assert_eq!(symbols.event_code(EV_KEY, "UNKNOWN"), Some(240));
        assert_eq!(symbols.event_code(EV_KEY, "BLUETOOTH"), Some(237));
        assert_eq!(symbols.event_code(EV_KEY, "OK"), Some(0x160));
        assert_eq!(symbols.event_code(EV_KEY, "LEFT"), Some(105));
        assert_eq!(symbols.event_code(EV_KEY, "MIDDLE"), Some(0x112));
        assert_eq!(symbols.event_code(EV_KEY, "BTN_LEFT"), Some(0x110));
        assert_eq!(symbols.event_code(EV_KEY, "KEY_ESC"), Some(1));
    }

    #[test]
    fn test_codes_are_scoped_to_their_type() {
        let symbols = EvdevSymbols;

        assert_eq!(symbols.event_code(EV_ABS, "X"), Some(0));
        assert_eq!(symbols.event_code(EV_ABS, "Y"), Some(1));
        assert_eq!(symbols.event_code(EV_REL, "WHEEL"), Some(8));
        assert_eq!(symbols.event_code(EV_REL, "BLUETOOTH"), None);
        assert_eq!(symbols.event_code(EV_SW, "LID"), Some(0));
        assert_eq!(symbols.event_code(0x16, "ANYTHING"), None);
    }

    #[test]
    fn test_no_symbols_resolves_nothing() {
        assert_eq!(NoSymbols.event_type("KEY"), None);
        assert_eq!(NoSymbols.event_code(EV_KEY, "UNKNOWN"), None);
    }
}
