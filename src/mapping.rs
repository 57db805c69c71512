use crate::context::Context;
use crate::err::{Error, Result};
use crate::event::{EV_CNT, EV_MAX, InputEvent};
use crate::mapping_table::{Insertion, MappingTable};
use crate::rule::MappingRule;

use log::Level;

use std::sync::Arc;

/// One-to-one code translations for a single device, one table per event type.
///
/// Populate it with [`Mapping::add`] or [`Mapping::add_from_string`], then share it behind
/// an `Arc` and translate events with [`Mapping::translate`]. A missing mapping is a valid
/// identity mapping, see [`translate`].
#[derive(Debug)]
pub struct Mapping {
    ctx: Arc<Context>,
    tables: [MappingTable; EV_CNT],
}

impl Mapping {
    pub fn new(ctx: &Arc<Context>) -> Self {
        Mapping {
            ctx: Arc::clone(ctx),
            tables: std::array::from_fn(|_| MappingTable::new()),
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Adds `from -> to` for `event_type`, replacing an existing target for `from`.
    pub fn add(&mut self, event_type: u16, from: u16, to: u16) -> Result<()> {
        let table = self
            .tables
            .get_mut(usize::from(event_type))
            .ok_or(Error::InvalidEventType {
                event_type,
                max: EV_MAX,
            })?;

        if let Insertion::Overwritten { previous, .. } = table.insert(from, to)? {
            ctx_log!(
                self.ctx,
                Level::Debug,
                "overwriting existing key {} in mapping (was {}, now {})",
                from,
                previous,
                to
            );
        }

        Ok(())
    }

    /// Adds the rule spelled by an hwdb property, `key` already stripped of its prefix.
    ///
    /// Malformed rules are logged and skipped so a single bad property cannot block the
    /// rest of a device's rules; only allocation failures are returned.
    pub fn add_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match MappingRule::parse(key, value, self.ctx.symbols()) {
            Ok(rule) => self.add(rule.event_type, rule.from, rule.to),
            Err(e) => {
                ctx_log!(
                    self.ctx,
                    Level::Debug,
                    "skipping mapping `{}={}`: {}",
                    key,
                    value,
                    e
                );
                Ok(())
            }
        }
    }

    /// Translates `code`, returning it unchanged when no rule applies.
    pub fn translate(&self, event_type: u16, code: u16) -> u16 {
        self.table(event_type)
            .and_then(|table| table.lookup(code))
            .unwrap_or(code)
    }

    /// Returns `event` with its code translated.
    pub fn map_event(&self, event: &InputEvent) -> InputEvent {
        InputEvent {
            code: self.translate(event.event_type, event.code),
            ..*event
        }
    }

    pub fn table(&self, event_type: u16) -> Option<&MappingTable> {
        self.tables.get(usize::from(event_type))
    }

    /// The event types that have at least one rule, with their tables.
    pub fn tables(&self) -> impl Iterator<Item = (u16, &MappingTable)> {
        self.tables
            .iter()
            .enumerate()
            .filter(|(_, table)| !table.is_empty())
            .map(|(event_type, table)| (event_type as u16, table))
    }
}

/// Translates `code` through `mapping`; `None` is the identity mapping.
pub fn translate(mapping: Option<&Mapping>, event_type: u16, code: u16) -> u16 {
    match mapping {
        Some(mapping) => mapping.translate(event_type, code),
        None => code,
    }
}

/// Event-level [`translate`].
pub fn map_event(mapping: Option<&Mapping>, event: &InputEvent) -> InputEvent {
    match mapping {
        Some(mapping) => mapping.map_event(event),
        None => *event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EV_ABS, EV_KEY};
    use crate::symbols::NoSymbols;
    use pretty_assertions::assert_eq;

    fn mapping() -> Mapping {
        Mapping::new(&Arc::new(Context::new()))
    }

    fn entries(mapping: &Mapping, event_type: u16) -> Vec<(u16, u16)> {
        mapping
            .table(event_type)
            .unwrap()
            .entries()
            .iter()
            .map(|e| (e.from, e.to))
            .collect()
    }

    #[test]
    fn test_add_and_translate() {
        let mut mapping = mapping();
        mapping.add(EV_KEY, 240, 237).unwrap();

        assert_eq!(mapping.translate(EV_KEY, 240), 237);
        assert_eq!(mapping.translate(EV_KEY, 237), 237);
        // Tables are per type.
        assert_eq!(mapping.translate(EV_ABS, 240), 240);
    }

    #[test]
    fn test_add_rejects_out_of_range_type() {
        let mut mapping = mapping();

        let err = mapping.add(EV_MAX + 1, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEventType {
                event_type: 0x20,
                max: EV_MAX
            }
        ));
        assert_eq!(mapping.tables().count(), 0);

        mapping.add(EV_MAX, 1, 2).unwrap();
        assert_eq!(mapping.translate(EV_MAX, 1), 2);
    }

    #[test]
    fn test_translate_out_of_range_type_is_identity() {
        let mapping = mapping();

        assert_eq!(mapping.translate(u16::MAX, 42), 42);
        assert!(mapping.table(EV_MAX + 1).is_none());
    }

    #[test]
    fn test_absent_mapping_is_identity() {
        let event = InputEvent::new(EV_KEY, 30, 1);

        assert_eq!(translate(None, EV_KEY, 30), 30);
        assert_eq!(map_event(None, &event), event);
    }

    #[test]
    fn test_map_event_only_rewrites_code() {
        let mut mapping = mapping();
        mapping.add(EV_KEY, 30, 48).unwrap();

        let mapped = map_event(Some(&mapping), &InputEvent::new(EV_KEY, 30, 2));

        assert_eq!(mapped, InputEvent::new(EV_KEY, 48, 2));
    }

    #[test]
    fn test_add_from_string_hex() {
        let mut mapping = mapping();
        mapping.add_from_string("0x1_0x1", "0x2").unwrap();

        assert_eq!(entries(&mapping, 1), vec![(1, 2)]);
    }

    #[test]
    fn test_add_from_string_matches_direct_add() {
        let mut parsed = mapping();
        parsed.add_from_string("KEY_UNKNOWN", "BLUETOOTH").unwrap();

        let mut direct = mapping();
        direct.add(EV_KEY, 240, 237).unwrap();

        assert_eq!(entries(&parsed, EV_KEY), entries(&direct, EV_KEY));
    }

    #[test]
    fn test_add_from_string_skips_malformed() {
        let mut mapping = mapping();
        mapping.add(EV_KEY, 1, 2).unwrap();

        for (key, value) in [
            ("INVALID", "X"),
            ("_0x1", "0x2"),
            ("0x1_", "0x2"),
            ("0x1_0x", "0x2"),
            ("0x1_0x10000", "0x2"),
            ("0x20_0x1", "0x2"),
            ("0x1_0x1", "NOPE"),
        ] {
            mapping.add_from_string(key, value).unwrap();
        }

        assert_eq!(entries(&mapping, EV_KEY), vec![(1, 2)]);
        assert_eq!(mapping.tables().count(), 1);
    }

    #[test]
    fn test_add_from_string_uses_context_symbols() {
        let ctx = Arc::new(Context::new().with_symbol_resolver(NoSymbols));
        let mut mapping = Mapping::new(&ctx);

        mapping.add_from_string("KEY_UNKNOWN", "BLUETOOTH").unwrap();
        mapping.add_from_string("0x1_0xf0", "0xed").unwrap();

        assert_eq!(entries(&mapping, EV_KEY), vec![(240, 237)]);
    }

    #[test]
    fn test_overwrite_through_mapping() {
        let mut mapping = mapping();
        mapping.add(EV_KEY, 5, 10).unwrap();
        mapping.add_from_string("0x1_0x5", "0x14").unwrap();

        assert_eq!(entries(&mapping, EV_KEY), vec![(5, 20)]);
    }

    #[test]
    fn test_tables_lists_non_empty_types() {
        let mut mapping = mapping();
        mapping.add(EV_ABS, 0, 1).unwrap();
        mapping.add(EV_KEY, 2, 3).unwrap();

        let types: Vec<u16> = mapping.tables().map(|(event_type, _)| event_type).collect();
        assert_eq!(types, vec![EV_KEY, EV_ABS]);
    }
}
