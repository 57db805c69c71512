use crate::err::Result;
use crate::hwdb::{Hwdb, PropertyDatabase};
use crate::mapping::Mapping;
use crate::symbols::{EvdevSymbols, SymbolResolver};

use log::{Level, debug};

use std::fmt;
use std::sync::Arc;

/// hwdb properties carrying mapping rules start with this prefix.
pub const MAP_PROPERTY_PREFIX: &str = "INMAP_MAP_";

/// Receives the diagnostics of a context and of every mapping created from it.
///
/// State that the callback needs should be captured by the closure.
pub type LogFn = Box<dyn Fn(Level, &fmt::Arguments<'_>) + Send + Sync>;

/// Shared state every [`Mapping`] is created from.
///
/// A context is configured by value and then shared through an `Arc`; mappings keep
/// their context alive for as long as they exist.
///
/// ```ignore
/// let ctx = Arc::new(
///     Context::new()
///         .with_database(Hwdb::from_dir("/etc/udev/hwdb.d")?)
///         .with_log_fn(|level, args| eprintln!("[{level}] {args}")),
/// );
/// let mapping = ctx.lookup_by_modalias(modalias)?;
/// ```
pub struct Context {
    database: Box<dyn PropertyDatabase + Send + Sync>,
    symbols: Box<dyn SymbolResolver + Send + Sync>,
    log_fn: Option<LogFn>,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            database: Box::new(Hwdb::new()),
            symbols: Box::new(EvdevSymbols),
            log_fn: None,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("log_fn", &self.log_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// A context with an empty database and the evdev symbol names.
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with_database(mut self, database: impl PropertyDatabase + Send + Sync + 'static) -> Self {
        self.database = Box::new(database);
        self
    }

    pub fn with_symbol_resolver(
        mut self,
        symbols: impl SymbolResolver + Send + Sync + 'static,
    ) -> Self {
        self.symbols = Box::new(symbols);
        self
    }

    /// Routes diagnostics to `log_fn` instead of the `log` facade.
    pub fn with_log_fn(
        mut self,
        log_fn: impl Fn(Level, &fmt::Arguments<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.log_fn = Some(Box::new(log_fn));
        self
    }

    pub fn symbols(&self) -> &dyn SymbolResolver {
        self.symbols.as_ref()
    }

    pub fn database(&self) -> &dyn PropertyDatabase {
        self.database.as_ref()
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match &self.log_fn {
            Some(log_fn) => log_fn(level, &args),
            None => log::log!(target: "inmap", level, "{}", args),
        }
    }

    /// Builds the mapping for the device identified by `modalias`.
    ///
    /// Returns `Ok(None)` when the database knows nothing about the device, which callers
    /// should treat as the identity mapping. Properties outside [`MAP_PROPERTY_PREFIX`]
    /// are ignored and malformed rules are skipped with a diagnostic.
    pub fn lookup_by_modalias(self: &Arc<Self>, modalias: &str) -> Result<Option<Arc<Mapping>>> {
        let properties = self.database().properties(modalias);

        if properties.is_empty() {
            debug!("no hwdb properties for `{}`", modalias);
            return Ok(None);
        }

        let mut mapping = Mapping::new(self);

        for property in &properties {
            let Some(key) = property.name.strip_prefix(MAP_PROPERTY_PREFIX) else {
                continue;
            };

            mapping.add_from_string(key, &property.value)?;
        }

        Ok(Some(Arc::new(mapping)))
    }
}
