use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use log::{info, warn, error};

#[derive(Debug, Clone, PartialEq)]
pub struct TickerEntry {
    pub symbol: String,
    pub quantity: u64,
}

impl TickerEntry {
    /// Parses a `SYMBOL,QUANTITY` record. `Ok(None)` means the line is not a
    /// record at all (wrong field count) and should be dropped silently.
    pub fn from_line(line: &str, line_num: usize) -> Result<Option<Self>, String> {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() != 2 {
            return Ok(None);
        }

        let quantity = fields[1].trim().parse::<u64>()
            .map_err(|e| format!("Invalid quantity at line {}: {} ({})", line_num + 1, line, e))?;

        Ok(Some(TickerEntry {
            symbol: fields[0].trim().to_uppercase(),
            quantity,
        }))
    }
}

/// Symbol -> held quantity table, built once at startup and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct TickerRegistry {
    entries: HashMap<String, TickerEntry>,
}

impl TickerRegistry {
    /// Loads the registry from `file_path`. A missing or unreadable file is
    /// logged and produces an empty registry; it never fails the process.
    pub fn load(file_path: &str) -> Self {
        let file = match File::open(file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("{} not found. Using empty ticker data.", file_path);
                return Self::default();
            }
            Err(e) => {
                error!("Error loading ticker data from {}: {}", file_path, e);
                return Self::default();
            }
        };

        match Self::from_reader(BufReader::new(file)) {
            Ok(registry) => {
                info!("Loaded {} tickers successfully from {}", registry.len(), file_path);
                registry
            }
            Err(e) => {
                error!("Error loading ticker data from {}: {}", file_path, e);
                Self::default()
            }
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut entries = HashMap::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            // Skip blank lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match TickerEntry::from_line(line, line_num) {
                // Last line wins for duplicate symbols
                Ok(Some(entry)) => {
                    entries.insert(entry.symbol.clone(), entry);
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping line: {}", e),
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(&self, symbol: &str) -> Option<&TickerEntry> {
        self.entries.get(symbol)
    }

    pub fn sorted_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.entries.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
