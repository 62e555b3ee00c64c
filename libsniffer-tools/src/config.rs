use std::io;

/// Sniffer configuration, a view over a TOML table
///
/// Keys are addressed by path: `"live.promisc"` refers to the `promisc` entry
/// of the `[live]` table.
#[derive(Clone, Debug)]
pub struct Config {
    value: toml::Value,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            value: toml::Value::Table(toml::map::Map::new()),
        }
    }
}

impl Config {
    fn lookup<T: AsRef<str>>(&self, k: T) -> Option<&toml::Value> {
        let mut item = &self.value;
        for key in k.as_ref().split('.') {
            item = item.get(key)?;
        }
        Some(item)
    }

    /// Get an entry by path. If the input argument contains dots, the path is split
    /// into keys, each key being requested recursively.
    pub fn get<T: AsRef<str>>(&self, k: T) -> Option<&str> {
        self.lookup(k)?.as_str()
    }

    /// Get an entry of type integer by path
    pub fn get_usize<T: AsRef<str>>(&self, k: T) -> Option<usize> {
        self.lookup(k)?
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
    }

    /// Get an entry of type boolean by path
    pub fn get_bool<T: AsRef<str>>(&self, k: T) -> Option<bool> {
        self.lookup(k)?.as_bool()
    }

    /// Set an entry by path, creating intermediate tables when needed.
    ///
    /// A non-table value found on the path is replaced by a table.
    pub fn set<T: AsRef<str>, V: Into<toml::Value>>(&mut self, k: T, v: V) {
        let mut item = &mut self.value;
        let mut keys = k.as_ref().split('.').peekable();
        while let Some(key) = keys.next() {
            if !item.is_table() {
                *item = toml::Value::Table(toml::map::Map::new());
            }
            let Some(table) = item.as_table_mut() else {
                return;
            };
            if keys.peek().is_none() {
                table.insert(key.to_owned(), v.into());
                return;
            }
            item = table
                .entry(key)
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }
    }

    /// Load configuration from input object. If keys are already present, they are overwritten
    pub fn load_config<R: io::Read>(&mut self, mut config: R) -> Result<(), io::Error> {
        let mut s = String::new();
        config.read_to_string(&mut s)?;
        match s.parse::<toml::Table>() {
            Ok(table) => {
                for (k, v) in table {
                    self.set(k, v);
                }
                Ok(())
            }
            Err(e) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Load configuration failed: {e}"),
            )),
        }
    }
}
