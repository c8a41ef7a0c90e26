// Property File Parser
// Parses simple key=value property files such as q3ios.cfg

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Parse property file text, invoking `handler` for each key-value pair.
///
/// Keys keep their case. `#` starts a comment anywhere on a line; a line
/// without `=` is skipped with a warning.
pub fn parse_propfile(data: &str, handler: &mut dyn FnMut(&str, &str)) {
    for (number, raw) in data.lines().enumerate() {
        let line = match raw.find('#') {
            Some(hash) => &raw[..hash],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Key without value on line {}: {:?}", number + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            log::warn!("Value without key on line {}", number + 1);
            continue;
        }
        handler(key, value.trim());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("Property file not found")]
    FileNotFound,

    #[error("I/O error on property file: {0}")]
    Io(io::Error),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

impl From<io::Error> for PropertyError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => PropertyError::FileNotFound,
            _ => PropertyError::Io(err),
        }
    }
}

/// Key-value pairs with case-insensitive keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyFile {
    properties: BTreeMap<String, String>,
}

impl PropertyFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a property file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PropertyError> {
        let data = fs::read_to_string(path)?;
        Ok(Self::parse(&data))
    }

    pub fn parse(data: &str) -> Self {
        let mut file = PropertyFile::new();
        parse_propfile(data, &mut |key, value| file.set(key, value));
        file
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Parse a value, failing on text that does not parse
    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, PropertyError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| PropertyError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Boolean property; accepts true/false, yes/no, on/off and 1/0
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, PropertyError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(PropertyError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_lowercase(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Entries under `prefix`, with the prefix stripped from the keys
    pub fn section<'a>(&'a self, prefix: &str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let prefix = prefix.to_lowercase();
        self.properties.iter().filter_map(move |(key, value)| {
            key.strip_prefix(prefix.as_str())
                .map(|rest| (rest, value.as_str()))
        })
    }

    /// Save sorted by key
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PropertyError> {
        let mut content = String::new();
        for (key, value) in &self.properties {
            content.push_str(key);
            content.push('=');
            content.push_str(value);
            content.push('\n');
        }

        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collect(data: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        parse_propfile(data, &mut |k, v| pairs.push((k.to_string(), v.to_string())));
        pairs
    }

    #[test]
    fn test_propfile_basic_keyvalue() {
        let pairs = collect("touch.deadzone=0.05\nlog.level = debug\n");
        assert_eq!(
            pairs,
            vec![
                ("touch.deadzone".to_string(), "0.05".to_string()),
                ("log.level".to_string(), "debug".to_string()),
            ]
        );
    }

    #[test]
    fn test_propfile_comments() {
        let pairs = collect("# full line\nname=Ranger # trailing\n   # indented\n");
        assert_eq!(pairs, vec![("name".to_string(), "Ranger".to_string())]);
    }

    #[test]
    fn test_propfile_key_without_value() {
        let pairs = collect("orphan\nkept=1\n=novalue\n");
        assert_eq!(pairs, vec![("kept".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_propfile_value_may_contain_equals() {
        let pairs = collect("bind.buttonA=set x=1\n");
        assert_eq!(pairs[0].1, "set x=1");
    }

    #[test]
    fn test_case_insensitive_keys() {
        let file = PropertyFile::parse("Launch.PlayerName=Doom\n");
        assert_eq!(file.get("launch.playername"), Some("Doom"));
        assert!(file.contains("LAUNCH.PLAYERNAME"));
    }

    #[test]
    fn test_get_parsed() {
        let file = PropertyFile::parse("a=12\nb=0.5\nc=twelve\n");
        assert_eq!(file.get_parsed::<u32>("a").unwrap(), Some(12));
        assert_eq!(file.get_parsed::<f32>("b").unwrap(), Some(0.5));
        assert_eq!(file.get_parsed::<u32>("missing").unwrap(), None);
        assert!(matches!(
            file.get_parsed::<u32>("c"),
            Err(PropertyError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_get_bool() {
        let file = PropertyFile::parse("a=yes\nb=OFF\nc=1\nd=maybe\n");
        assert_eq!(file.get_bool("a").unwrap(), Some(true));
        assert_eq!(file.get_bool("b").unwrap(), Some(false));
        assert_eq!(file.get_bool("c").unwrap(), Some(true));
        assert!(file.get_bool("d").is_err());
        assert_eq!(file.get_bool("e").unwrap(), None);
    }

    #[test]
    fn test_section() {
        let file = PropertyFile::parse("bind.buttonA=+moveup\nbind.buttonB=+button2\nother=1\n");
        let section: Vec<_> = file.section("bind.").collect();
        assert_eq!(section, vec![("buttona", "+moveup"), ("buttonb", "+button2")]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("q3ios.cfg");

        let mut file = PropertyFile::new();
        file.set("b", "2");
        file.set("a", "1");
        file.save(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a=1\nb=2\n");
        assert_eq!(PropertyFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = PropertyFile::load(dir.path().join("absent.cfg")).unwrap_err();
        assert!(matches!(err, PropertyError::FileNotFound));
        assert_eq!(err.to_string(), "Property file not found");
    }
}
