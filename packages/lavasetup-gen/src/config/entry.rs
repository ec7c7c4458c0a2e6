//! Normalized lab entries
//!
//! Each `normalize` constructor checks a raw YAML mapping against the
//! keywords recognized for its kind, rejects missing required fields and
//! fills the documented defaults. The raw mapping is never modified.

use camino::{Utf8Component, Utf8Path};
use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::constants::{
    DEFAULT_HOST, DEFAULT_LOGGER_PORT, DEFAULT_MASTER_NAME, DEFAULT_MASTER_PORT,
    DEFAULT_POSTGRE_HOSTNAME, DEFAULT_POSTGRE_USER, DEFAULT_SLAVE_NAME, DEFAULT_USER_FLAG,
    MASTER_KEYWORDS, SLAVE_KEYWORDS, USER_KEYWORDS,
};
use crate::error::{EntryKind, GenError, Result};

/// Optional ZMQ authentication settings shared by masters and slaves
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZmqAuth {
    /// `zmq_auth`: whether ZMQ authentication is on
    pub auth: Option<Value>,
    /// `zmq_auth_key`: path of the public key
    pub key: Option<Value>,
    /// `zmq_auth_key_secret`: path of the secret key
    pub key_secret: Option<Value>,
}

impl ZmqAuth {
    fn from_raw(raw: &RawEntry<'_>) -> Self {
        Self {
            auth: raw.value("zmq_auth"),
            key: raw.value("zmq_auth_key"),
            key_secret: raw.value("zmq_auth_key_secret"),
        }
    }

    /// Template bindings for the settings that were given
    pub fn bindings(&self) -> Vec<(&'static str, &Value)> {
        [
            ("ZMQ_AUTH", &self.auth),
            ("ZMQ_AUTH_KEY", &self.key),
            ("ZMQ_AUTH_KEY_SECRET", &self.key_secret),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v)))
        .collect()
    }
}

/// The coordinating lava-server node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterEntry {
    /// Unique name, also the hostname of the container
    pub name: String,
    /// Free-form node type, carried but not interpreted
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    /// Host the node is deployed on, a directory name under the output root
    pub host: String,
    /// lava-server accounts created at provisioning
    pub users: Vec<UserEntry>,
    /// Carried but not used
    pub groups: Vec<Value>,
    /// Database password, the one required master field
    pub postgre_password: Value,
    /// Database user, `lavaserver` by default
    pub postgre_user: Value,
    /// Database host as seen from the server container
    pub postgre_hostname: Value,
    /// ZMQ logger port, 5555 by default
    pub logger_port: Value,
    /// ZMQ master port, 5556 by default
    pub master_port: Value,
    /// Host port the web UI is published on
    pub server_port: Option<Value>,
    /// Name remote dispatchers use to reach the master
    pub dns_name: Option<Value>,
    /// ZMQ authentication settings
    pub zmq: ZmqAuth,
}

impl MasterEntry {
    /// Validate a raw master mapping and fill its defaults.
    ///
    /// Inline `users` are normalized along with the master.
    pub fn normalize(map: &Mapping) -> Result<Self> {
        let raw = RawEntry::new(EntryKind::Master, map);
        raw.check_keywords(MASTER_KEYWORDS)?;

        let postgre_password = raw.require_value("postgre_password")?;
        let name = raw
            .text("name", None)?
            .unwrap_or_else(|| DEFAULT_MASTER_NAME.to_string());

        let users = match raw.value("users") {
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Mapping(user) => UserEntry::normalize(user),
                    _ => Err(raw.invalid("users", &name, "user entries must be mappings")),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(raw.invalid("users", &name, "expected a list")),
            None => Vec::new(),
        };

        let master = Self {
            kind: raw.value("type"),
            host: raw
                .file_name("host", Some(&name))?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            groups: raw.list("groups", &name)?,
            users,
            postgre_password,
            postgre_user: raw.value_or("postgre_user", DEFAULT_POSTGRE_USER),
            postgre_hostname: raw.value_or("postgre_hostname", DEFAULT_POSTGRE_HOSTNAME),
            logger_port: raw.value_or("logger_port", DEFAULT_LOGGER_PORT),
            master_port: raw.value_or("master_port", DEFAULT_MASTER_PORT),
            server_port: raw.value("server_port"),
            dns_name: raw.value("dns_name"),
            zmq: ZmqAuth::from_raw(&raw),
            name,
        };

        debug!("Normalized master {} on host {}", master.name, master.host);
        Ok(master)
    }
}

/// A dispatcher node reporting to a master
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaveEntry {
    /// Unique name, also the hostname of the container
    pub name: String,
    /// Free-form node type, carried but not interpreted
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    /// Host the node is deployed on, a directory name under the output root
    pub host: String,
    /// Name of the master this dispatcher reports to
    pub remote_master: String,
    /// Carried but not used
    pub users: Vec<Value>,
    /// Carried but not used
    pub groups: Vec<Value>,
    /// ZMQ authentication settings
    pub zmq: ZmqAuth,
}

impl SlaveEntry {
    /// Validate a raw slave mapping and fill its defaults
    pub fn normalize(map: &Mapping) -> Result<Self> {
        let raw = RawEntry::new(EntryKind::Slave, map);
        raw.check_keywords(SLAVE_KEYWORDS)?;

        let remote_master = raw.require_text("remote_master", None)?;
        let name = raw
            .text("name", None)?
            .unwrap_or_else(|| DEFAULT_SLAVE_NAME.to_string());

        let slave = Self {
            kind: raw.value("type"),
            host: raw
                .file_name("host", Some(&name))?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            users: raw.list("users", &name)?,
            groups: raw.list("groups", &name)?,
            zmq: ZmqAuth::from_raw(&raw),
            remote_master,
            name,
        };

        debug!("Normalized slave {} on host {}", slave.name, slave.host);
        Ok(slave)
    }
}

/// A lava-server account created by the provisioning script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEntry {
    /// Login name
    pub name: Value,
    /// Initial password
    pub password: Value,
    /// `"yes"` grants superuser rights
    pub superuser: Value,
    /// `"yes"` grants staff rights
    pub staff: Value,
}

impl UserEntry {
    /// Validate a raw user mapping; both flags default to `"no"`
    pub fn normalize(map: &Mapping) -> Result<Self> {
        let raw = RawEntry::new(EntryKind::User, map);
        raw.check_keywords(USER_KEYWORDS)?;

        Ok(Self {
            name: raw.require_value("name")?,
            password: raw.require_value("password")?,
            superuser: raw.value_or("superuser", DEFAULT_USER_FLAG),
            staff: raw.value_or("staff", DEFAULT_USER_FLAG),
        })
    }
}

/// A device under test attached to one slave
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    /// Device name, also the name of its dictionary file
    pub name: String,
    #[serde(rename = "type")]
    /// Device type, names the template the dictionary extends
    pub device_type: String,
    /// Name of the slave the board is attached to
    pub slave: String,
    /// Template directives appended to the device descriptor, in order
    pub options: Vec<String>,
}

impl BoardEntry {
    /// Boards only need their three reference fields; other keys are
    /// carried by the document but not interpreted.
    pub fn normalize(map: &Mapping) -> Result<Self> {
        let raw = RawEntry::new(EntryKind::Board, map);

        let name = raw
            .file_name("name", None)?
            .ok_or(GenError::MissingField {
                kind: EntryKind::Board,
                field: "name",
                entry: None,
            })?;
        let slave = raw.require_text("slave", Some(&name))?;
        let device_type = raw.require_text("type", Some(&name))?;

        let options = match raw.value("options") {
            None => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    scalar_text(item)
                        .ok_or_else(|| raw.invalid("options", &name, "list items must be scalars"))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(Value::String(block)) => block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Some(_) => {
                return Err(raw.invalid("options", &name, "expected a list or a text block"));
            }
        };

        Ok(Self {
            name,
            device_type,
            slave,
            options,
        })
    }
}

/// Read-only view over one raw mapping from the setup file
struct RawEntry<'a> {
    kind: EntryKind,
    map: &'a Mapping,
}

impl<'a> RawEntry<'a> {
    fn new(kind: EntryKind, map: &'a Mapping) -> Self {
        Self { kind, map }
    }

    fn check_keywords(&self, allowed: &[&str]) -> Result<()> {
        for (key, _) in self.map.iter() {
            match key.as_str() {
                Some(key) if allowed.contains(&key) => {}
                _ => {
                    return Err(GenError::UnknownKey {
                        kind: self.kind,
                        key: scalar_text(key).unwrap_or_else(|| format!("{:?}", key)),
                    });
                }
            }
        }
        Ok(())
    }

    /// A present, non-null value
    fn value(&self, key: &str) -> Option<Value> {
        self.map.get(key).filter(|v| !v.is_null()).cloned()
    }

    fn value_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.value(key).unwrap_or_else(|| default.into())
    }

    fn require_value(&self, field: &'static str) -> Result<Value> {
        self.value(field).ok_or(GenError::MissingField {
            kind: self.kind,
            field,
            entry: None,
        })
    }

    /// Identity fields are used in paths and comparisons, so they must be
    /// scalars and are taken in their textual form.
    fn text(&self, key: &'static str, entry: Option<&str>) -> Result<Option<String>> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => scalar_text(&value).map(Some).ok_or_else(|| {
                self.invalid(key, entry.unwrap_or("<unnamed>"), "expected a scalar")
            }),
        }
    }

    /// Text used as one directory or file name under the output root
    fn file_name(&self, key: &'static str, entry: Option<&str>) -> Result<Option<String>> {
        let Some(text) = self.text(key, entry)? else {
            return Ok(None);
        };
        let mut components = Utf8Path::new(&text).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Utf8Component::Normal(_)), None)
        );
        if !single {
            return Err(self.invalid(
                key,
                entry.unwrap_or(&text),
                "must be a single path component",
            ));
        }
        Ok(Some(text))
    }

    fn require_text(&self, field: &'static str, entry: Option<&str>) -> Result<String> {
        self.text(field, entry)?.ok_or_else(|| GenError::MissingField {
            kind: self.kind,
            field,
            entry: entry.map(str::to_string),
        })
    }

    fn list(&self, field: &'static str, entry: &str) -> Result<Vec<Value>> {
        match self.value(field) {
            None => Ok(Vec::new()),
            Some(Value::Sequence(items)) => Ok(items),
            Some(_) => Err(self.invalid(field, entry, "expected a list")),
        }
    }

    fn invalid(&self, field: &'static str, entry: &str, reason: &str) -> GenError {
        GenError::InvalidValue {
            kind: self.kind,
            field,
            entry: entry.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Textual form of a YAML scalar, `None` for collections and null
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
