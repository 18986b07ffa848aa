use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Variables holding the environment name, in priority order
pub const ENV_KEYS: [&str; 3] = ["ENV", "APP_ENV", "env"];

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Source of the environment name that gates console echo
#[derive(Clone)]
pub struct Environment {
    lookup: Arc<Lookup>,
}

impl Environment {
    /// Read variables from the process environment
    pub fn from_process() -> Self {
        Self {
            lookup: Arc::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Read variables from a fixed set of pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            lookup: Arc::new(move |key: &str| vars.get(key).cloned()),
        }
    }

    /// The first non-empty value among `ENV`, `APP_ENV` and `env`
    pub fn name(&self) -> Option<String> {
        ENV_KEYS
            .into_iter()
            .filter_map(|key| (self.lookup)(key))
            .find(|value| !value.is_empty())
    }

    /// True for `dev` or `development`, in any case
    pub fn is_development(&self) -> bool {
        match self.name() {
            Some(name) => {
                let name = name.to_lowercase();
                name == "dev" || name == "development"
            }
            None => false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::from_process()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name())
            .finish()
    }
}
