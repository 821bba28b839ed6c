/// Preference-ordered providers per image model. Order only drives labelling;
/// every provider listed is tried.
const BUILTIN: &[(&str, &[&str])] = &[
    ("flux", &["PollinationsAI", "Together", "HuggingSpace"]),
    ("flux-dev", &["HuggingSpace", "Together"]),
    ("sdxl-turbo", &["PollinationsAI", "ImageLabs"]),
    ("dall-e-3", &["PollinationsAI", "Copilot"]),
    ("midjourney", &["PollinationsAI"]),
];

/// Used for models the table does not know.
pub const DEFAULT_PROVIDERS: &[&str] = &["PollinationsAI", "Together"];

#[derive(Clone, Debug)]
pub struct ModelProviderMap {
    entries: Vec<(String, Vec<String>)>,
    fallback: Vec<String>,
}

impl ModelProviderMap {
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN
                .iter()
                .map(|(model, providers)| (*model, providers.to_vec())),
            DEFAULT_PROVIDERS.to_vec(),
        )
    }

    pub fn from_entries<'a, I>(entries: I, fallback: Vec<&'a str>) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let owned = |v: Vec<&str>| v.into_iter().map(str::to_string).collect::<Vec<_>>();
        Self {
            entries: entries
                .into_iter()
                .map(|(model, providers)| (model.to_string(), owned(providers)))
                .collect(),
            fallback: owned(fallback),
        }
    }

    pub fn resolve(&self, model: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(model))
            .map(|(_, providers)| providers.as_slice())
            .unwrap_or(&self.fallback)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(m, _)| m.as_str())
    }

    /// Canonical spelling of `model`, if the table knows it.
    pub fn canonical(&self, model: &str) -> Option<&str> {
        self.models().find(|m| m.eq_ignore_ascii_case(model.trim()))
    }
}

impl Default for ModelProviderMap {
    fn default() -> Self {
        Self::builtin()
    }
}
