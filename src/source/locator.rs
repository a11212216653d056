//! Mapping from type names to the modules that define them.

use std::path::{Path, PathBuf};

/// Finds the on-disk module (`.dll` or `.exe`) that defines a type.
///
/// The host process knows which modules it has loaded; this trait is how it shares that
/// knowledge. Any `Fn(&str) -> Option<PathBuf>` closure is a locator.
pub trait ModuleLocator: Send + Sync {
    /// Path of the module defining `type_name`, a full name such as `MyApp.Services.Mailer`.
    fn locate(&self, type_name: &str) -> Option<PathBuf>;
}

impl<F> ModuleLocator for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn locate(&self, type_name: &str) -> Option<PathBuf> {
        self(type_name)
    }
}

/// A fixed table of namespace prefixes and the modules that define them.
///
/// The longest matching prefix wins. A prefix matches the type itself and every type
/// nested below it (separated by `.` or `+`).
#[derive(Debug, Clone, Default)]
pub struct StaticModuleLocator {
    modules: Vec<(String, PathBuf)>,
}

impl StaticModuleLocator {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        StaticModuleLocator::default()
    }

    /// Add a module for every type under `prefix`.
    #[must_use]
    pub fn with_module(mut self, prefix: impl Into<String>, module: impl AsRef<Path>) -> Self {
        self.add(prefix, module);
        self
    }

    /// Add a module for every type under `prefix`.
    pub fn add(&mut self, prefix: impl Into<String>, module: impl AsRef<Path>) {
        self.modules
            .push((prefix.into(), module.as_ref().to_path_buf()));
    }
}

impl ModuleLocator for StaticModuleLocator {
    fn locate(&self, type_name: &str) -> Option<PathBuf> {
        self.modules
            .iter()
            .filter(|(prefix, _)| {
                type_name
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| {
                        rest.is_empty() || rest.starts_with('.') || rest.starts_with('+')
                    })
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, module)| module.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let locator = StaticModuleLocator::new()
            .with_module("MyApp", "/app/MyApp.dll")
            .with_module("MyApp.Data", "/app/MyApp.Data.dll");

        assert_eq!(
            locator.locate("MyApp.Program"),
            Some(PathBuf::from("/app/MyApp.dll"))
        );
        assert_eq!(
            locator.locate("MyApp.Data.Repository+Query"),
            Some(PathBuf::from("/app/MyApp.Data.dll"))
        );
        assert_eq!(locator.locate("MyApp"), Some(PathBuf::from("/app/MyApp.dll")));
        assert_eq!(locator.locate("MyAppTools.Cli"), None);
        assert_eq!(locator.locate("System.String"), None);
    }

    #[test]
    fn closures_are_locators() {
        let locator = |type_name: &str| {
            type_name
                .starts_with("Shop.")
                .then(|| PathBuf::from("/srv/Shop.exe"))
        };

        assert_eq!(
            ModuleLocator::locate(&locator, "Shop.Cart"),
            Some(PathBuf::from("/srv/Shop.exe"))
        );
        assert_eq!(ModuleLocator::locate(&locator, "Other.Cart"), None);
    }
}
