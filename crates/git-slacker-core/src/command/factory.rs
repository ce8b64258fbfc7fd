//! Resolves logical command names to command kinds.

use super::{Command, CommandKind};
use crate::naming::NameResolver;
use crate::ConfigurationError;

/// Creates commands from short logical names such as `"GitHub/WebHook"`.
///
/// Names are resolved through explicit overrides first, then by convention:
/// every `/`- or `\`-separated segment has its first letter upper-cased and the
/// result is looked up in the command catalogue. Resolutions are memoized.
pub struct CommandFactory {
    resolver: NameResolver<CommandKind>,
}

impl CommandFactory {
    pub fn new() -> Self {
        Self {
            resolver: NameResolver::new(CommandKind::from_name),
        }
    }

    /// Bind `alias` to `kind`, taking precedence over the naming convention
    pub fn register(mut self, alias: &str, kind: CommandKind) -> Self {
        self.resolver.register(alias, kind);
        self
    }

    /// Resolve a logical name without instantiating a command
    pub fn resolve(&self, name: &str) -> Option<CommandKind> {
        self.resolver.resolve(name)
    }

    /// Instantiate an empty command for the logical `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownCommand`] when the name resolves to nothing.
    pub fn create(&self, name: &str) -> Result<Command, ConfigurationError> {
        self.resolve(name)
            .map(CommandKind::instantiate)
            .ok_or_else(|| ConfigurationError::UnknownCommand {
                name: name.to_string(),
            })
    }
}

impl Default for CommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
