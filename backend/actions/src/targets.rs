//! Navigation targets accepted by `goto`.

use serde::Serialize;

/// Shape of the arguments a target expects after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No arguments.
    None,
    /// One argument drawn from a fixed set.
    Subcommands(&'static [&'static str]),
    /// One free-form argument.
    One,
    /// Two free-form arguments.
    Two,
}

/// A `goto` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GotoTarget {
    Storykeep,
    Home,
    Concierge,
    Context,
    Product,
    StoryFragment,
    StoryFragmentPane,
    Bunny,
    BunnyContext,
    Url,
}

pub const STORYKEEP_SUBCOMMANDS: &[&str] = &["dashboard", "settings", "login", "logout"];

impl GotoTarget {
    pub const ALL: [GotoTarget; 10] = [
        GotoTarget::Storykeep,
        GotoTarget::Home,
        GotoTarget::Concierge,
        GotoTarget::Context,
        GotoTarget::Product,
        GotoTarget::StoryFragment,
        GotoTarget::StoryFragmentPane,
        GotoTarget::Bunny,
        GotoTarget::BunnyContext,
        GotoTarget::Url,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GotoTarget::Storykeep => "storykeep",
            GotoTarget::Home => "home",
            GotoTarget::Concierge => "concierge",
            GotoTarget::Context => "context",
            GotoTarget::Product => "product",
            GotoTarget::StoryFragment => "storyFragment",
            GotoTarget::StoryFragmentPane => "storyFragmentPane",
            GotoTarget::Bunny => "bunny",
            GotoTarget::BunnyContext => "bunnyContext",
            GotoTarget::Url => "url",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            GotoTarget::Storykeep => Arity::Subcommands(STORYKEEP_SUBCOMMANDS),
            GotoTarget::Home => Arity::None,
            GotoTarget::Concierge
            | GotoTarget::Context
            | GotoTarget::Product
            | GotoTarget::StoryFragment
            | GotoTarget::Url => Arity::One,
            GotoTarget::StoryFragmentPane | GotoTarget::Bunny | GotoTarget::BunnyContext => {
                Arity::Two
            }
        }
    }

    /// Whether an expression being authored has filled every slot this
    /// target needs. `args` excludes the target name itself.
    pub fn is_complete(&self, args: &[&str]) -> bool {
        match self.arity() {
            Arity::None => true,
            Arity::Subcommands(allowed) => args.first().is_some_and(|a| allowed.contains(a)),
            Arity::One => !args.is_empty(),
            Arity::Two => args.len() >= 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_roundtrip() {
        for target in GotoTarget::ALL {
            assert_eq!(GotoTarget::from_name(target.name()), Some(target));
        }
        assert_eq!(GotoTarget::from_name("nowhere"), None);
    }

    #[test]
    fn test_completeness() {
        assert!(GotoTarget::Home.is_complete(&[]));
        assert!(!GotoTarget::StoryFragment.is_complete(&[]));
        assert!(GotoTarget::StoryFragment.is_complete(&["hello"]));
        assert!(!GotoTarget::StoryFragmentPane.is_complete(&["hello"]));
        assert!(GotoTarget::StoryFragmentPane.is_complete(&["hello", "why-choose"]));
        assert!(GotoTarget::Storykeep.is_complete(&["settings"]));
        assert!(!GotoTarget::Storykeep.is_complete(&["elsewhere"]));
    }
}
