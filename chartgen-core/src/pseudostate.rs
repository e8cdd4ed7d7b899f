//! Mapping of `<<stereotype>>` tags to pseudostate kinds.

use core::str::FromStr;

use crate::error::BuildError;
use crate::model::StateKind;

/// Closed set of pseudostates a diagram can declare by stereotype.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PseudostateType {
    EntryPoint,
    ExitPoint,
    Choice,
    Fork,
    /// `<<end>>` binds the name to the container's final state.
    End,
}

impl PseudostateType {
    #[must_use]
    pub fn state_kind(self) -> StateKind {
        match self {
            PseudostateType::EntryPoint => StateKind::EntryPoint,
            PseudostateType::ExitPoint => StateKind::ExitPoint,
            PseudostateType::Choice => StateKind::Choice,
            PseudostateType::Fork => StateKind::Fork,
            PseudostateType::End => StateKind::Final,
        }
    }
}

impl FromStr for PseudostateType {
    type Err = BuildError;

    /// Accepts the tag with or without the `<<`/`>>` brackets.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let bare = tag.trim();
        let bare = bare
            .strip_prefix("<<")
            .and_then(|t| t.strip_suffix(">>"))
            .unwrap_or(bare)
            .trim();
        match bare {
            "entryPoint" | "inputPin" | "expansionInput" => Ok(PseudostateType::EntryPoint),
            "exitPoint" | "outputPin" | "expansionOutput" => Ok(PseudostateType::ExitPoint),
            "choice" => Ok(PseudostateType::Choice),
            "fork" | "join" => Ok(PseudostateType::Fork),
            "end" => Ok(PseudostateType::End),
            _ => Err(BuildError::UnknownPseudostate(tag.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_and_expansions_map_to_entry_and_exit_points() {
        for tag in ["<<entryPoint>>", "<<inputPin>>", "<<expansionInput>>"] {
            assert_eq!(tag.parse(), Ok(PseudostateType::EntryPoint));
        }
        for tag in ["<<exitPoint>>", "<<outputPin>>", "<<expansionOutput>>"] {
            assert_eq!(tag.parse(), Ok(PseudostateType::ExitPoint));
        }
    }

    #[test]
    fn fork_and_join_share_a_kind() {
        let fork: PseudostateType = "<<fork>>".parse().unwrap();
        let join: PseudostateType = "join".parse().unwrap();
        assert_eq!(fork.state_kind(), join.state_kind());
        assert_eq!(
            "<<end>>".parse::<PseudostateType>().unwrap().state_kind(),
            StateKind::Final
        );
    }

    #[test]
    fn unknown_tag_is_a_resolution_error() {
        let err = "<<sdlreceive>>".parse::<PseudostateType>().unwrap_err();
        assert_eq!(err, BuildError::UnknownPseudostate("<<sdlreceive>>".into()));
        assert!(err.is_resolution());
    }
}
