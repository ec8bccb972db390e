//! Macros for ergonomic state declarations.

/// Declare a state enum whose signal names match its persisted values.
///
/// Each variant is given the label it is stored as in the entity's state
/// field; the same label is used for `transitioned_to_<label>` signals.
///
/// # Example
///
/// ```
/// use statekeep::core::State;
/// use statekeep::state_enum;
///
/// state_enum! {
///     pub enum DocState {
///         Draft => "draft",
///         Review => "review",
///         Published => "published",
///     }
/// }
///
/// assert_eq!(DocState::Review.name(), "review");
/// assert_eq!(serde_json::to_value(DocState::Draft).unwrap(), "draft");
/// assert_eq!(DocState::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant
            ),*
        }

        impl $name {
            /// Every declared state, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    state_enum! {
        enum TestState {
            Draft => "draft",
            Review => "review",
            Published => "published",
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Draft.name(), "draft");
        assert_eq!(TestState::Published.name(), "published");
    }

    #[test]
    fn state_enum_persists_under_label() {
        let json = serde_json::to_value(TestState::Review).unwrap();
        assert_eq!(json, serde_json::json!("review"));

        let state: TestState = serde_json::from_value(serde_json::json!("published")).unwrap();
        assert_eq!(state, TestState::Published);
    }

    #[test]
    fn state_enum_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                Open => "open",
                Closed => "closed",
            }
        }

        assert_eq!(PublicState::ALL, &[PublicState::Open, PublicState::Closed]);
    }
}
