// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`]: `Display` impl mapping enum variants to string literals
//! - [`step_sequence!`]: a fixed, ordered step enum implementing [`StepSequence`]
//!
//! [`StepSequence`]: crate::steps::StepSequence

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// ```ignore
/// crate::simple_display! {
///     ProcessManager {
///         Systemd => "systemd",
///         Nohup => "nohup",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $str, )+
                })
            }
        }
    };
}

/// Define the ordered steps of one operation kind.
///
/// Declaration order is the execution order: the first variant is where a
/// fresh operation starts and the engine refuses to move to an earlier one.
/// Each variant carries the exact name persisted in the operation context.
///
/// ```ignore
/// crate::step_sequence! {
///     /// Steps of a delete.
///     pub enum DeleteStep {
///         Init => "DELETE_INIT",
///         Done => "DELETE_DONE",
///     }
/// }
/// ```
#[macro_export]
macro_rules! step_sequence {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $str:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $crate::steps::StepSequence for $name {
            const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::steps::StepSequence::name(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::steps::UnknownStep;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $str => Ok(Self::$variant), )+
                    other => Err($crate::steps::UnknownStep(other.to_string())),
                }
            }
        }
    };
}
