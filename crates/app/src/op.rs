use std::error::Error;

use crate::args::Args;
use crate::state::{AppConfig, StateError};

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Settings merged from the config file and the global flags
    pub settings: AppConfig,
}

impl OpContext {
    /// Load the config file (if any) and apply the global flags on top of it
    pub fn new(args: &Args) -> Result<Self, StateError> {
        let settings = AppConfig::load(args.config.as_deref())?.with_overrides(&args.overrides);
        Ok(Self { settings })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Declares the `Command` subcommand enum plus its `OpOutput` and `OpError`
/// companions, one variant per `(Variant, "name", OpType)` entry.
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $name:literal, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $(
                #[command(name = $name)]
                $variant($type),
            )*
        }

        impl Command {
            /// The subcommand as typed on the command line
            pub fn name(&self) -> &'static str {
                match self {
                    $(Command::$variant(_) => $name,)*
                }
            }
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl OpOutput {
            /// Text for stdout, or `None` when the command already used stdout
            /// for its own data or has nothing to say.
            pub fn report(&self) -> Option<String> {
                let text = match self {
                    $(OpOutput::$variant(output) => output.to_string(),)*
                };
                (!text.is_empty()).then_some(text)
            }
        }
    };
}
