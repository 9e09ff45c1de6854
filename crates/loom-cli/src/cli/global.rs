use clap::ValueEnum;

/// How command results are printed on stdout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Compact JSON, or the compiled module itself for `compile`.
    Raw,
}

/// Flags accepted by every subcommand, copied out of [`super::Cli`].
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    /// Row cap for listings.
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
}
