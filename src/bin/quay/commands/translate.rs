//! `quay translate` command

use anyhow::Result;

use super::{print_args, resolve_compiler};
use crate::cli::TranslateArgs;

pub fn execute(args: TranslateArgs) -> Result<()> {
    let compiler = resolve_compiler(&args.identity)?;

    if compiler.native_translator().is_none() {
        tracing::debug!("{} takes GNU-style arguments as they are", compiler.identity());
    }
    let out = compiler.unix_args_to_native(&args.args);

    print_args(&out, args.json)
}
